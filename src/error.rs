use std::path::PathBuf;
use thiserror::Error;

use crate::platform::Platform;

#[derive(Debug, Error)]
pub enum VariantsError {
    #[error("Failed to parse variants spec: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Unknown key '{key}' in {path} (line {line})")]
    UnknownKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    #[error("Unknown keys in {}", .0.first().map(unknown_key_path).unwrap_or_default())]
    UnknownKeys(Vec<VariantsError>),

    #[error("Failed to parse {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Settings error: {0}")]
    Settings(#[from] confique::Error),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Platform '{0}' is not declared in the variants spec")]
    PlatformNotDeclared(Platform),

    #[error("Variant '{name}' not found for {platform}")]
    VariantNotFound { name: String, platform: Platform },

    #[error("No 'default' variant declared for {0}")]
    MissingDefaultVariant(Platform),

    #[error("Variant '{0}' sets both 'id_suffix' and 'bundle_id'; use only one")]
    ConflictingBundleNaming(String),

    #[error("Variant '{0}' needs either 'id_suffix' or 'bundle_id'")]
    MissingBundleNaming(String),

    #[error("Variant '{0}' has no signing configuration and no global signing is set")]
    MissingSigningConfiguration(String),

    #[error("Variant '{variant}' is missing signing field '{field}'")]
    MissingSigningField { variant: String, field: &'static str },

    #[error(
        "Variant '{variant}' has invalid store destination '{value}'; expected one of: {}",
        .allowed.join(", ")
    )]
    InvalidDestination {
        variant: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Target '{name}' not found for {platform}")]
    TargetNotFound { name: String, platform: Platform },
}

fn unknown_key_path(err: &VariantsError) -> String {
    match err {
        VariantsError::UnknownKey { path, .. } => path.display().to_string(),
        _ => String::new(),
    }
}
