//! Artifact writers: render projections to text and write them under the project.
//!
//! Rendering is pure. Every file is rewritten in full on each switch, so the same
//! variant always produces byte-identical output.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::error::VariantsError;
use crate::platform::Platform;
use crate::project::{self, CiParameters};
use crate::settings::Settings;
use crate::variant::{Target, Variant};

pub const ENV_FILE: &str = "variants.env";
pub const ANDROID_PROPERTIES_FILE: &str = "variants.properties";
pub const CI_PARAMETERS_FILE: &str = "variants_params.json";

/// Where each artifact for one switch lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub build_config: PathBuf,
    pub environment: PathBuf,
    pub ci_parameters: PathBuf,
}

impl ArtifactPaths {
    /// Paths for `platform` and `target`, relative directories taken from `root`.
    pub fn new(settings: &Settings, root: &Path, platform: Platform, target: &Target) -> Self {
        let out = root.join(settings.output_dir(platform));
        let build_config = match platform {
            Platform::Ios => out.join(format!("{}.xcconfig", target.name)),
            Platform::Android => out.join(ANDROID_PROPERTIES_FILE),
        };
        Self {
            build_config,
            environment: out.join(ENV_FILE),
            ci_parameters: root.join(&settings.output.ci_dir).join(CI_PARAMETERS_FILE),
        }
    }

    pub fn all(&self) -> [&Path; 3] {
        [&self.build_config, &self.environment, &self.ci_parameters]
    }
}

/// `KEY = value` lines for an `.xcconfig`, `KEY=value` for Gradle properties.
pub fn render_build_config(platform: Platform, pairs: &[(String, String)]) -> String {
    let (comment, separator) = match platform {
        Platform::Ios => ("//", " = "),
        Platform::Android => ("#", "="),
    };
    let mut out = format!("{comment} Generated by variants. Do not edit.\n");
    for (key, value) in pairs {
        out.push_str(&format!("{key}{separator}{value}\n"));
    }
    out
}

pub fn render_environment(pairs: &[(String, String)]) -> String {
    let mut out = String::from("# Generated by variants. Do not edit.\n");
    for (name, value) in pairs {
        out.push_str(&format!("{name}={value}\n"));
    }
    out
}

/// JSON object with a `literal` map (name to value) and an `env` map (name to the
/// Fastlane lookup, `ENV["NAME"]`).
pub fn render_ci_parameters(params: &CiParameters) -> Result<String, VariantsError> {
    let literal: Map<String, Value> = params
        .literal
        .iter()
        .map(|p| (p.name.clone(), Value::String(p.value.clone())))
        .collect();
    let env: Map<String, Value> = params
        .env
        .iter()
        .map(|(name, lookup)| (name.clone(), Value::String(lookup.clone())))
        .collect();

    let mut out = serde_json::to_string_pretty(&json!({ "literal": literal, "env": env }))
        .map_err(|e| VariantsError::InvalidValue {
            key: CI_PARAMETERS_FILE.into(),
            reason: e.to_string(),
        })?;
    out.push('\n');
    Ok(out)
}

/// Render every projection of `variant` for `target` and write them to `paths`.
pub fn write_artifacts(
    variant: &Variant,
    target: &Target,
    paths: &ArtifactPaths,
) -> Result<(), VariantsError> {
    let build_config = project::project_for_build_config(variant, target);
    let environment = project::project_for_environment_export(variant);
    let ci = project::project_for_ci_parameters(variant);

    write_file(
        &paths.build_config,
        &render_build_config(variant.platform, &build_config),
    )?;
    write_file(&paths.environment, &render_environment(&environment))?;
    write_file(&paths.ci_parameters, &render_ci_parameters(&ci)?)?;

    info!(
        variant = %variant.name,
        target = %target.name,
        keys = build_config.len(),
        "artifacts written"
    );
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<(), VariantsError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| VariantsError::IoError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(path, content).map_err(|e| VariantsError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(path = %path.display(), bytes = content.len(), "wrote artifact");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ConfigurationDocument;
    use crate::fixtures::test::{ANDROID_SPEC, IOS_SPEC};
    use crate::settings::{self, SettingsInput};
    use std::fs;
    use tempfile::TempDir;

    fn settings() -> Settings {
        settings::resolve(SettingsInput::default()).unwrap()
    }

    fn resolved(spec: &str, platform: Platform, name: &str) -> (Variant, Target) {
        let doc = ConfigurationDocument::parse(spec).unwrap();
        (
            doc.resolve_variant(platform, name).unwrap(),
            doc.target(platform, None).unwrap(),
        )
    }

    #[test]
    fn paths_follow_settings() {
        let (_, target) = resolved(IOS_SPEC, Platform::Ios, "beta");
        let paths = ArtifactPaths::new(&settings(), Path::new("/proj"), Platform::Ios, &target);
        assert_eq!(paths.build_config, Path::new("/proj/Variants/AcmeApp.xcconfig"));
        assert_eq!(paths.environment, Path::new("/proj/Variants/variants.env"));
        assert_eq!(
            paths.ci_parameters,
            Path::new("/proj/fastlane/parameters/variants_params.json")
        );

        let (_, target) = resolved(ANDROID_SPEC, Platform::Android, "qa");
        let paths =
            ArtifactPaths::new(&settings(), Path::new("/proj"), Platform::Android, &target);
        assert_eq!(
            paths.build_config,
            Path::new("/proj/variants/variants.properties")
        );
    }

    #[test]
    fn xcconfig_and_properties_syntax() {
        let pairs = vec![("V_APP_NAME".to_string(), "Acme Beta".to_string())];
        let ios = render_build_config(Platform::Ios, &pairs);
        assert!(ios.starts_with("// "));
        assert!(ios.ends_with("V_APP_NAME = Acme Beta\n"));

        let android = render_build_config(Platform::Android, &pairs);
        assert!(android.starts_with("# "));
        assert!(android.ends_with("V_APP_NAME=Acme Beta\n"));
    }

    #[test]
    fn ci_parameters_json_shape() {
        let (variant, _) = resolved(IOS_SPEC, Platform::Ios, "beta");
        let rendered = render_ci_parameters(&project::project_for_ci_parameters(&variant)).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["literal"]["STORE_DESTINATION"], "testFlight");
        assert_eq!(value["literal"]["TEAMNAME"], "Acme");
        assert_eq!(value["env"]["API_KEY"], "ENV[\"ACME_API_KEY\"]");
    }

    #[test]
    fn writes_all_files_deterministically() {
        let dir = TempDir::new().unwrap();
        let (variant, target) = resolved(IOS_SPEC, Platform::Ios, "beta");
        let paths = ArtifactPaths::new(&settings(), dir.path(), Platform::Ios, &target);

        write_artifacts(&variant, &target, &paths).unwrap();
        let first: Vec<String> = paths
            .all()
            .iter()
            .map(|p| fs::read_to_string(p).unwrap())
            .collect();

        write_artifacts(&variant, &target, &paths).unwrap();
        let second: Vec<String> = paths
            .all()
            .iter()
            .map(|p| fs::read_to_string(p).unwrap())
            .collect();

        assert_eq!(first, second);
        assert!(first[0].contains("V_BUNDLE_ID = com.acme.app.beta\n"));
        assert!(first[1].contains("LOG_LEVEL=debug\n"));
    }

    #[test]
    fn switching_replaces_previous_content() {
        let dir = TempDir::new().unwrap();
        let doc = ConfigurationDocument::parse(IOS_SPEC).unwrap();
        let target = doc.target(Platform::Ios, None).unwrap();
        let paths = ArtifactPaths::new(&settings(), dir.path(), Platform::Ios, &target);

        let beta = doc.resolve_variant(Platform::Ios, "beta").unwrap();
        write_artifacts(&beta, &target, &paths).unwrap();
        let default = doc.resolve_variant(Platform::Ios, "default").unwrap();
        write_artifacts(&default, &target, &paths).unwrap();

        let xcconfig = fs::read_to_string(&paths.build_config).unwrap();
        assert!(xcconfig.contains("V_BUNDLE_ID = com.acme.app\n"));
        assert!(!xcconfig.contains("beta"));
    }
}
