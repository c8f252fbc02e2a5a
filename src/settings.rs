//! Tool settings: where `variants.yml` lives, where artifacts go, what is active.
//!
//! Settings resolve in layers, lowest priority first:
//!
//! 1. Compiled defaults (on the [`Settings`] struct)
//! 2. `variants.toml` files from the [`SearchPath`] list, deep-merged in order
//! 3. `VARIANTS__*` environment variables
//! 4. CLI overrides
//!
//! [`resolve`] is the pure pipeline over pre-loaded data. [`SettingsLoader`] does
//! the I/O and hands off to it.

use std::path::{Path, PathBuf};

use confique::Config;
use serde::Serialize;
use toml::{Table, Value};
use tracing::debug;

use crate::env;
use crate::error::VariantsError;
use crate::file;
use crate::merge::deep_merge;
use crate::platform::Platform;
use crate::types::{Boundary, SearchPath};
use crate::validate;

/// Settings file name searched for in every settings directory.
pub const SETTINGS_FILE: &str = "variants.toml";

/// Prefix for settings environment variables (`VARIANTS__OUTPUT__IOS_DIR`).
pub const ENV_PREFIX: &str = "VARIANTS";

#[derive(Config, Serialize, Debug, Clone, PartialEq)]
pub struct Settings {
    /// Path of the variants spec. Relative paths are looked up in the working
    /// directory and then each parent directory.
    #[config(default = "variants.yml")]
    pub spec: String,

    /// Reject unknown keys in `variants.yml`.
    #[config(default = true)]
    pub strict: bool,

    /// Where generated files are written, relative to the directory holding `variants.yml`.
    #[config(nested)]
    pub output: OutputSettings,

    /// The last variant switched to, per platform.
    #[config(nested)]
    pub active: ActiveVariants,
}

#[derive(Config, Serialize, Debug, Clone, PartialEq)]
pub struct OutputSettings {
    /// Directory for iOS `.xcconfig` files.
    #[config(default = "Variants")]
    pub ios_dir: String,

    /// Directory for the Android properties file.
    #[config(default = "variants")]
    pub android_dir: String,

    /// Directory for the Fastlane parameters file.
    #[config(default = "fastlane/parameters")]
    pub ci_dir: String,
}

#[derive(Config, Serialize, Debug, Clone, PartialEq)]
pub struct ActiveVariants {
    pub ios: Option<String>,
    pub android: Option<String>,
}

impl Settings {
    /// Spec path resolved against `cwd`, searching parent directories.
    pub fn spec_path(&self, cwd: &Path) -> PathBuf {
        file::find_spec(cwd, Path::new(&self.spec))
    }

    pub fn active(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Ios => self.active.ios.as_deref(),
            Platform::Android => self.active.android.as_deref(),
        }
    }

    /// Build-config output directory for `platform`.
    pub fn output_dir(&self, platform: Platform) -> &str {
        match platform {
            Platform::Ios => &self.output.ios_dir,
            Platform::Android => &self.output.android_dir,
        }
    }
}

/// All pre-loaded data needed to resolve settings. No I/O happens here.
#[derive(Debug, Clone, Default)]
pub struct SettingsInput {
    /// File contents, lowest priority first.
    pub files: Vec<(PathBuf, String)>,
    /// Raw environment variable pairs.
    pub env_vars: Vec<(String, String)>,
    /// `(dotted_key, value)` pairs from the command line.
    pub cli_overrides: Vec<(String, Value)>,
    /// Reject unknown keys in settings files.
    pub strict: bool,
}

/// Merge every layer and let confique fill defaults.
pub fn resolve(input: SettingsInput) -> Result<Settings, VariantsError> {
    let mut merged = Table::new();
    for (path, content) in &input.files {
        if input.strict {
            validate::validate_settings_keys::<Settings>(content, path)?;
        }
        let table: Table = toml::from_str(content).map_err(|e| VariantsError::SettingsParse {
            path: path.clone(),
            source: e,
        })?;
        merged = deep_merge(merged, table);
    }

    merged = deep_merge(merged, env::env_to_table(ENV_PREFIX, input.env_vars));
    merged = deep_merge(merged, overrides_to_table(&input.cli_overrides)?);

    let layer: <Settings as Config>::Layer =
        Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| VariantsError::InvalidValue {
                key: "<settings>".into(),
                reason: e.to_string(),
            })?;

    Ok(Settings::builder().preloaded(layer).load()?)
}

/// Expand dotted-key overrides into nested tables. Last entry for a key wins.
fn overrides_to_table(entries: &[(String, Value)]) -> Result<Table, VariantsError> {
    let mut table = Table::new();
    for (dotted_key, value) in entries {
        let segments: Vec<&str> = dotted_key.split('.').collect();
        let Some((leaf, parents)) = segments.split_last() else {
            continue;
        };
        let mut current = &mut table;
        for segment in parents {
            current = current
                .entry(*segment)
                .or_insert_with(|| Value::Table(Table::new()))
                .as_table_mut()
                .ok_or_else(|| VariantsError::InvalidValue {
                    key: dotted_key.clone(),
                    reason: format!("'{segment}' is not a table"),
                })?;
        }
        current.insert(leaf.to_string(), value.clone());
    }
    Ok(table)
}

/// Loads settings from disk and the process environment.
pub struct SettingsLoader {
    search_paths: Vec<SearchPath>,
    start_dir: Option<PathBuf>,
    env_enabled: bool,
    strict: bool,
    cli_overrides: Vec<(String, Value)>,
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsLoader {
    /// Platform config directory, then ancestors of the working directory up to
    /// the repository root.
    pub fn new() -> Self {
        Self {
            search_paths: vec![
                SearchPath::Platform,
                SearchPath::Ancestors(Boundary::Marker(".git")),
            ],
            start_dir: None,
            env_enabled: true,
            strict: true,
            cli_overrides: Vec::new(),
        }
    }

    /// Replace the search paths. Last entry has the highest priority.
    pub fn search_paths(mut self, paths: Vec<SearchPath>) -> Self {
        self.search_paths = paths;
        self
    }

    /// Directory `Ancestors` walks from (default: the working directory).
    pub fn start_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.start_dir = Some(dir.into());
        self
    }

    pub fn no_env(mut self) -> Self {
        self.env_enabled = false;
        self
    }

    /// Enable or disable unknown-key errors in settings files (default: `true`).
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Add a CLI override. `None` values are ignored (useful for optional clap args).
    pub fn cli_override<V: Into<Value>>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.cli_overrides.push((key.to_string(), v.into()));
        }
        self
    }

    fn build_input(&self) -> Result<SettingsInput, VariantsError> {
        let start = match &self.start_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(|e| VariantsError::IoError {
                path: PathBuf::from("."),
                source: e,
            })?,
        };
        let dirs = file::expand_search_paths(&self.search_paths, &start);
        let files = file::load_all(&dirs, SETTINGS_FILE)?;
        let env_vars = if self.env_enabled {
            std::env::vars().collect()
        } else {
            Vec::new()
        };

        Ok(SettingsInput {
            files,
            env_vars,
            cli_overrides: self.cli_overrides.clone(),
            strict: self.strict,
        })
    }

    pub fn load(self) -> Result<Settings, VariantsError> {
        let input = self.build_input()?;
        debug!(files = input.files.len(), "resolving settings");
        resolve(input)
    }
}
