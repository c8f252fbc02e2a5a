//! Command operations: starter templates, listing, inspection and switching.
//!
//! Each operation returns a [`VariantsResult`] that callers display. Nothing here
//! prints.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::artifacts::{self, ArtifactPaths};
use crate::document::ConfigurationDocument;
use crate::error::VariantsError;
use crate::persist;
use crate::platform::Platform;
use crate::project::{self, CiParameters};
use crate::settings::{SETTINGS_FILE, Settings};
use crate::types::VariantsAction;
use crate::variant::Target;

const IOS_TEMPLATE: &str = r#"ios:
  xcodeproj: MyApp.xcodeproj
  targets:
    MyApp:
      app_name: MyApp
      bundle_id: com.example.myapp
      source:
        path: MyApp
        info: MyApp/Info.plist
  signing:
    team_name: Example Inc
    team_id: ABCDE12345
    export_method: appstore
  custom:
    - name: API_HOST
      value: api.example.com
  variants:
    default:
      version_name: "0.1.0"
      version_number: 1
    beta:
      id_suffix: beta
      version_name: "0.1.0"
      version_number: 1
      store_destination: testFlight
"#;

const ANDROID_TEMPLATE: &str = r#"android:
  path: app
  app_name: MyApp
  app_identifier: com.example.myapp
  signing:
    key_alias: upload
    key_password: "{{ envVars.KEY_PASSWORD }}"
    store_file: upload.jks
    store_password: "{{ envVars.STORE_PASSWORD }}"
  custom:
    - name: API_HOST
      value: api.example.com
      destination: gradle
  variants:
    default:
      version_name: "0.1.0"
      version_code: 1
    beta:
      id_suffix: beta
      version_name: "0.1.0"
      version_code: 1
      store_destination: firebase
"#;

/// Starter spec for `platform`.
pub fn template(platform: Platform) -> &'static str {
    match platform {
        Platform::Ios => IOS_TEMPLATE,
        Platform::Android => ANDROID_TEMPLATE,
    }
}

/// One line of `list` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSummary {
    pub name: String,
    pub bundle_id: String,
    pub version: String,
    pub active: bool,
}

/// Everything a variant projects to, for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectionReport {
    pub platform: Platform,
    pub variant: String,
    pub target: String,
    pub build_config: BTreeMap<String, String>,
    pub environment: Vec<(String, String)>,
    pub ci_parameters: CiParameters,
    pub post_switch_script: Option<String>,
}

/// Result of an operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantsResult {
    /// A starter spec.
    Template(String),
    /// Confirmation that a starter spec was written.
    TemplateWritten { path: PathBuf },
    Listing {
        platform: Platform,
        entries: Vec<VariantSummary>,
    },
    Projection(ProjectionReport),
    /// Pre-rendered JSON.
    Json(String),
    Switched {
        platform: Platform,
        variant: String,
        files: Vec<PathBuf>,
        post_switch_script: Option<String>,
    },
}

impl fmt::Display for VariantsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantsResult::Template(t) | VariantsResult::Json(t) => write!(f, "{t}"),
            VariantsResult::TemplateWritten { path } => {
                writeln!(f, "Variants spec written to {}", path.display())
            }
            VariantsResult::Listing { platform, entries } => {
                writeln!(f, "{platform} variants:")?;
                for entry in entries {
                    let marker = if entry.active { '*' } else { ' ' };
                    writeln!(
                        f,
                        "{marker} {:<16} {:<40} {}",
                        entry.name, entry.bundle_id, entry.version
                    )?;
                }
                Ok(())
            }
            VariantsResult::Projection(report) => {
                writeln!(
                    f,
                    "{} / {} (target {})",
                    report.platform, report.variant, report.target
                )?;
                writeln!(f, "\n[build config]")?;
                for (key, value) in &report.build_config {
                    writeln!(f, "{key} = {value}")?;
                }
                writeln!(f, "\n[environment]")?;
                for (name, value) in &report.environment {
                    writeln!(f, "{name}={value}")?;
                }
                writeln!(f, "\n[ci parameters]")?;
                for p in &report.ci_parameters.literal {
                    writeln!(f, "{} = {}", p.name, p.value)?;
                }
                for (name, lookup) in &report.ci_parameters.env {
                    writeln!(f, "{name} = {lookup}")?;
                }
                if let Some(script) = &report.post_switch_script {
                    writeln!(f, "\n[post switch]\n{script}")?;
                }
                Ok(())
            }
            VariantsResult::Switched {
                platform,
                variant,
                files,
                post_switch_script,
            } => {
                writeln!(f, "Switched {platform} to '{variant}'")?;
                for file in files {
                    writeln!(f, "  wrote {}", file.display())?;
                }
                if let Some(script) = post_switch_script {
                    writeln!(f, "Post-switch script (not run): {script}")?;
                }
                Ok(())
            }
        }
    }
}

/// Settings plus the directory commands run from.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub settings: Settings,
    pub cwd: PathBuf,
}

impl Workspace {
    pub fn new(settings: Settings, cwd: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            cwd: cwd.into(),
        }
    }

    /// Load `variants.yml`. Returns it with the directory artifacts are written under.
    pub fn load_document(&self) -> Result<(ConfigurationDocument, PathBuf), VariantsError> {
        let path = self.settings.spec_path(&self.cwd);
        let doc = ConfigurationDocument::load(&path, self.settings.strict)?;
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone());
        Ok((doc, root))
    }

    pub fn handle(&self, action: &VariantsAction) -> Result<VariantsResult, VariantsError> {
        match action {
            VariantsAction::Init { platform, output } => init(*platform, output.as_deref()),
            VariantsAction::List { platform } => self.list(*platform),
            VariantsAction::Show {
                platform,
                variant,
                target,
                json,
            } => {
                let report = self.show(*platform, variant, target.as_deref())?;
                if *json {
                    let rendered = serde_json::to_string_pretty(&report).map_err(|e| {
                        VariantsError::InvalidValue {
                            key: variant.clone(),
                            reason: e.to_string(),
                        }
                    })?;
                    Ok(VariantsResult::Json(format!("{rendered}\n")))
                } else {
                    Ok(VariantsResult::Projection(report))
                }
            }
            VariantsAction::Switch {
                platform,
                variant,
                target,
            } => self.switch(*platform, variant, target.as_deref()),
        }
    }

    /// Handle an action and print the result to stdout.
    pub fn handle_and_print(&self, action: &VariantsAction) -> Result<(), VariantsError> {
        let result = self.handle(action)?;
        print!("{result}");
        Ok(())
    }

    fn list(&self, platform: Platform) -> Result<VariantsResult, VariantsError> {
        let (doc, _) = self.load_document()?;
        // The bundle id column is informational; a spec without targets still lists.
        let target = match doc.target(platform, None) {
            Ok(target) => Some(target),
            Err(VariantsError::TargetNotFound { .. }) => None,
            Err(e) => return Err(e),
        };
        let active = self.settings.active(platform);
        let entries = doc
            .resolve_all_variants(platform)?
            .into_iter()
            .map(|v| VariantSummary {
                active: active.is_some_and(|a| a.eq_ignore_ascii_case(&v.name)),
                bundle_id: target
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |t| v.bundle_id(t)),
                version: format!("{} ({})", v.version_name, v.version_number),
                name: v.name,
            })
            .collect();
        Ok(VariantsResult::Listing { platform, entries })
    }

    fn show(
        &self,
        platform: Platform,
        name: &str,
        target: Option<&str>,
    ) -> Result<ProjectionReport, VariantsError> {
        let (doc, _) = self.load_document()?;
        let variant = doc.resolve_variant(platform, name)?;
        let target: Target = doc.target(platform, target)?;
        Ok(ProjectionReport {
            platform,
            build_config: project::project_for_build_config(&variant, &target)
                .into_iter()
                .collect(),
            environment: project::project_for_environment_export(&variant),
            ci_parameters: project::project_for_ci_parameters(&variant),
            target: target.name,
            post_switch_script: variant.post_switch_script,
            variant: variant.name,
        })
    }

    fn switch(
        &self,
        platform: Platform,
        name: &str,
        target: Option<&str>,
    ) -> Result<VariantsResult, VariantsError> {
        let (doc, root) = self.load_document()?;
        doc.require_default_variant(platform)?;
        let variant = doc.resolve_variant(platform, name)?;
        let target = doc.target(platform, target)?;

        let paths = ArtifactPaths::new(&self.settings, &root, platform, &target);
        artifacts::write_artifacts(&variant, &target, &paths)?;
        persist::set_active_variant(&self.cwd.join(SETTINGS_FILE), platform, &variant.name)?;

        if let Some(script) = &variant.post_switch_script {
            warn!(
                variant = %variant.name,
                script = script.as_str(),
                "post-switch script is not executed"
            );
        }
        info!(%platform, variant = %variant.name, "switched");

        Ok(VariantsResult::Switched {
            platform,
            files: paths.all().iter().map(|p| p.to_path_buf()).collect(),
            post_switch_script: variant.post_switch_script,
            variant: variant.name,
        })
    }
}

fn init(platform: Platform, output: Option<&Path>) -> Result<VariantsResult, VariantsError> {
    let content = template(platform).to_string();
    match output {
        Some(path) => {
            std::fs::write(path, &content).map_err(|e| VariantsError::IoError {
                path: path.to_path_buf(),
                source: e,
            })?;
            Ok(VariantsResult::TemplateWritten {
                path: path.to_path_buf(),
            })
        }
        None => Ok(VariantsResult::Template(content)),
    }
}
