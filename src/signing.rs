//! Code-signing configuration and its field-wise merge.
//!
//! Each signing level in `variants.yml` may be partial. Levels are combined field by
//! field, so a variant that only sets `team_id` still inherits `team_name` from the
//! global block. Mandatory fields are checked once, on the combined result.

use serde::{Deserialize, Serialize};

use crate::merge::first_some;
use crate::property::{CustomProperty, PropertyDestination};

/// A mandatory signing field was still unset after merging all levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingField(pub &'static str);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMethod {
    #[serde(alias = "app-store", alias = "app_store")]
    Appstore,
    Development,
    #[serde(alias = "ad-hoc", alias = "ad_hoc")]
    Adhoc,
    Enterprise,
}

impl ExportMethod {
    /// Profile name prefix used by `match` for this export method.
    pub fn match_prefix(self) -> &'static str {
        match self {
            ExportMethod::Appstore => "match AppStore",
            ExportMethod::Development => "match Development",
            ExportMethod::Enterprise => "match InHouse",
            ExportMethod::Adhoc => "match AdHoc",
        }
    }
}

/// iOS signing. Every field is optional at every level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningConfig {
    pub team_name: Option<String>,
    pub team_id: Option<String>,
    pub export_method: Option<ExportMethod>,
    pub match_url: Option<String>,
}

impl SigningConfig {
    /// Combine levels field by field, highest priority first. No validation.
    pub fn layered(levels: &[Option<&SigningConfig>]) -> Option<SigningConfig> {
        if levels.iter().all(Option::is_none) {
            return None;
        }
        let field = |pick: fn(&SigningConfig) -> Option<&String>| {
            first_some(&levels.iter().map(|l| l.and_then(pick)).collect::<Vec<_>>())
        };
        Some(SigningConfig {
            team_name: field(|s| s.team_name.as_ref()),
            team_id: field(|s| s.team_id.as_ref()),
            export_method: levels.iter().flatten().find_map(|s| s.export_method),
            match_url: field(|s| s.match_url.as_ref()),
        })
    }

    /// `override` wins field by field; the result must have team name, team id
    /// and export method, checked in that order.
    pub fn merge(
        over: Option<&SigningConfig>,
        base: Option<&SigningConfig>,
    ) -> Result<SigningConfig, MissingField> {
        Self::layered(&[over, base])
            .unwrap_or_default()
            .validated()
    }

    pub fn validated(self) -> Result<SigningConfig, MissingField> {
        if self.team_name.is_none() {
            return Err(MissingField("team_name"));
        }
        if self.team_id.is_none() {
            return Err(MissingField("team_id"));
        }
        if self.export_method.is_none() {
            return Err(MissingField("export_method"));
        }
        Ok(self)
    }

    /// Fastlane parameters derived from this configuration.
    pub fn custom_properties(&self) -> Vec<CustomProperty> {
        let ci = |name: &str, value: &str| {
            CustomProperty::new(name, value, PropertyDestination::CiParameter)
        };
        let mut props = Vec::new();
        if let Some(team_name) = &self.team_name {
            props.push(ci("TEAMNAME", team_name));
        }
        if let Some(method) = self.export_method {
            props.push(ci("EXPORTMETHOD", method.match_prefix()));
        }
        if let Some(url) = &self.match_url {
            props.push(ci("MATCH_GIT_URL", url));
        }
        props
    }
}

/// Android keystore signing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AndroidSigning {
    pub key_alias: Option<String>,
    pub key_password: Option<String>,
    pub store_file: Option<String>,
    pub store_password: Option<String>,
}

impl AndroidSigning {
    /// Same contract as [`SigningConfig::merge`]; all four fields are mandatory.
    pub fn merge(
        over: Option<&AndroidSigning>,
        base: Option<&AndroidSigning>,
    ) -> Result<AndroidSigning, MissingField> {
        let pick = |f: fn(&AndroidSigning) -> Option<&String>| {
            first_some(&[over.and_then(f), base.and_then(f)])
        };
        let merged = AndroidSigning {
            key_alias: pick(|s| s.key_alias.as_ref()),
            key_password: pick(|s| s.key_password.as_ref()),
            store_file: pick(|s| s.store_file.as_ref()),
            store_password: pick(|s| s.store_password.as_ref()),
        };
        for (name, value) in [
            ("key_alias", &merged.key_alias),
            ("key_password", &merged.key_password),
            ("store_file", &merged.store_file),
            ("store_password", &merged.store_password),
        ] {
            if value.is_none() {
                return Err(MissingField(name));
            }
        }
        Ok(merged)
    }
}
