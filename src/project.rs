//! Output projection: a resolved variant flattened into what each artifact needs.
//!
//! Every function here is pure and deterministic. Writing the results to disk is
//! [`crate::artifacts`]' job.

use serde::Serialize;

use crate::property::{CustomProperty, PropertyDestination};
use crate::variant::{Target, Variant};

/// Prefix reserved for keys the projection computes itself.
pub const RESERVED_PREFIX: &str = "V_";

/// Fastlane parameters, split by how the value is obtained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CiParameters {
    /// Values written verbatim.
    pub literal: Vec<CustomProperty>,
    /// `(name, lookup)` pairs read from the environment when the lane runs,
    /// e.g. `("API_KEY", "ENV[\"ACME_API_KEY\"]")`.
    pub env: Vec<(String, String)>,
}

/// Build settings for `variant` applied to `target`, sorted by key.
///
/// Custom properties whose name starts with `V_` are dropped; the computed keys
/// always win.
pub fn project_for_build_config(variant: &Variant, target: &Target) -> Vec<(String, String)> {
    let bundle_id = variant.bundle_id(target);
    let mut pairs = vec![
        ("V_APP_NAME".to_string(), variant.display_name(target)),
        ("V_BUNDLE_ID".to_string(), bundle_id.clone()),
        ("V_VERSION_NAME".to_string(), variant.version_name.clone()),
        (
            "V_VERSION_NUMBER".to_string(),
            variant.version_number.to_string(),
        ),
        ("V_APP_ICON".to_string(), variant.app_icon(target)),
    ];

    if let Some(release) = variant.release_signing()
        && let (Some(method), Some(_)) = (release.export_method, &release.match_url)
    {
        pairs.push((
            "V_MATCH_PROFILE".to_string(),
            format!("{} {bundle_id}", method.match_prefix()),
        ));
    }

    pairs.extend(
        variant
            .custom
            .iter()
            .filter(|p| p.destination == PropertyDestination::BuildConfig)
            .filter(|p| !p.name.starts_with(RESERVED_PREFIX))
            .map(|p| (p.name.clone(), p.process_for_environment().1)),
    );

    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}

/// Shell exports in merged property order.
pub fn project_for_environment_export(variant: &Variant) -> Vec<(String, String)> {
    variant
        .custom
        .iter()
        .filter(|p| p.destination == PropertyDestination::EnvVar)
        .map(|p| (p.name.clone(), p.environment_value()))
        .collect()
}

/// Fastlane parameters. Environment-sourced values are rendered as lookups;
/// the store destination and release signing entries are appended as literals.
pub fn project_for_ci_parameters(variant: &Variant) -> CiParameters {
    let mut literal = Vec::new();
    let mut env = Vec::new();
    for property in variant
        .custom
        .iter()
        .filter(|p| p.destination == PropertyDestination::CiParameter)
    {
        match property.process_for_environment() {
            (true, lookup) => env.push((property.name.clone(), lookup)),
            (false, _) => literal.push(property.clone()),
        }
    }

    literal.push(variant.store_destination_property());
    if let Some(release) = variant.release_signing() {
        literal.extend(release.custom_properties());
    }

    CiParameters { literal, env }
}
