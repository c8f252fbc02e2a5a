//! Variant resolution: one raw override plus platform globals in, one validated
//! [`Variant`] out.
//!
//! Resolution is a single pure pass. The first failing rule aborts it and no
//! partially filled variant escapes. Steps, in order:
//!
//! 1. Store destination (variant, then globals, then the platform fallback)
//! 2. Bundle naming (`default` is always derived from the target)
//! 3. Signing, field-wise across every declared level
//! 4. Custom properties, variant entries replacing same-named globals
//! 5. Post-switch script, global and variant fragments chained with `&&`

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::VariantsError;
use crate::merge::{join_scripts, merge_properties};
use crate::platform::{Platform, StoreDestination};
use crate::property::CustomProperty;
use crate::signing::{AndroidSigning, MissingField, SigningConfig};

/// Reserved name of the variant every platform must declare.
pub const DEFAULT_VARIANT: &str = "default";

pub fn is_default_name(name: &str) -> bool {
    name.eq_ignore_ascii_case(DEFAULT_VARIANT)
}

/// The build target a variant is applied to: base name, identifier and icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    pub name: String,
    pub app_name: String,
    pub bundle_id: String,
    pub app_icon: String,
}

/// How a variant derives its bundle identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BundleNaming {
    /// The target's identifier, unchanged. Only the default variant uses this.
    FromTarget,
    /// Target identifier + `"."` + suffix.
    IdSuffix(String),
    /// A literal identifier; the target's is ignored.
    ExplicitBundleId(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantSigning {
    Apple {
        debug: SigningConfig,
        release: SigningConfig,
    },
    Android(AndroidSigning),
}

/// Signing levels as declared in `variants.yml`, before merging.
#[derive(Debug, Clone, Copy)]
pub enum SigningLevels<'a> {
    Apple {
        debug: Option<&'a SigningConfig>,
        release: Option<&'a SigningConfig>,
        variant: Option<&'a SigningConfig>,
        global: Option<&'a SigningConfig>,
    },
    Android {
        variant: Option<&'a AndroidSigning>,
        global: Option<&'a AndroidSigning>,
    },
}

/// Borrowed view of one raw variant entry.
#[derive(Debug, Clone, Copy)]
pub struct VariantInput<'a> {
    pub name: &'a str,
    pub version_name: &'a str,
    pub version_number: u64,
    pub app_name: Option<&'a str>,
    pub app_icon: Option<&'a str>,
    pub id_suffix: Option<&'a str>,
    pub bundle_id: Option<&'a str>,
    pub store_destination: Option<&'a str>,
    pub signing: SigningLevels<'a>,
    pub custom: &'a [CustomProperty],
    pub post_switch_script: Option<&'a str>,
}

/// Platform-wide settings every variant inherits.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalDefaults<'a> {
    pub store_destination: Option<&'a str>,
    pub custom: &'a [CustomProperty],
    pub post_switch_script: Option<&'a str>,
}

/// A fully resolved, immutable build variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub name: String,
    pub platform: Platform,
    pub version_name: String,
    pub version_number: u64,
    pub app_name: Option<String>,
    pub app_icon: Option<String>,
    pub store_destination: StoreDestination,
    pub signing: VariantSigning,
    pub custom: Vec<CustomProperty>,
    pub naming: BundleNaming,
    pub post_switch_script: Option<String>,
}

impl Variant {
    pub fn is_default(&self) -> bool {
        is_default_name(&self.name)
    }

    pub fn bundle_id(&self, target: &Target) -> String {
        match &self.naming {
            BundleNaming::FromTarget => target.bundle_id.clone(),
            BundleNaming::IdSuffix(suffix) => format!("{}.{suffix}", target.bundle_id),
            BundleNaming::ExplicitBundleId(id) => id.clone(),
        }
    }

    /// Explicit `app_name`, else the target name, suffixed with the capitalized
    /// variant name for anything but `default`.
    pub fn display_name(&self, target: &Target) -> String {
        if let Some(name) = &self.app_name {
            return name.clone();
        }
        if self.is_default() {
            return target.app_name.clone();
        }
        format!("{} {}", target.app_name, capitalize(&self.name))
    }

    pub fn app_icon(&self, target: &Target) -> String {
        self.app_icon
            .clone()
            .unwrap_or_else(|| target.app_icon.clone())
    }

    /// Release signing on iOS; Android has no separate release block.
    pub fn release_signing(&self) -> Option<&SigningConfig> {
        match &self.signing {
            VariantSigning::Apple { release, .. } => Some(release),
            VariantSigning::Android(_) => None,
        }
    }

    pub fn debug_signing(&self) -> Option<&SigningConfig> {
        match &self.signing {
            VariantSigning::Apple { debug, .. } => Some(debug),
            VariantSigning::Android(_) => None,
        }
    }

    /// Fastlane property announcing where this variant ships.
    pub fn store_destination_property(&self) -> CustomProperty {
        CustomProperty::new(
            "STORE_DESTINATION",
            self.store_destination.as_str(),
            crate::property::PropertyDestination::CiParameter,
        )
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Resolve one variant against its platform's globals.
pub fn resolve(
    platform: Platform,
    input: &VariantInput<'_>,
    globals: &GlobalDefaults<'_>,
) -> Result<Variant, VariantsError> {
    debug!(variant = input.name, %platform, "resolving variant");

    let store_destination = match input.store_destination.or(globals.store_destination) {
        Some(raw) => platform.parse_store_destination(input.name, raw)?,
        None => platform.default_store_destination(),
    };

    let naming = resolve_naming(platform, input)?;
    let signing = resolve_signing(input.name, &input.signing)?;
    let custom = merge_properties(globals.custom, input.custom);
    for property in custom.iter().filter(|p| p.has_embedded_placeholder()) {
        warn!(
            variant = input.name,
            property = property.name.as_str(),
            "envVars placeholder inside a larger value is written literally"
        );
    }
    let post_switch_script = join_scripts(globals.post_switch_script, input.post_switch_script);

    debug!(
        variant = input.name,
        properties = custom.len(),
        destination = %store_destination,
        "variant resolved"
    );

    Ok(Variant {
        name: input.name.to_string(),
        platform,
        version_name: input.version_name.to_string(),
        version_number: input.version_number,
        app_name: input.app_name.map(str::to_string),
        app_icon: input.app_icon.map(str::to_string),
        store_destination,
        signing,
        custom,
        naming,
        post_switch_script,
    })
}

fn resolve_naming(
    platform: Platform,
    input: &VariantInput<'_>,
) -> Result<BundleNaming, VariantsError> {
    if is_default_name(input.name) {
        if input.id_suffix.is_some() || input.bundle_id.is_some() {
            warn!(
                %platform,
                "'id_suffix' and '{}' are ignored on the default variant",
                platform.bundle_id_key()
            );
        }
        return Ok(BundleNaming::FromTarget);
    }
    match (input.id_suffix, input.bundle_id) {
        (Some(_), Some(_)) => Err(VariantsError::ConflictingBundleNaming(
            input.name.to_string(),
        )),
        (Some(suffix), None) => Ok(BundleNaming::IdSuffix(suffix.to_string())),
        (None, Some(id)) => Ok(BundleNaming::ExplicitBundleId(id.to_string())),
        (None, None) => Err(VariantsError::MissingBundleNaming(input.name.to_string())),
    }
}

fn resolve_signing(
    variant: &str,
    levels: &SigningLevels<'_>,
) -> Result<VariantSigning, VariantsError> {
    let missing = |MissingField(field)| VariantsError::MissingSigningField {
        variant: variant.to_string(),
        field,
    };
    let nothing = || VariantsError::MissingSigningConfiguration(variant.to_string());

    match *levels {
        SigningLevels::Apple {
            debug,
            release,
            variant: generic,
            global,
        } => {
            let debug = SigningConfig::layered(&[debug, generic, global]).ok_or_else(nothing)?;
            let release =
                SigningConfig::layered(&[release, generic, global]).ok_or_else(nothing)?;
            Ok(VariantSigning::Apple {
                debug: debug.validated().map_err(missing)?,
                release: release.validated().map_err(missing)?,
            })
        }
        SigningLevels::Android {
            variant: over,
            global,
        } => {
            if over.is_none() && global.is_none() {
                return Err(nothing());
            }
            AndroidSigning::merge(over, global)
                .map(VariantSigning::Android)
                .map_err(missing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyDestination;
    use crate::signing::ExportMethod;

    fn acme() -> SigningConfig {
        SigningConfig {
            team_name: Some("Acme".into()),
            team_id: Some("T123".into()),
            export_method: Some(ExportMethod::Appstore),
            match_url: None,
        }
    }

    fn target() -> Target {
        Target {
            name: "AcmeApp".into(),
            app_name: "Acme".into(),
            bundle_id: "com.acme.app".into(),
            app_icon: "AppIcon".into(),
        }
    }

    fn input<'a>(name: &'a str, global: Option<&'a SigningConfig>) -> VariantInput<'a> {
        VariantInput {
            name,
            version_name: "1.0.0",
            version_number: 7,
            app_name: None,
            app_icon: None,
            id_suffix: None,
            bundle_id: None,
            store_destination: None,
            signing: SigningLevels::Apple {
                debug: None,
                release: None,
                variant: None,
                global,
            },
            custom: &[],
            post_switch_script: None,
        }
    }

    #[test]
    fn beta_with_suffix_inherits_global_signing() {
        let global = acme();
        let raw = VariantInput {
            id_suffix: Some("beta"),
            ..input("beta", Some(&global))
        };
        let variant = resolve(Platform::Ios, &raw, &GlobalDefaults::default()).unwrap();
        assert_eq!(
            variant.release_signing().unwrap().team_name.as_deref(),
            Some("Acme")
        );
        assert_eq!(variant.bundle_id(&target()), "com.acme.app.beta");
        assert_eq!(variant.store_destination, StoreDestination::AppStore);
    }

    #[test]
    fn default_variant_uses_target_identity() {
        let global = acme();
        let variant = resolve(
            Platform::Ios,
            &input("default", Some(&global)),
            &GlobalDefaults::default(),
        )
        .unwrap();
        assert_eq!(variant.naming, BundleNaming::FromTarget);
        assert_eq!(variant.bundle_id(&target()), "com.acme.app");
        assert_eq!(variant.display_name(&target()), "Acme");
    }

    #[test]
    fn default_variant_ignores_naming_keys() {
        let global = acme();
        let raw = VariantInput {
            id_suffix: Some("dev"),
            ..input("default", Some(&global))
        };
        let variant = resolve(Platform::Ios, &raw, &GlobalDefaults::default()).unwrap();
        assert_eq!(variant.bundle_id(&target()), "com.acme.app");
    }

    #[test]
    fn both_naming_keys_conflict() {
        let global = acme();
        let raw = VariantInput {
            id_suffix: Some("beta"),
            bundle_id: Some("com.other.beta"),
            ..input("beta", Some(&global))
        };
        let err = resolve(Platform::Ios, &raw, &GlobalDefaults::default()).unwrap_err();
        assert!(matches!(err, VariantsError::ConflictingBundleNaming(name) if name == "beta"));
    }

    #[test]
    fn no_naming_key_is_missing() {
        let global = acme();
        let err = resolve(
            Platform::Ios,
            &input("beta", Some(&global)),
            &GlobalDefaults::default(),
        )
        .unwrap_err();
        assert!(matches!(err, VariantsError::MissingBundleNaming(name) if name == "beta"));
    }

    #[test]
    fn explicit_bundle_id_ignores_target() {
        let global = acme();
        let raw = VariantInput {
            bundle_id: Some("com.partner.whitelabel"),
            ..input("partner", Some(&global))
        };
        let variant = resolve(Platform::Ios, &raw, &GlobalDefaults::default()).unwrap();
        assert_eq!(variant.bundle_id(&target()), "com.partner.whitelabel");
    }

    #[test]
    fn display_name_suffixes_variant() {
        let global = acme();
        let raw = VariantInput {
            id_suffix: Some("beta"),
            ..input("beta", Some(&global))
        };
        let variant = resolve(Platform::Ios, &raw, &GlobalDefaults::default()).unwrap();
        assert_eq!(variant.display_name(&target()), "Acme Beta");

        let named = VariantInput {
            app_name: Some("Acme Preview"),
            ..raw
        };
        let variant = resolve(Platform::Ios, &named, &GlobalDefaults::default()).unwrap();
        assert_eq!(variant.display_name(&target()), "Acme Preview");
    }

    #[test]
    fn no_signing_anywhere() {
        let raw = VariantInput {
            id_suffix: Some("beta"),
            ..input("beta", None)
        };
        let err = resolve(Platform::Ios, &raw, &GlobalDefaults::default()).unwrap_err();
        assert!(matches!(err, VariantsError::MissingSigningConfiguration(name) if name == "beta"));
    }

    #[test]
    fn partial_signing_names_missing_field() {
        let partial = SigningConfig {
            team_name: Some("Acme".into()),
            export_method: Some(ExportMethod::Development),
            ..Default::default()
        };
        let raw = VariantInput {
            id_suffix: Some("beta"),
            ..input("beta", Some(&partial))
        };
        let err = resolve(Platform::Ios, &raw, &GlobalDefaults::default()).unwrap_err();
        match err {
            VariantsError::MissingSigningField { variant, field } => {
                assert_eq!(variant, "beta");
                assert_eq!(field, "team_id");
            }
            other => panic!("Expected MissingSigningField, got: {other:?}"),
        }
    }

    #[test]
    fn build_type_signing_beats_generic_field_by_field() {
        let global = acme();
        let generic = SigningConfig {
            team_id: Some("GENERIC".into()),
            export_method: Some(ExportMethod::Adhoc),
            ..Default::default()
        };
        let debug = SigningConfig {
            export_method: Some(ExportMethod::Development),
            ..Default::default()
        };
        let raw = VariantInput {
            id_suffix: Some("qa"),
            signing: SigningLevels::Apple {
                debug: Some(&debug),
                release: None,
                variant: Some(&generic),
                global: Some(&global),
            },
            ..input("qa", None)
        };
        let variant = resolve(Platform::Ios, &raw, &GlobalDefaults::default()).unwrap();
        let debug = variant.debug_signing().unwrap();
        let release = variant.release_signing().unwrap();
        assert_eq!(debug.export_method, Some(ExportMethod::Development));
        assert_eq!(debug.team_id.as_deref(), Some("GENERIC"));
        assert_eq!(debug.team_name.as_deref(), Some("Acme"));
        assert_eq!(release.export_method, Some(ExportMethod::Adhoc));
        assert_eq!(release.team_id.as_deref(), Some("GENERIC"));
    }

    #[test]
    fn variant_custom_property_wins() {
        let global = acme();
        let global_props = [
            CustomProperty::new("A", "1", PropertyDestination::BuildConfig),
            CustomProperty::new("B", "2", PropertyDestination::BuildConfig),
        ];
        let variant_props = [CustomProperty::new("B", "3", PropertyDestination::BuildConfig)];
        let raw = VariantInput {
            id_suffix: Some("beta"),
            custom: &variant_props,
            ..input("beta", Some(&global))
        };
        let globals = GlobalDefaults {
            custom: &global_props,
            ..Default::default()
        };
        let variant = resolve(Platform::Ios, &raw, &globals).unwrap();
        let values: Vec<(&str, &str)> = variant
            .custom
            .iter()
            .map(|p| (p.name.as_str(), p.value.as_str()))
            .collect();
        assert_eq!(values, [("A", "1"), ("B", "3")]);
    }

    #[test]
    fn store_destination_falls_back_to_globals() {
        let global = acme();
        let raw = VariantInput {
            id_suffix: Some("beta"),
            ..input("beta", Some(&global))
        };
        let globals = GlobalDefaults {
            store_destination: Some("firebase"),
            ..Default::default()
        };
        let variant = resolve(Platform::Ios, &raw, &globals).unwrap();
        assert_eq!(variant.store_destination, StoreDestination::Firebase);

        let own = VariantInput {
            store_destination: Some("TestFlight"),
            ..raw
        };
        let variant = resolve(Platform::Ios, &own, &globals).unwrap();
        assert_eq!(variant.store_destination, StoreDestination::TestFlight);
    }

    #[test]
    fn invalid_store_destination() {
        let global = acme();
        let raw = VariantInput {
            id_suffix: Some("beta"),
            store_destination: Some("sideload"),
            ..input("beta", Some(&global))
        };
        let err = resolve(Platform::Ios, &raw, &GlobalDefaults::default()).unwrap_err();
        assert!(matches!(err, VariantsError::InvalidDestination { value, .. } if value == "sideload"));
    }

    #[test]
    fn scripts_are_chained() {
        let global = acme();
        let raw = VariantInput {
            id_suffix: Some("beta"),
            post_switch_script: Some("echo beta"),
            ..input("beta", Some(&global))
        };
        let globals = GlobalDefaults {
            post_switch_script: Some("echo global"),
            ..Default::default()
        };
        let variant = resolve(Platform::Ios, &raw, &globals).unwrap();
        assert_eq!(
            variant.post_switch_script.as_deref(),
            Some("echo global && echo beta")
        );
    }

    #[test]
    fn android_single_signing_block() {
        let global = AndroidSigning {
            key_alias: Some("upload".into()),
            key_password: Some("kp".into()),
            store_file: Some("release.jks".into()),
            store_password: Some("sp".into()),
        };
        let raw = VariantInput {
            id_suffix: Some("staging"),
            signing: SigningLevels::Android {
                variant: None,
                global: Some(&global),
            },
            ..input("staging", None)
        };
        let variant = resolve(Platform::Android, &raw, &GlobalDefaults::default()).unwrap();
        assert_eq!(variant.signing, VariantSigning::Android(global.clone()));
        assert_eq!(variant.store_destination, StoreDestination::PlayStore);
        assert_eq!(variant.release_signing(), None);
    }
}
