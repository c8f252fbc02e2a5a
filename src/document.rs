//! The parsed `variants.yml` document.
//!
//! Parsing only checks structure. Cross-field rules (bundle naming, signing,
//! destinations) run when a variant is resolved, so a broken `staging` entry does
//! not stop anyone from switching to `beta`. The one eager check,
//! [`ConfigurationDocument::require_default_variant`], is left to the commands
//! that need it.

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::VariantsError;
use crate::platform::Platform;
use crate::property::CustomProperty;
use crate::signing::{AndroidSigning, SigningConfig};
use crate::validate;
use crate::variant::{
    self, GlobalDefaults, SigningLevels, Target, Variant, VariantInput, is_default_name,
};

const DEFAULT_IOS_ICON: &str = "AppIcon";
const DEFAULT_ANDROID_ICON: &str = "@mipmap/ic_launcher";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigurationDocument {
    pub ios: Option<IosSpec>,
    pub android: Option<AndroidSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IosSpec {
    pub xcodeproj: Option<String>,
    #[serde(default, deserialize_with = "ordered_map")]
    pub targets: Vec<(String, IosTargetSpec)>,
    #[serde(default, deserialize_with = "ordered_map")]
    pub variants: Vec<(String, IosVariantSpec)>,
    pub signing: Option<SigningConfig>,
    #[serde(default)]
    pub custom: Vec<CustomProperty>,
    pub post_switch_script: Option<String>,
    pub store_destination: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IosTargetSpec {
    pub name: Option<String>,
    pub app_name: Option<String>,
    pub bundle_id: String,
    pub app_icon: Option<String>,
    pub test_target: Option<String>,
    pub source: Option<TargetSource>,
}

/// Where a target's sources live. Carried for project tooling; resolution
/// never reads it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetSource {
    pub path: String,
    pub info: Option<String>,
    pub config: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IosVariantSpec {
    #[serde(deserialize_with = "scalar_string")]
    pub version_name: String,
    pub version_number: u64,
    pub app_name: Option<String>,
    pub app_icon: Option<String>,
    pub id_suffix: Option<String>,
    pub bundle_id: Option<String>,
    pub store_destination: Option<String>,
    pub signing: Option<SigningConfig>,
    pub debug_signing: Option<SigningConfig>,
    pub release_signing: Option<SigningConfig>,
    #[serde(default)]
    pub custom: Vec<CustomProperty>,
    pub post_switch_script: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AndroidSpec {
    pub path: Option<String>,
    pub app_name: String,
    pub app_identifier: String,
    pub app_icon: Option<String>,
    #[serde(default, deserialize_with = "ordered_map")]
    pub variants: Vec<(String, AndroidVariantSpec)>,
    pub signing: Option<AndroidSigning>,
    #[serde(default)]
    pub custom: Vec<CustomProperty>,
    pub post_switch_script: Option<String>,
    pub store_destination: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AndroidVariantSpec {
    #[serde(deserialize_with = "scalar_string")]
    pub version_name: String,
    pub version_code: u64,
    pub app_name: Option<String>,
    pub app_icon: Option<String>,
    pub id_suffix: Option<String>,
    pub app_identifier: Option<String>,
    pub store_destination: Option<String>,
    pub signing: Option<AndroidSigning>,
    #[serde(default)]
    pub custom: Vec<CustomProperty>,
    pub post_switch_script: Option<String>,
}

impl IosSpec {
    fn globals(&self) -> GlobalDefaults<'_> {
        GlobalDefaults {
            store_destination: self.store_destination.as_deref(),
            custom: &self.custom,
            post_switch_script: self.post_switch_script.as_deref(),
        }
    }

    fn inputs(&self) -> Vec<VariantInput<'_>> {
        self.variants
            .iter()
            .map(|(name, raw)| VariantInput {
                name,
                version_name: &raw.version_name,
                version_number: raw.version_number,
                app_name: raw.app_name.as_deref(),
                app_icon: raw.app_icon.as_deref(),
                id_suffix: raw.id_suffix.as_deref(),
                bundle_id: raw.bundle_id.as_deref(),
                store_destination: raw.store_destination.as_deref(),
                signing: SigningLevels::Apple {
                    debug: raw.debug_signing.as_ref(),
                    release: raw.release_signing.as_ref(),
                    variant: raw.signing.as_ref(),
                    global: self.signing.as_ref(),
                },
                custom: &raw.custom,
                post_switch_script: raw.post_switch_script.as_deref(),
            })
            .collect()
    }

    fn targets(&self) -> Vec<Target> {
        self.targets
            .iter()
            .map(|(key, spec)| {
                let name = spec.name.clone().unwrap_or_else(|| key.clone());
                Target {
                    app_name: spec.app_name.clone().unwrap_or_else(|| name.clone()),
                    name,
                    bundle_id: spec.bundle_id.clone(),
                    app_icon: spec
                        .app_icon
                        .clone()
                        .unwrap_or_else(|| DEFAULT_IOS_ICON.to_string()),
                }
            })
            .collect()
    }
}

impl AndroidSpec {
    fn globals(&self) -> GlobalDefaults<'_> {
        GlobalDefaults {
            store_destination: self.store_destination.as_deref(),
            custom: &self.custom,
            post_switch_script: self.post_switch_script.as_deref(),
        }
    }

    fn inputs(&self) -> Vec<VariantInput<'_>> {
        self.variants
            .iter()
            .map(|(name, raw)| VariantInput {
                name,
                version_name: &raw.version_name,
                version_number: raw.version_code,
                app_name: raw.app_name.as_deref(),
                app_icon: raw.app_icon.as_deref(),
                id_suffix: raw.id_suffix.as_deref(),
                bundle_id: raw.app_identifier.as_deref(),
                store_destination: raw.store_destination.as_deref(),
                signing: SigningLevels::Android {
                    variant: raw.signing.as_ref(),
                    global: self.signing.as_ref(),
                },
                custom: &raw.custom,
                post_switch_script: raw.post_switch_script.as_deref(),
            })
            .collect()
    }

    /// Android has one implicit target made of the app-level keys.
    fn target(&self) -> Target {
        Target {
            name: self.app_name.clone(),
            app_name: self.app_name.clone(),
            bundle_id: self.app_identifier.clone(),
            app_icon: self
                .app_icon
                .clone()
                .unwrap_or_else(|| DEFAULT_ANDROID_ICON.to_string()),
        }
    }
}

impl ConfigurationDocument {
    /// Structural parse. Unknown keys are ignored.
    pub fn parse(content: &str) -> Result<Self, VariantsError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse and reject keys the document model does not know, reporting each
    /// with `path` and a best-effort line number.
    pub fn parse_strict(content: &str, path: &Path) -> Result<Self, VariantsError> {
        validate::deserialize_yaml_strict(content, path)
    }

    /// Read and parse the `variants.yml` at `path`.
    pub fn load(path: &Path, strict: bool) -> Result<Self, VariantsError> {
        let content = std::fs::read_to_string(path).map_err(|e| VariantsError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(path = %path.display(), strict, "loading variants spec");
        if strict {
            Self::parse_strict(&content, path)
        } else {
            Self::parse(&content)
        }
    }

    /// Platforms this document declares, iOS first.
    pub fn platforms(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| match p {
                Platform::Ios => self.ios.is_some(),
                Platform::Android => self.android.is_some(),
            })
            .collect()
    }

    fn entries(
        &self,
        platform: Platform,
    ) -> Result<(GlobalDefaults<'_>, Vec<VariantInput<'_>>), VariantsError> {
        let entries = match platform {
            Platform::Ios => self.ios.as_ref().map(|s| (s.globals(), s.inputs())),
            Platform::Android => self.android.as_ref().map(|s| (s.globals(), s.inputs())),
        };
        entries.ok_or(VariantsError::PlatformNotDeclared(platform))
    }

    /// Declared variant names in document order.
    pub fn variant_names(&self, platform: Platform) -> Result<Vec<&str>, VariantsError> {
        let (_, inputs) = self.entries(platform)?;
        Ok(inputs.iter().map(|i| i.name).collect())
    }

    /// Fails with [`VariantsError::MissingDefaultVariant`] unless a `default`
    /// variant is declared for `platform`.
    pub fn require_default_variant(&self, platform: Platform) -> Result<(), VariantsError> {
        let names = self.variant_names(platform)?;
        if names.iter().any(|n| is_default_name(n)) {
            Ok(())
        } else {
            Err(VariantsError::MissingDefaultVariant(platform))
        }
    }

    /// Resolve the variant called `name` (case-insensitive).
    pub fn resolve_variant(&self, platform: Platform, name: &str) -> Result<Variant, VariantsError> {
        let (globals, inputs) = self.entries(platform)?;
        let input = inputs
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| VariantsError::VariantNotFound {
                name: name.to_string(),
                platform,
            })?;
        variant::resolve(platform, input, &globals)
    }

    /// Resolve every declared variant; the first failure aborts the batch.
    pub fn resolve_all_variants(&self, platform: Platform) -> Result<Vec<Variant>, VariantsError> {
        let (globals, inputs) = self.entries(platform)?;
        inputs
            .iter()
            .map(|input| variant::resolve(platform, input, &globals))
            .collect()
    }

    /// Targets variants are applied to, in document order.
    pub fn targets(&self, platform: Platform) -> Result<Vec<Target>, VariantsError> {
        let targets = match platform {
            Platform::Ios => self.ios.as_ref().map(IosSpec::targets),
            Platform::Android => self.android.as_ref().map(|s| vec![s.target()]),
        };
        targets.ok_or(VariantsError::PlatformNotDeclared(platform))
    }

    /// The target called `name`, or the first declared one.
    pub fn target(&self, platform: Platform, name: Option<&str>) -> Result<Target, VariantsError> {
        let targets = self.targets(platform)?;
        let found = match name {
            Some(wanted) => targets.into_iter().find(|t| t.name.eq_ignore_ascii_case(wanted)),
            None => targets.into_iter().next(),
        };
        found.ok_or_else(|| VariantsError::TargetNotFound {
            name: name.unwrap_or("<first>").to_string(),
            platform,
        })
    }
}

/// Deserialize a name -> entry mapping keeping document order.
///
/// Names that differ only by case are rejected since lookups ignore case.
fn ordered_map<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct OrderedMap<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedMap<T> {
        type Value = Vec<(String, T)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping of names to entries")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries: Vec<(String, T)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(key) = map.next_key::<String>()? {
                if entries.iter().any(|(k, _)| k.eq_ignore_ascii_case(&key)) {
                    return Err(de::Error::custom(format!("duplicate entry '{key}'")));
                }
                let value = map.next_value::<T>()?;
                entries.push((key, value));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(OrderedMap(PhantomData))
}

/// Accept any YAML scalar as a string, so `version_name: 2` works unquoted.
pub(crate) fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    struct Scalar;

    impl Visitor<'_> for Scalar {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string, number or boolean")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_str(Scalar)
}
