//! Platform policy: the small set of rules that differ between iOS and Android.
//!
//! Resolution runs one algorithm for both platforms. Everything platform-specific
//! it needs (allowed store destinations, the fallback destination, how keys are
//! spelled in `variants.yml`) hangs off [`Platform`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VariantsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

/// Distribution channel a variant targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoreDestination {
    AppStore,
    TestFlight,
    PlayStore,
    AppCenter,
    Firebase,
}

impl StoreDestination {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreDestination::AppStore => "appStore",
            StoreDestination::TestFlight => "testFlight",
            StoreDestination::PlayStore => "playStore",
            StoreDestination::AppCenter => "appCenter",
            StoreDestination::Firebase => "firebase",
        }
    }
}

impl fmt::Display for StoreDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Ios, Platform::Android];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }

    /// Store destinations a variant on this platform may declare.
    pub fn store_destinations(self) -> &'static [StoreDestination] {
        match self {
            Platform::Ios => &[
                StoreDestination::AppStore,
                StoreDestination::TestFlight,
                StoreDestination::AppCenter,
                StoreDestination::Firebase,
            ],
            Platform::Android => &[
                StoreDestination::PlayStore,
                StoreDestination::AppCenter,
                StoreDestination::Firebase,
            ],
        }
    }

    /// Used when neither the variant nor the platform globals name a destination.
    pub fn default_store_destination(self) -> StoreDestination {
        match self {
            Platform::Ios => StoreDestination::AppStore,
            Platform::Android => StoreDestination::PlayStore,
        }
    }

    /// Case-insensitive match of `raw` against this platform's destinations.
    pub fn parse_store_destination(
        self,
        variant: &str,
        raw: &str,
    ) -> Result<StoreDestination, VariantsError> {
        let wanted = raw.trim();
        self.store_destinations()
            .iter()
            .copied()
            .find(|d| d.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| VariantsError::InvalidDestination {
                variant: variant.to_string(),
                value: raw.to_string(),
                allowed: self
                    .store_destinations()
                    .iter()
                    .map(|d| d.as_str().to_string())
                    .collect(),
            })
    }

    /// Spec key holding a literal bundle identifier on this platform.
    pub fn bundle_id_key(self) -> &'static str {
        match self {
            Platform::Ios => "bundle_id",
            Platform::Android => "app_identifier",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = VariantsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| VariantsError::InvalidValue {
                key: "platform".into(),
                reason: format!("'{s}' is not one of: ios, android"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_matches_case_insensitively() {
        let d = Platform::Ios
            .parse_store_destination("beta", "TESTFLIGHT")
            .unwrap();
        assert_eq!(d, StoreDestination::TestFlight);
    }

    #[test]
    fn destination_from_other_platform_rejected() {
        let err = Platform::Ios
            .parse_store_destination("beta", "PlayStore")
            .unwrap_err();
        match err {
            VariantsError::InvalidDestination {
                variant, allowed, ..
            } => {
                assert_eq!(variant, "beta");
                assert_eq!(allowed, ["appStore", "testFlight", "appCenter", "firebase"]);
            }
            other => panic!("Expected InvalidDestination, got: {other:?}"),
        }
    }

    #[test]
    fn default_destinations_per_platform() {
        assert_eq!(
            Platform::Ios.default_store_destination(),
            StoreDestination::AppStore
        );
        assert_eq!(
            Platform::Android.default_store_destination(),
            StoreDestination::PlayStore
        );
    }

    #[test]
    fn platform_parses_from_str() {
        assert_eq!("iOS".parse::<Platform>().unwrap(), Platform::Ios);
        assert_eq!("android".parse::<Platform>().unwrap(), Platform::Android);
        assert!("windows".parse::<Platform>().is_err());
    }
}
