//! Custom properties: free-form key/value pairs routed to one output artifact.

use serde::{Deserialize, Serialize};

use crate::env;

/// Which artifact receives a custom property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PropertyDestination {
    /// Build settings (`.xcconfig` on iOS, Gradle properties on Android).
    #[default]
    #[serde(rename = "project", alias = "gradle")]
    BuildConfig,
    /// Fastlane parameters.
    #[serde(rename = "fastlane")]
    CiParameter,
    /// Environment variable exports.
    #[serde(rename = "envVar", alias = "env_var")]
    EnvVar,
}

/// A named configuration value declared globally or on a variant.
///
/// Two properties are equal when their names match; a variant property replaces
/// a global one with the same name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomProperty {
    pub name: String,
    #[serde(deserialize_with = "crate::document::scalar_string")]
    pub value: String,
    /// The value names an environment variable rather than a literal.
    #[serde(default)]
    pub env: bool,
    #[serde(default)]
    pub destination: PropertyDestination,
}

impl PartialEq for CustomProperty {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for CustomProperty {}

impl CustomProperty {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        destination: PropertyDestination,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            env: false,
            destination,
        }
    }

    /// Name of the environment variable this property reads, if any.
    ///
    /// A `{{ envVars.NAME }}` placeholder always counts, but only as the whole
    /// value: `https://{{ envVars.HOST }}/api` is a literal. With the `env` flag
    /// set the whole value is taken as the variable name.
    pub fn env_var_name(&self) -> Option<&str> {
        match env::placeholder_name(&self.value) {
            Some(name) => Some(name),
            None if self.env => Some(self.value.trim()),
            None => None,
        }
    }

    pub fn is_environment_variable(&self) -> bool {
        self.env_var_name().is_some()
    }

    /// The value as the destination artifact should spell it.
    ///
    /// Environment-sourced values become a lookup: the bare name for build
    /// settings, `ENV["NAME"]` for Fastlane, `$NAME` for shell exports.
    pub fn environment_value(&self) -> String {
        match self.env_var_name() {
            Some(name) => match self.destination {
                PropertyDestination::BuildConfig => name.to_string(),
                PropertyDestination::CiParameter => format!("ENV[\"{name}\"]"),
                PropertyDestination::EnvVar => format!("${name}"),
            },
            None => self.value.clone(),
        }
    }

    /// `(is_env_var, rendered)` for this property at its destination.
    pub fn process_for_environment(&self) -> (bool, String) {
        (self.is_environment_variable(), self.environment_value())
    }

    /// The value contains a placeholder that will be written out literally.
    pub fn has_embedded_placeholder(&self) -> bool {
        !self.env && env::has_embedded_placeholder(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_value_and_destination() {
        let a = CustomProperty::new("A", "1", PropertyDestination::BuildConfig);
        let b = CustomProperty::new("A", "2", PropertyDestination::EnvVar);
        let c = CustomProperty::new("B", "1", PropertyDestination::BuildConfig);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn placeholder_for_build_config_is_bare_name() {
        let p = CustomProperty::new(
            "API_KEY",
            "{{ envVars.API_KEY }}",
            PropertyDestination::BuildConfig,
        );
        assert_eq!(p.process_for_environment(), (true, "API_KEY".to_string()));
    }

    #[test]
    fn placeholder_for_fastlane_is_env_lookup() {
        let p = CustomProperty::new(
            "API_KEY",
            "{{ envVars.API_KEY }}",
            PropertyDestination::CiParameter,
        );
        assert_eq!(
            p.process_for_environment(),
            (true, "ENV[\"API_KEY\"]".to_string())
        );
    }

    #[test]
    fn placeholder_for_env_export_is_shell_reference() {
        let p = CustomProperty::new(
            "TOKEN",
            "{{ envVars.CI_TOKEN }}",
            PropertyDestination::EnvVar,
        );
        assert_eq!(p.environment_value(), "$CI_TOKEN");
    }

    #[test]
    fn env_flag_treats_value_as_variable_name() {
        let p = CustomProperty {
            env: true,
            ..CustomProperty::new("SECRET", "MY_SECRET", PropertyDestination::CiParameter)
        };
        assert!(p.is_environment_variable());
        assert_eq!(p.environment_value(), "ENV[\"MY_SECRET\"]");
    }

    #[test]
    fn literal_value_passes_through() {
        let p = CustomProperty::new("HOST", "api.example.com", PropertyDestination::CiParameter);
        assert_eq!(
            p.process_for_environment(),
            (false, "api.example.com".to_string())
        );
    }

    #[test]
    fn embedded_placeholder_stays_literal() {
        let p = CustomProperty::new(
            "API_URL",
            "https://{{ envVars.HOST }}/api",
            PropertyDestination::CiParameter,
        );
        assert_eq!(
            p.process_for_environment(),
            (false, "https://{{ envVars.HOST }}/api".to_string())
        );
        assert!(p.has_embedded_placeholder());

        let whole = CustomProperty::new("HOST", "{{envVars.HOST}}", PropertyDestination::CiParameter);
        assert!(!whole.has_embedded_placeholder());
        assert!(!CustomProperty::new("A", "plain", PropertyDestination::EnvVar).has_embedded_placeholder());
    }

    #[test]
    fn destination_spellings() {
        let gradle: PropertyDestination = serde_yaml::from_str("gradle").unwrap();
        let project: PropertyDestination = serde_yaml::from_str("project").unwrap();
        let env: PropertyDestination = serde_yaml::from_str("envVar").unwrap();
        assert_eq!(gradle, PropertyDestination::BuildConfig);
        assert_eq!(project, PropertyDestination::BuildConfig);
        assert_eq!(env, PropertyDestination::EnvVar);
        assert!(serde_yaml::from_str::<PropertyDestination>("plist").is_err());
    }

    #[test]
    fn destination_defaults_to_build_config() {
        let p: CustomProperty = serde_yaml::from_str("name: A\nvalue: b\n").unwrap();
        assert_eq!(p.destination, PropertyDestination::BuildConfig);
        assert!(!p.env);
    }
}
