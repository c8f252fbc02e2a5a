//! Build variants for iOS and Android projects. Declare them once, switch
//! between them, and get deterministic build files out.
//!
//! A variant is a named configuration (`default`, `beta`, `staging`, ...) that
//! differs from the others in bundle identifier, version, display name, signing
//! and arbitrary custom properties. All of them live in one `variants.yml`:
//!
//! ```yaml
//! ios:
//!   targets:
//!     AcmeApp: { app_name: Acme, bundle_id: com.acme.app }
//!   signing: { team_name: Acme, team_id: T123, export_method: appstore }
//!   variants:
//!     default: { version_name: "1.0.0", version_number: 1 }
//!     beta: { id_suffix: beta, version_name: "1.1.0", version_number: 12 }
//! ```
//!
//! ```ignore
//! let doc = ConfigurationDocument::load(Path::new("variants.yml"), true)?;
//! let beta = doc.resolve_variant(Platform::Ios, "beta")?;
//! let target = doc.target(Platform::Ios, None)?;
//! let pairs = project::project_for_build_config(&beta, &target);
//! // [("V_APP_ICON", "AppIcon"), ("V_APP_NAME", "Acme Beta"),
//! //  ("V_BUNDLE_ID", "com.acme.app.beta"), ...]
//! ```
//!
//! # Pipeline
//!
//! ```text
//! variants.yml ──parse──▶ ConfigurationDocument ──resolve──▶ Variant
//!                                                              │
//!                      build config / env exports / CI params ◀┘ project
//! ```
//!
//! - **Parse** ([`document`]) checks structure only. In strict mode unknown keys
//!   are rejected with file path and line number.
//! - **Resolve** ([`variant`]) merges the platform's global defaults with one
//!   variant's overrides and validates the result. Rules that fail name the
//!   variant and the field. A broken variant never stops the others from
//!   resolving on their own; [`resolve_all_variants`] stops at the first error.
//! - **Project** ([`project`]) is pure: the same variant always yields the same
//!   keys in the same order.
//!
//! [`resolve_all_variants`]: ConfigurationDocument::resolve_all_variants
//!
//! # Override hierarchy
//!
//! Every level is kept as its own optional value and collapsed field by field,
//! highest priority first:
//!
//! ```text
//! iOS signing     release_signing / debug_signing ▶ variant signing ▶ global signing
//! Android signing variant signing ▶ global signing
//! Destination     variant ▶ global ▶ platform default (appStore / playStore)
//! Properties      variant entry replaces the same-named global entry
//! Scripts         "<global> && <variant>"
//! ```
//!
//! A variant that only sets `team_id` still inherits `team_name` from the
//! global block. Mandatory fields are checked once, after merging.
//!
//! # Environment indirection
//!
//! A value of `{{ envVars.NAME }}` (or any value with `env: true`) is not a
//! literal. Each artifact spells the lookup its own way: the bare name in build
//! settings, `ENV["NAME"]` in Fastlane parameters, `$NAME` in shell exports.
//!
//! # Tool settings
//!
//! Where `variants.yml` lives and where artifacts go come from [`Settings`], resolved
//! in layers (later wins):
//!
//! ```text
//! Compiled defaults     #[config(default = ...)]
//!        ↑ overridden by
//! variants.toml         platform config dir, then each ancestor up to .git
//!        ↑ overridden by
//! Environment vars      VARIANTS__OUTPUT__IOS_DIR=...
//!        ↑ overridden by
//! CLI flags             --spec
//! ```
//!
//! `switch` records the chosen variant under `[active]` in `./variants.toml`,
//! editing with `toml_edit` so comments survive.
//!
//! # Clap adapter
//!
//! The `cli` module (behind the `clap` feature, on by default) parses the
//! command line into a [`VariantsAction`]. Everything past that point runs
//! through [`Workspace::handle`] and needs no CLI framework.

pub mod artifacts;
pub mod document;
pub mod error;
pub mod ops;
pub mod platform;
pub mod project;
pub mod property;
pub mod settings;
pub mod signing;
pub mod types;
pub mod variant;

#[cfg(feature = "clap")]
pub mod cli;
mod env;
mod file;
pub(crate) mod merge;
mod persist;
mod validate;

#[cfg(test)]
mod fixtures;

pub use document::ConfigurationDocument;
pub use error::VariantsError;
pub use ops::{VariantsResult, Workspace};
pub use platform::{Platform, StoreDestination};
pub use property::{CustomProperty, PropertyDestination};
pub use settings::{Settings, SettingsLoader};
pub use types::{Boundary, SearchPath, VariantsAction};
pub use variant::{Target, Variant};
