use std::path::PathBuf;

use crate::platform::Platform;

/// Where to search for `variants.toml` settings files.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPath {
    /// Platform config directory (XDG on Linux, ~/Library/Application Support on macOS).
    Platform,
    /// An explicit directory.
    Path(PathBuf),
    /// Every directory from the start directory up to the [`Boundary`],
    /// shallowest first so deeper directories win.
    Ancestors(Boundary),
}

/// Where an [`Ancestors`](SearchPath::Ancestors) walk stops.
#[derive(Debug, Clone, PartialEq)]
pub enum Boundary {
    /// Walk to the filesystem root.
    Root,
    /// Stop at the first directory containing this entry (inclusive).
    Marker(&'static str),
}

/// A command, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum VariantsAction {
    Init {
        platform: Platform,
        output: Option<PathBuf>,
    },
    List {
        platform: Platform,
    },
    Show {
        platform: Platform,
        variant: String,
        target: Option<String>,
        json: bool,
    },
    Switch {
        platform: Platform,
        variant: String,
        target: Option<String>,
    },
}
