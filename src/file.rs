//! File discovery: settings files and the variants spec.
//!
//! Each [`SearchPath`] resolves to one or more directories, listed in
//! priority-ascending order (last = highest). `Ancestors` walks from a start
//! directory toward the root and emits directories shallowest first, so a
//! `variants.toml` next to the project beats one higher up.
//!
//! Missing files are silently skipped. Only actual I/O errors (permissions, etc.)
//! are propagated.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::VariantsError;
use crate::types::{Boundary, SearchPath};

/// Application name used for the platform config directory.
pub const APP_NAME: &str = "variants";

/// Resolve a single-directory [`SearchPath`] to a concrete path.
///
/// Returns `None` for [`SearchPath::Ancestors`] (use [`expand_ancestors_from`])
/// or when the platform directory cannot be determined.
pub fn resolve_search_path(sp: &SearchPath) -> Option<PathBuf> {
    match sp {
        SearchPath::Platform => {
            let proj = directories::ProjectDirs::from("", "", APP_NAME)?;
            Some(proj.config_dir().to_path_buf())
        }
        SearchPath::Path(p) => Some(p.clone()),
        SearchPath::Ancestors(_) => None,
    }
}

/// Walk from `start` toward the filesystem root, stopping (inclusive) at the
/// [`Boundary`]. Returned shallowest first.
pub fn expand_ancestors_from(start: &Path, boundary: &Boundary) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    for dir in start.ancestors() {
        dirs.push(dir.to_path_buf());
        if let Boundary::Marker(name) = boundary
            && dir.join(name).exists()
        {
            break;
        }
    }

    dirs.reverse();
    dirs
}

/// Expand all search paths into a flat, priority-ascending directory list.
/// `Ancestors` entries are walked from `start`.
pub fn expand_search_paths(search_paths: &[SearchPath], start: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for sp in search_paths {
        match sp {
            SearchPath::Ancestors(boundary) => dirs.extend(expand_ancestors_from(start, boundary)),
            other => dirs.extend(resolve_search_path(other)),
        }
    }
    dirs
}

/// Read every `{dir}/{file_name}` that exists, in directory order.
pub fn load_all(dirs: &[PathBuf], file_name: &str) -> Result<Vec<(PathBuf, String)>, VariantsError> {
    let mut results = Vec::new();
    for dir in dirs {
        let file_path = dir.join(file_name);
        match std::fs::read_to_string(&file_path) {
            Ok(content) => {
                debug!(path = %file_path.display(), "loaded settings file");
                results.push((file_path, content));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                return Err(VariantsError::IoError {
                    path: file_path,
                    source: e,
                });
            }
        }
    }
    Ok(results)
}

/// Locate `variants.yml`.
///
/// Absolute paths are taken as is. A relative path is looked up in `start` and
/// then each ancestor, nearest first. When nothing is found the path under
/// `start` is returned so the subsequent read reports a useful error.
pub fn find_spec(start: &Path, spec: &Path) -> PathBuf {
    if spec.is_absolute() {
        return spec.to_path_buf();
    }
    start
        .ancestors()
        .map(|dir| dir.join(spec))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| start.join(spec))
}
