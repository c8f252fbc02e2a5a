//! Settings persistence: patch values into `variants.toml` while preserving formatting.
//!
//! Uses `toml_edit` so comments and unrelated keys survive. Creates the file and
//! its parent directories as needed.

use std::path::Path;

use tracing::info;

use crate::error::VariantsError;
use crate::platform::Platform;

/// Pure function: patch a TOML document string, setting the string at `key`.
///
/// `content` is `None` when the file does not exist yet. Intermediate tables are
/// created as needed.
pub fn set_in_document(
    content: Option<&str>,
    key: &str,
    value: &str,
) -> Result<String, VariantsError> {
    let mut doc: toml_edit::DocumentMut = content
        .unwrap_or_default()
        .parse()
        .map_err(|e: toml_edit::TomlError| VariantsError::InvalidValue {
            key: key.into(),
            reason: e.to_string(),
        })?;

    let segments: Vec<&str> = key.split('.').collect();
    let Some((leaf, parents)) = segments.split_last() else {
        return Ok(doc.to_string());
    };

    let mut current: &mut toml_edit::Item = doc.as_item_mut();
    for segment in parents {
        if current.get(segment).is_none() {
            current[*segment] = toml_edit::Item::Table(toml_edit::Table::new());
        }
        current = &mut current[*segment];
        if !current.is_table_like() {
            return Err(VariantsError::InvalidValue {
                key: key.into(),
                reason: format!("'{segment}' is not a table"),
            });
        }
    }
    current[*leaf] = toml_edit::value(value);

    Ok(doc.to_string())
}

/// I/O wrapper: reads `file_path` (if it exists), patches it, writes it back.
pub fn persist_value(file_path: &Path, key: &str, value: &str) -> Result<(), VariantsError> {
    let content = match std::fs::read_to_string(file_path) {
        Ok(c) => Some(c),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            return Err(VariantsError::IoError {
                path: file_path.to_path_buf(),
                source: e,
            });
        }
    };

    let new_content = set_in_document(content.as_deref(), key, value)?;

    if let Some(parent) = file_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| VariantsError::IoError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(file_path, new_content).map_err(|e| VariantsError::IoError {
        path: file_path.to_path_buf(),
        source: e,
    })?;
    info!(path = %file_path.display(), key, value, "settings updated");
    Ok(())
}

/// Record `variant` as the active one for `platform` under `[active]`.
pub fn set_active_variant(
    file_path: &Path,
    platform: Platform,
    variant: &str,
) -> Result<(), VariantsError> {
    persist_value(file_path, &format!("active.{platform}"), variant)
}
