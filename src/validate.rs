//! Strict-mode validation: detect unknown keys in `variants.yml` and in settings files.
//!
//! Uses `serde_ignored` to deserialize while capturing every key the target type
//! doesn't consume. Each unknown key is reported with its file path and a
//! best-effort line number.

use std::path::Path;

use confique::Config;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::VariantsError;

/// Deserialize a YAML document, failing if any key is unknown to `T`.
pub fn deserialize_yaml_strict<T: DeserializeOwned>(
    content: &str,
    path: &Path,
) -> Result<T, VariantsError> {
    let mut unknown: Vec<String> = Vec::new();
    let deserializer = serde_yaml::Deserializer::from_str(content);
    let value: T = serde_ignored::deserialize(deserializer, |ignored| {
        unknown.push(dotted(&ignored));
    })?;

    if unknown.is_empty() {
        return Ok(value);
    }
    Err(report(unknown, path, |key| find_yaml_key_line(content, key)))
}

/// Validate that a TOML settings file contains no keys unknown to `C`.
///
/// Deserializes into `C::Layer`, where every field is optional, so only unknown
/// keys (not missing ones) fail here.
pub fn validate_settings_keys<C: Config>(content: &str, path: &Path) -> Result<(), VariantsError>
where
    C::Layer: for<'de> Deserialize<'de>,
{
    let mut unknown: Vec<String> = Vec::new();
    let deserializer = toml::Deserializer::new(content);
    let _layer: C::Layer = serde_ignored::deserialize(deserializer, |ignored| {
        unknown.push(dotted(&ignored));
    })
    .map_err(|e| VariantsError::SettingsParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    if unknown.is_empty() {
        return Ok(());
    }
    Err(report(unknown, path, |key| find_toml_key_line(content, key)))
}

fn report(keys: Vec<String>, path: &Path, locate: impl Fn(&str) -> usize) -> VariantsError {
    VariantsError::UnknownKeys(
        keys.into_iter()
            .map(|key| VariantsError::UnknownKey {
                line: locate(&key),
                key,
                path: path.to_path_buf(),
            })
            .collect(),
    )
}

/// Render an ignored path as `a.b.0.c`, skipping `Option`/newtype wrappers.
fn dotted(path: &serde_ignored::Path<'_>) -> String {
    let mut segments = Vec::new();
    collect_segments(path, &mut segments);
    segments.join(".")
}

fn collect_segments(path: &serde_ignored::Path<'_>, out: &mut Vec<String>) {
    use serde_ignored::Path;
    match path {
        Path::Root => {}
        Path::Seq { parent, index } => {
            collect_segments(parent, out);
            out.push(index.to_string());
        }
        Path::Map { parent, key } => {
            collect_segments(parent, out);
            out.push(key.clone());
        }
        Path::Some { parent }
        | Path::NewtypeStruct { parent }
        | Path::NewtypeVariant { parent } => collect_segments(parent, out),
    }
}

/// Find the 1-indexed line of a dotted key in YAML block-style content.
///
/// Walks one segment at a time, only matching direct children of the previous
/// hit (by indentation). Numeric segments select the n-th `- ` item of a
/// sequence. Flow-style mappings and quoted keys are not handled.
/// Returns 0 if the key cannot be located.
fn find_yaml_key_line(content: &str, dotted_key: &str) -> usize {
    let lines: Vec<&str> = content.lines().collect();
    let mut from = 0;
    let mut parent: Option<usize> = None;
    let mut found = 0;

    for segment in dotted_key.split('.') {
        let Some((line, indent)) = find_yaml_child(&lines, from, parent, segment) else {
            return 0;
        };
        found = line + 1;
        // A sequence item's first key shares the item's line.
        from = if segment.parse::<usize>().is_ok() { line } else { line + 1 };
        parent = Some(indent);
    }
    found
}

fn find_yaml_child(
    lines: &[&str],
    from: usize,
    parent: Option<usize>,
    segment: &str,
) -> Option<(usize, usize)> {
    let index = segment.parse::<usize>().ok();
    let mut child_indent: Option<usize> = None;
    let mut seen = 0;

    for (i, line) in lines.iter().enumerate().skip(from) {
        let body = line.trim_start();
        if body.is_empty() || body.starts_with('#') {
            continue;
        }
        let indent = line.len() - body.len();
        let item = body.strip_prefix('-').map(str::trim_start);

        if let Some(p) = parent
            && i > from
            && indent <= p
            && !(indent == p && item.is_some() && index.is_some())
        {
            break;
        }

        if let Some(n) = index {
            if item.is_some() && *child_indent.get_or_insert(indent) == indent {
                if seen == n {
                    return Some((i, indent));
                }
                seen += 1;
            }
            continue;
        }

        let (key_indent, text) = match item {
            Some(rest) => (indent + (body.len() - rest.len()), rest),
            None => (indent, body),
        };
        let expected = *child_indent.get_or_insert(key_indent);
        if key_indent == expected
            && text
                .strip_prefix(segment)
                .is_some_and(|after| after.trim_start().starts_with(':'))
        {
            return Some((i, key_indent));
        }
    }
    None
}

/// Find the 1-indexed line number for a key in TOML content.
///
/// For a dotted key like `"output.typo"`, tracks the current `[section]` header
/// while scanning and only matches the leaf key when inside the correct section.
/// Returns 0 if the key cannot be located.
fn find_toml_key_line(content: &str, dotted_key: &str) -> usize {
    let segments: Vec<&str> = dotted_key.split('.').collect();
    let Some((leaf, expected_section)) = segments.split_last() else {
        return 0;
    };
    let mut current_section: Vec<&str> = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.starts_with('[') && !trimmed.starts_with("[[") {
            let header = trimmed.trim_start_matches('[').trim_end_matches(']').trim();
            current_section = header.split('.').map(str::trim).collect();
            continue;
        }

        if expected_section == current_section.as_slice()
            && let Some(after_key) = trimmed.strip_prefix(leaf)
            && after_key.trim_start().starts_with('=')
        {
            return i + 1;
        }
    }
    0
}
