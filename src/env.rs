//! Environment variable handling.
//!
//! Two concerns live here: turning `VARIANTS__*` process variables into a settings
//! layer, and recognizing `{{ envVars.NAME }}` placeholders in spec values.

use toml::{Table, Value};

/// Build a settings layer from environment variables matching `{PREFIX}__*`.
///
/// `__` separates nesting levels and segments are lowercased, so
/// `VARIANTS__OUTPUT__IOS_DIR` lands on `output.ios_dir`. Every settings key is a
/// string or a bool, so only `true`/`false` get a non-string type.
///
/// Takes an iterator so callers decide where variables come from.
pub fn env_to_table(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Table {
    let needle = format!("{prefix}__");
    let mut table = Table::new();

    for (key, value) in vars {
        let Some(rest) = key.strip_prefix(&needle) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        let segments: Vec<String> = rest.split("__").map(str::to_lowercase).collect();
        insert_nested(&mut table, &segments, parse_env_value(value));
    }

    table
}

fn insert_nested(table: &mut Table, segments: &[String], value: Value) {
    let Some((leaf, parents)) = segments.split_last() else {
        return;
    };
    let mut current = table;
    for segment in parents {
        let entry = current
            .entry(segment.as_str())
            .or_insert_with(|| Value::Table(Table::new()));
        let Value::Table(sub) = entry else {
            return;
        };
        current = sub;
    }
    current.insert(leaf.clone(), value);
}

fn parse_env_value(s: String) -> Value {
    if s.eq_ignore_ascii_case("true") {
        Value::Boolean(true)
    } else if s.eq_ignore_ascii_case("false") {
        Value::Boolean(false)
    } else {
        Value::String(s)
    }
}

/// Extract `NAME` from a `{{ envVars.NAME }}` placeholder.
///
/// The whole value must be the placeholder; whitespace inside the braces is
/// optional. Returns `None` for anything else, including an empty name.
pub fn placeholder_name(value: &str) -> Option<&str> {
    let inner = value
        .trim()
        .strip_prefix("{{")?
        .strip_suffix("}}")?
        .trim();
    let name = inner.strip_prefix("envVars.")?;
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(name)
}

/// True when `value` mentions an `envVars.` placeholder without being one.
pub fn has_embedded_placeholder(value: &str) -> bool {
    placeholder_name(value).is_none()
        && value
            .split("{{")
            .skip(1)
            .any(|rest| rest.trim_start().starts_with("envVars."))
}
