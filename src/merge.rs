//! Layer combinators.
//!
//! Every override level (global, variant, build-type specific) is kept as its own
//! optional value and collapsed here. Nothing in this module validates; callers
//! check the combined result.

use toml::Table;

use crate::property::CustomProperty;

/// First present value, highest-priority layer first.
pub fn first_some<T: Clone>(layers: &[Option<&T>]) -> Option<T> {
    layers.iter().flatten().next().map(|v| (*v).clone())
}

/// Global properties not redeclared by the variant, followed by the variant's own.
///
/// Ordering inside each group is kept. A name declared twice on the variant side
/// is kept once, last declaration winning, at the position of its first
/// declaration.
pub fn merge_properties(
    global: &[CustomProperty],
    variant: &[CustomProperty],
) -> Vec<CustomProperty> {
    let mut merged: Vec<CustomProperty> = global
        .iter()
        .filter(|g| !variant.contains(g))
        .cloned()
        .collect();
    for property in variant {
        match merged.iter_mut().find(|m| m.name == property.name) {
            Some(existing) => *existing = property.clone(),
            None => merged.push(property.clone()),
        }
    }
    merged
}

/// `"<global> && <variant>"` when both exist, else whichever does.
pub fn join_scripts(global: Option<&str>, variant: Option<&str>) -> Option<String> {
    fn clean(s: Option<&str>) -> Option<&str> {
        s.map(str::trim).filter(|s| !s.is_empty())
    }
    match (clean(global), clean(variant)) {
        (Some(g), Some(v)) => Some(format!("{g} && {v}")),
        (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
        (None, None) => None,
    }
}

/// Deep-merge `overlay` on top of `base`.
/// If both sides have a Table for the same key, recurse.
/// Otherwise, `overlay`'s value wins.
pub fn deep_merge(mut base: Table, overlay: Table) -> Table {
    for (key, overlay_val) in overlay {
        match (base.remove(&key), overlay_val) {
            (Some(toml::Value::Table(base_tbl)), toml::Value::Table(overlay_tbl)) => {
                base.insert(key, toml::Value::Table(deep_merge(base_tbl, overlay_tbl)));
            }
            (_, overlay_val) => {
                base.insert(key, overlay_val);
            }
        }
    }
    base
}
