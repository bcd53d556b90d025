//! Key filters over dependency mappings.
//!
//! Both functions build a fresh mapping and keep the input's entry order.

use super::DependencyMap;

/// Keep only the entries whose key appears in `keys`.
///
/// Keys that are not in `mapping` are ignored.
pub fn pick<K: AsRef<str>>(mapping: &DependencyMap, keys: &[K]) -> DependencyMap {
    mapping
        .iter()
        .filter(|(name, _)| contains(keys, name))
        .map(|(name, version)| (name.clone(), version.clone()))
        .collect()
}

/// Drop the entries whose key appears in `keys`.
pub fn omit<K: AsRef<str>>(mapping: &DependencyMap, keys: &[K]) -> DependencyMap {
    mapping
        .iter()
        .filter(|(name, _)| !contains(keys, name))
        .map(|(name, version)| (name.clone(), version.clone()))
        .collect()
}

fn contains<K: AsRef<str>>(keys: &[K], name: &str) -> bool {
    keys.iter().any(|k| k.as_ref() == name)
}
