use std::collections::BTreeMap;

use crate::workload::Name;

/// Resolve the logical application name for the given label set.
///
/// The preferred key wins when present with a non-empty value, then the
/// fallback key when present, then the supplied default — the workload's own
/// name — with an empty label key. Resolution is deterministic for a given
/// label set.
pub fn resolve_name(labels: &BTreeMap<String, String>, preferred_key: &str, fallback_key: &str, default_name: &str) -> Name {
    if let Some(value) = labels.get(preferred_key) {
        if !value.is_empty() {
            return Name {
                label_key: preferred_key.to_string(),
                value: value.clone(),
            };
        }
    }
    if let Some(value) = labels.get(fallback_key) {
        return Name {
            label_key: fallback_key.to_string(),
            value: value.clone(),
        };
    }
    Name {
        label_key: String::new(),
        value: default_name.to_string(),
    }
}
