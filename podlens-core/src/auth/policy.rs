use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::auth::RoleClaims;

/// The access decision capability of a single requesting role.
///
/// The role is embodied by the implementing value and injected per request,
/// so policy sources can be swapped independently of the code consuming the
/// decisions. All predicates are pure evaluations over the role & label inputs.
pub trait AccessPolicy: Send + Sync + 'static {
    /// Can this role see objects in the given namespace.
    fn can_access_namespace(&self, namespace: &str) -> bool;

    /// Can this role see a workload carrying the given labels.
    fn can_access_workload(&self, labels: &BTreeMap<String, String>) -> bool;

    /// Can this role see environment variable values of a workload carrying the given labels.
    fn can_access_env_vars(&self, labels: &BTreeMap<String, String>) -> bool;

    /// Does the given label set match an explicit app name filter.
    ///
    /// Always true when no filter was supplied.
    fn matches_app_filter(&self, labels: &BTreeMap<String, String>, filter: Option<&str>) -> bool {
        match filter {
            Some(filter) => labels.values().any(|value| value == filter),
            None => true,
        }
    }
}

/// A single label matcher of a role's claims.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LabelMatch {
    /// The label key to match on.
    pub key: String,
    /// The required label value, where `*` matches any value.
    pub value: String,
}

impl LabelMatch {
    /// Check this matcher against the given label set.
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match labels.get(&self.key) {
            Some(value) => self.value == "*" || &self.value == value,
            None => false,
        }
    }
}

impl AccessPolicy for RoleClaims {
    fn can_access_namespace(&self, namespace: &str) -> bool {
        self.namespaces.iter().any(|ns| ns == "*" || ns == namespace)
    }

    fn can_access_workload(&self, labels: &BTreeMap<String, String>) -> bool {
        self.workloads.iter().any(|matcher| matcher.matches(labels))
    }

    fn can_access_env_vars(&self, labels: &BTreeMap<String, String>) -> bool {
        self.env_vars.iter().any(|matcher| matcher.matches(labels))
    }
}
