use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use k8s_openapi::api::core::v1::{Container, EnvVar, PodSpec, PodStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

use crate::auth::AccessPolicy;
use crate::workload::WorkloadRecord;

/// Build a workload record carrying one container with an env var.
pub fn record(name: &str, namespace: &str, app: &str) -> WorkloadRecord {
    let mut labels = BTreeMap::new();
    labels.insert("app".to_string(), app.to_string());
    WorkloadRecord {
        name: name.to_string(),
        namespace: namespace.to_string(),
        cluster_name: "test-cluster".to_string(),
        labels,
        status: PodStatus {
            host_ip: Some("10.0.0.10".into()),
            pod_ip: Some("10.1.2.3".into()),
            phase: Some("Running".into()),
            start_time: Some(Time(Utc.ymd(2021, 9, 1).and_hms(12, 0, 0))),
            ..Default::default()
        },
        spec: PodSpec {
            containers: vec![Container {
                name: "web".into(),
                env: Some(vec![EnvVar {
                    name: "FOO".into(),
                    value: Some("bar".into()),
                    ..Default::default()
                }]),
                ..Default::default()
            }],
            ..Default::default()
        },
    }
}

/// A tagged-variant access policy used to drive test scenarios.
#[derive(Clone)]
pub enum TestPolicy {
    /// Every predicate passes.
    AllowAll,
    /// Every predicate passes except env var access.
    NoEnvVars,
    /// Namespace access is denied for the named namespace, all else passes.
    DenyNamespace(String),
    /// Every predicate fails.
    DenyAll,
}

impl AccessPolicy for TestPolicy {
    fn can_access_namespace(&self, namespace: &str) -> bool {
        match self {
            Self::AllowAll | Self::NoEnvVars => true,
            Self::DenyNamespace(denied) => denied != namespace,
            Self::DenyAll => false,
        }
    }

    fn can_access_workload(&self, _labels: &BTreeMap<String, String>) -> bool {
        !matches!(self, Self::DenyAll)
    }

    fn can_access_env_vars(&self, _labels: &BTreeMap<String, String>) -> bool {
        matches!(self, Self::AllowAll | Self::DenyNamespace(_))
    }
}
