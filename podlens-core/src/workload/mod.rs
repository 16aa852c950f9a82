//! Workload introspection core.
//!
//! This module decides what a requesting role may see of the cluster's
//! workloads: whether a record is visible at all, whether its environment
//! variables must be stripped, and how many records fold into the overview of
//! one logical application. The cluster data source behind the
//! [`WorkloadSource`] trait and the HTTP boundary are collaborators; this
//! module owns only the filtering, redaction & aggregation semantics.

mod detail;
#[cfg(test)]
mod fixtures;
mod name;
mod overview;
mod redact;

pub use detail::project_detail;
pub use name::resolve_name;
pub use overview::{WorkloadService, DEFAULT_LIST_LIMIT};
pub use redact::redact_env;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ContainerStatus, Pod, PodSpec, PodStatus};
use serde::{Deserialize, Serialize};

use crate::auth::AccessPolicy;

/// A raw workload record as returned by the cluster data source.
///
/// Records are received by value and never mutated by this module; redaction
/// always produces a copy.
#[derive(Clone, Debug, Default)]
pub struct WorkloadRecord {
    /// The name of this workload instance.
    pub name: String,
    /// The namespace of this workload instance.
    pub namespace: String,
    /// The name of the cluster this workload instance runs in.
    pub cluster_name: String,
    /// The labels of this workload instance.
    pub labels: BTreeMap<String, String>,
    /// The current status of this workload instance.
    pub status: PodStatus,
    /// The container spec of this workload instance.
    pub spec: PodSpec,
}

impl From<Pod> for WorkloadRecord {
    fn from(pod: Pod) -> Self {
        Self {
            name: pod.metadata.name.unwrap_or_default(),
            namespace: pod.metadata.namespace.unwrap_or_default(),
            cluster_name: pod.metadata.cluster_name.unwrap_or_default(),
            labels: pod.metadata.labels.unwrap_or_default(),
            status: pod.status.unwrap_or_default(),
            spec: pod.spec.unwrap_or_default(),
        }
    }
}

/// The immutable access context of one request.
#[derive(Clone)]
pub struct AccessContext {
    /// The access decision capability of the requesting role.
    pub policy: Arc<dyn AccessPolicy>,
    /// The namespace being queried.
    pub namespace: String,
    /// The preferred label key used to resolve logical application names.
    pub app_label_key: String,
    /// An explicit app name filter, if the caller supplied one.
    pub app_filter: Option<String>,
}

/// A resolved logical application name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    /// The label key which produced the value, empty when the default was used.
    pub label_key: String,
    /// The resolved name value.
    pub value: String,
}

/// The projected, access-filtered, possibly redacted view of one workload record.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadDetail {
    /// The name of the workload instance.
    pub name: String,
    /// The namespace of the workload instance.
    pub namespace: String,
    /// The IP address of the host the workload instance is scheduled on.
    pub host_ip: String,
    /// The network address of the workload instance itself.
    pub pod_ip: String,
    /// The start time of the workload instance, RFC 3339, empty if unset.
    pub start_time: String,
    /// The current lifecycle phase.
    pub phase: String,
    /// Human readable detail on the current phase, if any.
    pub phase_message: String,
    /// Per-container statuses.
    pub container_status: Vec<ContainerStatus>,
    /// The full status block of the workload instance.
    pub status: PodStatus,
    /// The container spec, redacted per the requesting role's access.
    pub spec: PodSpec,
}

/// An aggregate view across all workload records of one logical application.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadOverview {
    /// The resolved logical application name.
    pub name: Name,
    /// The namespace the records were queried in.
    pub namespace: String,
    /// The name of the cluster the records run in.
    pub cluster_name: String,
    /// A deep link into the deploy tracking system for this application.
    pub deployer_link: String,
    /// The admitted per-instance details, in list order.
    pub details: Vec<WorkloadDetail>,
}

/// The cluster data source supplying raw workload records.
///
/// Implementations own transport concerns (connection handling, retries); any
/// failure they surface is terminal for the request at hand.
#[async_trait]
pub trait WorkloadSource: Send + Sync + 'static {
    /// Fetch a single workload record by name.
    async fn fetch(&self, namespace: &str, name: &str) -> Result<WorkloadRecord>;

    /// List workload records matching the given label selector, bounded by limit.
    async fn list(&self, namespace: &str, selector: &str, limit: u32) -> Result<Vec<WorkloadRecord>>;
}
