use anyhow::{bail, Result};

use crate::auth::AccessPolicy;
use crate::error::AppError;
use crate::workload::{redact_env, WorkloadDetail, WorkloadRecord};

/// Project one raw workload record into an access-filtered detail view.
///
/// Fails with `AppError::Forbidden` when the role may not see the record at
/// all. Environment visibility is decided per the record's own labels, as
/// label sets may differ across instances of the same logical application.
pub fn project_detail(record: &WorkloadRecord, policy: &dyn AccessPolicy) -> Result<WorkloadDetail> {
    if !policy.can_access_workload(&record.labels) {
        bail!(AppError::Forbidden);
    }

    let allow_env_vars = policy.can_access_env_vars(&record.labels);
    let spec = redact_env(&record.spec, allow_env_vars);
    let start_time = record.status.start_time.as_ref().map(|time| time.0.to_rfc3339()).unwrap_or_default();

    Ok(WorkloadDetail {
        name: record.name.clone(),
        namespace: record.namespace.clone(),
        host_ip: record.status.host_ip.clone().unwrap_or_default(),
        pod_ip: record.status.pod_ip.clone().unwrap_or_default(),
        start_time,
        phase: record.status.phase.clone().unwrap_or_default(),
        phase_message: record.status.message.clone().unwrap_or_default(),
        container_status: record.status.container_statuses.clone().unwrap_or_default(),
        status: record.status.clone(),
        spec,
    })
}
