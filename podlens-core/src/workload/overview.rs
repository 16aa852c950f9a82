use std::collections::BTreeMap;

use anyhow::{anyhow, bail, ensure, Result};
use futures::future::join_all;

use crate::auth::AccessPolicy;
use crate::error::AppError;
use crate::workload::{project_detail, resolve_name, AccessContext, WorkloadDetail, WorkloadOverview, WorkloadRecord, WorkloadSource};

/// The default upper bound on records fetched for one overview.
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// The workload introspection service over a cluster data source.
pub struct WorkloadService<S> {
    /// The cluster data source, borrowed per call by the operations below.
    source: S,
    /// The label key tried when the preferred app name key resolves nothing.
    fallback_label_key: String,
    /// The base URL of the deploy tracking system linked from overviews.
    deployer_link_base: String,
}

impl<S: WorkloadSource> WorkloadService<S> {
    /// Create a new instance.
    pub fn new(source: S, fallback_label_key: impl Into<String>, deployer_link_base: impl Into<String>) -> Self {
        Self {
            source,
            fallback_label_key: fallback_label_key.into(),
            deployer_link_base: deployer_link_base.into(),
        }
    }

    /// Fetch a single workload record and project it for the requesting role.
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    pub async fn workload_detail(&self, ctx: &AccessContext, name: &str) -> Result<WorkloadDetail> {
        let record = self.source.fetch(&ctx.namespace, name).await.map_err(source_error)?;
        if record.name.is_empty() {
            bail!(AppError::Ise(anyhow!("workload record returned with an empty name")));
        }
        project_detail(&record, ctx.policy.as_ref())
    }

    /// Build an aggregate overview across all workload records of one logical application.
    ///
    /// The namespace gate fails the whole request with `Forbidden` before any
    /// query is issued, and a failed list query fails it with the underlying
    /// error. Past that point, records failing access checks are silently
    /// excluded — an overview with zero admitted records is a valid result.
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    pub async fn workload_overview(&self, ctx: &AccessContext, limit: Option<u32>) -> Result<WorkloadOverview> {
        if !ctx.policy.can_access_namespace(&ctx.namespace) {
            bail!(AppError::Forbidden);
        }
        let app_name = ctx.app_filter.clone().unwrap_or_default();
        ensure!(!app_name.is_empty(), AppError::InvalidInput("an app name is required for overview queries".into()));

        let selector = format!("{}={}", ctx.app_label_key, app_name);
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);
        let records = self.source.list(&ctx.namespace, &selector, limit).await.map_err(source_error)?;

        // Fan out one evaluation task per record. Every task owns immutable
        // inputs and returns a task-local value; nothing is appended in place.
        let mut tasks = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let ctx = ctx.clone();
            tasks.push(tokio::spawn(async move { evaluate_record(index, record, &ctx) }));
        }

        // Fan in, then fold. Details keep input order, and the identity block
        // comes from the first admitted record in input order, so the result
        // is deterministic regardless of task scheduling.
        let mut admitted = Vec::with_capacity(tasks.len());
        for task in join_all(tasks).await {
            let outcome = task.map_err(|err| AppError::Ise(err.into()))?;
            if let Some(evaluated) = outcome? {
                admitted.push(evaluated);
            }
        }
        admitted.sort_by_key(|evaluated| evaluated.index);

        let mut overview = WorkloadOverview::default();
        for evaluated in admitted {
            if overview.details.is_empty() {
                overview.name = resolve_name(&evaluated.labels, &ctx.app_label_key, &self.fallback_label_key, &evaluated.detail.name);
                overview.namespace = evaluated.detail.namespace.clone();
                overview.deployer_link = self.deployer_link(&evaluated.detail.name);
                overview.cluster_name = evaluated.cluster_name;
            }
            overview.details.push(evaluated.detail);
        }
        Ok(overview)
    }

    /// Derive the deploy tracking link for the given workload name.
    fn deployer_link(&self, name: &str) -> String {
        format!("{}/{}", self.deployer_link_base.trim_end_matches('/'), name)
    }
}

/// The output of one admitted per-record evaluation task.
struct Evaluated {
    /// The input-order index of the record.
    index: usize,
    /// The record's labels, kept for identity resolution.
    labels: BTreeMap<String, String>,
    /// The record's cluster name, kept for identity resolution.
    cluster_name: String,
    /// The projected detail view.
    detail: WorkloadDetail,
}

/// Evaluate one record's access predicates and project it when admitted.
///
/// An `Ok(None)` here is a per-record filtering decision, never an error;
/// only access denials are excluded, any other projection failure propagates.
fn evaluate_record(index: usize, record: WorkloadRecord, ctx: &AccessContext) -> Result<Option<Evaluated>> {
    let admitted = ctx.policy.can_access_namespace(&record.namespace)
        && ctx.policy.can_access_workload(&record.labels)
        && ctx.policy.matches_app_filter(&record.labels, ctx.app_filter.as_deref());
    if !admitted {
        return Ok(None);
    }
    let detail = match project_detail(&record, ctx.policy.as_ref()) {
        Ok(detail) => detail,
        Err(err) if matches!(err.downcast_ref::<AppError>(), Some(AppError::Forbidden)) => return Ok(None),
        Err(err) => return Err(err),
    };
    Ok(Some(Evaluated {
        index,
        labels: record.labels,
        cluster_name: record.cluster_name,
        detail,
    }))
}

/// Map a data source failure into the app error taxonomy, preserving the
/// underlying message unless the source already classified it.
fn source_error(err: anyhow::Error) -> anyhow::Error {
    if err.is::<AppError>() {
        err
    } else {
        AppError::Ise(err).into()
    }
}
