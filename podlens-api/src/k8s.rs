//! Kubernetes cluster data source.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, ListParams};
use kube::client::Client;

use podlens_core::error::AppError;
use podlens_core::workload::{WorkloadRecord, WorkloadSource};

/// A workload source backed by the Kubernetes API.
#[derive(Clone)]
pub struct PodSource {
    /// K8s client.
    client: Client,
}

impl PodSource {
    /// Create a new instance.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl WorkloadSource for PodSource {
    async fn fetch(&self, namespace: &str, name: &str) -> Result<WorkloadRecord> {
        let pod = match self.pods(namespace).get(name).await {
            Ok(pod) => pod,
            Err(kube::Error::Api(err)) if err.code == 404 => bail!(AppError::ResourceNotFound),
            Err(err) => return Err(err).context("error fetching workload record"),
        };
        Ok(WorkloadRecord::from(pod))
    }

    async fn list(&self, namespace: &str, selector: &str, limit: u32) -> Result<Vec<WorkloadRecord>> {
        let params = ListParams {
            label_selector: Some(selector.to_string()),
            limit: Some(limit),
            ..Default::default()
        };
        let pods = self.pods(namespace).list(&params).await.context("error listing workload records")?;
        Ok(pods.items.into_iter().map(WorkloadRecord::from).collect())
    }
}
