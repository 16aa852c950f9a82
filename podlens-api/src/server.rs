//! HTTP server exposing the workload introspection API.

use std::sync::Arc;

use anyhow::Result;
use axum::body::{Body, HttpBody};
use axum::extract;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Response, StatusCode};
use axum::routing::{get, Router};
use axum::AddExtensionLayer;
use serde::Deserialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::k8s::PodSource;
use podlens_core::auth::{AccessPolicy, TokenCredentials};
use podlens_core::error::AppError;
use podlens_core::workload::{AccessContext, WorkloadDetail, WorkloadOverview, WorkloadService};

/// Application server.
pub struct AppServer {
    /// The application's runtime config.
    config: Arc<Config>,
    /// A channel used for triggering graceful shutdown.
    shutdown: broadcast::Sender<()>,
    /// The workload introspection service backing the routes.
    service: WorkloadService<PodSource>,
}

/// Shared handler state.
struct State {
    config: Arc<Config>,
    service: WorkloadService<PodSource>,
}

impl AppServer {
    /// Create a new instance.
    pub fn new(config: Arc<Config>, client: kube::Client, shutdown: broadcast::Sender<()>) -> Self {
        let service = WorkloadService::new(
            PodSource::new(client),
            config.fallback_label_key.clone(),
            config.deployer_link_base.clone(),
        );
        Self { config, shutdown, service }
    }

    /// Spawn this server.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let state = Arc::new(State {
            config: self.config.clone(),
            service: self.service,
        });
        let router = Router::new()
            .route("/health", get(|| async { StatusCode::OK }))
            .route("/v1/workloads/:namespace", get(workload_overview))
            .route("/v1/workloads/:namespace/:name", get(workload_detail))
            .layer(AddExtensionLayer::new(state));

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let mut shutdown_rx = self.shutdown.subscribe();
        let server = axum::Server::bind(&addr).serve(router.into_make_service()).with_graceful_shutdown(async move {
            let _res = shutdown_rx.recv().await;
        });

        tracing::info!("HTTP server listening");
        if let Err(err) = server.await {
            tracing::error!(error = ?err, "error from HTTP server, shutting down");
            let _res = self.shutdown.send(());
        }
    }
}

/// Query parameters accepted by overview requests.
#[derive(Debug, Deserialize)]
struct OverviewQuery {
    /// The logical application name to aggregate over.
    appname: String,
    /// An override of the configured app name label key.
    #[serde(rename = "labelKey")]
    label_key: Option<String>,
    /// An upper bound on the number of records fetched.
    limit: Option<u32>,
}

/// Handler for single workload detail requests.
#[tracing::instrument(level = "debug", skip(headers, state))]
async fn workload_detail(
    path: extract::Path<(String, String)>, headers: HeaderMap, state: extract::Extension<Arc<State>>,
) -> ServerResult<axum::Json<WorkloadDetail>> {
    let extract::Path((namespace, name)) = path;
    let policy = must_get_role(&headers, &state.config)?;
    let ctx = AccessContext {
        policy,
        namespace,
        app_label_key: state.config.app_label_key.clone(),
        app_filter: None,
    };
    let detail = state.service.workload_detail(&ctx, &name).await?;
    Ok(axum::Json(detail))
}

/// Handler for workload overview requests.
#[tracing::instrument(level = "debug", skip(headers, state))]
async fn workload_overview(
    path: extract::Path<String>, query: extract::Query<OverviewQuery>, headers: HeaderMap, state: extract::Extension<Arc<State>>,
) -> ServerResult<axum::Json<WorkloadOverview>> {
    let extract::Path(namespace) = path;
    let extract::Query(query) = query;
    let policy = must_get_role(&headers, &state.config)?;
    let ctx = AccessContext {
        policy,
        namespace,
        app_label_key: query.label_key.unwrap_or_else(|| state.config.app_label_key.clone()),
        app_filter: Some(query.appname),
    };
    let overview = state.service.workload_overview(&ctx, query.limit).await?;
    Ok(axum::Json(overview))
}

/// Extract the requesting role's claims from the authorization header, else fail.
fn must_get_role(headers: &HeaderMap, config: &Config) -> Result<Arc<dyn AccessPolicy>> {
    let header_val = headers.get(AUTHORIZATION).cloned().ok_or(AppError::Unauthorized)?;
    let creds = TokenCredentials::from_auth_header(header_val, &config.jwt_decoding_key)?;
    Ok(Arc::new(creds.claims))
}

/// A result type used to work seamlessly with axum.
type ServerResult<T> = std::result::Result<T, ServerError>;

/// A newtype to make anyhow errors work with axum.
struct ServerError(pub anyhow::Error);

impl From<anyhow::Error> for ServerError {
    fn from(src: anyhow::Error) -> Self {
        ServerError(src)
    }
}

impl axum::response::IntoResponse for ServerError {
    type Body = Body;
    type BodyError = <Self::Body as HttpBody>::Error;

    fn into_response(self) -> Response<Self::Body> {
        let (status, message) = match self.0.downcast_ref::<AppError>() {
            Some(err @ (AppError::Unauthorized | AppError::InvalidCredentials(_))) => (StatusCode::UNAUTHORIZED, err.to_string()),
            Some(err @ AppError::Forbidden) => (StatusCode::FORBIDDEN, err.to_string()),
            Some(err @ AppError::InvalidInput(_)) => (StatusCode::BAD_REQUEST, err.to_string()),
            Some(err @ AppError::ResourceNotFound) => (StatusCode::NOT_FOUND, err.to_string()),
            // The underlying message is preserved for diagnostics.
            Some(AppError::Ise(inner)) => (StatusCode::INTERNAL_SERVER_ERROR, inner.to_string()),
            None => (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()),
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self.0, "error handling request");
        }
        let mut res = Response::new(Body::from(message));
        *res.status_mut() = status;
        res
    }
}
