//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, service log, auth)
//!
//! No inbound timeout: once issued, a broadcast runs to completion.
//! - Translate HTTP requests into relay requests
//! - Serve until the shutdown signal fires

use axum::{
    extract::State,
    http::{header, HeaderMap},
    middleware,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::http::auth::auth_guard;
use crate::http::request::RequestIdLayer;
use crate::http::response::ServiceInfo;
use crate::http::service_log::service_log;
use crate::ledger::BroadcastResult;
use crate::relay::{
    AnnounceBody, LegacyVariant, RelayError, RelayPipeline, RelayRequest, RequestShape,
    TransferBody,
};
use crate::store::DocumentStore;

/// Where the auth guard finds its policy document.
#[derive(Debug, Clone)]
pub struct GuardSettings {
    pub configs_collection: String,
    pub auth_key: String,
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RelayPipeline>,
    pub store: Arc<dyn DocumentStore>,
    pub guard: GuardSettings,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(
        config: RelayConfig,
        pipeline: Arc<RelayPipeline>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let state = AppState {
            pipeline,
            store,
            guard: GuardSettings {
                configs_collection: config.store.configs_collection.clone(),
                auth_key: config.store.auth_key.clone(),
            },
        };

        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(root_handler))
            .route("/announce", post(announce_handler))
            .route("/announce/legacy", post(announce_legacy_handler))
            .route("/announce/new", post(announce_new_handler))
            .route("/announce/transfer", post(transfer_handler))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .layer(middleware::from_fn(service_log))
            .with_state(state)
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn root_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo::current())
}

async fn announce_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AnnounceBody>,
) -> Result<Json<BroadcastResult>, RelayError> {
    let shape = RequestShape::Legacy {
        variant: LegacyVariant::Primary,
        data: body.data,
    };
    relay(&state, &headers, shape).await
}

async fn announce_legacy_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AnnounceBody>,
) -> Result<Json<BroadcastResult>, RelayError> {
    let shape = RequestShape::Legacy {
        variant: LegacyVariant::Legacy,
        data: body.data,
    };
    relay(&state, &headers, shape).await
}

async fn announce_new_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AnnounceBody>,
) -> Result<Json<BroadcastResult>, RelayError> {
    relay(&state, &headers, RequestShape::NewChain { data: body.data }).await
}

async fn transfer_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<TransferBody>,
) -> Result<Json<BroadcastResult>, RelayError> {
    let shape = RequestShape::PeerToPeer {
        sender_key: body.sender,
        entity_key: body.entity,
        data: body.data,
    };
    relay(&state, &headers, shape).await
}

async fn relay(
    state: &AppState,
    headers: &HeaderMap,
    shape: RequestShape,
) -> Result<Json<BroadcastResult>, RelayError> {
    let request = RelayRequest::new(authorization(headers), shape);
    state.pipeline.relay(request).await.map(Json)
}
