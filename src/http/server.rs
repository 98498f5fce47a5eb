//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all proxy route
//! - Wire up middleware (tracing, timeout, request ID)
//! - Spawn the background tasks (bucket refiller, failure monitor)
//! - Per request: admission gate → active backend → forward → classify

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admission::TokenBucket;
use crate::config::ProxyConfig;
use crate::failover::{Backend, FailoverPool, FailureMonitor};
use crate::http::forward::{self, UpstreamClient};
use crate::http::request::{RequestUuid, X_REQUEST_ID};
use crate::observability::metrics;

/// Application state injected into the proxy handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<FailoverPool>,
    pub bucket: Arc<TokenBucket>,
    pub client: UpstreamClient,
    pub upstream_timeout: Duration,
}

/// HTTP server for the failover proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    pool: Arc<FailoverPool>,
    bucket: Arc<TokenBucket>,
}

impl HttpServer {
    /// Create a server for the given configuration and backend pool.
    pub fn new(config: ProxyConfig, backends: Vec<Backend>) -> Self {
        let pool = Arc::new(FailoverPool::new(backends));
        let bucket = Arc::new(TokenBucket::new(
            config.rate_limit.requests_per_second as usize,
            Duration::from_millis(config.rate_limit.acquire_timeout_ms),
        ));
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            pool: pool.clone(),
            bucket: bucket.clone(),
            client,
            upstream_timeout: Duration::from_secs(config.timeouts.upstream_secs),
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            pool,
            bucket,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(RequestUuid))
    }

    /// Run the server until shutdown is signalled.
    ///
    /// Spawns the two background tasks (refiller, failure monitor); both
    /// subscribe to the same shutdown channel as the server itself.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backends = self.pool.len(),
            "HTTP server starting"
        );

        let monitor = FailureMonitor::new(self.pool.clone(), self.config.failover.clone());
        tokio::spawn(monitor.run(shutdown.resubscribe()));
        tokio::spawn(self.bucket.clone().run_refiller(shutdown.resubscribe()));

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler: admission gate, then forward to the active backend.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    if state.bucket.acquire().await.is_err() {
        tracing::warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            "Admission wait timed out, rejecting request"
        );
        metrics::record_admission_timeout();
        metrics::record_request(&method, StatusCode::TOO_MANY_REQUESTS.as_u16(), "none", start);
        return error_response(StatusCode::TOO_MANY_REQUESTS, "rate limit exceeded");
    }

    // A rotation moments after this read is fine; rotation happens on a
    // tens-of-seconds timescale while requests are sub-second.
    let backend = state.pool.current();
    let backend_label = backend.label();

    let (parts, body) = request.into_parts();
    let result = match forward::build_upstream_request(backend.base_url(), &parts, body) {
        Ok(outbound) => forward::execute(&state.client, outbound, state.upstream_timeout).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(response) => {
            tracing::debug!(
                request_id = %request_id,
                backend = %backend_label,
                status = %response.status(),
                duration = ?start.elapsed(),
                "Forwarded request"
            );
            metrics::record_request(&method, response.status().as_u16(), &backend_label, start);
            response.into_response()
        }
        Err(err) => {
            tracing::error!(
                request_id = %request_id,
                backend = %backend_label,
                method = %method,
                path = %path,
                error = %err,
                "Upstream request failed"
            );
            state.pool.record_failure();
            metrics::record_upstream_failure(&backend_label);

            let status = err.client_status();
            metrics::record_request(&method, status.as_u16(), &backend_label, start);
            error_response(status, "upstream request failed")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
