//! Outbound request construction and execution.
//!
//! # Responsibilities
//! - Rebuild the inbound request against the active backend's base URL
//!   (same method, same path and query, headers carried over)
//! - Force the content-type to JSON for the upstream hop
//! - Stream bodies in both directions without buffering
//! - Bound the upstream call with a deadline
//! - Classify failures for the failure monitor
//!
//! # Design Decisions
//! - Only `200 OK` counts as upstream success; any other status is
//!   recorded as a failure and never forwarded
//! - Host and connection headers are regenerated for the upstream hop
//! - An I/O error while streaming an already-started response body is
//!   logged but does not count as an upstream failure

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, request::Parts, HeaderValue, Request, Response, StatusCode, Uri};
use http_body_util::BodyExt;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use thiserror::Error;
use tokio::time;
use url::Url;

/// Client used for all upstream calls.
pub type UpstreamClient = Client<HttpConnector, Body>;

/// Upstream success status. Anything else is a recorded failure.
const SUCCESS_STATUS: StatusCode = StatusCode::OK;

/// Why a forwarded request did not produce a success response.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to build upstream URI: {0}")]
    InvalidUri(#[from] axum::http::uri::InvalidUri),

    #[error("failed to build upstream request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("upstream returned status {0}")]
    BadStatus(StatusCode),
}

impl ForwardError {
    /// Gateway status reported to the client for this failure.
    pub fn client_status(&self) -> StatusCode {
        match self {
            ForwardError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Build the outbound request for the given backend.
///
/// The inbound body is passed through as-is, so it streams to the
/// upstream without being buffered here.
pub fn build_upstream_request(
    base: &Url,
    parts: &Parts,
    body: Body,
) -> Result<Request<Body>, ForwardError> {
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = format!("{}{}", base.as_str().trim_end_matches('/'), path_and_query);
    let uri: Uri = target.parse()?;

    let mut builder = Request::builder().method(parts.method.clone()).uri(uri);
    if let Some(headers) = builder.headers_mut() {
        for (name, value) in parts.headers.iter() {
            // Host and connection handling belong to the upstream hop.
            if name == header::HOST || name == header::CONNECTION {
                continue;
            }
            headers.insert(name.clone(), value.clone());
        }
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
    }

    Ok(builder.body(body)?)
}

/// Execute the outbound call and stream the response back.
///
/// Returns an error for transport failures, deadline expiry and non-200
/// upstream statuses; the caller records those into the failure window.
pub async fn execute(
    client: &UpstreamClient,
    request: Request<Body>,
    deadline: Duration,
) -> Result<Response<Body>, ForwardError> {
    let response = time::timeout(deadline, client.request(request))
        .await
        .map_err(|_| ForwardError::DeadlineExceeded(deadline))??;

    let status = response.status();
    if status != SUCCESS_STATUS {
        return Err(ForwardError::BadStatus(status));
    }

    let (parts, upstream_body) = response.into_parts();

    // A copy error mid-stream cannot fail the response anymore; surface
    // it in the logs and let the connection close.
    let body = Body::new(upstream_body.map_err(|err| {
        tracing::warn!(error = %err, "Error streaming upstream response body");
        err
    }));

    let mut builder = Response::builder().status(parts.status);
    if let Some(content_type) = parts.headers.get(header::CONTENT_TYPE) {
        builder = builder.header(header::CONTENT_TYPE, content_type.clone());
    }
    Ok(builder.body(body)?)
}
