//! HTTP surface for the relay.
//!
//! Wires the single legacy write endpoint into an axum router and runs
//! the request pipeline: credential gate, series decoding, point
//! translation into a request-scoped batch, then the downstream forward.

use crate::{
    auth::{AuthOutcome, Credentials},
    batch::PointBatch,
    error::Error,
    forward::WriteSink,
    parsing,
    translate::{self, TimePrecision},
};
use axum::{
    body::Bytes,
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Query parameters of a legacy write request.
#[derive(Debug, Deserialize)]
pub struct WriteParams {
    /// Caller username.
    pub u: Option<String>,
    /// Caller password.
    pub p: Option<String>,
    /// Unit of incoming time values: `s`, `ms` or `us`.
    pub time_precision: Option<String>,
}

/// Shared application state
pub struct AppState {
    /// Credentials inbound writes are checked against.
    pub credentials: Credentials,
    /// Downstream database batches are written to.
    pub database: String,
    /// Destination for drained batches.
    pub sink: Arc<dyn WriteSink>,
}

/// Error type mapping pipeline failures to transport status codes.
pub enum ApiError {
    /// Credential mismatch or missing credentials: client error, generic
    /// body that does not reveal which credential was wrong.
    Unauthorized,
    /// Malformed body: server error with an empty body, as the legacy
    /// endpoint responded.
    Decode,
    /// A translation failure (row shape, time value): client error.
    Translate(Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Username/Password mismatch\n").into_response()
            }
            ApiError::Decode => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            ApiError::Translate(err) => {
                (StatusCode::BAD_REQUEST, format!("{}\n", err)).into_response()
            }
        }
    }
}

/// Create the router with the legacy write endpoint.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/db/graphite/series", post(handle_series_write))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// POST /db/graphite/series - translate and forward a legacy write
async fn handle_series_write(
    State(state): State<Arc<AppState>>,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    Query(params): Query<WriteParams>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<String, ApiError> {
    let forwarded_for =
        headers.get("x-forwarded-for").and_then(|value| value.to_str().ok());

    match state.credentials.verify(params.u.as_deref(), params.p.as_deref()) {
        AuthOutcome::Authorized => {}
        AuthOutcome::Rejected(reason) => {
            warn!(
                remote = %remote,
                forwarded_for,
                path = uri.path(),
                reason = ?reason,
                "username/password check failed, rejecting request"
            );
            return Err(ApiError::Unauthorized);
        }
    }

    info!(remote = %remote, forwarded_for, path = uri.path(), "ready to parse request");

    let series = parsing::decode_series(&body).map_err(|err| {
        warn!(error = %err, "body decode error, dropping request");
        ApiError::Decode
    })?;

    let precision = params.time_precision.as_deref().and_then(TimePrecision::parse);

    let mut batch = PointBatch::new(state.database.clone());
    for entry in &series {
        debug!(
            series = %entry.name,
            columns = ?entry.columns,
            rows = entry.points.len(),
            "translating series"
        );
        translate::translate_series(entry, precision, &mut batch).map_err(|err| {
            warn!(error = %err, "translation error, dropping request");
            ApiError::Translate(err)
        })?;
    }

    // The acknowledgement below goes out regardless of the forward
    // outcome; the caller cannot observe a downstream failure.
    if let Err(err) = state.sink.forward(&mut batch).await {
        warn!(error = %err, database = %state.database, "forward failed, batch dropped");
    }

    Ok(format!("request accepted for user {}\n", state.credentials.username()))
}

/// Start the relay server on the specified address
pub async fn start_server(
    addr: &str,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "legacy series relay listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
