//! End-to-end tests for the relay pipeline
//!
//! These tests run the real router on an ephemeral port and drive it
//! with an HTTP client, either against a recording sink or against a
//! mock downstream `/write` endpoint.

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::post,
    Router,
};
use series_relay::{
    auth::Credentials,
    batch::PointBatch,
    error::Result,
    forward::{InfluxSink, SinkConfig, WriteSink},
    http::{create_router, AppState},
    translate::TranslatedPoint,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

/// Sink that records every drained batch instead of forwarding it.
#[derive(Default)]
struct RecordingSink {
    batches: Mutex<Vec<Vec<TranslatedPoint>>>,
}

#[async_trait]
impl WriteSink for RecordingSink {
    async fn forward(&self, batch: &mut PointBatch) -> Result<()> {
        self.batches.lock().unwrap().push(batch.drain());
        Ok(())
    }
}

async fn spawn_relay(sink: Arc<dyn WriteSink>) -> SocketAddr {
    let state = Arc::new(AppState {
        credentials: Credentials::new("influx", "secret"),
        database: "graphite".to_string(),
        sink,
    });
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .unwrap();
    });
    addr
}

fn write_url(addr: SocketAddr, query: &str) -> String {
    format!("http://{}/db/graphite/series?{}", addr, query)
}

const LEGACY_BODY: &str =
    r#"[{"name":"host.cpu.load","columns":["time","value"],"points":[[1000,0.5]]}]"#;

#[tokio::test]
async fn test_write_is_translated_and_forwarded() {
    let sink = Arc::new(RecordingSink::default());
    let addr = spawn_relay(sink.clone()).await;

    let response = reqwest::Client::new()
        .post(write_url(addr, "u=influx&p=secret&time_precision=s"))
        .body(LEGACY_BODY)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "request accepted for user influx\n");

    let batches = sink.batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1);

    let point = &batches[0][0];
    assert_eq!(point.measurement, "host");
    assert_eq!(point.tags["name"], "host.cpu.load");
    assert_eq!(point.tags["tag0"], "host");
    assert_eq!(point.tags["tag1"], "cpu");
    assert_eq!(point.tags["tag2"], "load");
    assert_eq!(point.fields.len(), 1);
    assert_eq!(point.fields["value"], 0.5);
    assert_eq!(point.timestamp.timestamp(), 1000);
}

#[tokio::test]
async fn test_millisecond_precision_decomposes_by_floor_division() {
    let sink = Arc::new(RecordingSink::default());
    let addr = spawn_relay(sink.clone()).await;

    let body = r#"[{"name":"a.b","columns":["time","value"],"points":[[1500,1.0]]}]"#;
    let response = reqwest::Client::new()
        .post(write_url(addr, "u=influx&p=secret&time_precision=ms"))
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let batches = sink.batches.lock().unwrap();
    let point = &batches[0][0];
    assert_eq!(point.timestamp.timestamp(), 1);
    assert_eq!(point.timestamp.timestamp_subsec_millis(), 500);
    assert_eq!(point.timestamp.timestamp_millis(), 1500);
}

#[tokio::test]
async fn test_credential_mismatch_is_rejected_before_decoding() {
    let sink = Arc::new(RecordingSink::default());
    let addr = spawn_relay(sink.clone()).await;

    let response = reqwest::Client::new()
        .post(write_url(addr, "u=influx&p=wrong&time_precision=s"))
        .body(LEGACY_BODY)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert_eq!(response.text().await.unwrap(), "Username/Password mismatch\n");
    assert!(sink.batches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_credentials_are_rejected() {
    let sink = Arc::new(RecordingSink::default());
    let addr = spawn_relay(sink.clone()).await;

    let response = reqwest::Client::new()
        .post(write_url(addr, "time_precision=s"))
        .body(LEGACY_BODY)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert!(sink.batches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_a_server_error() {
    let sink = Arc::new(RecordingSink::default());
    let addr = spawn_relay(sink.clone()).await;

    let response = reqwest::Client::new()
        .post(write_url(addr, "u=influx&p=secret"))
        .body("{not valid json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    assert_eq!(response.text().await.unwrap(), "");
    assert!(sink.batches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_row_shape_mismatch_aborts_whole_request() {
    let sink = Arc::new(RecordingSink::default());
    let addr = spawn_relay(sink.clone()).await;

    // second series has a short row; nothing must be forwarded
    let body = r#"[
        {"name":"ok.series","columns":["time","value"],"points":[[1,1.0]]},
        {"name":"bad.series","columns":["time","value"],"points":[[2]]}
    ]"#;
    let response = reqwest::Client::new()
        .post(write_url(addr, "u=influx&p=secret&time_precision=s"))
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    assert!(sink.batches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_series_list_is_accepted() {
    let sink = Arc::new(RecordingSink::default());
    let addr = spawn_relay(sink.clone()).await;

    let response = reqwest::Client::new()
        .post(write_url(addr, "u=influx&p=secret"))
        .body("[]")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    // the forward cycle ran with an empty batch
    let batches = sink.batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert!(batches[0].is_empty());
}

#[tokio::test]
async fn test_forward_failure_does_not_change_acknowledgement() {
    // a sink pointed at a dead port fails every forward
    let sink = Arc::new(
        InfluxSink::new(&SinkConfig {
            url: "http://127.0.0.1:1".to_string(),
            username: "influx".to_string(),
            password: "secret".to_string(),
            timeout: Duration::from_secs(2),
        })
        .unwrap(),
    );
    let addr = spawn_relay(sink).await;

    let response = reqwest::Client::new()
        .post(write_url(addr, "u=influx&p=secret&time_precision=s"))
        .body(LEGACY_BODY)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "request accepted for user influx\n");
}

/// Captured downstream writes: query parameters and raw body.
#[derive(Clone, Default)]
struct CapturedWrites(Arc<Mutex<Vec<(HashMap<String, String>, String)>>>);

async fn capture_write(
    State(captured): State<CapturedWrites>,
    Query(params): Query<HashMap<String, String>>,
    body: String,
) -> StatusCode {
    captured.0.lock().unwrap().push((params, body));
    StatusCode::NO_CONTENT
}

async fn spawn_downstream(captured: CapturedWrites) -> SocketAddr {
    let app = Router::new().route("/write", post(capture_write)).with_state(captured);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_end_to_end_line_protocol_write() {
    let captured = CapturedWrites::default();
    let downstream = spawn_downstream(captured.clone()).await;

    let sink = Arc::new(
        InfluxSink::new(&SinkConfig {
            url: format!("http://{}", downstream),
            username: "influx".to_string(),
            password: "secret".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap(),
    );
    let addr = spawn_relay(sink).await;

    let response = reqwest::Client::new()
        .post(write_url(addr, "u=influx&p=secret&time_precision=s"))
        .body(LEGACY_BODY)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let writes = captured.0.lock().unwrap();
    assert_eq!(writes.len(), 1);

    let (params, body) = &writes[0];
    assert_eq!(params["db"], "graphite");
    assert_eq!(params["precision"], "u");
    assert_eq!(params["u"], "influx");
    assert_eq!(params["p"], "secret");
    assert_eq!(
        body,
        "host,name=host.cpu.load,tag0=host,tag1=cpu,tag2=load value=0.5 1000000000"
    );
}
