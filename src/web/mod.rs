//! Live results view: runs the suite in the background and streams each
//! completed measurement to the browser over SSE.

mod assets;

use std::{
    convert::Infallible,
    net::SocketAddr,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use anyhow::Result;
use axum::body::Body;
use axum::{
    extract::State,
    http::header,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;
use tokio::{net::TcpListener, sync::broadcast};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use crate::{
    harness::{Harness, Measurement},
    report::format_line,
    sequence::InputPattern,
    suite::Suite,
};

#[derive(Clone, Serialize)]
pub struct StateEnvelope {
    pub suite: String,
    pub total_runs: usize,
    pub latest: Option<Measurement>,
    pub completed: bool,
}

#[derive(Clone)]
struct AppState {
    broadcaster: broadcast::Sender<String>,
    latest: Arc<Mutex<Option<Measurement>>>,
    results: Arc<Mutex<Vec<Measurement>>>,
    total_runs: usize,
    suite_name: String,
    suite_done: Arc<AtomicBool>,
}

pub struct WebServerConfig {
    pub suite: Suite,
    pub report_dir: Option<PathBuf>,
    pub iterations: Option<u64>,
    pub input: Option<InputPattern>,
    pub host: String,
    pub port: u16,
}

impl WebServerConfig {
    /// Assemble the harness with the same override chain as the plain CLI
    /// path; serve mode honors `--iterations` and `--input` alike.
    fn harness(&self) -> Result<Harness> {
        self.suite
            .build_harness(self.report_dir.clone(), self.iterations, self.input.as_ref())
    }
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let mut harness = config.harness()?;
    let WebServerConfig { host, port, .. } = config;

    let suite_name = harness.suite_name().to_string();
    let total_runs = harness.run_count();

    let (tx, _) = broadcast::channel::<String>(64);
    let latest: Arc<Mutex<Option<Measurement>>> = Arc::new(Mutex::new(None));
    let results: Arc<Mutex<Vec<Measurement>>> = Arc::new(Mutex::new(Vec::new()));
    let suite_done = Arc::new(AtomicBool::new(false));

    let latest_for_bench = latest.clone();
    let results_for_bench = results.clone();
    let done_for_bench = suite_done.clone();
    let tx_for_bench = tx.clone();
    let suite_label = suite_name.clone();

    let bench_handle = tokio::task::spawn_blocking(move || -> Result<()> {
        harness.run_with_hook(|measurement| {
            println!("{}", format_line(measurement));
            {
                let mut guard = latest_for_bench.lock().expect("latest lock poisoned");
                *guard = Some(measurement.clone());
            }
            {
                let mut guard = results_for_bench.lock().expect("results lock poisoned");
                guard.push(measurement.clone());
            }
            if let Ok(payload) = serde_json::to_string(measurement) {
                let _ = tx_for_bench.send(payload);
            }
        })?;
        done_for_bench.store(true, Ordering::SeqCst);
        Ok(())
    });

    let state = Arc::new(AppState {
        broadcaster: tx.clone(),
        latest: latest.clone(),
        results: results.clone(),
        total_runs,
        suite_name: suite_name.clone(),
        suite_done: suite_done.clone(),
    });

    tokio::spawn(async move {
        match bench_handle.await {
            Ok(Ok(())) => {
                println!("[web] Suite '{}' completed.", suite_label);
            }
            Ok(Err(err)) => {
                eprintln!("[web] Suite error: {err:?}");
            }
            Err(err) => {
                eprintln!("[web] Benchmark task failed: {err:?}");
            }
        }
    });

    let router = Router::new()
        .route("/", get(index))
        .route("/styles.css", get(styles))
        .route("/app.js", get(script))
        .route("/api/state", get(latest_state))
        .route("/api/results", get(all_results))
        .route("/api/report.json", get(raw_report))
        .route("/api/events", get(stream_events))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("invalid address");

    println!(
        "branchmark results live at http://{}:{} (Ctrl+C to stop)",
        host, port
    );

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    println!("Shutting down results view...");
}

async fn index() -> Html<&'static str> {
    Html(assets::INDEX_HTML)
}

async fn styles() -> impl IntoResponse {
    Response::builder()
        .header(header::CONTENT_TYPE, "text/css; charset=utf-8")
        .body(assets::STYLES_CSS.to_string())
        .unwrap()
}

async fn script() -> impl IntoResponse {
    Response::builder()
        .header(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )
        .body(assets::APP_JS.to_string())
        .unwrap()
}

async fn latest_state(State(state): State<Arc<AppState>>) -> Json<StateEnvelope> {
    let latest = state.latest.lock().expect("latest lock poisoned").clone();
    Json(StateEnvelope {
        suite: state.suite_name.clone(),
        total_runs: state.total_runs,
        latest,
        completed: state.suite_done.load(Ordering::SeqCst),
    })
}

#[derive(Serialize)]
struct ResultsResponse {
    suite: String,
    total_runs: usize,
    completed: bool,
    measurements: Vec<Measurement>,
}

async fn all_results(State(state): State<Arc<AppState>>) -> Json<ResultsResponse> {
    let measurements = state.results.lock().expect("results lock poisoned").clone();
    Json(ResultsResponse {
        suite: state.suite_name.clone(),
        total_runs: state.total_runs,
        completed: state.suite_done.load(Ordering::SeqCst),
        measurements,
    })
}

async fn raw_report(State(state): State<Arc<AppState>>) -> Response {
    let measurements = state.results.lock().expect("results lock poisoned").clone();
    let json = serde_json::to_vec_pretty(&measurements).unwrap_or_else(|_| b"[]".to_vec());
    Response::builder()
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(Bytes::from(json)))
        .unwrap()
}

async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.broadcaster.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
