//! Fixture HTTP server shared by the integration tests.
//!
//! Routes:
//! - `GET /slow/{ms}/{body}`: sleeps `ms` milliseconds, then answers `body`,
//!   while an in-flight gauge tracks how many handlers overlap.
//! - `GET /count`: answers the number of times it has been hit.
//!
//! [`truncated_body_url`] starts a separate raw TCP listener whose response
//! promises more body bytes than it sends.

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-flight instrumentation for the fixture server.
#[derive(Clone, Default)]
pub struct Gauge {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    hits: Arc<AtomicUsize>,
}

impl Gauge {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        self.hits.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn slow(State(gauge): State<Gauge>, Path((ms, body)): Path<(u64, String)>) -> String {
    gauge.enter();
    tokio::time::sleep(Duration::from_millis(ms)).await;
    gauge.leave();
    body
}

async fn count(State(gauge): State<Gauge>) -> String {
    gauge.enter();
    gauge.leave();
    gauge.hits().to_string()
}

pub struct Fixture {
    pub base_url: String,
    pub gauge: Gauge,
}

impl Fixture {
    pub async fn start() -> Self {
        init_tracing();
        let gauge = Gauge::default();
        let app = Router::new()
            .route("/slow/{ms}/{body}", get(slow))
            .route("/count", get(count))
            .with_state(gauge.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            gauge,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Route `tracing` output to the test harness; RUST_LOG controls the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An address nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/gone")
}

/// Serve one connection that announces `Content-Length: 100`, writes five
/// bytes and hangs up, so the response head arrives but the body cannot be
/// read in full.
pub async fn truncated_body_url() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let _ = socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nshort")
            .await;
        let _ = socket.flush().await;
        let _ = socket.shutdown().await;
    });
    format!("http://{addr}/truncated")
}
