//! HTTP API for hum removal, compiled with the `http` feature.
//!
//! Exposes health, process-audio and detect-hum endpoints on an Axum router.
//! Each DSP run is moved onto the blocking pool so request handling never
//! stalls the async workers.

mod routes;

pub use routes::{
    build_router, run_http_server, DetectResponse, HealthResponse, HttpServerError, HumHttpState,
    ProcessQuery,
};

use anyhow::Context;
use std::net::SocketAddr;

use crate::config::AppConfig;

/// Parse `addr`, build a multi-threaded runtime and serve until Ctrl-C.
pub fn serve_blocking(config: &AppConfig, addr: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("invalid listen address {addr:?}"))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime for HTTP server")?;

    let state = HumHttpState::from_config(config);
    runtime.block_on(run_http_server(state, addr))
}
