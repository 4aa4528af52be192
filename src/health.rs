//! Liveness endpoints for process supervision and uptime pingers.

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use sysinfo::System;
use tracing::info;

/// Body of `/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Resident set size, where the platform exposes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_rss_bytes: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

/// Body of `/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
    pub league_id: String,
    pub uptime: String,
    pub timestamp: DateTime<Utc>,
}

pub struct HealthState {
    started: Instant,
    league_id: String,
}

impl HealthState {
    pub fn new(league_id: impl Into<String>) -> Self {
        Self {
            started: Instant::now(),
            league_id: league_id.into(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.uptime_seconds(),
            memory_rss_bytes: resident_memory_bytes(),
            timestamp: Utc::now(),
        }
    }

    pub fn status(&self) -> StatusResponse {
        StatusResponse {
            message: "🏈 League bot is running!".to_string(),
            league_id: self.league_id.clone(),
            uptime: format!("{} minutes", self.uptime_seconds() / 60),
            timestamp: Utc::now(),
        }
    }
}

/// Resident memory of this process in bytes, when the platform reports it.
fn resident_memory_bytes() -> Option<u64> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut system = System::new();
    if !system.refresh_process(pid) {
        return None;
    }
    system.process(pid).map(|p| p.memory())
}

pub fn router(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/", get(status_handler))
        .route("/ping", get(ping_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

pub struct HealthServer {
    state: Arc<HealthState>,
    port: u16,
}

impl HealthServer {
    pub fn new(state: Arc<HealthState>, port: u16) -> Self {
        Self { state, port }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let app = router(Arc::clone(&self.state));

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("HTTP server running on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

async fn status_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    Json(state.status())
}

async fn ping_handler() -> &'static str {
    "pong"
}

async fn health_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    Json(state.health())
}
