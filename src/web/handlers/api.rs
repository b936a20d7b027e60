use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::db::Row;
use crate::web::state::AppState;

#[derive(Debug, Deserialize, Clone)]
pub struct NlQueryRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct NlQueryResponse {
    pub question: String,
    pub sql: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub row_count: usize,
    pub execution_time_ms: u64,
    /// Set when the generated SQL could not be executed.
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub llm_backend: String,
    pub llm_model: String,
    pub database_path: String,
    pub database_available: bool,
    pub read_only: bool,
}

// Natural language query: translate, execute, return rows as JSON
pub async fn nl_query(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<NlQueryRequest>,
) -> Result<Json<NlQueryResponse>, (StatusCode, String)> {
    debug!("NL-query: {}", payload.question);
    let start_time = Instant::now();

    let answer = app_state.text2sql.ask(&payload.question).await.map_err(|e| {
        error!("Translation failed: {}", e);
        (StatusCode::BAD_GATEWAY, format!("Translation unavailable: {}", e))
    })?;

    let (columns, rows, error) = match answer.outcome {
        Ok(result_set) => (result_set.columns, result_set.rows, None),
        Err(e) => (Vec::new(), Vec::new(), Some(e.to_string())),
    };

    let execution_time_ms = start_time.elapsed().as_millis() as u64;
    info!(
        "NL-query answered with {} rows in {}ms",
        rows.len(),
        execution_time_ms
    );

    Ok(Json(NlQueryResponse {
        question: answer.question,
        sql: answer.sql,
        columns,
        row_count: rows.len(),
        rows,
        execution_time_ms,
        error,
    }))
}

// System status
pub async fn system_status(State(state): State<Arc<AppState>>) -> Json<SystemStatus> {
    let now = chrono::Utc::now();
    let uptime = now.signed_duration_since(state.startup_time).num_seconds();
    let executor = state.text2sql.executor();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        llm_backend: state.config.llm.backend.clone(),
        llm_model: state.config.llm.model.clone(),
        database_path: executor.path().display().to_string(),
        database_available: executor.path().is_file(),
        read_only: executor.is_read_only(),
    })
}
