use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use minijinja::Value;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

use crate::web::state::AppState;
use crate::web::templates::render_template;

#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub question: String,
}

// Main UI entry point
pub async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let context = HashMap::from([
        ("question", Value::from("")),
        ("submitted", Value::from(false)),
    ]);

    Html(render_template(&state.template_env, "index.html", context))
}

// Form submission: one heading per result row
pub async fn ask_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AskForm>,
) -> impl IntoResponse {
    let mut context = HashMap::from([
        ("question", Value::from(form.question.as_str())),
        ("submitted", Value::from(true)),
    ]);

    match state.text2sql.ask(&form.question).await {
        Ok(answer) => {
            context.insert("sql", Value::from(answer.sql));
            match answer.outcome {
                Ok(result_set) => {
                    let rows: Vec<String> = result_set.rows.iter().map(|r| r.to_string()).collect();
                    context.insert("rows", Value::from(rows));
                }
                Err(e) => {
                    context.insert("error", Value::from(e.to_string()));
                }
            }
        }
        Err(e) => {
            error!("Translation failed: {}", e);
            context.insert(
                "error",
                Value::from(format!("Translation unavailable: {}", e)),
            );
        }
    }

    Html(render_template(&state.template_env, "index.html", context))
}

pub async fn not_found_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let context = HashMap::from([
        ("title", Value::from("Not Found")),
        ("message", Value::from("The page you requested does not exist.")),
    ]);

    (
        StatusCode::NOT_FOUND,
        Html(render_template(&state.template_env, "error.html", context)),
    )
}
