use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::output::{HEADER, rows};
use crate::pipeline::{Label, LabelContext, SharedAnnotator, label_text};
use crate::requirement::{Requirement, parse_requirement_line};

/// Longest text or line accepted by the labeling endpoints, in bytes.
pub const MAX_TEXT_LEN: usize = 10_000;

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<LabelContext>,
    pub annotator: SharedAnnotator,
}

#[derive(Deserialize)]
pub struct LabelQuery {
    pub text: String,
}

#[derive(Deserialize)]
pub struct RequirementQuery {
    pub line: String,
}

#[derive(Serialize)]
pub struct LabelResponse {
    matches: Vec<Label>,
}

#[derive(Serialize)]
pub struct RequirementResponse {
    requirement: Requirement,
    header: [&'static str; 6],
    rows: Vec<[String; 6]>,
}

#[derive(Serialize)]
pub struct CategoryInfo {
    name: String,
    rank: Option<usize>,
    pos: Option<Vec<&'static str>>,
    tags: Option<Vec<String>>,
    words: usize,
    phrases: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/categories", get(categories))
        .route("/v1/label", get(label))
        .route("/v1/requirement", get(requirement))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn categories(State(state): State<AppState>) -> Json<serde_json::Value> {
    let ctx = &state.ctx;
    let mut names: Vec<&str> = ctx
        .rules
        .categories()
        .map(|(name, _)| name)
        .chain(ctx.dictionary.categories().keys().map(String::as_str))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    ctx.rules.sort_by_priority(&mut names);

    let items: Vec<CategoryInfo> = names
        .into_iter()
        .map(|name| {
            let rule = ctx.rules.rule(name);
            let stats = ctx.dictionary.categories().get(name);
            CategoryInfo {
                name: name.to_string(),
                rank: ctx.rules.rank(name),
                pos: rule.map(|r| r.pos.iter().map(|p| p.as_str()).collect()),
                tags: rule.map(|r| r.tags.iter().cloned().collect()),
                words: stats.map_or(0, |s| s.words),
                phrases: stats.map_or(0, |s| s.phrases),
            }
        })
        .collect();
    Json(json!({ "categories": items }))
}

async fn label(
    State(state): State<AppState>,
    Query(params): Query<LabelQuery>,
) -> Result<Json<LabelResponse>, ApiError> {
    check_len("text", &params.text)?;
    let matches = label_text(&state.ctx, state.annotator.as_ref(), &params.text)
        .map_err(ApiError::internal)?;
    Ok(Json(LabelResponse { matches }))
}

async fn requirement(
    State(state): State<AppState>,
    Query(params): Query<RequirementQuery>,
) -> Result<Json<RequirementResponse>, ApiError> {
    check_len("line", &params.line)?;
    let req = parse_requirement_line(&params.line)
        .map_err(|e| ApiError::bad_request(format!("invalid requirement line: {e}")))?;
    let labels = label_text(&state.ctx, state.annotator.as_ref(), &req.text)
        .map_err(ApiError::internal)?;
    let rows = rows(&req, &labels)
        .into_iter()
        .map(|row| row.map(str::to_string))
        .collect();
    Ok(Json(RequirementResponse {
        requirement: req,
        header: HEADER,
        rows,
    }))
}

fn check_len(field: &str, value: &str) -> Result<(), ApiError> {
    if value.len() > MAX_TEXT_LEN {
        return Err(ApiError::bad_request(format!(
            "{field} must be at most {MAX_TEXT_LEN} bytes"
        )));
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }

    fn internal(err: anyhow::Error) -> Self {
        error!("labeling failed: {err:#}");
        ApiError::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Internal => {
                let body = Json(json!({ "error": "internal server error" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
