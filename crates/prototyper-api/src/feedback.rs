//! Handlers for `/feedback` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/feedback` | Optional `page_id`, `round`, `status`, `element_id`, `page_level` |
//! | `POST` | `/feedback` | Body: [`NewFeedback`]; returns 201 + `{"id"}`; `round` at most one past the newest |
//! | `POST` | `/feedback/{id}/status` | Body: `{"status":"resolved"}`; returns 204 |
//! | `GET`  | `/feedback/count` | `?page_id&element_id` required |
//! | `GET`  | `/feedback/export` | Every entry in export order |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use prototyper_core::{
  feedback::{FeedbackEntry, FeedbackId, FeedbackStatus, NewFeedback},
  store::{ElementFilter, FeedbackQuery, FeedbackStore},
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::ApiError;

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub page_id:    Option<String>,
  pub round:      Option<u32>,
  pub status:     Option<FeedbackStatus>,
  /// Restrict to comments on this element.
  pub element_id: Option<String>,
  /// Restrict to page-level comments. Cannot be combined with `element_id`.
  #[serde(default)]
  pub page_level: bool,
}

impl ListParams {
  fn into_query(self) -> Result<FeedbackQuery, ApiError> {
    let element = match (self.element_id, self.page_level) {
      (Some(_), true) => {
        return Err(ApiError::BadRequest(
          "element_id and page_level are mutually exclusive".into(),
        ));
      }
      (Some(id), false) => ElementFilter::Element(id),
      (None, true) => ElementFilter::PageLevel,
      (None, false) => ElementFilter::Any,
    };
    Ok(FeedbackQuery {
      page_id: self.page_id,
      round: self.round,
      status: self.status,
      element,
    })
  }
}

/// `GET /feedback[?page_id=..][&round=..][&status=..][&element_id=..|&page_level=true]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<FeedbackEntry>>, ApiError>
where
  S: FeedbackStore,
{
  let query = params.into_query()?;
  let entries = store.query(&query).await.map_err(ApiError::store)?;
  Ok(Json(entries))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /feedback`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewFeedback>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FeedbackStore,
{
  let input = body.validate()?;
  let max_round = store.max_round().await.map_err(ApiError::store)?;
  input.check_round(max_round)?;
  let id = store.add(input).await.map_err(ApiError::store)?;
  debug!(%id, "feedback created via api");
  Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: FeedbackStatus,
}

/// `POST /feedback/{id}/status`: unknown ids are accepted and ignored.
pub async fn set_status<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Json(body): Json<StatusBody>,
) -> Result<StatusCode, ApiError>
where
  S: FeedbackStore,
{
  store
    .set_status(&FeedbackId::new(id), body.status)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Count ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CountParams {
  pub page_id:    String,
  pub element_id: String,
}

/// `GET /feedback/count?page_id=..&element_id=..`
pub async fn count<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<CountParams>,
) -> Result<Json<serde_json::Value>, ApiError>
where
  S: FeedbackStore,
{
  let count = store
    .count_for_element(&params.page_id, &params.element_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "count": count })))
}

// ─── Export ──────────────────────────────────────────────────────────────────

/// `GET /feedback/export`
pub async fn export<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<FeedbackEntry>>, ApiError>
where
  S: FeedbackStore,
{
  let entries = store.export_all().await.map_err(ApiError::store)?;
  Ok(Json(entries))
}
