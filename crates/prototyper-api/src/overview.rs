//! Aggregate endpoints: `/rounds/max` and `/summary`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use prototyper_core::{
  store::{FeedbackQuery, FeedbackStore},
  summary::FeedbackSummary,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;

/// `GET /rounds/max`
pub async fn max_round<S>(State(store): State<Arc<S>>) -> Result<Json<serde_json::Value>, ApiError>
where
  S: FeedbackStore,
{
  let max = store.max_round().await.map_err(ApiError::store)?;
  Ok(Json(json!({ "max_round": max })))
}

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
  pub round: Option<u32>,
}

/// `GET /summary[?round=n]`: totals across every entry, or one round.
pub async fn summary<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<SummaryParams>,
) -> Result<Json<FeedbackSummary>, ApiError>
where
  S: FeedbackStore,
{
  let entries = match params.round {
    Some(round) => {
      let query = FeedbackQuery::all().round(round);
      store.query(&query).await
    }
    None => store.export_all().await,
  }
  .map_err(ApiError::store)?;
  Ok(Json(FeedbackSummary::from_entries(&entries)))
}
