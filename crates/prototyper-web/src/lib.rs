//! HTML dashboard for the prototyper.
//!
//! Exposes an axum [`Router`] with the mock dashboard pages, their feedback
//! widgets, the admin overview and the exports, backed by any
//! [`FeedbackStore`]. The JSON API from `prototyper-api` is nested under
//! `/api`.

pub mod chart;
pub mod error;
pub mod export;
pub mod forms;
pub mod html;
pub mod pages;
pub mod theme;

pub use error::{Error, Result};

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use prototyper_core::{dataset::Dataset, store::FeedbackStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use pages::{exec_summary, feedback_overview, market_uptake, regional_view};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PROTOTYPER_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:      String,
  #[serde(default = "default_port")]
  pub port:      u16,
  #[serde(default = "default_data_path")]
  pub data_path: PathBuf,
  #[serde(default)]
  pub backend:   BackendConfig,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8501 }

fn default_data_path() -> PathBuf { PathBuf::from("data/mock-data.json") }

/// Which [`FeedbackStore`] the server runs on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
  Sqlite {
    #[serde(default = "default_db_path")]
    path: PathBuf,
  },
  Sheet {
    endpoint:       String,
    #[serde(default = "default_cache_ttl")]
    cache_ttl_secs: u64,
  },
}

fn default_db_path() -> PathBuf { PathBuf::from("feedback.db") }

fn default_cache_ttl() -> u64 { 10 }

impl Default for BackendConfig {
  fn default() -> Self { Self::Sqlite { path: default_db_path() } }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: FeedbackStore> {
  pub store:   Arc<S>,
  pub dataset: Arc<Dataset>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: pages, forms, exports and `/api`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: FeedbackStore + Clone + 'static,
{
  let api = prototyper_api::api_router(state.store.clone());

  Router::new()
    .route("/", get(exec_summary::handler::<S>))
    .route("/exec", get(exec_summary::handler::<S>))
    .route("/uptake", get(market_uptake::handler::<S>))
    .route("/regional", get(regional_view::handler::<S>))
    .route("/feedback", get(feedback_overview::handler::<S>).post(forms::submit::<S>))
    .route("/feedback/{id}/status", post(forms::set_status::<S>))
    .route("/feedback/export.csv", get(export::csv::<S>))
    .route("/feedback/export.xlsx", get(export::xlsx::<S>))
    .with_state(state)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use prototyper_core::{
    feedback::{FeedbackStatus, NewFeedback},
    store::FeedbackQuery,
  };
  use prototyper_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  const DATA: &str = include_str!("../../../data/mock-data.json");

  async fn state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState {
      store:   Arc::new(store),
      dataset: Arc::new(Dataset::from_json(DATA).unwrap()),
    }
  }

  async fn get_page(state: &AppState<SqliteStore>, uri: &str) -> (StatusCode, String) {
    let resp = router(state.clone())
      .oneshot(Request::get(uri).body(Body::empty()).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    (status, body_text(resp).await)
  }

  async fn post_form(state: &AppState<SqliteStore>, uri: &str, form: &str) -> Response {
    router(state.clone())
      .oneshot(
        Request::post(uri)
          .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
          .body(Body::from(form.to_owned()))
          .unwrap(),
      )
      .await
      .unwrap()
  }

  async fn body_text(resp: Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
  }

  fn location(resp: &Response) -> &str {
    resp.headers()[header::LOCATION].to_str().unwrap()
  }

  #[test]
  fn config_defaults_to_local_sqlite() {
    let cfg: ServerConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg.port, 8501);
    assert_eq!(cfg.backend, BackendConfig::Sqlite { path: "feedback.db".into() });

    let cfg: ServerConfig =
      serde_json::from_str(r#"{"backend": {"kind": "sheet", "endpoint": "https://x/exec"}}"#).unwrap();
    assert_eq!(cfg.backend, BackendConfig::Sheet {
      endpoint:       "https://x/exec".into(),
      cache_ttl_secs: 10,
    });
  }

  #[tokio::test]
  async fn dashboard_pages_render() {
    let state = state().await;
    for (uri, needle) in [
      ("/", "Executive Summary"),
      ("/exec?round=2", "Net Revenue kum."),
      ("/uptake", "Repeat-Rate"),
      ("/regional", "TRx nach KV-Region"),
    ] {
      let (status, body) = get_page(&state, uri).await;
      assert_eq!(status, StatusCode::OK, "{uri}");
      assert!(body.contains(needle), "{uri} lacks {needle}");
      assert!(body.contains("<svg"), "{uri} has no chart");
      assert!(body.contains("Noch kein Feedback abgegeben."));
    }
  }

  #[tokio::test]
  async fn empty_overview_shows_placeholder() {
    let (status, body) = get_page(&state().await, "/feedback").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Noch kein Feedback vorhanden."));
  }

  #[tokio::test]
  async fn blank_author_never_reaches_the_store() {
    let state = state().await;
    let resp = post_form(
      &state,
      "/feedback",
      "page_id=exec-summary&element_id=&round=1&author=+&comment=Hallo&rating=3&return_to=%2Fexec%3Fround%3D1",
    )
    .await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/exec?round=1&error=missing#feedback");
    assert!(state.store.export_all().await.unwrap().is_empty());

    let (_, body) = get_page(&state, "/exec?round=1&error=missing").await;
    assert!(body.contains("Bitte Name und Kommentar ausfüllen."));
  }

  #[tokio::test]
  async fn element_comment_is_stored_and_shown() {
    let state = state().await;
    let resp = post_form(
      &state,
      "/feedback",
      "page_id=exec-summary&element_id=trx-chart&round=2&author=Max&comment=Plan+fehlt&rating=4&return_to=%2Fexec%3Fround%3D2",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/exec?round=2#feedback");

    let stored = state.store.export_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].element_id.as_deref(), Some("trx-chart"));
    assert_eq!(stored[0].round, 2);

    let (_, body) = get_page(&state, "/exec?round=2").await;
    assert!(body.contains("Plan fehlt"));
    assert!(body.contains("💬 1"));
    assert!(body.contains("Runde 2 (1 Kommentare)"));
    assert!(body.contains("Runde 3 ← neu"));
  }

  #[tokio::test]
  async fn rounds_beyond_the_next_one_are_refused() {
    let state = state().await;
    for round in ["3", "2000000", "4294967295"] {
      let form = format!(
        "page_id=regional-view&round={round}&author=Eva&comment=Hallo&rating=3&return_to=%2Fregional"
      );
      let resp = post_form(&state, "/feedback", &form).await;
      assert_eq!(resp.status(), StatusCode::SEE_OTHER);
      assert_eq!(location(&resp), "/regional?error=round#feedback");
    }
    assert!(state.store.export_all().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn foreign_huge_round_keeps_pages_small() {
    let state = state().await;
    state
      .store
      .add(NewFeedback::new("regional-view", u32::MAX, "Eva", "Sortierung?", 2))
      .await
      .unwrap();

    let (status, body) = get_page(&state, "/regional").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.len() < 1_000_000, "{} bytes", body.len());
    assert!(body.contains("Runde 1000 ← neu"));
  }

  #[tokio::test]
  async fn status_toggle_redirects_back() {
    let state = state().await;
    let id = state
      .store
      .add(NewFeedback::new("regional-view", 1, "Eva", "Sortierung?", 2))
      .await
      .unwrap();

    let resp = post_form(
      &state,
      &format!("/feedback/{id}/status"),
      "status=resolved&return_to=%2Ffeedback%3Ff_status%3Dopen",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/feedback?f_status=open");

    let resolved = state
      .store
      .query(&FeedbackQuery::all().status(FeedbackStatus::Resolved))
      .await
      .unwrap();
    assert_eq!(resolved.len(), 1);

    let resp = post_form(&state, &format!("/feedback/{id}/status"), "status=done").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn overview_filters_and_exports() {
    let state = state().await;
    for (page, element, round) in [
      ("exec-summary", None, 1),
      ("exec-summary", Some("trx-chart"), 1),
      ("market-uptake", None, 2),
    ] {
      let mut input = NewFeedback::new(page, round, "Max", format!("zu {page}, ja"), 4);
      input.element_id = element.map(str::to_owned);
      state.store.add(input).await.unwrap();
    }

    let (status, body) = get_page(&state, "/feedback?f_page=exec-summary&f_element=__page").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("1 Einträge"));

    let resp = router(state.clone())
      .oneshot(Request::get("/feedback/export.csv?f_round=1").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      resp.headers()[header::CONTENT_DISPOSITION],
      "attachment; filename=\"feedback.csv\""
    );
    let csv = body_text(resp).await;
    assert!(csv.starts_with("id,page_id,element_id,round,author,comment,rating,status,created_at,source\r\n"));
    assert_eq!(csv.matches("\r\n").count(), 3);
    assert!(csv.contains("\"zu exec-summary, ja\""));

    let resp = router(state.clone())
      .oneshot(Request::get("/feedback/export.xlsx").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"PK"));
  }

  #[tokio::test]
  async fn api_is_nested() {
    let (status, body) = get_page(&state().await, "/api/rounds/max").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"max_round":1}"#);
  }
}
