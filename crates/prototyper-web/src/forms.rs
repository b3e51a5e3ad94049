//! Form POST handlers. Both answer with a redirect back to the page the form
//! sat on, which then re-renders from fresh store reads.

use axum::{
  Form,
  extract::{Path, State},
  response::Redirect,
};
use prototyper_core::{
  Error as CoreError,
  feedback::{FeedbackId, FeedbackStatus, NewFeedback},
  store::FeedbackStore,
};
use serde::Deserialize;

use crate::{AppState, Error, Result};

/// Fields of the feedback form. Numbers arrive as text so a tampered value
/// becomes a notice instead of a rejected request.
#[derive(Debug, Deserialize)]
pub struct FeedbackForm {
  pub page_id:    String,
  #[serde(default)]
  pub element_id: Option<String>,
  pub round:      String,
  #[serde(default)]
  pub author:     String,
  #[serde(default)]
  pub comment:    String,
  pub rating:     String,
  pub return_to:  Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
  pub status:    String,
  pub return_to: Option<String>,
}

// ─── Redirect targets ────────────────────────────────────────────────────────

/// A local path to send the user back to; anything else becomes `/`.
pub fn safe_return(raw: Option<&str>) -> String {
  let target = raw.map(str::trim).unwrap_or_default();
  let target = target.split('#').next().unwrap_or_default();
  if target.starts_with('/') && !target.starts_with("//") && !target.contains('\\') {
    target.to_owned()
  } else {
    "/".to_owned()
  }
}

/// `target` without any `error=` query pairs.
pub fn strip_notice(target: &str) -> String {
  let Some((path, query)) = target.split_once('?') else {
    return target.to_owned();
  };
  let kept: Vec<&str> = query
    .split('&')
    .filter(|pair| !pair.is_empty() && !pair.starts_with("error="))
    .collect();
  if kept.is_empty() {
    path.to_owned()
  } else {
    format!("{path}?{}", kept.join("&"))
  }
}

/// `target` carrying the notice `code`.
pub fn with_notice(target: &str, code: &str) -> String {
  let clean = strip_notice(target);
  let sep = if clean.contains('?') { '&' } else { '?' };
  format!("{clean}{sep}error={code}")
}

/// Notice code for a rejected submission.
fn notice_code(err: &CoreError) -> &'static str {
  match err {
    CoreError::EmptyField("author" | "comment") => "missing",
    CoreError::InvalidRating(_) => "rating",
    CoreError::InvalidRound | CoreError::RoundAhead { .. } => "round",
    _ => "invalid",
  }
}

impl FeedbackForm {
  /// The validated payload, or the notice code to redirect with. `max_round`
  /// is the store's newest round.
  fn into_new_feedback(self, max_round: u32) -> std::result::Result<NewFeedback, &'static str> {
    let round: u32 = self.round.trim().parse().map_err(|_| "round")?;
    let rating: u8 = self.rating.trim().parse().map_err(|_| "rating")?;
    let mut input = NewFeedback::new(self.page_id, round, self.author, self.comment, rating);
    input.element_id = self.element_id;
    let input = input.validate().map_err(|e| notice_code(&e))?;
    input.check_round(max_round).map_err(|e| notice_code(&e))?;
    Ok(input)
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `POST /feedback`
pub async fn submit<S>(State(state): State<AppState<S>>, Form(form): Form<FeedbackForm>) -> Result<Redirect>
where
  S: FeedbackStore,
{
  let back = strip_notice(&safe_return(form.return_to.as_deref()));
  let max_round = state.store.max_round().await.map_err(Error::store)?;
  let input = match form.into_new_feedback(max_round) {
    Ok(input) => input,
    Err(code) => {
      tracing::debug!(code, "rejected feedback form");
      return Ok(Redirect::to(&format!("{}#feedback", with_notice(&back, code))));
    }
  };

  let page_id = input.page_id.clone();
  let id = state.store.add(input).await.map_err(Error::store)?;
  tracing::info!(%id, page_id = %page_id, "feedback added");
  Ok(Redirect::to(&format!("{back}#feedback")))
}

/// `POST /feedback/{id}/status`
pub async fn set_status<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
  Form(form): Form<StatusForm>,
) -> Result<Redirect>
where
  S: FeedbackStore,
{
  let status: FeedbackStatus = form
    .status
    .parse()
    .map_err(|e: CoreError| Error::BadRequest(e.to_string()))?;
  let id = FeedbackId::new(id);
  state
    .store
    .set_status(&id, status)
    .await
    .map_err(Error::store)?;
  tracing::info!(%id, %status, "feedback status changed");
  Ok(Redirect::to(&safe_return(form.return_to.as_deref())))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn form(author: &str, round: &str, rating: &str) -> FeedbackForm {
    FeedbackForm {
      page_id:    "exec-summary".into(),
      element_id: Some(String::new()),
      round:      round.into(),
      author:     author.into(),
      comment:    "Achse fehlt".into(),
      rating:     rating.into(),
      return_to:  None,
    }
  }

  #[test]
  fn return_targets_stay_local() {
    assert_eq!(safe_return(Some("/exec?round=2")), "/exec?round=2");
    assert_eq!(safe_return(Some("/exec?round=2#feedback")), "/exec?round=2");
    assert_eq!(safe_return(Some("https://example.com/")), "/");
    assert_eq!(safe_return(Some("//example.com")), "/");
    assert_eq!(safe_return(None), "/");
  }

  #[test]
  fn notices_replace_each_other() {
    assert_eq!(with_notice("/exec", "missing"), "/exec?error=missing");
    assert_eq!(with_notice("/exec?round=2&error=rating", "missing"), "/exec?round=2&error=missing");
    assert_eq!(strip_notice("/exec?error=rating"), "/exec");
  }

  #[test]
  fn form_errors_map_to_notice_codes() {
    assert_eq!(form(" ", "1", "3").into_new_feedback(1).unwrap_err(), "missing");
    assert_eq!(form("Max", "1", "6").into_new_feedback(1).unwrap_err(), "rating");
    assert_eq!(form("Max", "1", "drei").into_new_feedback(1).unwrap_err(), "rating");
    assert_eq!(form("Max", "0", "3").into_new_feedback(1).unwrap_err(), "round");
    assert_eq!(form("Max", "x", "3").into_new_feedback(1).unwrap_err(), "round");
    assert_eq!(form("Max", "4294967295", "3").into_new_feedback(1).unwrap_err(), "round");
    assert_eq!(form("Max", "3", "3").into_new_feedback(1).unwrap_err(), "round");
    assert!(form("Max", "3", "3").into_new_feedback(2).is_ok());
  }

  #[test]
  fn blank_element_means_page_level() {
    let input = form(" Max ", "2", "4").into_new_feedback(1).unwrap();
    assert_eq!(input.author, "Max");
    assert_eq!(input.element_id, None);
    assert_eq!(input.round, 2);
  }
}
