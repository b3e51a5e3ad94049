//! JSON REST API for the dashboard prototyper.
//!
//! The same operations the HTML forms use, as JSON over any
//! [`prototyper_core::store::FeedbackStore`].
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", prototyper_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod feedback;
pub mod overview;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use prototyper_core::store::FeedbackStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: FeedbackStore + 'static,
{
  Router::new()
    // Feedback
    .route("/feedback", get(feedback::list::<S>).post(feedback::create::<S>))
    .route("/feedback/count", get(feedback::count::<S>))
    .route("/feedback/export", get(feedback::export::<S>))
    .route("/feedback/{id}/status", post(feedback::set_status::<S>))
    // Aggregates
    .route("/rounds/max", get(overview::max_round::<S>))
    .route("/summary", get(overview::summary::<S>))
    .with_state(store)
}
