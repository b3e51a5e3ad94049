//! Snapshot of every sheet row, shared by all reads until it expires or a
//! write drops it.
//!
//! Every write bumps a generation counter. A fetch remembers the generation
//! it started in and its rows are only kept if no write happened meanwhile,
//! so a read that raced a write never re-caches rows from before it.

use std::{sync::Arc, time::Duration};

use prototyper_core::feedback::FeedbackEntry;
use tokio::{sync::RwLock, time::Instant};

struct Snapshot {
  rows:       Arc<Vec<FeedbackEntry>>,
  fetched_at: Instant,
}

#[derive(Default)]
struct Slot {
  generation: u64,
  snapshot:   Option<Snapshot>,
}

pub struct RowCache {
  ttl:  Duration,
  slot: RwLock<Slot>,
}

impl RowCache {
  /// A zero `ttl` disables caching.
  pub fn new(ttl: Duration) -> Self { Self { ttl, slot: RwLock::new(Slot::default()) } }

  pub async fn get(&self) -> Option<Arc<Vec<FeedbackEntry>>> {
    let slot = self.slot.read().await;
    slot
      .snapshot
      .as_ref()
      .filter(|s| s.fetched_at.elapsed() < self.ttl)
      .map(|s| Arc::clone(&s.rows))
  }

  /// Current generation; take it before fetching and hand it to [`put`](Self::put).
  pub async fn generation(&self) -> u64 { self.slot.read().await.generation }

  /// Store `rows` fetched during `generation`. Rows from an older generation
  /// are returned to the caller but not cached.
  pub async fn put(&self, generation: u64, rows: Vec<FeedbackEntry>) -> Arc<Vec<FeedbackEntry>> {
    let rows = Arc::new(rows);
    let mut slot = self.slot.write().await;
    if slot.generation == generation {
      slot.snapshot = Some(Snapshot {
        rows:       Arc::clone(&rows),
        fetched_at: Instant::now(),
      });
    }
    rows
  }

  pub async fn invalidate(&self) {
    let mut slot = self.slot.write().await;
    slot.generation = slot.generation.wrapping_add(1);
    slot.snapshot = None;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn put_then_get_until_invalidated() {
    let cache = RowCache::new(Duration::from_secs(60));
    assert!(cache.get().await.is_none());
    let generation = cache.generation().await;
    cache.put(generation, vec![]).await;
    assert!(cache.get().await.is_some());
    cache.invalidate().await;
    assert!(cache.get().await.is_none());
  }

  #[tokio::test]
  async fn rows_fetched_before_a_write_are_not_kept() {
    let cache = RowCache::new(Duration::from_secs(60));
    let before = cache.generation().await;
    cache.invalidate().await;

    let rows = cache.put(before, vec![]).await;
    assert!(rows.is_empty());
    assert!(cache.get().await.is_none());

    let after = cache.generation().await;
    cache.put(after, vec![]).await;
    assert!(cache.get().await.is_some());
  }

  #[tokio::test]
  async fn zero_ttl_never_hits() {
    let cache = RowCache::new(Duration::ZERO);
    cache.put(0, vec![]).await;
    assert!(cache.get().await.is_none());
  }

  #[tokio::test(start_paused = true)]
  async fn snapshot_expires_after_ttl() {
    let cache = RowCache::new(Duration::from_secs(10));
    cache.put(0, vec![]).await;
    tokio::time::advance(Duration::from_secs(11)).await;
    assert!(cache.get().await.is_none());
  }
}
