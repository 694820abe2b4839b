use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};
use strum::Display;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info};

use crate::action::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum QueryKey {
  Items,
}

#[derive(Debug, Clone)]
struct QueryEntry<T> {
  data: Option<T>,
  stale: bool,
  invalidations: usize,
  generation: u64,
  in_flight: usize,
}

impl<T> Default for QueryEntry<T> {
  fn default() -> Self {
    QueryEntry { data: None, stale: true, invalidations: 0, generation: 0, in_flight: 0 }
  }
}

/// Cached query results shared between components.
///
/// Invalidating a key marks its data stale and broadcasts
/// `Action::QueryInvalidated` so whichever component owns the query refetches.
/// Stale data is still served until the refetch lands.
///
/// Every fetch and every invalidation bumps the key's generation. A fetch only
/// writes its result if no newer fetch or invalidation happened since it
/// started, so a slow response can never overwrite fresher data.
#[derive(Clone)]
pub struct QueryCache<T: Clone + Send + 'static> {
  entries: Arc<Mutex<HashMap<QueryKey, QueryEntry<T>>>>,
  action_tx: Arc<Mutex<Option<UnboundedSender<Action>>>>,
}

impl<T: Clone + Send + 'static> Default for QueryCache<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Clone + Send + 'static> QueryCache<T> {
  pub fn new() -> Self {
    QueryCache { entries: Arc::new(Mutex::new(HashMap::new())), action_tx: Arc::new(Mutex::new(None)) }
  }

  pub fn register_action_handler(&self, tx: UnboundedSender<Action>) {
    *self.action_tx.lock().unwrap() = Some(tx);
  }

  pub fn get(&self, key: QueryKey) -> Option<T> {
    self.entries.lock().unwrap().get(&key).and_then(|entry| entry.data.clone())
  }

  /// Registers a fetch for `key` and returns the generation to complete it with.
  pub fn begin_fetch(&self, key: QueryKey) -> u64 {
    let mut entries = self.entries.lock().unwrap();
    let entry = entries.entry(key).or_default();
    entry.generation += 1;
    entry.in_flight += 1;
    entry.generation
  }

  /// Stores `data` if `generation` is still the latest. Returns whether it was stored.
  pub fn complete_fetch(&self, key: QueryKey, generation: u64, data: T) -> bool {
    let mut entries = self.entries.lock().unwrap();
    let entry = entries.entry(key).or_default();
    entry.in_flight = entry.in_flight.saturating_sub(1);
    if generation != entry.generation {
      info!("QueryCache: dropping outdated '{}' result (generation {} < {})", key, generation, entry.generation);
      return false;
    }
    entry.data = Some(data);
    entry.stale = false;
    true
  }

  pub fn fail_fetch(&self, key: QueryKey) {
    let mut entries = self.entries.lock().unwrap();
    let entry = entries.entry(key).or_default();
    entry.in_flight = entry.in_flight.saturating_sub(1);
  }

  pub fn is_fetching(&self, key: QueryKey) -> bool {
    self.entries.lock().unwrap().get(&key).is_some_and(|entry| entry.in_flight > 0)
  }

  /// Unknown keys count as stale.
  pub fn is_stale(&self, key: QueryKey) -> bool {
    self.entries.lock().unwrap().get(&key).is_none_or(|entry| entry.stale)
  }

  pub fn invalidate(&self, key: QueryKey) {
    {
      let mut entries = self.entries.lock().unwrap();
      let entry = entries.entry(key).or_default();
      entry.stale = true;
      entry.invalidations += 1;
      entry.generation += 1;
    }
    info!("QueryCache: invalidated '{}'", key);

    if let Some(tx) = self.action_tx.lock().unwrap().as_ref() {
      if let Err(err) = tx.send(Action::QueryInvalidated(key)) {
        error!("Failed to broadcast invalidation of '{}': {}", key, err);
      }
    }
  }

  pub fn invalidation_count(&self, key: QueryKey) -> usize {
    self.entries.lock().unwrap().get(&key).map_or(0, |entry| entry.invalidations)
  }
}
