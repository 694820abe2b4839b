use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{components::toasts::Notification, query_cache::QueryKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display, Deserialize)]
pub enum Action {
  CloseAddItem,
  Error(String),
  ItemCreateFailed { session: u64 },
  ItemCreated { session: u64 },
  Notify(Notification),
  OpenAddItem,
  QueryInvalidated(QueryKey),
  Quit,
  Refresh,
  Render,
  Resize(u16, u16),
  Resume,
  SelectNext,
  SelectPrevious,
  Suspend,
  Tick,
}
