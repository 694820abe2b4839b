use std::{
  sync::{Arc, Mutex},
  time::SystemTime,
};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use tokio::{sync::mpsc::UnboundedSender, task::spawn};
use tracing::{error, info};

use crate::{
  action::Action,
  api::{
    items_service::ItemsService,
    types::{ItemPublic, ItemsPublic},
  },
  components::{Component, toasts::Notification},
  query_cache::{QueryCache, QueryKey},
  tui::Frame,
  utils::format_time_elapsed,
};

// Shared state that can be accessed from async blocks
#[derive(Clone)]
struct SharedState {
  loading: Arc<Mutex<Option<SystemTime>>>,
  selected_index: Arc<Mutex<usize>>,
  action_tx: Arc<Mutex<Option<UnboundedSender<Action>>>>,
}

impl SharedState {
  fn new() -> Self {
    SharedState {
      loading: Arc::new(Mutex::new(None)),
      selected_index: Arc::new(Mutex::new(0)),
      action_tx: Arc::new(Mutex::new(None)),
    }
  }

  fn set_loading(&self, loading: Option<SystemTime>) {
    *self.loading.lock().unwrap() = loading;
  }

  fn send(&self, action: Action) {
    if let Some(tx) = self.action_tx.lock().unwrap().as_ref() {
      if let Err(err) = tx.send(action) {
        error!("Failed to send action: {}", err);
      }
    }
  }
}

/// The list of items the current user can see.
pub struct ItemsList {
  service: Arc<dyn ItemsService>,
  cache: QueryCache<ItemsPublic>,
  page_size: usize,
  shared_state: SharedState,
  list_state: ListState,
}

impl ItemsList {
  pub fn new(service: Arc<dyn ItemsService>, cache: QueryCache<ItemsPublic>, page_size: usize) -> Self {
    ItemsList { service, cache, page_size, shared_state: SharedState::new(), list_state: ListState::default() }
  }

  fn items(&self) -> Vec<ItemPublic> {
    self.cache.get(QueryKey::Items).map(|page| page.data).unwrap_or_default()
  }

  pub fn is_loading(&self) -> bool {
    self.shared_state.loading.lock().unwrap().is_some()
  }

  pub fn selected_index(&self) -> usize {
    *self.shared_state.selected_index.lock().unwrap()
  }

  pub fn load_items(&self) -> impl FnOnce() + use<> {
    let state = self.shared_state.clone();
    let service = self.service.clone();
    let cache = self.cache.clone();
    let limit = self.page_size;

    move || {
      let generation = cache.begin_fetch(QueryKey::Items);
      state.set_loading(Some(SystemTime::now()));
      state.send(Action::Render);

      let future = async move {
        match service.read_items(0, limit).await {
          Ok(page) => {
            info!("ItemsList: loaded {} of {} items", page.data.len(), page.count);
            let len = page.data.len();
            if cache.complete_fetch(QueryKey::Items, generation, page) {
              let mut selected = state.selected_index.lock().unwrap();
              if *selected >= len {
                *selected = len.saturating_sub(1);
              }
            }
          },
          Err(err) => {
            error!("ItemsList: failed to load items: {}", err);
            cache.fail_fetch(QueryKey::Items);
            state.send(Action::Notify(Notification::error("Something went wrong.", &err.detail_message())));
          },
        }
        if !cache.is_fetching(QueryKey::Items) {
          state.set_loading(None);
        }
        state.send(Action::Render);
      };

      spawn(future);
    }
  }

  fn select_next(&mut self) {
    let len = self.items().len();
    if len == 0 {
      return;
    }
    let mut selected = self.shared_state.selected_index.lock().unwrap();
    *selected = if *selected + 1 >= len { 0 } else { *selected + 1 };
  }

  fn select_previous(&mut self) {
    let len = self.items().len();
    if len == 0 {
      return;
    }
    let mut selected = self.shared_state.selected_index.lock().unwrap();
    *selected = if *selected == 0 || *selected >= len { len - 1 } else { *selected - 1 };
  }

  fn title(&self) -> String {
    if let Some(started) = *self.shared_state.loading.lock().unwrap() {
      return format!("Loading Items...({})", format_time_elapsed(started));
    }
    match self.cache.get(QueryKey::Items) {
      Some(page) if self.cache.is_stale(QueryKey::Items) => format!("Items ({}, stale)", page.count),
      Some(page) => format!("Items ({})", page.count),
      None => String::from("Items"),
    }
  }

  fn render_item(item: &ItemPublic) -> ListItem<'static> {
    let mut spans = vec![Span::styled(item.title.clone(), Style::default().add_modifier(Modifier::BOLD))];
    if let Some(description) = &item.description {
      spans.push(Span::raw("  "));
      spans.push(Span::styled(description.clone(), Style::default().fg(Color::Gray)));
    }
    ListItem::new(Line::from(spans))
  }

  pub fn instructions(&self) -> Vec<&'static str> {
    let mut instructions = vec!["a: Add Item", "r: Refresh", "q: Quit"];
    if !self.items().is_empty() {
      instructions.insert(0, "up/down: Select");
    }
    instructions
  }
}

#[async_trait::async_trait]
impl Component for ItemsList {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    *self.shared_state.action_tx.lock().unwrap() = Some(tx);
    Ok(())
  }

  async fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
    let action = match key {
      KeyEvent { code: KeyCode::Down | KeyCode::Char('j'), modifiers: KeyModifiers::NONE, .. } => {
        Some(Action::SelectNext)
      },
      KeyEvent { code: KeyCode::Up | KeyCode::Char('k'), modifiers: KeyModifiers::NONE, .. } => {
        Some(Action::SelectPrevious)
      },
      KeyEvent { code: KeyCode::Char('a' | 'A'), modifiers: KeyModifiers::NONE | KeyModifiers::SHIFT, .. } => {
        Some(Action::OpenAddItem)
      },
      KeyEvent { code: KeyCode::Char('r' | 'R'), modifiers: KeyModifiers::NONE | KeyModifiers::SHIFT, .. } => {
        Some(Action::Refresh)
      },
      _ => None,
    };

    Ok(action)
  }

  async fn update(&mut self, action: Action) -> Result<Option<Action>> {
    match action {
      Action::SelectNext => self.select_next(),
      Action::SelectPrevious => self.select_previous(),
      Action::Refresh | Action::QueryInvalidated(QueryKey::Items) => {
        info!("ItemsList: reloading items after {}", action);
        let operation = self.load_items();
        operation();
      },
      _ => {},
    }
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    let block = Block::default().title(self.title()).borders(Borders::ALL);
    let items = self.items();

    if items.is_empty() {
      let message = if self.is_loading() { "" } else { "You don't have any items yet. Press 'a' to add one." };
      f.render_widget(Paragraph::new(message).style(Style::default().fg(Color::Gray)).block(block), area);
      return Ok(());
    }

    let render_items: Vec<ListItem> = items.iter().map(Self::render_item).collect();
    let list = List::new(render_items)
      .block(block)
      .style(Style::default().fg(Color::White))
      .highlight_style(Style::default().add_modifier(Modifier::BOLD))
      .highlight_symbol("→")
      .repeat_highlight_symbol(true);

    self.list_state.select(Some(self.selected_index()));
    f.render_stateful_widget(list, area, &mut self.list_state);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use ratatui::{Terminal, backend::TestBackend};
  use std::sync::atomic::{AtomicUsize, Ordering};

  use tokio::sync::{Notify, mpsc};

  use super::*;
  use crate::{
    api::{mock_items_service::MockItemsService, types::ItemCreate},
    error::Error,
  };

  /// The first `read_items` call waits on `release`, later calls answer at once.
  /// Each call returns one more item than the previous one.
  struct GatedItemsService {
    calls: AtomicUsize,
    release: Arc<Notify>,
  }

  #[async_trait::async_trait]
  impl ItemsService for GatedItemsService {
    async fn create_item(&self, draft: &ItemCreate) -> Result<ItemPublic, Error> {
      Ok(ItemPublic::new("id", &draft.title, None, "owner"))
    }

    async fn read_items(&self, _skip: usize, _limit: usize) -> Result<ItemsPublic, Error> {
      let call = self.calls.fetch_add(1, Ordering::SeqCst);
      if call == 0 {
        self.release.notified().await;
      }
      let data = items(call + 1);
      Ok(ItemsPublic { count: data.len(), data })
    }
  }

  fn items(count: usize) -> Vec<ItemPublic> {
    (0..count).map(|i| ItemPublic::new(&format!("id-{i}"), &format!("Item {i}"), None, "owner")).collect()
  }

  fn list_with(service: MockItemsService) -> (ItemsList, mpsc::UnboundedReceiver<Action>, QueryCache<ItemsPublic>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let cache = QueryCache::new();
    let mut list = ItemsList::new(Arc::new(service), cache.clone(), 100);
    list.register_action_handler(tx).unwrap();
    (list, rx, cache)
  }

  async fn load(list: &mut ItemsList, rx: &mut mpsc::UnboundedReceiver<Action>) {
    list.update(Action::Refresh).await.unwrap();
    // One render when loading starts, one when it settles.
    rx.recv().await;
    loop {
      if rx.recv().await == Some(Action::Render) {
        break;
      }
    }
  }

  #[tokio::test]
  async fn test_load_started_before_invalidation_cannot_overwrite_newer_data() {
    let release = Arc::new(Notify::new());
    let service = GatedItemsService { calls: AtomicUsize::new(0), release: release.clone() };
    let (tx, mut rx) = mpsc::unbounded_channel();
    let cache = QueryCache::new();
    let mut list = ItemsList::new(Arc::new(service), cache.clone(), 100);
    list.register_action_handler(tx).unwrap();

    list.update(Action::Refresh).await.unwrap();
    assert_eq!(rx.recv().await, Some(Action::Render));
    tokio::task::yield_now().await;

    cache.invalidate(QueryKey::Items);
    list.update(Action::QueryInvalidated(QueryKey::Items)).await.unwrap();
    assert_eq!(rx.recv().await, Some(Action::Render));
    assert_eq!(rx.recv().await, Some(Action::Render));

    assert_eq!(cache.get(QueryKey::Items).map(|page| page.count), Some(2));
    assert!(list.is_loading());

    release.notify_one();
    assert_eq!(rx.recv().await, Some(Action::Render));

    assert_eq!(cache.get(QueryKey::Items).map(|page| page.count), Some(2));
    assert!(!cache.is_stale(QueryKey::Items));
    assert!(!list.is_loading());
  }

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[tokio::test]
  async fn test_key_bindings() {
    let (mut list, _rx, _cache) = list_with(MockItemsService::default());

    assert_eq!(list.handle_key_events(key(KeyCode::Down)).await.unwrap(), Some(Action::SelectNext));
    assert_eq!(list.handle_key_events(key(KeyCode::Char('k'))).await.unwrap(), Some(Action::SelectPrevious));
    assert_eq!(list.handle_key_events(key(KeyCode::Char('a'))).await.unwrap(), Some(Action::OpenAddItem));
    assert_eq!(list.handle_key_events(key(KeyCode::Char('r'))).await.unwrap(), Some(Action::Refresh));
    assert_eq!(list.handle_key_events(key(KeyCode::Char('x'))).await.unwrap(), None);
  }

  #[tokio::test]
  async fn test_refresh_fills_cache() {
    let (mut list, mut rx, cache) = list_with(MockItemsService::with_items(items(3)));

    load(&mut list, &mut rx).await;

    let page = cache.get(QueryKey::Items).unwrap();
    assert_eq!(page.count, 3);
    assert_eq!(page.data.len(), 3);
    assert!(!list.is_loading());
    assert_eq!(list.title(), "Items (3)");
  }

  #[tokio::test]
  async fn test_invalidation_triggers_reload() {
    let (mut list, mut rx, cache) = list_with(MockItemsService::with_items(items(2)));
    cache.invalidate(QueryKey::Items);
    assert!(cache.is_stale(QueryKey::Items));

    list.update(Action::QueryInvalidated(QueryKey::Items)).await.unwrap();
    rx.recv().await;
    rx.recv().await;

    assert!(!cache.is_stale(QueryKey::Items));
    assert_eq!(cache.get(QueryKey::Items).map(|page| page.count), Some(2));
  }

  #[tokio::test]
  async fn test_load_failure_notifies() {
    let service = MockItemsService::failing_with(401, "Unauthorized", r#"{"detail":"Could not validate credentials"}"#);
    let (mut list, mut rx, cache) = list_with(service);

    list.update(Action::Refresh).await.unwrap();

    assert_eq!(rx.recv().await, Some(Action::Render));
    assert_eq!(
      rx.recv().await,
      Some(Action::Notify(Notification::error("Something went wrong.", "Could not validate credentials")))
    );
    assert_eq!(rx.recv().await, Some(Action::Render));
    assert!(cache.get(QueryKey::Items).is_none());
  }

  #[tokio::test]
  async fn test_selection_wraps() {
    let (mut list, mut rx, _cache) = list_with(MockItemsService::with_items(items(3)));
    load(&mut list, &mut rx).await;

    list.update(Action::SelectPrevious).await.unwrap();
    assert_eq!(list.selected_index(), 2);

    list.update(Action::SelectNext).await.unwrap();
    assert_eq!(list.selected_index(), 0);

    list.update(Action::SelectNext).await.unwrap();
    assert_eq!(list.selected_index(), 1);
  }

  #[tokio::test]
  async fn test_selection_on_empty_list() {
    let (mut list, _rx, _cache) = list_with(MockItemsService::default());

    list.update(Action::SelectNext).await.unwrap();
    list.update(Action::SelectPrevious).await.unwrap();

    assert_eq!(list.selected_index(), 0);
  }

  #[tokio::test]
  async fn test_draw_empty_and_filled() {
    let (mut list, mut rx, _cache) = list_with(MockItemsService::with_items(items(1)));
    let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();

    terminal.draw(|f| list.draw(f, f.area()).unwrap()).unwrap();
    let text: String = terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect();
    assert!(text.contains("You don't have any items yet."));

    load(&mut list, &mut rx).await;
    terminal.draw(|f| list.draw(f, f.area()).unwrap()).unwrap();
    let text: String = terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect();
    assert!(text.contains("Items (1)"));
    assert!(text.contains("Item 0"));
  }
}
