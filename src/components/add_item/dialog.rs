use std::{sync::Arc, time::SystemTime};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
  layout::{Constraint, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph},
};
use tokio::{sync::mpsc::UnboundedSender, task::spawn};
use tracing::{error, info, warn};

use super::form::AddItemForm;
use crate::{
  action::Action,
  api::{
    items_service::ItemsService,
    types::{ItemCreate, ItemPublic, ItemsPublic},
  },
  components::{Component, shared::modal::centered_rect, toasts::Notification},
  query_cache::{QueryCache, QueryKey},
  tui::Frame,
  utils::format_time_elapsed,
};

pub const SUCCESS_TITLE: &str = "Success!";
pub const SUCCESS_MESSAGE: &str = "Item created successfully.";
pub const ERROR_TITLE: &str = "Something went wrong.";

const DIALOG_WIDTH: u16 = 60;
const DIALOG_HEIGHT: u16 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
  Created(ItemPublic),
  Failed(String),
}

fn send_action(tx: &UnboundedSender<Action>, action: Action) {
  if let Err(e) = tx.send(action) {
    error!("Failed to send action: {}", e);
  }
}

/// Sends `draft` to the API and reports back through `tx`.
///
/// Exactly one notification goes out per call, followed by either
/// `ItemCreated` or `ItemCreateFailed` tagged with `session`. The items query
/// is invalidated once the request has settled, whatever the outcome.
pub async fn submit_item(
  service: Arc<dyn ItemsService>,
  cache: QueryCache<ItemsPublic>,
  tx: UnboundedSender<Action>,
  session: u64,
  draft: ItemCreate,
) -> SubmissionOutcome {
  let outcome = match service.create_item(&draft).await {
    Ok(item) => {
      info!("AddItemDialog: created item '{}' ({})", item.title, item.id);
      send_action(&tx, Action::Notify(Notification::success(SUCCESS_TITLE, SUCCESS_MESSAGE)));
      send_action(&tx, Action::ItemCreated { session });
      SubmissionOutcome::Created(item)
    },
    Err(err) => {
      let detail = err.detail_message();
      error!("AddItemDialog: failed to create item: {}", err);
      send_action(&tx, Action::Notify(Notification::error(ERROR_TITLE, &detail)));
      send_action(&tx, Action::ItemCreateFailed { session });
      SubmissionOutcome::Failed(detail)
    },
  };

  cache.invalidate(QueryKey::Items);
  outcome
}

/// Modal form that creates a new item.
///
/// Every time the dialog opens it starts a new session with an empty form.
/// Request completions carry the session they were started from and are
/// ignored once that session is gone, so a reply arriving after the user
/// cancelled (and perhaps reopened) cannot close or reset the current form.
pub struct AddItemDialog {
  service: Arc<dyn ItemsService>,
  cache: QueryCache<ItemsPublic>,
  form: AddItemForm,
  is_open: bool,
  session: u64,
  submitting: Option<SystemTime>,
  action_tx: Option<UnboundedSender<Action>>,
}

impl AddItemDialog {
  pub fn new(service: Arc<dyn ItemsService>, cache: QueryCache<ItemsPublic>) -> Self {
    AddItemDialog {
      service,
      cache,
      form: AddItemForm::new(),
      is_open: false,
      session: 0,
      submitting: None,
      action_tx: None,
    }
  }

  pub fn is_open(&self) -> bool {
    self.is_open
  }

  pub fn is_submitting(&self) -> bool {
    self.submitting.is_some()
  }

  fn open(&mut self) {
    self.session += 1;
    self.form.reset();
    self.submitting = None;
    self.is_open = true;
    info!("AddItemDialog: opened session {}", self.session);
  }

  fn close(&mut self) {
    self.is_open = false;
  }

  fn submit(&mut self) {
    if self.submitting.is_some() {
      return;
    }
    if !self.form.validate_all() {
      info!("AddItemDialog: validation failed, not submitting");
      return;
    }
    let Some(tx) = self.action_tx.clone() else {
      error!("AddItemDialog: no action handler registered, cannot submit");
      return;
    };

    self.submitting = Some(SystemTime::now());
    let draft = self.form.draft();
    info!("AddItemDialog: submitting '{}' in session {}", draft.title, self.session);
    spawn(submit_item(self.service.clone(), self.cache.clone(), tx, self.session, draft));
  }

  fn is_current(&self, session: u64) -> bool {
    if session != self.session {
      warn!("AddItemDialog: ignoring completion for stale session {} (current {})", session, self.session);
      return false;
    }
    true
  }

  pub fn instructions(&self) -> Vec<&'static str> {
    if self.submitting.is_some() {
      return vec!["esc: Cancel"];
    }
    vec!["enter: Save", "tab: Next Field", "shift+tab: Previous Field", "esc: Cancel"]
  }

  fn render_buttons(&self, f: &mut Frame<'_>, area: Rect) {
    let line = match self.submitting {
      Some(started) => Line::from(vec![
        Span::styled(
          format!("Saving...({})", format_time_elapsed(started)),
          Style::default().add_modifier(Modifier::DIM),
        ),
        Span::raw("  "),
        Span::raw("[ Cancel ]"),
      ]),
      None => Line::from(vec![
        Span::styled("[ Save ]", Style::default().fg(Color::LightGreen).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::raw("[ Cancel ]"),
      ]),
    };
    f.render_widget(Paragraph::new(line), area);
  }
}

#[async_trait::async_trait]
impl Component for AddItemDialog {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.action_tx = Some(tx);
    Ok(())
  }

  async fn handle_paste_event(&mut self, text: &str) -> Result<Option<Action>> {
    if self.is_open && self.submitting.is_none() {
      self.form.insert_str(text);
    }
    Ok(None)
  }

  async fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
    if !self.is_open {
      return Ok(None);
    }
    if key.code == KeyCode::Esc {
      return Ok(Some(Action::CloseAddItem));
    }
    if self.submitting.is_some() {
      return Ok(None);
    }
    match key {
      KeyEvent { code: KeyCode::Enter, .. } => self.submit(),
      KeyEvent { code: KeyCode::Char('s'), modifiers: KeyModifiers::CONTROL, .. } => self.submit(),
      KeyEvent { code: KeyCode::Tab | KeyCode::Down, .. } => self.form.focus_next(),
      KeyEvent { code: KeyCode::BackTab | KeyCode::Up, .. } => self.form.focus_previous(),
      _ => {
        self.form.handle_key_event(key);
      },
    }
    Ok(None)
  }

  async fn update(&mut self, action: Action) -> Result<Option<Action>> {
    match action {
      Action::OpenAddItem => {
        self.open();
        Ok(None)
      },
      Action::CloseAddItem => {
        self.close();
        Ok(None)
      },
      Action::ItemCreated { session } => {
        if !self.is_current(session) {
          return Ok(None);
        }
        self.submitting = None;
        if !self.is_open {
          return Ok(None);
        }
        self.form.reset();
        Ok(Some(Action::CloseAddItem))
      },
      Action::ItemCreateFailed { session } => {
        if self.is_current(session) {
          self.submitting = None;
        }
        Ok(None)
      },
      _ => Ok(None),
    }
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    if !self.is_open {
      return Ok(());
    }
    let dialog_area = centered_rect(DIALOG_WIDTH, DIALOG_HEIGHT, area);
    let block = Block::default()
      .title(" Add Item ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::LightCyan));
    let inner = block.inner(dialog_area);

    f.render_widget(Clear, dialog_area);
    f.render_widget(block, dialog_area);

    let layout = Layout::vertical([Constraint::Length(8), Constraint::Length(1), Constraint::Length(1)]).split(inner);
    self.form.render(f, layout[0]);
    self.render_buttons(f, layout[2]);
    Ok(())
  }
}
