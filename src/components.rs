use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
  action::Action,
  tui::{Event, Frame},
};

pub mod add_item;
pub mod common;
pub mod items_list;
pub mod shared;
pub mod toasts;

/// A piece of the screen that reacts to terminal events and app actions.
///
/// Components never touch each other directly. Anything one of them wants to
/// happen elsewhere is returned (or sent through the registered sender) as an
/// [`Action`] and fanned out to every component by the app.
#[async_trait::async_trait]
pub trait Component: Send + Sync {
  /// Hands over the sender used for actions produced off the event loop, e.g.
  /// by spawned requests.
  fn register_action_handler(&mut self, _tx: UnboundedSender<Action>) -> Result<()> {
    Ok(())
  }

  /// Routes a terminal event to the key or paste handler.
  async fn handle_events(&mut self, event: Option<Event>) -> Result<Option<Action>> {
    match event {
      Some(Event::Key(key_event)) => self.handle_key_events(key_event).await,
      Some(Event::Paste(text)) => self.handle_paste_event(&text).await,
      _ => Ok(None),
    }
  }

  async fn handle_key_events(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
    Ok(None)
  }

  /// Bracketed paste, delivered as one string.
  async fn handle_paste_event(&mut self, _text: &str) -> Result<Option<Action>> {
    Ok(None)
  }

  /// Reacts to an action. A returned action is queued for every component.
  async fn update(&mut self, _action: Action) -> Result<Option<Action>> {
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()>;
}
