use std::{
  collections::VecDeque,
  time::{Duration, Instant},
};

use color_eyre::eyre::Result;
use ratatui::{
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use serde::{Deserialize, Serialize};
use strum::Display;

use super::Component;
use crate::{action::Action, tui::Frame};

const MAX_VISIBLE: usize = 3;
const TOAST_WIDTH: u16 = 48;
const TOAST_HEIGHT: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Severity {
  Success,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
  pub title: String,
  pub message: String,
  pub severity: Severity,
}

impl Notification {
  pub fn success(title: &str, message: &str) -> Self {
    Notification { title: title.to_string(), message: message.to_string(), severity: Severity::Success }
  }

  pub fn error(title: &str, message: &str) -> Self {
    Notification { title: title.to_string(), message: message.to_string(), severity: Severity::Error }
  }
}

#[derive(Debug, Clone)]
struct Toast {
  notification: Notification,
  shown_at: Instant,
}

/// Transient notifications stacked in the top right corner, newest first.
pub struct ToastStack {
  toasts: VecDeque<Toast>,
  duration: Duration,
}

impl ToastStack {
  pub fn new(duration: Duration) -> Self {
    ToastStack { toasts: VecDeque::new(), duration }
  }

  pub fn notify(&mut self, notification: Notification) {
    self.toasts.push_front(Toast { notification, shown_at: Instant::now() });
  }

  fn expire(&mut self, now: Instant) {
    let duration = self.duration;
    self.toasts.retain(|toast| now.saturating_duration_since(toast.shown_at) < duration);
  }

  pub fn visible(&self) -> Vec<&Notification> {
    self.toasts.iter().take(MAX_VISIBLE).map(|toast| &toast.notification).collect()
  }
}

#[async_trait::async_trait]
impl Component for ToastStack {
  async fn update(&mut self, action: Action) -> Result<Option<Action>> {
    match action {
      Action::Notify(notification) => self.notify(notification),
      Action::Error(message) => self.notify(Notification::error("Something went wrong.", &message)),
      Action::Tick => self.expire(Instant::now()),
      _ => {},
    }
    Ok(None)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    let width = TOAST_WIDTH.min(area.width);
    let x = area.x + area.width - width;

    for (index, notification) in self.visible().into_iter().enumerate() {
      let y = area.y + 1 + index as u16 * TOAST_HEIGHT;
      if y + TOAST_HEIGHT > area.y + area.height {
        break;
      }
      let toast_area = Rect::new(x, y, width, TOAST_HEIGHT);
      let color = match notification.severity {
        Severity::Success => Color::LightGreen,
        Severity::Error => Color::LightRed,
      };
      let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(notification.title.clone(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(notification.message.clone()),
      ])
      .wrap(Wrap { trim: true })
      .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color)));

      f.render_widget(Clear, toast_area);
      f.render_widget(paragraph, toast_area);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use ratatui::{Terminal, backend::TestBackend};

  use super::*;

  fn row_text(terminal: &Terminal<TestBackend>, y: u16) -> String {
    let buffer = terminal.backend().buffer();
    (0..buffer.area.width).map(|x| buffer[(x, y)].symbol()).collect()
  }

  #[tokio::test]
  async fn test_notify_action_pushes_toast() {
    let mut toasts = ToastStack::new(Duration::from_secs(5));

    toasts.update(Action::Notify(Notification::success("Success!", "Item created successfully."))).await.unwrap();

    assert_eq!(toasts.visible(), vec![&Notification::success("Success!", "Item created successfully.")]);
  }

  #[tokio::test]
  async fn test_error_action_becomes_error_toast() {
    let mut toasts = ToastStack::new(Duration::from_secs(5));

    toasts.update(Action::Error("Failed to draw".to_string())).await.unwrap();

    assert_eq!(toasts.visible()[0].severity, Severity::Error);
    assert_eq!(toasts.visible()[0].message, "Failed to draw");
  }

  #[test]
  fn test_newest_first_and_capped() {
    let mut toasts = ToastStack::new(Duration::from_secs(5));
    for i in 0..5 {
      toasts.notify(Notification::error("t", &i.to_string()));
    }

    let messages: Vec<&str> = toasts.visible().iter().map(|n| n.message.as_str()).collect();

    assert_eq!(messages, vec!["4", "3", "2"]);
  }

  #[test]
  fn test_expire() {
    let mut toasts = ToastStack::new(Duration::from_secs(5));
    toasts.notify(Notification::success("t", "m"));

    toasts.expire(Instant::now() + Duration::from_secs(1));
    assert_eq!(toasts.visible().len(), 1);

    toasts.expire(Instant::now() + Duration::from_secs(6));
    assert!(toasts.visible().is_empty());
  }

  #[test]
  fn test_draw_stacks_top_right() {
    let mut toasts = ToastStack::new(Duration::from_secs(5));
    toasts.notify(Notification::success("Success!", "Item created successfully."));
    toasts.notify(Notification::error("Something went wrong.", "Title already exists"));
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

    terminal.draw(|f| toasts.draw(f, f.area()).unwrap()).unwrap();

    let buffer = terminal.backend().buffer();
    assert_eq!(buffer[(32, 1)].symbol(), "┌");
    assert_eq!(buffer[(79, 1)].symbol(), "┐");
    assert_eq!(buffer[(32, 1)].fg, Color::LightRed);
    assert_eq!(buffer[(32, 5)].fg, Color::LightGreen);
    assert!(row_text(&terminal, 2).contains("Something went wrong."));
    assert!(row_text(&terminal, 6).contains("Success!"));
    assert_eq!(buffer[(31, 2)].symbol(), " ");
  }

  #[test]
  fn test_draw_skips_toasts_that_do_not_fit() {
    let mut toasts = ToastStack::new(Duration::from_secs(5));
    toasts.notify(Notification::success("Older", "first"));
    toasts.notify(Notification::success("Newer", "second"));
    let mut terminal = Terminal::new(TestBackend::new(30, 6)).unwrap();

    terminal.draw(|f| toasts.draw(f, f.area()).unwrap()).unwrap();

    let text: String = (0..6).map(|y| row_text(&terminal, y)).collect();
    assert!(text.contains("Newer"));
    assert!(!text.contains("Older"));
    assert_eq!(terminal.backend().buffer()[(0, 1)].symbol(), "┌");
  }

  #[test]
  fn test_severity_display() {
    assert_eq!(Severity::Success.to_string(), "success");
    assert_eq!(Severity::Error.to_string(), "error");
  }
}
