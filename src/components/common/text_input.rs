use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
  layout::Rect,
  prelude::Color,
  style::{Modifier, Style},
  widgets::{Block, Borders},
};
use tui_textarea::{Input, TextArea};

use crate::tui::Frame;

/// A single line text field with a bordered label.
#[derive(Debug, Default)]
pub struct TextInput {
  text_input: TextArea<'static>,
  label: String,
  required: bool,
  focused: bool,
  invalid: bool,
}

impl TextInput {
  pub fn new(label: &str, required: bool) -> Self {
    let mut input = TextInput { label: label.to_string(), required, ..Default::default() };
    input.init_style();
    input
  }

  pub fn init_style(&mut self) {
    let title = if self.required { format!("{} *", self.label) } else { self.label.clone() };
    let border_color = match (self.invalid, self.focused) {
      (true, _) => Color::LightRed,
      (false, true) => Color::LightCyan,
      (false, false) => Color::DarkGray,
    };
    self.text_input.set_style(Style::default().fg(Color::White));
    self.text_input.set_placeholder_text(self.label.clone());
    self.text_input.set_cursor_line_style(Style::default());
    self.text_input.set_cursor_style(if self.focused {
      Style::default().add_modifier(Modifier::REVERSED)
    } else {
      Style::default()
    });
    self
      .text_input
      .set_block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(border_color)).title(title));
  }

  pub fn get_text(&self) -> String {
    self.text_input.lines().first().cloned().unwrap_or_default()
  }

  pub fn set_focused(&mut self, focused: bool) {
    self.focused = focused;
    self.init_style();
  }

  pub fn set_invalid(&mut self, invalid: bool) {
    self.invalid = invalid;
    self.init_style();
  }

  /// Applies an editing key. Keys that move between fields or submit are left
  /// to the caller, and keys the textarea would turn into a line break are
  /// dropped. Returns whether the text changed.
  pub fn handle_key_event(&mut self, key_event: KeyEvent) -> bool {
    match key_event {
      KeyEvent {
        code: KeyCode::Enter | KeyCode::Esc | KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down,
        ..
      } => false,
      KeyEvent { code: KeyCode::Char('\n' | '\r'), .. } => false,
      KeyEvent { code: KeyCode::Char('m' | 'M'), modifiers, .. } if modifiers.contains(KeyModifiers::CONTROL) => false,
      _ => self.text_input.input(Input::from(key_event)),
    }
  }

  /// Inserts pasted text, flattened onto one line.
  pub fn insert_str(&mut self, text: &str) -> bool {
    let flattened = text.replace(['\r', '\n'], " ");
    self.text_input.insert_str(flattened)
  }

  pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
    f.render_widget(&self.text_input, area);
  }
}
