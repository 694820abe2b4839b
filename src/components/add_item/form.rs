use std::collections::{HashMap, HashSet};

use crossterm::event::KeyEvent;
use ratatui::{
  layout::{Constraint, Layout, Rect},
  style::{Color, Style},
  widgets::Paragraph,
};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::{api::types::ItemCreate, components::common::text_input::TextInput, tui::Frame};

pub const TITLE_REQUIRED: &str = "Title is required.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum FormField {
  Title,
  Description,
}

impl FormField {
  fn next(self) -> Self {
    match self {
      FormField::Title => FormField::Description,
      FormField::Description => FormField::Title,
    }
  }

  fn previous(self) -> Self {
    // Two fields, so stepping back is the same as stepping forward.
    self.next()
  }
}

/// Returns the inline error for `value`, if any.
pub fn validate(field: FormField, value: &str) -> Option<String> {
  match field {
    FormField::Title if value.trim().is_empty() => Some(TITLE_REQUIRED.to_string()),
    _ => None,
  }
}

/// Field values plus per-field errors for the add item dialog.
///
/// A field is only validated once it has been blurred (or a submit was
/// attempted). From then on every edit re-validates it.
pub struct AddItemForm {
  title: TextInput,
  description: TextInput,
  focus: FormField,
  errors: HashMap<FormField, String>,
  touched: HashSet<FormField>,
}

impl Default for AddItemForm {
  fn default() -> Self {
    Self::new()
  }
}

impl AddItemForm {
  pub fn new() -> Self {
    let mut title = TextInput::new("Title", true);
    title.set_focused(true);
    AddItemForm {
      title,
      description: TextInput::new("Description", false),
      focus: FormField::Title,
      errors: HashMap::new(),
      touched: HashSet::new(),
    }
  }

  pub fn draft(&self) -> ItemCreate {
    ItemCreate::new(&self.title.get_text(), &self.description.get_text())
  }

  pub fn value(&self, field: FormField) -> String {
    self.input(field).get_text()
  }

  pub fn focus(&self) -> FormField {
    self.focus
  }

  pub fn error(&self, field: FormField) -> Option<&str> {
    self.errors.get(&field).map(String::as_str)
  }

  pub fn has_errors(&self) -> bool {
    !self.errors.is_empty()
  }

  fn input(&self, field: FormField) -> &TextInput {
    match field {
      FormField::Title => &self.title,
      FormField::Description => &self.description,
    }
  }

  fn input_mut(&mut self, field: FormField) -> &mut TextInput {
    match field {
      FormField::Title => &mut self.title,
      FormField::Description => &mut self.description,
    }
  }

  fn validate_field(&mut self, field: FormField) -> bool {
    let error = validate(field, &self.value(field));
    let is_valid = error.is_none();
    match error {
      Some(message) => self.errors.insert(field, message),
      None => self.errors.remove(&field),
    };
    self.input_mut(field).set_invalid(!is_valid);
    is_valid
  }

  /// Feeds an editing key to the focused field. Returns whether the text changed.
  pub fn handle_key_event(&mut self, key_event: KeyEvent) -> bool {
    let field = self.focus;
    let changed = self.input_mut(field).handle_key_event(key_event);
    if changed && self.touched.contains(&field) {
      self.validate_field(field);
    }
    changed
  }

  pub fn insert_str(&mut self, text: &str) -> bool {
    let field = self.focus;
    let changed = self.input_mut(field).insert_str(text);
    if changed && self.touched.contains(&field) {
      self.validate_field(field);
    }
    changed
  }

  fn blur(&mut self) {
    let field = self.focus;
    self.touched.insert(field);
    self.validate_field(field);
    self.input_mut(field).set_focused(false);
  }

  fn focus_on(&mut self, field: FormField) {
    self.blur();
    self.focus = field;
    self.input_mut(field).set_focused(true);
  }

  pub fn focus_next(&mut self) {
    self.focus_on(self.focus.next());
  }

  pub fn focus_previous(&mut self) {
    self.focus_on(self.focus.previous());
  }

  /// Validates every field as a submit attempt does. Returns true when the
  /// draft can be sent.
  pub fn validate_all(&mut self) -> bool {
    for field in FormField::iter() {
      self.touched.insert(field);
      self.validate_field(field);
    }
    !self.has_errors()
  }

  pub fn reset(&mut self) {
    *self = Self::new();
  }

  pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
    let layout = Layout::vertical([
      Constraint::Length(3),
      Constraint::Length(1),
      Constraint::Length(3),
      Constraint::Length(1),
    ])
    .split(area);
    let error_style = Style::default().fg(Color::LightRed);

    self.title.render(f, layout[0]);
    if let Some(error) = self.error(FormField::Title) {
      f.render_widget(Paragraph::new(error).style(error_style), layout[1]);
    }
    self.description.render(f, layout[2]);
    if let Some(error) = self.error(FormField::Description) {
      f.render_widget(Paragraph::new(error).style(error_style), layout[3]);
    }
  }
}

#[cfg(test)]
mod tests {
  use crossterm::event::{KeyCode, KeyModifiers};
  use pretty_assertions::assert_eq;

  use super::*;

  fn type_text(form: &mut AddItemForm, text: &str) {
    for c in text.chars() {
      form.handle_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
    }
  }

  fn backspace(form: &mut AddItemForm) {
    form.handle_key_event(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
  }

  #[test]
  fn test_validate() {
    assert_eq!(validate(FormField::Title, ""), Some(TITLE_REQUIRED.to_string()));
    assert_eq!(validate(FormField::Title, " \t "), Some(TITLE_REQUIRED.to_string()));
    assert_eq!(validate(FormField::Title, " x "), None);
    assert_eq!(validate(FormField::Description, ""), None);
  }

  #[test]
  fn test_new_form_is_empty_and_focused_on_title() {
    let form = AddItemForm::new();

    assert_eq!(form.draft(), ItemCreate { title: String::new(), description: None });
    assert_eq!(form.focus(), FormField::Title);
    assert!(!form.has_errors());
  }

  #[test]
  fn test_typing_targets_focused_field() {
    let mut form = AddItemForm::new();
    type_text(&mut form, "Groceries");
    form.focus_next();
    type_text(&mut form, "milk");

    assert_eq!(form.draft(), ItemCreate::new("Groceries", "milk"));
    assert_eq!(form.focus(), FormField::Description);
  }

  #[test]
  fn test_ctrl_m_keeps_title_intact() {
    let mut form = AddItemForm::new();
    type_text(&mut form, "Groceries");
    form.handle_key_event(KeyEvent::new(KeyCode::Home, KeyModifiers::NONE));

    let changed = form.handle_key_event(KeyEvent::new(KeyCode::Char('m'), KeyModifiers::CONTROL));

    assert!(!changed);
    assert_eq!(form.draft(), ItemCreate::new("Groceries", ""));
  }

  #[test]
  fn test_no_error_before_blur() {
    let mut form = AddItemForm::new();
    type_text(&mut form, "a");
    backspace(&mut form);

    assert_eq!(form.error(FormField::Title), None);
  }

  #[test]
  fn test_blur_validates_then_edits_revalidate() {
    let mut form = AddItemForm::new();
    form.focus_next();
    assert_eq!(form.error(FormField::Title), Some(TITLE_REQUIRED));

    form.focus_previous();
    type_text(&mut form, "x");
    assert_eq!(form.error(FormField::Title), None);

    backspace(&mut form);
    assert_eq!(form.error(FormField::Title), Some(TITLE_REQUIRED));
  }

  #[test]
  fn test_validate_all_blocks_whitespace_title() {
    let mut form = AddItemForm::new();
    type_text(&mut form, "   ");

    assert!(!form.validate_all());
    assert_eq!(form.error(FormField::Title), Some(TITLE_REQUIRED));
    assert_eq!(form.error(FormField::Description), None);
  }

  #[test]
  fn test_validate_all_passes_with_title() {
    let mut form = AddItemForm::new();
    type_text(&mut form, "Groceries");

    assert!(form.validate_all());
    assert!(!form.has_errors());
  }

  #[test]
  fn test_paste_revalidates_touched_field() {
    let mut form = AddItemForm::new();
    form.validate_all();

    form.insert_str("Pasted title");

    assert_eq!(form.error(FormField::Title), None);
    assert_eq!(form.value(FormField::Title), "Pasted title");
  }

  #[test]
  fn test_reset() {
    let mut form = AddItemForm::new();
    type_text(&mut form, "Groceries");
    form.focus_next();
    type_text(&mut form, "milk");
    form.validate_all();

    form.reset();

    assert_eq!(form.value(FormField::Title), "");
    assert_eq!(form.value(FormField::Description), "");
    assert_eq!(form.focus(), FormField::Title);
  }
}
