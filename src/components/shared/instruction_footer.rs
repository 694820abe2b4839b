use ratatui::{
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::tui::Frame;

/// Key hints for whatever currently owns the keyboard.
#[derive(Default)]
pub struct InstructionFooter {}

impl InstructionFooter {
  /// Hints are written as `"key: description"`; the key part is highlighted.
  pub fn line(instructions: &[&'static str]) -> Line<'static> {
    let mut spans = Vec::with_capacity(instructions.len() * 3);
    for (index, instruction) in instructions.iter().copied().enumerate() {
      if index > 0 {
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
      }
      match instruction.split_once(": ") {
        Some((key, description)) => {
          spans.push(Span::styled(key, Style::default().fg(Color::LightCyan).add_modifier(Modifier::BOLD)));
          spans.push(Span::raw(format!(": {}", description)));
        },
        None => spans.push(Span::raw(instruction)),
      }
    }
    Line::from(spans)
  }

  pub fn render(&self, frame: &mut Frame<'_>, area: Rect, instructions: Vec<&'static str>) {
    if instructions.is_empty() {
      return;
    }
    let paragraph = Paragraph::new(Self::line(&instructions))
      .block(Block::default().borders(Borders::ALL))
      .style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, area);
  }
}
