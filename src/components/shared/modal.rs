use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// A `width` x `height` rect centred in `area`, clamped to fit.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
  let [horizontal] = Layout::horizontal([Constraint::Length(width.min(area.width))]).flex(Flex::Center).areas(area);
  let [centered] =
    Layout::vertical([Constraint::Length(height.min(area.height))]).flex(Flex::Center).areas(horizontal);
  centered
}
