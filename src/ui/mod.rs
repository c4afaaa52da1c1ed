pub mod components;
pub mod renderfns;
pub mod theme;
pub mod view;
pub mod views;

use ratatui::widgets::TableState;

/// Keep the selection inside `len` rows; select the first row when nothing is
/// selected, clear it when there are no rows.
pub fn ensure_valid_selection(state: &mut TableState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    Some(idx) if idx >= len => state.select(Some(len - 1)),
    None => state.select(Some(0)),
    _ => {}
  }
}
