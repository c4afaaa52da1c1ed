use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::ui::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Events emitted by search input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
  /// Filter text changed (each keystroke, and empty string on cancel)
  Changed(String),
  /// Search submitted, filter persists
  Submitted,
}

/// Search box that filters the product table while typing.
///
/// The filter stays applied after Enter; Esc clears it.
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
  input: TextInput,
  active: bool,
}

impl SearchInput {
  pub fn new() -> Self {
    Self::default()
  }

  /// Check if search is currently focused
  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Current filter text
  pub fn query(&self) -> &str {
    self.input.value()
  }

  /// Focus the box, keeping the current filter for editing
  pub fn activate(&mut self) {
    self.active = true;
  }

  /// Drop the filter
  pub fn clear(&mut self) {
    self.active = false;
    self.input.clear();
  }

  /// Handle a key event
  /// Call this regardless of active state - it handles activation too
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<SearchEvent> {
    if !self.active {
      if key.code == KeyCode::Char('/') {
        self.activate();
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(_) => {
        self.active = false;
        KeyResult::Event(SearchEvent::Submitted)
      }
      InputResult::Cancelled => {
        self.clear();
        KeyResult::Event(SearchEvent::Changed(String::new()))
      }
      InputResult::Consumed => KeyResult::Event(SearchEvent::Changed(self.query().to_string())),
      // Keep focus while typing
      InputResult::NotHandled => KeyResult::Handled,
    }
  }

  /// Render the one line search bar
  pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
    const PROMPT: &str = " Search: ";

    let line = if self.active {
      // Terminal cursor sits where the next character goes
      let offset = (PROMPT.len() + self.input.cursor_position()) as u16;
      if offset < area.width {
        frame.set_cursor_position((area.x + offset, area.y));
      }
      Line::from(vec![
        Span::styled(PROMPT, Style::default().fg(theme.accent()).bold()),
        Span::raw(self.query()),
      ])
    } else if self.input.is_empty() {
      Line::from(Span::styled(
        " Search… (press /)",
        Style::default().fg(theme.muted()),
      ))
    } else {
      Line::from(vec![
        Span::styled(" Filter: ", Style::default().fg(theme.muted())),
        Span::styled(self.query(), Style::default().fg(theme.accent())),
        Span::styled("  (/ edit, Esc clear)", Style::default().fg(theme.muted())),
      ])
    };

    frame.render_widget(Paragraph::new(line).style(theme.base()), area);
  }
}
