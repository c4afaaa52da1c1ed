use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of handling a key event in an input component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
  /// Key was handled, continue input mode
  Consumed,
  /// Enter pressed, here's the submitted value
  Submitted(String),
  /// Escape pressed, input cancelled
  Cancelled,
  /// Key not handled, pass to next handler
  NotHandled,
}

/// Which characters a field accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CharFilter {
  #[default]
  Any,
  /// Whole numbers only
  Digits,
  /// Digits and a single decimal point
  Decimal,
}

impl CharFilter {
  fn accepts(self, current: &str, c: char) -> bool {
    match self {
      CharFilter::Any => true,
      CharFilter::Digits => c.is_ascii_digit(),
      CharFilter::Decimal => c.is_ascii_digit() || (c == '.' && !current.contains('.')),
    }
  }
}

/// Single line text input. The cursor counts characters, not bytes.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
  buffer: String,
  cursor: usize,
  filter: CharFilter,
}

impl TextInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_filter(filter: CharFilter) -> Self {
    Self {
      filter,
      ..Self::default()
    }
  }

  /// Get the current input value
  pub fn value(&self) -> &str {
    &self.buffer
  }

  /// Check if the input is empty
  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  /// Clear the input
  pub fn clear(&mut self) {
    self.buffer.clear();
    self.cursor = 0;
  }

  /// Cursor position in characters
  pub fn cursor_position(&self) -> usize {
    self.cursor
  }

  fn char_count(&self) -> usize {
    self.buffer.chars().count()
  }

  /// Byte offset of the character at `idx`
  fn byte_index(&self, idx: usize) -> usize {
    self
      .buffer
      .char_indices()
      .nth(idx)
      .map(|(i, _)| i)
      .unwrap_or(self.buffer.len())
  }

  /// Handle a key event, returning the result
  pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Esc => InputResult::Cancelled,
      KeyCode::Enter => InputResult::Submitted(self.buffer.clone()),
      KeyCode::Backspace => {
        if self.cursor > 0 {
          self.cursor -= 1;
          let at = self.byte_index(self.cursor);
          self.buffer.remove(at);
        }
        InputResult::Consumed
      }
      KeyCode::Delete => {
        if self.cursor < self.char_count() {
          let at = self.byte_index(self.cursor);
          self.buffer.remove(at);
        }
        InputResult::Consumed
      }
      KeyCode::Left => {
        self.cursor = self.cursor.saturating_sub(1);
        InputResult::Consumed
      }
      KeyCode::Right => {
        if self.cursor < self.char_count() {
          self.cursor += 1;
        }
        InputResult::Consumed
      }
      KeyCode::Home => {
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::End => {
        self.cursor = self.char_count();
        InputResult::Consumed
      }
      KeyCode::Char('a') if ctrl => {
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::Char('e') if ctrl => {
        self.cursor = self.char_count();
        InputResult::Consumed
      }
      KeyCode::Char('u') if ctrl => {
        // Clear line before cursor
        let at = self.byte_index(self.cursor);
        self.buffer.replace_range(..at, "");
        self.cursor = 0;
        InputResult::Consumed
      }
      KeyCode::Char(_) if ctrl => InputResult::NotHandled,
      KeyCode::Char(c) => {
        if self.filter.accepts(&self.buffer, c) {
          let at = self.byte_index(self.cursor);
          self.buffer.insert(at, c);
          self.cursor += 1;
        }
        InputResult::Consumed
      }
      _ => InputResult::NotHandled,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn ctrl_key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::CONTROL)
  }

  fn type_str(input: &mut TextInput, s: &str) {
    for c in s.chars() {
      input.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_submit_returns_value() {
    let mut input = TextInput::new();
    type_str(&mut input, "W-1");

    let result = input.handle_key(key(KeyCode::Enter));
    assert_eq!(result, InputResult::Submitted("W-1".to_string()));
  }

  #[test]
  fn test_cancel() {
    let mut input = TextInput::new();
    type_str(&mut input, "x");
    assert_eq!(input.handle_key(key(KeyCode::Esc)), InputResult::Cancelled);
  }

  #[test]
  fn test_edit_in_the_middle_of_multibyte_text() {
    let mut input = TextInput::new();
    type_str(&mut input, "café");
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Backspace));
    assert_eq!(input.value(), "caé");
    input.handle_key(key(KeyCode::Char('f')));
    assert_eq!(input.value(), "café");
    assert_eq!(input.cursor_position(), 3);
  }

  #[test]
  fn test_ctrl_u_clear_before_cursor() {
    let mut input = TextInput::new();
    type_str(&mut input, "hello world");
    for _ in 0..5 {
      input.handle_key(key(KeyCode::Left));
    }
    input.handle_key(ctrl_key(KeyCode::Char('u')));
    assert_eq!(input.value(), "world");
  }

  #[test]
  fn test_digits_filter() {
    let mut input = TextInput::with_filter(CharFilter::Digits);
    type_str(&mut input, "1a2-3.");
    assert_eq!(input.value(), "123");
  }

  #[test]
  fn test_decimal_filter_allows_one_point() {
    let mut input = TextInput::with_filter(CharFilter::Decimal);
    type_str(&mut input, "2.5.0x");
    assert_eq!(input.value(), "2.50");
  }

  #[test]
  fn test_unhandled_ctrl_chars_pass_through() {
    let mut input = TextInput::new();
    assert_eq!(
      input.handle_key(ctrl_key(KeyCode::Char('c'))),
      InputResult::NotHandled
    );
    assert!(input.is_empty());
  }
}
