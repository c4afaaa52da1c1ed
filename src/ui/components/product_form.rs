use super::input::{CharFilter, InputResult, TextInput};
use super::KeyResult;
use crate::catalog::ProductForm;
use crate::ui::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

const LABELS: [&str; 4] = ["Name", "SKU", "Stock", "Price"];

/// Events emitted by the add form that the parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  /// Enter pressed, here are the raw field values
  Submitted(ProductForm),
  /// Form dismissed
  Cancelled,
}

/// Overlay form for entering a new product
#[derive(Debug, Clone)]
pub struct ProductFormInput {
  active: bool,
  fields: [TextInput; 4],
  focused: usize,
}

impl Default for ProductFormInput {
  fn default() -> Self {
    Self {
      active: false,
      fields: [
        TextInput::new(),
        TextInput::new(),
        TextInput::with_filter(CharFilter::Digits),
        TextInput::with_filter(CharFilter::Decimal),
      ],
      focused: 0,
    }
  }
}

impl ProductFormInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn show(&mut self) {
    self.active = true;
  }

  pub fn hide(&mut self) {
    self.active = false;
  }

  /// Empty every field and focus the first one
  pub fn reset(&mut self) {
    for field in &mut self.fields {
      field.clear();
    }
    self.focused = 0;
  }

  /// Current field values
  pub fn values(&self) -> ProductForm {
    ProductForm {
      name: self.fields[0].value().to_string(),
      sku: self.fields[1].value().to_string(),
      stock: self.fields[2].value().to_string(),
      price: self.fields[3].value().to_string(),
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.focused = (self.focused + 1) % self.fields.len();
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
        return KeyResult::Handled;
      }
      _ => {}
    }

    match self.fields[self.focused].handle_key(key) {
      InputResult::Submitted(_) => KeyResult::Event(FormEvent::Submitted(self.values())),
      InputResult::Cancelled => {
        self.hide();
        KeyResult::Event(FormEvent::Cancelled)
      }
      InputResult::Consumed | InputResult::NotHandled => KeyResult::Handled,
    }
  }

  /// Render the form overlay if active. `saving` swaps the submit hint.
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect, theme: &Theme, saving: bool) {
    if !self.active {
      return;
    }

    let width = (area.width / 10 * 6).clamp(30u16.min(area.width), 60);
    let height = (LABELS.len() as u16 + 4).min(area.height);

    // Center the overlay
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(theme.accent()))
      .title(" Add product ")
      .style(theme.base());

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let mut lines: Vec<Line> = LABELS
      .iter()
      .zip(self.fields.iter())
      .enumerate()
      .map(|(i, (label, field))| {
        let focused = i == self.focused;
        let label_style = if focused {
          Style::default().fg(theme.accent()).bold()
        } else {
          Style::default().fg(theme.muted())
        };
        let mut spans = vec![
          Span::styled(format!("{:>6}: ", label), label_style),
          Span::raw(field.value().to_string()),
        ];
        if focused {
          spans.push(Span::styled("_", Style::default().fg(theme.accent())));
        }
        Line::from(spans)
      })
      .collect();

    lines.push(Line::raw(""));
    let hint = if saving {
      Span::styled("Saving…", Style::default().fg(theme.muted()).italic())
    } else {
      Span::styled(
        "Enter add   Tab next   Esc cancel",
        Style::default().fg(theme.muted()),
      )
    };
    lines.push(Line::from(hint));

    frame.render_widget(Paragraph::new(lines), inner);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_str(form: &mut ProductFormInput, s: &str) {
    for c in s.chars() {
      form.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_inactive_form_ignores_keys() {
    let mut form = ProductFormInput::new();
    assert_eq!(form.handle_key(key(KeyCode::Char('a'))), KeyResult::NotHandled);
  }

  #[test]
  fn test_fill_and_submit() {
    let mut form = ProductFormInput::new();
    form.show();
    type_str(&mut form, "Widget");
    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "W-1");
    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "5x");
    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "2.50");

    let event = form.handle_key(key(KeyCode::Enter));
    assert_eq!(
      event,
      KeyResult::Event(FormEvent::Submitted(ProductForm {
        name: "Widget".to_string(),
        sku: "W-1".to_string(),
        stock: "5".to_string(),
        price: "2.50".to_string(),
      }))
    );
    // Parent decides whether to close
    assert!(form.is_active());
  }

  #[test]
  fn test_backtab_wraps_to_price() {
    let mut form = ProductFormInput::new();
    form.show();
    form.handle_key(key(KeyCode::BackTab));
    type_str(&mut form, "9");
    assert_eq!(form.values().price, "9");
  }

  #[test]
  fn test_escape_cancels_and_reset_clears() {
    let mut form = ProductFormInput::new();
    form.show();
    type_str(&mut form, "Widget");
    assert_eq!(
      form.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(FormEvent::Cancelled)
    );
    assert!(!form.is_active());

    form.reset();
    assert_eq!(form.values(), ProductForm::default());
  }
}
