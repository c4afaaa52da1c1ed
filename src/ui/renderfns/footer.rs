use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Busy and error state shown at the bottom of the screen
#[derive(Debug, Default)]
pub struct FooterStatus<'a> {
  pub error: Option<&'a str>,
  pub loading: bool,
  pub saving: bool,
  pub deleting: bool,
}

/// Draw the footer line: the last error, otherwise busy indicators
pub fn draw_footer(frame: &mut Frame, area: Rect, status: &FooterStatus, theme: &Theme) {
  let mut spans = vec![Span::raw(" ")];

  if let Some(error) = status.error {
    spans.push(Span::styled(error.to_string(), Style::default().fg(theme.error())));
    spans.push(Span::raw("  "));
  }

  let busy: Vec<&str> = [
    (status.loading, "Loading…"),
    (status.saving, "Saving…"),
    (status.deleting, "Deleting…"),
  ]
  .into_iter()
  .filter_map(|(on, label)| on.then_some(label))
  .collect();

  if !busy.is_empty() {
    spans.push(Span::styled(
      busy.join("  "),
      Style::default().fg(theme.muted()).italic(),
    ));
  }

  frame.render_widget(Paragraph::new(Line::from(spans)).style(theme.base()), area);
}
