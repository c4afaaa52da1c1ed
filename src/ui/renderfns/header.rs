use crate::ui::theme::Theme;
use crate::ui::view::ShortcutInfo;
use chrono::{DateTime, Local};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// What the header shows besides the shortcuts
pub struct HeaderInfo<'a> {
  pub title: &'a str,
  pub host: &'a str,
  pub count: usize,
  pub synced_at: Option<DateTime<Local>>,
}

/// Draw the header bar with title, store, sync time and shortcuts
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  info: &HeaderInfo,
  shortcuts: &[ShortcutInfo],
  theme: &Theme,
) {
  let bar = theme.bar();
  let dim = bar.add_modifier(Modifier::DIM);

  let mut spans = vec![
    Span::styled(format!(" {} ", info.title), bar.bold()),
    Span::styled("│", dim),
    Span::styled(format!(" {} ", info.host), bar),
    Span::styled("│", dim),
    Span::styled(format!(" {} products ", info.count), bar),
    Span::styled("│", dim),
    Span::styled(format!(" {} ", sync_label(info.synced_at)), dim),
    Span::styled(format!(" {} ", theme.toggle_icon()), bar),
    Span::raw("  "),
  ];

  let mut sorted: Vec<&ShortcutInfo> = shortcuts.iter().collect();
  sorted.sort_by_key(|s| s.priority);
  for shortcut in sorted {
    spans.push(Span::styled(format!("<{}>", shortcut.key), bar.bold()));
    spans.push(Span::styled(format!(" {}   ", shortcut.label), dim));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(bar);
  frame.render_widget(paragraph, area);
}

fn sync_label(synced_at: Option<DateTime<Local>>) -> String {
  match synced_at {
    Some(at) => format!("synced {}", at.format("%H:%M:%S")),
    None => "not synced".to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn test_sync_label() {
    assert_eq!(sync_label(None), "not synced");
    let at = Local.with_ymd_and_hms(2026, 10, 16, 9, 5, 7).unwrap();
    assert_eq!(sync_label(Some(at)), "synced 09:05:07");
  }
}
