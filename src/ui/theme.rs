use ratatui::prelude::*;

/// Light or dark palette for the whole screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Theme {
  pub dark: bool,
}

impl Theme {
  pub fn new(dark: bool) -> Self {
    Self { dark }
  }

  pub fn toggled(self) -> Self {
    Self { dark: !self.dark }
  }

  pub fn base(&self) -> Style {
    if self.dark {
      Style::default().fg(Color::Gray).bg(Color::Black)
    } else {
      Style::default().fg(Color::Black).bg(Color::White)
    }
  }

  /// Header bar, the emerald strip
  pub fn bar(&self) -> Style {
    Style::default().fg(Color::White).bg(if self.dark {
      Color::Rgb(6, 78, 59)
    } else {
      Color::Rgb(5, 150, 105)
    })
  }

  pub fn accent(&self) -> Color {
    if self.dark {
      Color::LightGreen
    } else {
      Color::Green
    }
  }

  pub fn muted(&self) -> Color {
    Color::DarkGray
  }

  pub fn error(&self) -> Color {
    if self.dark {
      Color::LightRed
    } else {
      Color::Red
    }
  }

  pub fn border(&self) -> Style {
    Style::default().fg(if self.dark { Color::Gray } else { Color::Blue })
  }

  pub fn highlight(&self) -> Style {
    let bg = if self.dark {
      Color::DarkGray
    } else {
      Color::Rgb(226, 232, 240)
    };
    Style::default().bg(bg).add_modifier(Modifier::BOLD)
  }

  /// Background for every other table row
  pub fn stripe(&self) -> Style {
    if self.dark {
      Style::default().bg(Color::Rgb(24, 24, 27))
    } else {
      Style::default().bg(Color::Rgb(248, 250, 252))
    }
  }

  /// Theme toggle glyph: the mode you switch to
  pub fn toggle_icon(&self) -> &'static str {
    if self.dark {
      "☀"
    } else {
      "☾"
    }
  }
}
