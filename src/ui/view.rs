/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Things a view asks the App to do in response to user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
  /// No action needed
  None,
  /// Flip dark mode and persist it
  ToggleTheme,
  /// Leave the application
  Quit,
}
