//! Local preferences kept in a small SQLite database.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::debug;

/// Key under which the dark mode flag is stored
pub const DARK_MODE_KEY: &str = "dark_mode";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Preference store backed by a SQLite connection
pub struct Preferences {
  conn: Connection,
}

impl Preferences {
  /// Open or create the preferences database at `path`
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create state directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open state database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// Use an already open connection (in-memory for tests)
  pub fn with_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(SCHEMA)
      .map_err(|e| eyre!("Failed to run migrations: {}", e))?;
    Ok(Self { conn })
  }

  fn get(&self, key: &str) -> Result<Option<String>> {
    self
      .conn
      .query_row(
        "SELECT value FROM preferences WHERE key = ?1",
        params![key],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read preference {}: {}", key, e))
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    self
      .conn
      .execute(
        "INSERT INTO preferences (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
      )
      .map_err(|e| eyre!("Failed to write preference {}: {}", key, e))?;
    debug!(key, value, "preference saved");
    Ok(())
  }

  /// Dark mode flag; absent means light
  pub fn dark_mode(&self) -> Result<bool> {
    Ok(self.get(DARK_MODE_KEY)?.as_deref() == Some("1"))
  }

  pub fn set_dark_mode(&self, dark: bool) -> Result<()> {
    self.set(DARK_MODE_KEY, if dark { "1" } else { "0" })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn memory() -> Preferences {
    Preferences::with_connection(Connection::open_in_memory().unwrap()).unwrap()
  }

  #[test]
  fn test_dark_mode_defaults_to_light() {
    assert!(!memory().dark_mode().unwrap());
  }

  #[test]
  fn test_dark_mode_round_trip_overwrites() {
    let prefs = memory();
    prefs.set_dark_mode(true).unwrap();
    assert!(prefs.dark_mode().unwrap());
    prefs.set_dark_mode(false).unwrap();
    assert!(!prefs.dark_mode().unwrap());
  }

  #[test]
  fn test_persists_across_connections() {
    let dir = std::env::temp_dir().join(format!("stockroom-prefs-{}", std::process::id()));
    let path = dir.join("state.db");

    Preferences::open(&path).unwrap().set_dark_mode(true).unwrap();
    assert!(Preferences::open(&path).unwrap().dark_mode().unwrap());

    let _ = std::fs::remove_dir_all(&dir);
  }
}
