use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub store: StoreConfig,
  /// Custom title for header (defaults to "stockroom")
  pub title: Option<String>,
  /// Where preferences are kept (defaults to $XDG_DATA_HOME/stockroom/state.db)
  pub state_db: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// Base URL of the hosted database service, e.g. https://xyz.supabase.co
  pub url: Option<String>,
  #[serde(default = "default_table")]
  pub table: String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self {
      url: None,
      table: default_table(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

fn default_table() -> String {
  "products".to_string()
}

fn default_timeout_secs() -> u64 {
  30
}

impl Config {
  /// Load configuration from file, then apply environment overrides.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./stockroom.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/stockroom/config.yaml
  ///
  /// Unlike an explicit path, a missing file in the default locations is fine:
  /// everything can come from the environment.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    if let Ok(url) = std::env::var("STOCKROOM_URL") {
      if !url.trim().is_empty() {
        config.store.url = Some(url);
      }
    }

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("stockroom.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("stockroom").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    // An empty file deserializes to null
    if contents.trim().is_empty() {
      return Ok(Config::default());
    }
    serde_yaml::from_str(contents)
  }

  /// The store base URL, without a trailing slash.
  pub fn store_url(&self) -> Result<&str> {
    self
      .store
      .url
      .as_deref()
      .map(|u| u.trim().trim_end_matches('/'))
      .filter(|u| !u.is_empty())
      .ok_or_else(|| {
        eyre!(
          "Store URL not configured. Set STOCKROOM_URL, pass --url, or set store.url in the config file."
        )
      })
  }

  /// Header title
  pub fn title(&self) -> &str {
    self.title.as_deref().unwrap_or("stockroom")
  }

  /// Get the store access key from environment variables.
  ///
  /// Checks STOCKROOM_API_KEY first, then SUPABASE_ANON_KEY as fallback.
  /// The key is never read from the config file.
  pub fn get_api_key() -> Result<String> {
    std::env::var("STOCKROOM_API_KEY")
      .or_else(|_| std::env::var("SUPABASE_ANON_KEY"))
      .ok()
      .filter(|k| !k.trim().is_empty())
      .ok_or_else(|| {
        eyre!("Store access key not found. Set STOCKROOM_API_KEY or SUPABASE_ANON_KEY environment variable.")
      })
  }

  /// Default location of the local state database
  pub fn state_db_path(&self) -> Result<PathBuf> {
    if let Some(path) = &self.state_db {
      return Ok(path.clone());
    }
    Ok(data_dir()?.join("state.db"))
  }
}

/// $XDG_DATA_HOME/stockroom, falling back to ~/.local/share/stockroom
pub fn data_dir() -> Result<PathBuf> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("stockroom"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_apply_to_missing_keys() {
    let config = Config::parse("store:\n  url: https://demo.supabase.co/\n").unwrap();
    assert_eq!(config.store.table, "products");
    assert_eq!(config.store.timeout_secs, 30);
    assert_eq!(config.store_url().unwrap(), "https://demo.supabase.co");
    assert_eq!(config.title(), "stockroom");
  }

  #[test]
  fn test_empty_file_is_default() {
    let config = Config::parse("").unwrap();
    assert!(config.store.url.is_none());
    assert!(config.store_url().is_err());
  }

  #[test]
  fn test_full_config() {
    let yaml = r#"
title: Warehouse
state_db: /tmp/stockroom-test.db
store:
  url: https://demo.supabase.co
  table: inventory
  timeout_secs: 5
"#;
    let config = Config::parse(yaml).unwrap();
    assert_eq!(config.title(), "Warehouse");
    assert_eq!(config.store.table, "inventory");
    assert_eq!(config.store.timeout_secs, 5);
    assert_eq!(
      config.state_db_path().unwrap(),
      PathBuf::from("/tmp/stockroom-test.db")
    );
  }

  #[test]
  fn test_blank_url_is_not_configured() {
    let config = Config::parse("store:\n  url: \"  \"\n").unwrap();
    assert!(config.store_url().is_err());
  }
}
