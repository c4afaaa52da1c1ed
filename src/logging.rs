//! File logging. The terminal belongs to the UI, so logs never go to stdout.

use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config;

/// Install the global subscriber writing to `log_file` (default
/// $XDG_DATA_HOME/stockroom/stockroom.log). Filter comes from RUST_LOG,
/// defaulting to info.
///
/// Keep the returned guard alive for the lifetime of the program, dropping it
/// flushes pending lines.
pub fn init(log_file: Option<&Path>) -> Result<WorkerGuard> {
  let path = match log_file {
    Some(p) => p.to_path_buf(),
    None => config::data_dir()?.join("stockroom.log"),
  };
  let (dir, file_name) = split_path(&path)?;

  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::never(&dir, file_name);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to install logger: {}", e))?;

  Ok(guard)
}

fn split_path(path: &Path) -> Result<(PathBuf, &std::ffi::OsStr)> {
  let file_name = path
    .file_name()
    .ok_or_else(|| eyre!("Log file path has no file name: {}", path.display()))?;
  let dir = match path.parent() {
    Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
    _ => PathBuf::from("."),
  };
  Ok((dir, file_name))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_split_bare_file_name_uses_current_dir() {
    let (dir, name) = split_path(Path::new("stockroom.log")).unwrap();
    assert_eq!(dir, PathBuf::from("."));
    assert_eq!(name, "stockroom.log");
  }

  #[test]
  fn test_split_nested_path() {
    let (dir, name) = split_path(Path::new("/var/log/stockroom/app.log")).unwrap();
    assert_eq!(dir, PathBuf::from("/var/log/stockroom"));
    assert_eq!(name, "app.log");
  }

  #[test]
  fn test_directory_only_path_is_rejected() {
    assert!(split_path(Path::new("/")).is_err());
  }
}
