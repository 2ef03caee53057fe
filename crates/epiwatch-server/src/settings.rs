//! Runtime configuration.
//!
//! Layered, lowest precedence first: built-in defaults, the TOML file named
//! by `--config`, then `EPIWATCH_*` environment variables. Command-line flags
//! are applied on top by `main`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// SQLite database file.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Directory holding `cases_year.csv` and `cases_month.csv`. Defaults to
  /// the directory of the executable.
  #[serde(default)]
  pub csv_dir:    Option<PathBuf>,
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// Case rows per insert transaction.
  #[serde(default = "default_batch_size")]
  pub batch_size: usize,
}

fn default_store_path() -> PathBuf { PathBuf::from("measles_rubella.db") }

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8501 }

fn default_batch_size() -> usize { epiwatch_store_sqlite::DEFAULT_CASE_BATCH }

impl Settings {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("EPIWATCH").try_parsing(true))
      .build()?
      .try_deserialize()
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let s = Settings::load(Path::new("/nonexistent/epiwatch.toml")).unwrap();
    assert_eq!(s.store_path, PathBuf::from("measles_rubella.db"));
    assert_eq!(s.csv_dir, None);
    assert_eq!(s.port, 8501);
    assert_eq!(s.batch_size, 1000);
  }

  #[test]
  fn file_values_override_defaults() {
    let path = std::env::temp_dir()
      .join(format!("epiwatch-settings-{}.toml", std::process::id()));
    std::fs::write(
      &path,
      "store_path = \"/var/lib/epiwatch/cases.db\"\ncsv_dir = \"/srv/extracts\"\nport = 9000\n",
    )
    .unwrap();

    let s = Settings::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(s.store_path, PathBuf::from("/var/lib/epiwatch/cases.db"));
    assert_eq!(s.csv_dir, Some(PathBuf::from("/srv/extracts")));
    assert_eq!(s.port, 9000);
    assert_eq!(s.host, "127.0.0.1");
  }

  #[test]
  fn tilde_expands_to_home() {
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expand_tilde(Path::new("~/x.db")), PathBuf::from(home).join("x.db"));
    }
    assert_eq!(expand_tilde(Path::new("/abs/x.db")), PathBuf::from("/abs/x.db"));
  }
}
