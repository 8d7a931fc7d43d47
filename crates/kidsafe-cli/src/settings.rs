//! Layered configuration: an optional TOML file under `KIDSAFE_` environment
//! variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use kidsafe_tracking::TrackingConfig;
use serde::Deserialize;

/// Runtime configuration, deserialised from `kidsafe.toml`.
///
/// ```toml
/// store_path = "~/.local/share/kidsafe/kidsafe.db"
///
/// [tracking]
/// sample_interval_ms = 3000
/// low_battery_percent = 20.0
/// ```
///
/// Environment overrides use `__` between levels, e.g.
/// `KIDSAFE_TRACKING__SAMPLE_INTERVAL_MS=1000`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub tracking:   TrackingConfig,
}

fn default_store_path() -> PathBuf { PathBuf::from("kidsafe.db") }

impl Settings {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(
        config::Environment::with_prefix("KIDSAFE")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    let mut settings: Self = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    settings.store_path = expand_tilde(&settings.store_path);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
