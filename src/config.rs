use std::path::{Path, PathBuf};

use config::{ConfigError, FileFormat};
use serde::{Deserialize, Serialize};

use crate::utils::{PROJECT_NAME, get_config_dir, get_data_dir};

const CONFIG: &str = include_str!("../.config/config.json5");

const CONFIG_FILES: [(&str, FileFormat); 4] = [
  ("config.json5", FileFormat::Json5),
  ("config.json", FileFormat::Json),
  ("config.yaml", FileFormat::Yaml),
  ("config.toml", FileFormat::Toml),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
  pub base_url: String,
  #[serde(default)]
  pub token: Option<String>,
  pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
  /// How long a toast stays on screen.
  pub toast_secs: u64,
  pub page_size: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub _data_dir: PathBuf,
  #[serde(default)]
  pub _config_dir: PathBuf,
  pub api: ApiConfig,
  pub ui: UiConfig,
}

impl Config {
  pub fn new() -> Result<Self, ConfigError> {
    Self::load(&get_config_dir())
  }

  /// Layers the built-in defaults, any config file found in `config_dir`, then
  /// `ITEM_ADMIN_*` environment variables (`ITEM_ADMIN_API__BASE_URL`, ...).
  pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
    let default_config: Config =
      json5::from_str(CONFIG).map_err(|e| ConfigError::Message(format!("Invalid built-in config: {}", e)))?;
    let data_dir = get_data_dir();

    let mut builder = config::Config::builder()
      .set_default("_data_dir", data_dir.to_string_lossy().to_string())?
      .set_default("_config_dir", config_dir.to_string_lossy().to_string())?
      .set_default("api.base_url", default_config.api.base_url)?
      .set_default("api.timeout_secs", default_config.api.timeout_secs)?
      .set_default("ui.toast_secs", default_config.ui.toast_secs)?
      .set_default("ui.page_size", default_config.ui.page_size as u64)?;

    for (file, format) in &CONFIG_FILES {
      builder = builder.add_source(config::File::from(config_dir.join(file)).format(*format).required(false));
    }
    builder = builder
      .add_source(config::Environment::with_prefix(&PROJECT_NAME).prefix_separator("_").separator("__"));

    builder.build()?.try_deserialize()
  }
}
