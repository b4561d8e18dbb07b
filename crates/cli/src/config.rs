use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/whopaid.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// Directory of the local mirror document.
    pub data_dir: PathBuf,
    /// Use the local mirror instead of the server.
    pub local: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            data_dir: PathBuf::from("data"),
            local: false,
        }
    }
}

/// Command line overrides, applied on top of file and environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub config: Option<String>,
    pub base_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub local: bool,
}

pub fn load(overrides: Overrides) -> Result<AppConfig> {
    let config_path = overrides.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("WHOPAID_CLI"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = overrides.base_url {
        settings.base_url = base_url;
    }
    if let Some(data_dir) = overrides.data_dir {
        settings.data_dir = data_dir;
    }
    if overrides.local {
        settings.local = true;
    }

    Ok(settings)
}
