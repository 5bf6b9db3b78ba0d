use std::{collections::HashMap, fs};

const SETTINGS_FILE: &str = "r2ol.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
        }
    }
}

/// Defaults, overridden by `r2ol.toml` in the working directory,
/// overridden by environment variables.
pub fn load_settings() -> Settings {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    build_settings(file.as_deref(), |key| std::env::var(key).ok())
}

pub(crate) fn build_settings(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
            if let Some(v) = file_cfg.get("server_url") {
                settings.server_url = v.clone();
            }
        }
    }

    if let Some(v) = env("R2OL_SERVER_URL") {
        settings.server_url = v;
    }

    settings
}
