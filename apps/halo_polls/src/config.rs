use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::ValueEnum;
use client_core::DEFAULT_STORAGE_KEY;
use tracing::warn;

pub const CONFIG_FILE: &str = "halo_polls.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Local,
    Remote,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Backend::Local),
            "remote" => Ok(Backend::Remote),
            other => Err(format!("unknown backend '{other}', expected 'local' or 'remote'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend: Backend,
    pub database_url: String,
    pub api_base_url: String,
    pub storage_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: Backend::Local,
            database_url: "sqlite://./data/halo_polls.db".into(),
            api_base_url: "http://127.0.0.1:8080".into(),
            storage_key: DEFAULT_STORAGE_KEY.into(),
        }
    }
}

pub fn load_settings(config_path: Option<&Path>) -> Settings {
    let path = config_path.map_or_else(|| PathBuf::from(CONFIG_FILE), Path::to_path_buf);
    load_settings_from(&path, |key| std::env::var(key).ok())
}

/// Defaults, then the optional TOML file, then environment variables.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("backend") {
                    apply_backend(&mut settings, v);
                }
                if let Some(v) = file_cfg.get("database_url") {
                    settings.database_url = v.clone();
                }
                if let Some(v) = file_cfg.get("api_base_url") {
                    settings.api_base_url = v.clone();
                }
                if let Some(v) = file_cfg.get("storage_key").filter(|v| !v.trim().is_empty()) {
                    settings.storage_key = v.clone();
                }
            }
            Err(error) => warn!(path = %path.display(), %error, "ignoring unreadable config file"),
        }
    }

    for key in ["HALO_POLLS_BACKEND", "APP__BACKEND"] {
        if let Some(v) = env(key) {
            apply_backend(&mut settings, &v);
        }
    }
    for key in ["DATABASE_URL", "APP__DATABASE_URL"] {
        if let Some(v) = env(key) {
            settings.database_url = v;
        }
    }
    for key in ["HALO_POLLS_API_URL", "APP__API_BASE_URL"] {
        if let Some(v) = env(key) {
            settings.api_base_url = v;
        }
    }
    if let Some(v) = env("HALO_POLLS_STORAGE_KEY") {
        if !v.trim().is_empty() {
            settings.storage_key = v;
        }
    }

    settings
}

fn apply_backend(settings: &mut Settings, raw: &str) {
    match raw.parse() {
        Ok(backend) => settings.backend = backend,
        Err(error) => warn!(%error, "keeping backend {:?}", settings.backend),
    }
}

/// Turns a plain file path into a sqlite url. Opening the store creates any
/// missing parent directory.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
