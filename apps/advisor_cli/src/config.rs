use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use client_core::{transport::normalize_base_url, DEFAULT_BASE_URL, DEFAULT_TYPING_DELAY};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "finwise.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub typing_delay: Duration,
    pub request_timeout: Option<Duration>,
    pub file_banner: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            typing_delay: DEFAULT_TYPING_DELAY,
            request_timeout: None,
            file_banner: client_core::screens::pdf::DEFAULT_FILE_BANNER_TTL,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    base_url: Option<String>,
    typing_delay_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    file_banner_secs: Option<u64>,
}

impl Settings {
    pub fn apply_file(&mut self, raw: &str) -> anyhow::Result<()> {
        let file_cfg: FileSettings = toml::from_str(raw).context("invalid config file")?;
        if let Some(v) = file_cfg.base_url {
            self.base_url = v;
        }
        if let Some(v) = file_cfg.typing_delay_ms {
            self.typing_delay = Duration::from_millis(v);
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            self.request_timeout = timeout_from_secs(v);
        }
        if let Some(v) = file_cfg.file_banner_secs {
            self.file_banner = Duration::from_secs(v);
        }
        Ok(())
    }

    /// Later names win, so `APP__*` overrides the short form.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("FINWISE_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = var("APP__BASE_URL") {
            self.base_url = v;
        }

        if let Some(v) = var("APP__TYPING_DELAY_MS") {
            if let Ok(parsed) = v.trim().parse::<u64>() {
                self.typing_delay = Duration::from_millis(parsed);
            }
        }

        if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
            if let Ok(parsed) = v.trim().parse::<u64>() {
                self.request_timeout = timeout_from_secs(parsed);
            }
        }
    }

    pub fn apply_cli(&mut self, base_url: Option<&str>) {
        if let Some(v) = base_url {
            self.base_url = v.to_string();
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        normalize_base_url(&self.base_url)
            .with_context(|| format!("base url '{}' is not usable", self.base_url))?;
        Ok(())
    }
}

/// Zero means no timeout.
fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Defaults, then the config file, then the environment, then CLI flags.
///
/// An explicit `config` path must exist; the default `finwise.toml` is
/// optional.
pub fn load_settings(config: Option<&Path>, base_url: Option<&str>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => settings
            .apply_file(&raw)
            .with_context(|| format!("failed to load '{}'", path.display()))?,
        Err(err) if required || err.kind() != std::io::ErrorKind::NotFound => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()));
        }
        Err(_) => {}
    }

    settings.apply_env(|key| std::env::var(key).ok());
    settings.apply_cli(base_url);
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
