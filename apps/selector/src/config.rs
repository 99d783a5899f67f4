use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "selector.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_url: String,
    pub request_timeout_secs: u64,
    pub touch_device: bool,
    pub bearer_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://lvh.me:8000".into(),
            request_timeout_secs: 15,
            touch_device: false,
            bearer_token: None,
        }
    }
}

/// Command-line values that take precedence over file and environment.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub server_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub touch_device: bool,
}

/// Defaults, then the config file, then the environment, then the CLI.
pub fn load_settings(cli: &CliOverrides) -> anyhow::Result<Settings> {
    let mut settings = match &cli.config_path {
        Some(path) => read_settings_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            read_settings_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => Settings::default(),
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;

    if let Some(v) = &cli.server_url {
        settings.server_url = v.clone();
    }
    if let Some(v) = cli.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if cli.touch_device {
        settings.touch_device = true;
    }

    if settings.request_timeout_secs == 0 {
        bail!("request timeout must be at least one second");
    }
    Ok(settings)
}

pub fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid config file '{}'", path.display()))
}

pub fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("SELECTOR_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = v
            .trim()
            .parse()
            .with_context(|| format!("APP__REQUEST_TIMEOUT_SECS must be an integer, got '{v}'"))?;
    }

    if let Some(v) = lookup("APP__TOUCH_DEVICE") {
        settings.touch_device = parse_flag(&v)
            .with_context(|| format!("APP__TOUCH_DEVICE must be a boolean, got '{v}'"))?;
    }

    if let Some(v) = lookup("APP__BEARER_TOKEN") {
        let v = v.trim();
        settings.bearer_token = (!v.is_empty()).then(|| v.to_string());
    }

    Ok(())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
