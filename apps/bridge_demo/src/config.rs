use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Serialize;
use sync_core::DEFAULT_QUIESCENCE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub quiescence_ms: u64,
    pub log_filter: String,
    pub route_vertex_moves: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quiescence_ms: u64::try_from(DEFAULT_QUIESCENCE.as_millis()).unwrap_or(u64::MAX),
            log_filter: "info".into(),
            route_vertex_moves: false,
        }
    }
}

impl Settings {
    pub fn quiescence(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }
}

/// Defaults, then `path` if it exists, then the process environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        apply_file_overrides(&mut settings, &raw)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?;
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file_overrides(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: HashMap<String, String> = toml::from_str::<HashMap<String, toml::Value>>(raw)?
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect();

    if let Some(v) = file_cfg.get("quiescence_ms") {
        settings.quiescence_ms = v
            .parse()
            .with_context(|| format!("quiescence_ms must be an integer, got '{v}'"))?;
    }
    if let Some(v) = file_cfg.get("log_filter") {
        settings.log_filter = v.clone();
    }
    if let Some(v) = file_cfg.get("route_vertex_moves") {
        settings.route_vertex_moves = parse_flag(v)
            .with_context(|| format!("route_vertex_moves must be true or false, got '{v}'"))?;
    }
    Ok(())
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("BRIDGE_QUIESCENCE_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.quiescence_ms = parsed;
        }
    }
    if let Some(v) = lookup("APP__QUIESCENCE_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.quiescence_ms = parsed;
        }
    }

    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if let Some(v) = lookup("APP__ROUTE_VERTEX_MOVES") {
        if let Some(flag) = parse_flag(&v) {
            settings.route_vertex_moves = flag;
        }
    }
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
