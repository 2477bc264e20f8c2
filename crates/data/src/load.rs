use anyhow::{anyhow, Context};
use molegrid_core::GameConfig;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "assets/game.json";
pub const CONFIG_ENV: &str = "MOLEGRID_CONFIG";
pub const LANG_ENV: &str = "MOLEGRID_LANG";

/// Command-line values that win over the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub grid_size: Option<usize>,
    pub seed: Option<u64>,
}

pub fn load_game_config(path: &Path) -> anyhow::Result<GameConfig> {
    let config: GameConfig = load_json(path)?;
    config
        .validate()
        .map_err(|err| anyhow!(err))
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(config)
}

/// Explicit path, then `MOLEGRID_CONFIG`, then `assets/game.json` when it
/// exists, then built-in defaults.
pub fn resolve_game_config(explicit: Option<&Path>) -> anyhow::Result<GameConfig> {
    if let Some(path) = explicit {
        log::info!("loading config from {}", path.display());
        return load_game_config(path);
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
        log::info!("loading config from {} ({CONFIG_ENV})", path.display());
        return load_game_config(&path);
    }
    let fallback = Path::new(DEFAULT_CONFIG_FILE);
    if fallback.exists() {
        log::info!("loading config from {}", fallback.display());
        return load_game_config(fallback);
    }
    log::info!("no config file found, using defaults");
    Ok(GameConfig::default())
}

pub fn apply_overrides(
    mut config: GameConfig,
    overrides: ConfigOverrides,
) -> anyhow::Result<GameConfig> {
    if let Some(grid_size) = overrides.grid_size {
        config.grid_size = grid_size;
    }
    if let Some(seed) = overrides.seed {
        config.seed = Some(seed);
    }
    config
        .validate()
        .map_err(|err| anyhow!(err))
        .context("apply command line overrides")?;
    Ok(config)
}

pub fn normalize_locale(locale: Option<&str>) -> String {
    let raw = locale.unwrap_or("en_US").trim();
    if raw.is_empty() {
        return "en_US".to_string();
    }
    match raw.replace('-', "_").to_ascii_lowercase().as_str() {
        "zh" | "zh_cn" | "zh_hans" | "zh_hans_cn" => "zh_CN".to_string(),
        "en" | "en_us" | "en_gb" => "en_US".to_string(),
        _ => raw.replace('-', "_"),
    }
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
