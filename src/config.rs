// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_TARGETS_PATH: &str = "TARGETS_PATH";

/// One search the harvester runs per cycle: a term plus where to look.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchTarget {
    pub term: String,
    /// Human label, e.g. "Argentina".
    pub location: String,
    /// Locale/country code the source adapter understands, e.g. "argentina".
    pub country: String,
}

/// Explicit runtime configuration, built once at startup and handed into each
/// component. Nothing in the core reads the environment after this point.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub groq_model: String,

    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,

    pub store_dir: PathBuf,
    pub profile_path: PathBuf,
    pub board_url: String,

    pub targets: Vec<SearchTarget>,
    pub results_per_target: u32,
    pub recency_hours: u32,
    pub harvest_interval: Duration,
}

impl Config {
    /// Read configuration from the environment. The inference API key is the
    /// only hard requirement; everything else defaults or degrades.
    pub fn from_env() -> Result<Self> {
        let groq_api_key = std::env::var("GROQ_API_KEY")
            .map_err(|_| anyhow!("GROQ_API_KEY environment variable is required"))?;

        let groq_model = std::env::var("GROQ_MODEL")
            .unwrap_or_else(|_| "llama-3.3-70b-versatile".to_string());

        let telegram_bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|v| !v.is_empty());
        let telegram_chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .ok()
            .filter(|v| !v.is_empty());

        let store_dir = std::env::var("STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/postings"));
        let profile_path = std::env::var("PROFILE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("cv.json"));
        let board_url = std::env::var("JOB_BOARD_URL")
            .unwrap_or_else(|_| "https://jobboard.example/api/search".to_string());

        let targets = load_targets_default()?;

        Ok(Self {
            groq_api_key,
            groq_model,
            telegram_bot_token,
            telegram_chat_id,
            store_dir,
            profile_path,
            board_url,
            targets,
            results_per_target: env_u32("RESULTS_PER_TARGET", 15),
            recency_hours: env_u32("RECENCY_HOURS", 24),
            harvest_interval: Duration::from_secs(env_u32("HARVEST_INTERVAL_SECS", 300) as u64),
        })
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Load search targets using env var + fallbacks:
/// 1) $TARGETS_PATH
/// 2) config/targets.toml
/// 3) built-in defaults
pub fn load_targets_default() -> Result<Vec<SearchTarget>> {
    if let Ok(p) = std::env::var(ENV_TARGETS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_targets_from(&pb);
        }
        return Err(anyhow!("TARGETS_PATH points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/targets.toml");
    if toml_p.exists() {
        return load_targets_from(&toml_p);
    }
    Ok(default_targets())
}

/// Load targets from an explicit path. Supports TOML or JSON formats.
pub fn load_targets_from(path: &Path) -> Result<Vec<SearchTarget>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading search targets from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_targets(&content, ext.as_str())
}

fn parse_targets(s: &str, hint_ext: &str) -> Result<Vec<SearchTarget>> {
    #[derive(Deserialize)]
    struct TomlTargets {
        targets: Vec<SearchTarget>,
    }
    if hint_ext == "toml" || s.contains("[[targets]]") {
        if let Ok(v) = toml::from_str::<TomlTargets>(s) {
            return Ok(v.targets);
        }
    }
    if let Ok(v) = serde_json::from_str::<Vec<SearchTarget>>(s) {
        return Ok(v);
    }
    Err(anyhow!("unsupported targets format"))
}

/// The baked-in search plan: one term across the Spanish-speaking markets.
pub fn default_targets() -> Vec<SearchTarget> {
    const COUNTRIES: &[(&str, &str)] = &[
        ("Argentina", "argentina"),
        ("Spain", "spain"),
        ("Mexico", "mexico"),
        ("Colombia", "colombia"),
        ("Chile", "chile"),
        ("Peru", "peru"),
        ("Ecuador", "ecuador"),
        ("Uruguay", "uruguay"),
        ("Costa Rica", "costa rica"),
        ("Panama", "panama"),
    ];
    COUNTRIES
        .iter()
        .map(|(loc, country)| SearchTarget {
            term: "Python Developer".to_string(),
            location: loc.to_string(),
            country: country.to_string(),
        })
        .collect()
}
