use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tally_finance::categorizer::{DEFAULT_CALL_CAP, DEFAULT_CALL_DELAY};
use tally_finance::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use tally_finance::CategorizerConfig;

use crate::state::ensure_tally_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierSection,
    #[serde(default)]
    pub parser: ParserSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSection {
    /// Consult the external classifier without passing --ai
    pub enabled: bool,
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    /// Most external calls per statement
    pub call_cap: usize,
    /// Gap between external calls
    pub delay_ms: u64,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserSection {
    /// IANA zone used to pick the fallback statement year
    pub timezone: String,
    pub layout: String,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "openai".to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            call_cap: DEFAULT_CALL_CAP,
            delay_ms: DEFAULT_CALL_DELAY.as_millis() as u64,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl Default for ParserSection {
    fn default() -> Self {
        Self {
            timezone: "America/Mexico_City".to_string(),
            layout: "bbva-mx".to_string(),
        }
    }
}

impl ClassifierSection {
    pub fn categorizer_config(&self, ai_enabled: bool, call_cap: Option<usize>) -> CategorizerConfig {
        CategorizerConfig {
            ai_enabled,
            call_cap: call_cap.unwrap_or(self.call_cap),
            call_delay: Duration::from_millis(self.delay_ms),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let p = config_path()?;
    let cfg = load_config()?;
    if !p.exists() {
        println!("# {} not found, showing defaults", p.display());
    }
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}
