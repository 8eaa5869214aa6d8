use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "pdfquiz";

pub const MIN_QUESTION_COUNT: usize = 1;
pub const MAX_QUESTION_COUNT: usize = 50;

const API_KEY_VAR: &str = "OPENAI_API_KEY";
const API_KEY_PLACEHOLDER: &str = "your_openai_api_key_here";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    #[serde(default = "default_pdf_dir")]
    pub pdf_dir: PathBuf,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_question_count")]
    pub default_question_count: usize,
    #[serde(default = "default_preview_length")]
    pub preview_length: usize,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

fn default_database_path() -> PathBuf {
    data_dir().join("test_generator.db")
}
fn default_pdf_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}
fn default_theme() -> String {
    "default".to_string()
}
fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_request_timeout_secs() -> u64 {
    120
}
fn default_question_count() -> usize {
    5
}
fn default_preview_length() -> usize {
    200
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            pdf_dir: default_pdf_dir(),
            theme: default_theme(),
            openai_model: default_openai_model(),
            openai_base_url: default_openai_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            default_question_count: default_question_count(),
            preview_length: default_preview_length(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str::<Config>(&content)?
        } else {
            Config::default()
        };
        config.normalize();
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Clamp values a hand-edited file may have pushed out of range.
    pub fn normalize(&mut self) {
        self.default_question_count = self
            .default_question_count
            .clamp(MIN_QUESTION_COUNT, MAX_QUESTION_COUNT);
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = default_request_timeout_secs();
        }
    }
}

/// The generation credential from the environment, if a real one is set.
/// Call after `dotenvy::dotenv()` so a local `.env` file is honoured.
pub fn openai_api_key() -> Option<String> {
    let key = usable_api_key(std::env::var(API_KEY_VAR).ok());
    if key.is_none() {
        tracing::warn!("{API_KEY_VAR} not set or using placeholder; question generation is disabled");
    }
    key
}

fn usable_api_key(raw: Option<String>) -> Option<String> {
    raw.map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && k != API_KEY_PLACEHOLDER)
}
