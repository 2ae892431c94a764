//! Configuration file support

use serde::{Deserialize, Serialize};
use socratic_ai::{DEFAULT_MODEL, DEFAULT_TEMPERATURE, providers::resolve_api_key};
use std::fs;
use std::path::PathBuf;

/// Configuration for socratic
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model to use
    pub model: Option<String>,
    /// Sampling temperature, 0.0 to 2.0
    pub temperature: Option<f32>,
    /// API root override (e.g. a proxy)
    pub base_url: Option<String>,
    /// API key (alternative to environment variables)
    pub api_key: Option<String>,
    /// Where Ctrl+E and --export write socratic_logs.json
    pub export_dir: Option<PathBuf>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("socratic")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("SOCRATIC_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Parse config file content
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load config from file; problems fall back to defaults with a warning
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Write the example config if no file exists yet
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, example_config())?;
        Ok(path)
    }

    pub fn model(&self) -> String {
        self.model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    /// Configured temperature, or the default when unset or out of range
    pub fn temperature(&self) -> f32 {
        match self.temperature {
            Some(t) if (0.0..=2.0).contains(&t) => t,
            Some(t) => {
                tracing::warn!(temperature = t, "temperature out of range, using default");
                DEFAULT_TEMPERATURE
            }
            None => DEFAULT_TEMPERATURE,
        }
    }

    /// API key from the config file, then from the environment
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with(|var| std::env::var(var).ok())
    }

    fn api_key_with<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        resolve_api_key(self.api_key.as_deref(), lookup).ok()
    }

    /// Export directory, defaulting to the working directory
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# socratic configuration file
# Place at ~/.config/socratic/config.toml (Linux), ~/Library/Application Support/socratic/config.toml (Mac)
# or %APPDATA%\socratic\config.toml (Windows). SOCRATIC_CONFIG_PATH overrides the location.

# Model to use
model = "gemini-3-flash-preview"

# Sampling temperature (0.0 - 2.0)
temperature = 0.7

# API root, for proxies (optional)
# base_url = "https://generativelanguage.googleapis.com/v1beta"

# Directory for exported conversation logs (optional, defaults to the working directory)
# export_dir = "~/socratic-logs"

# API key (optional - API_KEY, GEMINI_API_KEY or GOOGLE_API_KEY also work)
# It's recommended to use environment variables instead for security
# api_key = "..."
"#
}
