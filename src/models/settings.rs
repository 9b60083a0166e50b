//! Settings Models
//!
//! Application configuration and settings data structures.

use serde::{Deserialize, Serialize};

/// Default Ollama API endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Model every subject model is derived from
pub const DEFAULT_BASE_MODEL: &str = "mistral";

/// Application configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the Ollama server
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
    /// Base model new subject models are created from
    #[serde(default = "default_base_model")]
    pub base_model: String,
    /// Sampling temperature for chat requests
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Enable debug logging
    #[serde(default)]
    pub debug_mode: bool,
}

fn default_ollama_url() -> String {
    DEFAULT_OLLAMA_URL.to_string()
}

fn default_base_model() -> String {
    DEFAULT_BASE_MODEL.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ollama_url: default_ollama_url(),
            base_model: default_base_model(),
            temperature: default_temperature(),
            debug_mode: false,
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub ollama_url: Option<String>,
    pub base_model: Option<String>,
    pub temperature: Option<f32>,
    pub debug_mode: Option<bool>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(url) = update.ollama_url {
            self.ollama_url = url;
        }
        if let Some(model) = update.base_model {
            self.base_model = model;
        }
        if let Some(temperature) = update.temperature {
            self.temperature = temperature;
        }
        if let Some(debug) = update.debug_mode {
            self.debug_mode = debug;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        match url::Url::parse(&self.ollama_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(parsed) => {
                return Err(format!(
                    "Invalid ollama_url scheme: {}. Must be 'http' or 'https'",
                    parsed.scheme()
                ));
            }
            Err(e) => return Err(format!("Invalid ollama_url {}: {}", self.ollama_url, e)),
        }

        if self.base_model.trim().is_empty() {
            return Err("base_model cannot be empty".to_string());
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }

        Ok(())
    }
}
