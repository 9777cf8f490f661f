//! Configuration management for Campaigner.
//!
//! Handles loading configuration from TOML files.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{CampaignError, CampaignResult};

/// Name of the per-directory config file.
pub const LOCAL_CONFIG_FILE: &str = ".campaigner.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Page fetch settings
    pub fetch: FetchConfig,

    /// Completion provider settings
    pub ai: AiConfig,

    /// Analysis stage settings
    pub analysis: AnalysisConfig,

    /// Generation stage settings
    pub generation: GenerationConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// SQLite file holding scheduled posts (`~` is expanded)
    pub database: Option<String>,
}

/// Page fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

/// Completion provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Provider (openai, claude, ollama)
    pub provider: String,

    /// Model override for the selected provider
    pub model: Option<String>,

    /// Base URL override (OpenAI-compatible gateways)
    pub base_url: Option<String>,

    /// Ollama-specific settings
    pub ollama: OllamaConfig,
}

/// Ollama configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama server URL
    pub base_url: String,

    /// Model to use
    pub model: String,
}

/// Analysis stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Page text beyond this many characters is dropped before submission
    pub max_input_chars: usize,

    /// Sampling temperature
    pub temperature: f32,

    /// Completion token limit
    pub max_tokens: u32,
}

/// Generation stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Sampling temperature
    pub temperature: f32,

    /// Completion token limit
    pub max_tokens: u32,

    /// Posts are spread over this many consecutive days
    pub campaign_days: u32,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.campaigner.toml` in current directory
    /// 2. `~/.config/campaigner/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> CampaignResult<Self> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Some(global_config) = Self::global_config_path() {
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CampaignResult<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| CampaignError::Config(format!("{}: {e}", path.display())))
    }

    /// Path of the file `load` would read, if any exists.
    pub fn active_path() -> Option<PathBuf> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }
        Self::global_config_path().filter(|p| p.exists())
    }

    /// Get the global config file path.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("campaigner").join("config.toml"))
    }

    /// Get the data directory path.
    pub fn data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("campaigner"))
    }

    /// Resolve the database file, expanding `~` and falling back to the
    /// data directory (or the working directory when there is none).
    pub fn database_path(&self) -> PathBuf {
        if let Some(ref configured) = self.general.database {
            return PathBuf::from(shellexpand::tilde(configured).into_owned());
        }

        Self::data_dir().map_or_else(|| PathBuf::from("campaign.db"), |d| d.join("campaign.db"))
    }

    /// Render as pretty TOML.
    pub fn to_toml(&self) -> CampaignResult<String> {
        toml::to_string_pretty(self).map_err(|e| CampaignError::Config(e.to_string()))
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { database: None }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            base_url: None,
            ollama: OllamaConfig::default(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self { base_url: "http://localhost:11434".to_string(), model: "llama3.2".to_string() }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { max_input_chars: 15_000, temperature: 0.7, max_tokens: 2048 }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { temperature: 0.8, max_tokens: 4096, campaign_days: 7 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.fetch.timeout_secs, 10);
        assert_eq!(config.ai.provider, "openai");
        assert_eq!(config.analysis.max_input_chars, 15_000);
        assert_eq!(config.generation.campaign_days, 7);
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = Config::default().to_toml().unwrap();
        assert!(toml_str.contains("[fetch]"));
        assert!(toml_str.contains("[generation]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            database = "/tmp/posts.db"

            [ai]
            provider = "ollama"

            [ai.ollama]
            model = "mistral"

            [generation]
            campaign_days = 5
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ai.provider, "ollama");
        assert_eq!(config.ai.ollama.model, "mistral");
        assert_eq!(config.ai.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.generation.campaign_days, 5);
        assert!((config.generation.temperature - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.database_path(), PathBuf::from("/tmp/posts.db"));
    }

    #[test]
    fn test_load_from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[fetch]\ntimeout_secs = \"soon\"").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }
}
