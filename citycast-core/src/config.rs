use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const USERS_FILE_NAME: &str = "users.json";

/// Where and how to reach the weather provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound for a whole request, connect to last body byte.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// users_file = "/srv/citycast/users.json"
///
/// [api]
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_key: Option<String>,

    /// Location of the user store; defaults to the platform data directory.
    pub users_file: Option<PathBuf>,

    #[serde(default)]
    pub api: ApiSettings,
}

impl Config {
    /// Load config from the platform config directory, then apply environment
    /// overrides. A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let cfg = Self::load_from(&path)?;
        Ok(cfg.with_env_overrides())
    }

    /// Load config from `path`, or return an empty default if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform config directory.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the user store, explicit or in the platform data directory.
    pub fn users_file_path(&self) -> Result<PathBuf> {
        match &self.users_file {
            Some(path) => Ok(path.clone()),
            None => Ok(project_dirs()?.data_dir().join(USERS_FILE_NAME)),
        }
    }

    /// Replace the stored API key with `OPENWEATHER_API_KEY` when it is set.
    pub fn with_env_overrides(self) -> Self {
        self.with_api_key_override(std::env::var(API_KEY_ENV).ok())
    }

    /// A blank override keeps the stored key.
    fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.as_deref().map(str::trim).filter(|key| !key.is_empty()) {
            self.api_key = Some(key.to_string());
        }
        self
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Returns the API key, if a non-blank one is present.
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "citycast", "citycast")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_not_configured() {
        let cfg = Config::default();
        assert!(!cfg.is_configured());
        assert_eq!(cfg.api.timeout_secs, 10);
        assert_eq!(cfg.api.base_url, "https://api.openweathermap.org/data/2.5");
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".into());
        assert!(!cfg.is_configured());

        cfg.set_api_key(" OPEN_KEY ".into());
        assert_eq!(cfg.api_key().as_deref(), Some("OPEN_KEY"));
    }

    #[test]
    fn env_key_replaces_stored_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("STORED".into());

        let cfg = cfg.with_api_key_override(Some(" FROM_ENV ".into()));
        assert_eq!(cfg.api_key().as_deref(), Some("FROM_ENV"));
    }

    #[test]
    fn blank_or_unset_env_key_keeps_stored_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("STORED".into());

        let cfg = cfg.with_api_key_override(Some("   ".into()));
        assert_eq!(cfg.api_key().as_deref(), Some("STORED"));

        let cfg = cfg.with_api_key_override(None);
        assert_eq!(cfg.api_key().as_deref(), Some("STORED"));
    }

    #[test]
    fn env_key_configures_an_empty_config() {
        let cfg = Config::default().with_api_key_override(Some("FROM_ENV".into()));
        assert!(cfg.is_configured());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("OPEN_KEY".into());
        cfg.users_file = Some(dir.path().join("users.json"));
        cfg.api.timeout_secs = 3;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_api_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = \"K\"\n[api]\ntimeout_secs = 4\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key().as_deref(), Some("K"));
        assert_eq!(loaded.api.timeout_secs, 4);
        assert_eq!(loaded.api.base_url, "https://api.openweathermap.org/data/2.5");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn explicit_users_file_wins() {
        let cfg = Config {
            users_file: Some(PathBuf::from("/tmp/citycast-users.json")),
            ..Config::default()
        };
        assert_eq!(
            cfg.users_file_path().unwrap(),
            PathBuf::from("/tmp/citycast-users.json")
        );
    }
}
