use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host (and port) serving the debate socket
    pub host: String,

    /// Path of the socket endpoint on that host
    pub ws_path: String,

    /// Fixed delay before each reconnect attempt
    pub reconnect_delay_ms: u64,

    /// UI preferences
    pub ui: UiConfig,
}

/// UI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Composer label once the connection is open
    pub action_label: String,
    /// Composer label while not connected
    pub connecting_label: String,
    /// Render the bots' thought panes
    pub show_thoughts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1:8000".to_string(),
            ws_path: "/ws".to_string(),
            reconnect_delay_ms: 3000,
            ui: UiConfig::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            action_label: "Start Debate".to_string(),
            connecting_label: "Connecting...".to_string(),
            show_thoughts: true,
        }
    }
}

impl Config {
    /// Directory holding the config file and the log
    pub fn home_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".debate-panels"))
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("config.toml"))
    }

    /// Load configuration from `path`, or the default location. A missing
    /// file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))
    }

    /// Save configuration to `path`, creating its directory if needed
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = self.to_toml()?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Apply command line overrides
    pub fn with_host(mut self, host: Option<String>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        self
    }

    /// `ws://<host><path>`
    pub fn endpoint(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if self.ws_path.starts_with('/') {
            format!("ws://{}{}", host, self.ws_path)
        } else {
            format!("ws://{}/{}", host, self.ws_path)
        }
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_endpoint() {
        assert_eq!(Config::default().endpoint(), "ws://127.0.0.1:8000/ws");
        assert_eq!(Config::default().reconnect_delay(), Duration::from_secs(3));
    }

    #[test]
    fn endpoint_normalises_slashes() {
        let config = Config {
            host: "debate.local/".to_string(),
            ws_path: "socket".to_string(),
            ..Config::default()
        };
        assert_eq!(config.endpoint(), "ws://debate.local/socket");
    }

    #[test]
    fn host_override() {
        let config = Config::default().with_host(Some("10.0.0.2:9000".to_string()));
        assert_eq!(config.endpoint(), "ws://10.0.0.2:9000/ws");

        let config = Config::default().with_host(None);
        assert_eq!(config.host, "127.0.0.1:8000");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.host = "example.org:80".to_string();
        config.ui.show_thoughts = false;
        config.save(&path).unwrap();

        assert_eq!(Config::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "reconnect_delay_ms = 500\n[ui]\naction_label = \"Go\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.reconnect_delay_ms, 500);
        assert_eq!(config.ui.action_label, "Go");
        assert_eq!(config.ui.connecting_label, "Connecting...");
        assert_eq!(config.host, "127.0.0.1:8000");
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "reconnect_delay_ms = \"soon\"").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
