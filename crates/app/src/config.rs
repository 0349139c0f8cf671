//! Configuration file schema and loader
//!
//! Settings are read from `classroom.toml`. Every field has a default, so a
//! missing file or a partial file is fine.
//!
//! ```toml
//! retry_pause_ms = 2000
//!
//! [server]
//! bind = "127.0.0.1:5000"
//! start_threshold = 3
//!
//! [door]
//! server = "127.0.0.1:5000"
//! min_delta = -3
//! max_delta = 9
//!
//! [teacher]
//! yes_probability = 0.4
//! names = ["Alice", "Bob"]
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use classroom_core::DEFAULT_START_THRESHOLD;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

/// Name of the config file looked up in the platform config directory
pub const CONFIG_FILE_NAME: &str = "classroom.toml";

fn default_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], classroom_net::DEFAULT_PORT))
}

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration shared by every subcommand
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassroomConfig {
    /// Pause before an agent reconnects after a transport error
    pub retry_pause_ms: u64,
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,
    pub server: ServerConfig,
    pub door: DoorConfig,
    pub teacher: TeacherConfig,
}

/// `[server]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Pending students required before start-voting opens
    pub start_threshold: i64,
}

/// `[door]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DoorConfig {
    pub server: SocketAddr,
    pub door_id: i64,
    pub description: String,
    /// Smallest student delta per report (may be negative)
    pub min_delta: i64,
    /// Largest student delta per report, inclusive
    pub max_delta: i64,
    pub min_pause_ms: u64,
    pub max_pause_ms: u64,
    /// Pause while the class is in session and the door is shut
    pub closed_pause_ms: u64,
}

/// `[teacher]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TeacherConfig {
    pub server: SocketAddr,
    /// Time a teacher deliberates before casting a vote
    pub vote_delay_ms: u64,
    /// Chance that a cast vote is affirmative
    pub yes_probability: f64,
    pub cycle_pause_ms: u64,
    pub names: Vec<String>,
}

impl Default for ClassroomConfig {
    fn default() -> Self {
        Self {
            retry_pause_ms: 2000,
            log_level: "info".to_string(),
            server: ServerConfig::default(),
            door: DoorConfig::default(),
            teacher: TeacherConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_addr(),
            start_threshold: DEFAULT_START_THRESHOLD,
        }
    }
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            server: default_addr(),
            door_id: 0,
            description: "Main entrance door".to_string(),
            min_delta: -3,
            max_delta: 9,
            min_pause_ms: 1000,
            max_pause_ms: 3000,
            closed_pause_ms: 2000,
        }
    }
}

impl Default for TeacherConfig {
    fn default() -> Self {
        Self {
            server: default_addr(),
            vote_delay_ms: 2000,
            yes_probability: 0.4,
            cycle_pause_ms: 7000,
            names: [
                "Alice", "Bob", "Charlie", "Diana", "Eve", "Frank", "Grace", "Hank", "Ivy",
                "Jack", "Karen", "Leo", "Mia", "Nina",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl ClassroomConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path. The file must exist.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load from `path` if given, else from the platform config directory if
    /// a file exists there, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "Loading config");
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.start_threshold < 0 {
            return Err(ConfigError::Invalid(format!(
                "server.start_threshold must be >= 0, got {}",
                self.server.start_threshold
            )));
        }
        if self.door.min_delta > self.door.max_delta {
            return Err(ConfigError::Invalid(format!(
                "door.min_delta ({}) exceeds door.max_delta ({})",
                self.door.min_delta, self.door.max_delta
            )));
        }
        if self.door.min_pause_ms > self.door.max_pause_ms {
            return Err(ConfigError::Invalid(format!(
                "door.min_pause_ms ({}) exceeds door.max_pause_ms ({})",
                self.door.min_pause_ms, self.door.max_pause_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.teacher.yes_probability) {
            return Err(ConfigError::Invalid(format!(
                "teacher.yes_probability must be within [0, 1], got {}",
                self.teacher.yes_probability
            )));
        }
        if self.teacher.names.is_empty() {
            return Err(ConfigError::Invalid("teacher.names is empty".into()));
        }
        Ok(())
    }
}

/// `classroom.toml` in the platform config directory
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "classroom", "classroom")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ClassroomConfig::from_toml("").unwrap();
        assert_eq!(config, ClassroomConfig::default());
        assert_eq!(config.server.start_threshold, 3);
        assert_eq!(config.server.bind.port(), 5000);
    }

    #[test]
    fn test_partial_sections() {
        let config = ClassroomConfig::from_toml(
            r#"
            retry_pause_ms = 500

            [server]
            bind = "0.0.0.0:6000"

            [teacher]
            yes_probability = 1.0
            names = ["Zed"]
            "#,
        )
        .unwrap();

        assert_eq!(config.retry_pause_ms, 500);
        assert_eq!(config.server.bind.port(), 6000);
        assert_eq!(config.server.start_threshold, 3);
        assert_eq!(config.teacher.names, vec!["Zed".to_string()]);
        assert_eq!(config.door.max_delta, 9);
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        let err = ClassroomConfig::from_toml("[door]\nmin_delta = 5\nmax_delta = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ClassroomConfig::from_toml("[teacher]\nyes_probability = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ClassroomConfig::from_toml("[teacher]\nnames = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_toml() {
        let err = ClassroomConfig::from_toml("[server\nbind = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[door]\ndoor_id = 4\ndescription = \"Back door\"").unwrap();

        let config = ClassroomConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.door.door_id, 4);
        assert_eq!(config.door.description, "Back door");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = ClassroomConfig::load(Some(missing.as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
