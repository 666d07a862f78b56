//! Server configuration
//!
//! Layered from built-in defaults, an optional TOML file, and `AVIARY__*`
//! environment variables (`AVIARY__SERVER__PORT=8080`).

use config::{Config, Environment, File, Map};
use reference_lookup::WikipediaConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file, overridable with `AVIARY_CONFIG`
pub const DEFAULT_CONFIG_FILE: &str = "aviary.toml";

/// No published source; set `artifact.url` unless the artifact is already on disk
pub const DEFAULT_ARTIFACT_URL: &str = "";

/// Local artifact file name
pub const DEFAULT_ARTIFACT_NAME: &str = "italian_birds_resnet34_fine_tuned.onnx";

const ENV_PREFIX: &str = "AVIARY";
const ENV_SEPARATOR: &str = "__";

/// What to do when classification succeeds but the reference lookup fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPolicy {
    /// Fail the whole request
    Strict,
    /// Answer with the prediction and a null URL
    Lenient,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpConfig,
    pub artifact: ArtifactConfig,
    pub model: ModelConfig,
    pub lookup: LookupConfig,
    pub logging: LoggingConfig,
}

/// Listener and static content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `index.html`
    pub view_dir: PathBuf,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Maximum request body (uploads included)
    pub body_limit_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            view_dir: PathBuf::from("app/view"),
            static_dir: PathBuf::from("app/static"),
            body_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Model artifact source and location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub url: String,
    pub directory: PathBuf,
    pub file_name: String,
    /// Download timeout
    pub timeout_secs: u64,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ARTIFACT_URL.to_string(),
            directory: PathBuf::from("app"),
            file_name: DEFAULT_ARTIFACT_NAME.to_string(),
            timeout_secs: 600,
        }
    }
}

impl ArtifactConfig {
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Square input edge the model was exported with
    pub input_size: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self { input_size: 224 }
    }
}

/// Knowledge source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub link_policy: LinkPolicy,
}

impl Default for LookupConfig {
    fn default() -> Self {
        let wiki = WikipediaConfig::default();
        Self {
            endpoint: wiki.endpoint,
            user_agent: wiki.user_agent,
            timeout_secs: wiki.timeout.as_secs(),
            link_policy: LinkPolicy::Strict,
        }
    }
}

impl LookupConfig {
    pub fn to_wikipedia(&self) -> WikipediaConfig {
        WikipediaConfig {
            endpoint: self.endpoint.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ServerConfig {
    /// Load from `AVIARY_CONFIG` (or `aviary.toml`) plus the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::var("AVIARY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Path::new(&path))
    }

    /// Load from an explicit file (optional) plus the environment
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        Self::layered(path, None)
    }

    fn layered(path: &Path, env: Option<Map<String, String>>) -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }

    /// `host:port` for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> Option<Map<String, String>> {
        Some(Map::new())
    }

    #[test]
    fn test_defaults_without_file() {
        let config = ServerConfig::layered(Path::new("does-not-exist.toml"), no_env()).unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
        assert_eq!(config.artifact.file_name, DEFAULT_ARTIFACT_NAME);
        assert!(config.artifact.url.is_empty());
        assert_eq!(config.artifact.path(), PathBuf::from("app").join(DEFAULT_ARTIFACT_NAME));
        assert_eq!(config.lookup.link_policy, LinkPolicy::Strict);
        assert_eq!(config.model.input_size, 224);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aviary.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 8080

[artifact]
directory = "/var/lib/aviary"

[lookup]
link_policy = "lenient"
"#,
        )
        .unwrap();

        let config = ServerConfig::layered(&path, no_env()).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.artifact.directory, PathBuf::from("/var/lib/aviary"));
        assert_eq!(config.lookup.link_policy, LinkPolicy::Lenient);
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aviary.toml");
        std::fs::write(&path, "[server]\nport = 8080\n").unwrap();

        let mut env = Map::new();
        env.insert("AVIARY__SERVER__PORT".to_string(), "9090".to_string());
        env.insert("AVIARY__LOOKUP__ENDPOINT".to_string(), "https://it.wikipedia.org/w/api.php".to_string());

        let config = ServerConfig::layered(&path, Some(env)).unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.lookup.endpoint, "https://it.wikipedia.org/w/api.php");
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let mut env = Map::new();
        env.insert("AVIARY__LOOKUP__LINK_POLICY".to_string(), "sometimes".to_string());
        assert!(ServerConfig::layered(Path::new("absent.toml"), Some(env)).is_err());
    }
}
