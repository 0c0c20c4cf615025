//! Knowledge base configuration
//!
//! A configuration names the ontology file and selects a storage backend:
//!
//! ```yaml
//! ontology: companies.yaml
//! backend:
//!   kind: remote
//!   uri: http://localhost:7474
//!   username: neo4j
//!   password: secret
//! ```
//!
//! The remote connection triple can also come from the environment, see
//! [`RemoteConfig::from_env`].

use crate::error::{ConfigurationError, ConfigurationResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the remote endpoint URI
pub const ENV_GRAPH_URI: &str = "FACTBASE_GRAPH_URI";
/// Environment variable holding the remote user name
pub const ENV_GRAPH_USER: &str = "FACTBASE_GRAPH_USER";
/// Environment variable holding the remote password
pub const ENV_GRAPH_PASSWORD: &str = "FACTBASE_GRAPH_PASSWORD";
/// Optional environment variable overriding the database name
pub const ENV_GRAPH_DATABASE: &str = "FACTBASE_GRAPH_DATABASE";

fn default_database() -> String {
    "neo4j".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_snapshot() -> PathBuf {
    PathBuf::from("factbase.snapshot")
}

/// Connection settings of the remote graph database
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URI of the HTTP endpoint, e.g. `http://localhost:7474`
    pub uri: String,
    pub username: String,
    pub password: String,

    #[serde(default = "default_database")]
    pub database: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RemoteConfig {
    pub fn new(uri: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            username: username.into(),
            password: password.into(),
            database: default_database(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Read the connection triple from `FACTBASE_GRAPH_URI`,
    /// `FACTBASE_GRAPH_USER` and `FACTBASE_GRAPH_PASSWORD`.
    ///
    /// `FACTBASE_GRAPH_DATABASE` optionally overrides the database name.
    pub fn from_env() -> ConfigurationResult<Self> {
        let var = |name: &'static str| env::var(name).map_err(|_| ConfigurationError::MissingEnv(name));
        let mut config = Self::new(var(ENV_GRAPH_URI)?, var(ENV_GRAPH_USER)?, var(ENV_GRAPH_PASSWORD)?);
        if let Ok(database) = env::var(ENV_GRAPH_DATABASE) {
            config.database = database;
        }
        Ok(config)
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Transactional commit endpoint: `{uri}/db/{database}/tx/commit`
    pub fn commit_url(&self) -> String {
        format!("{}/db/{}/tx/commit", self.uri.trim_end_matches('/'), self.database)
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Storage backend selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    /// In-process graph persisted to a snapshot file
    InMemory {
        #[serde(default = "default_snapshot")]
        snapshot: PathBuf,
    },
    /// Remote graph database
    Remote(RemoteConfig),
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::InMemory {
            snapshot: default_snapshot(),
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Ontology YAML file
    pub ontology: PathBuf,

    #[serde(default)]
    pub backend: BackendConfig,
}

impl KnowledgeConfig {
    pub fn new(ontology: impl Into<PathBuf>, backend: BackendConfig) -> Self {
        Self {
            ontology: ontology.into(),
            backend,
        }
    }

    /// Load a configuration file.
    ///
    /// Relative ontology and snapshot paths are resolved against the
    /// directory containing the file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigurationResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&text)?;

        if let Some(base) = path.parent() {
            config.ontology = resolve(base, &config.ontology);
            if let BackendConfig::InMemory { snapshot } = &mut config.backend {
                *snapshot = resolve(base, snapshot);
            }
        }
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> ConfigurationResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
