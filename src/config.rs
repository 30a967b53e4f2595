//! Config load, env overrides, validation.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Root config: server, store, auth, retrieval.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub server: Option<ServerConfig>,
    pub store: Option<StoreConfig>,
    pub auth: Option<AuthConfig>,
    pub retrieval: Option<RetrievalConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StoreConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuthConfig {
    /// The single identity allowed to mutate tasks; compared for exact
    /// equality, no hashing, no expiry.
    pub verified_email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetrievalConfig {
    pub embed_api_base: Option<String>,
    pub embed_api_key: Option<String>,
    pub embed_model: Option<String>,
    pub index_api_base: Option<String>,
    pub index_api_key: Option<String>,
    pub index_name: Option<String>,
    pub namespace: Option<String>,
}

/// Resolved retrieval settings, every field present.
#[derive(Debug, Clone)]
pub struct RetrievalSettings {
    pub embed_api_base: String,
    pub embed_api_key: String,
    pub embed_model: String,
    pub index_api_base: String,
    pub index_api_key: String,
    pub index_name: String,
    pub namespace: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config read {path}: {err}")]
    Read { path: String, err: String },
    #[error("config parse: {0}")]
    Parse(String),
    #[error("config: {0}")]
    Invalid(String),
}

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_STORE_PATH: &str = "tasks.db";
const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-small";

impl Config {
    pub fn host(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.host.as_deref())
            .unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_PORT)
    }

    pub fn store_path(&self) -> PathBuf {
        self.store
            .as_ref()
            .and_then(|s| s.path.as_deref())
            .unwrap_or(DEFAULT_STORE_PATH)
            .into()
    }

    /// The authorized identity for mutating task operations. Required.
    pub fn verified_email(&self) -> Result<String, ConfigError> {
        self.auth
            .as_ref()
            .and_then(|a| a.verified_email.as_deref())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| ConfigError::Invalid("auth.verified-email required".to_string()))
    }

    /// Resolved retrieval settings. All fields required except the model.
    pub fn retrieval_settings(&self) -> Result<RetrievalSettings, ConfigError> {
        let r = self
            .retrieval
            .as_ref()
            .ok_or_else(|| ConfigError::Invalid("retrieval section missing".to_string()))?;
        let require = |value: &Option<String>, key: &str| {
            value
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
                .ok_or_else(|| ConfigError::Invalid(format!("retrieval.{key} required")))
        };
        Ok(RetrievalSettings {
            embed_api_base: require(&r.embed_api_base, "embed-api-base")?,
            embed_api_key: require(&r.embed_api_key, "embed-api-key")?,
            embed_model: r
                .embed_model
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(DEFAULT_EMBED_MODEL)
                .to_string(),
            index_api_base: require(&r.index_api_base, "index-api-base")?,
            index_api_key: require(&r.index_api_key, "index-api-key")?,
            index_name: require(&r.index_name, "index-name")?,
            namespace: require(&r.namespace, "namespace")?,
        })
    }
}

/// Default config path: `$TOOLHUB_CONFIG` or `./toolhub.toml`.
pub fn default_config_path() -> PathBuf {
    std::env::var("TOOLHUB_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("toolhub.toml"))
}

/// Load config from `path` (missing file yields defaults), then apply env
/// overrides for secrets.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let mut cfg = if path.exists() {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            err: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?
    } else {
        Config::default()
    };
    apply_env_overrides(&mut cfg);
    Ok(cfg)
}

fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("TOOLHUB_VERIFIED_EMAIL") {
        cfg.auth.get_or_insert_with(Default::default).verified_email = Some(v);
    }
    if let Ok(v) = std::env::var("TOOLHUB_EMBED_API_KEY") {
        cfg.retrieval
            .get_or_insert_with(Default::default)
            .embed_api_key = Some(v);
    }
    if let Ok(v) = std::env::var("TOOLHUB_INDEX_API_KEY") {
        cfg.retrieval
            .get_or_insert_with(Default::default)
            .index_api_key = Some(v);
    }
}
