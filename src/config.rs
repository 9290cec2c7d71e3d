//! Application-level configuration: listen port, storage backend and static auth tokens.

use std::{env, fs, io::ErrorKind, path::PathBuf, str::FromStr, sync::Arc};

use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::{Identity, RejectAll, StaticTokenVerifier, TokenVerifier};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SCORECARD_BACK_CONFIG_PATH";
/// Port used when none, or an unusable one, is configured.
pub const DEFAULT_PORT: u16 = 8080;

/// Document store the server persists games into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local store, lost on restart.
    #[default]
    Memory,
    /// MongoDB, configured through `MONGO_URI` / `MONGO_DB`.
    Mongo,
    /// CouchDB, configured through `COUCH_BASE_URL` / `COUCH_DB`.
    Couch,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "couch" | "couchdb" => Ok(Self::Couch),
            other => Err(format!("unknown store backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    port: u16,
    store: StoreBackend,
    tokens: Vec<(String, Identity)>,
}

impl AppConfig {
    /// Load the configuration file, then apply environment overrides.
    pub fn load() -> Self {
        Self::load_file().with_env_overrides(|key| env::var(key).ok())
    }

    fn load_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        store = ?config.store,
                        tokens = config.tokens.len(),
                        "loaded configuration file"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Apply `PORT` (or `SERVER_PORT`) and `STORE_BACKEND` overrides read through `lookup`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(port) = lookup("PORT").or_else(|| lookup("SERVER_PORT")) {
            self.port = resolve_port(Some(&port));
        }

        if let Some(value) = lookup("STORE_BACKEND") {
            match value.parse() {
                Ok(store) => self.store = store,
                Err(err) => warn!(error = %err, "ignoring STORE_BACKEND override"),
            }
        }

        self
    }

    /// Port the HTTP server listens on.
    pub fn port(&self) -> u16 {
        if self.port == 0 { DEFAULT_PORT } else { self.port }
    }

    /// Storage backend to connect to.
    pub fn store(&self) -> StoreBackend {
        self.store
    }

    /// Token verifier matching the configuration: the static table when tokens are
    /// configured, otherwise a verifier refusing everything.
    pub fn token_verifier(&self) -> Arc<dyn TokenVerifier> {
        if self.tokens.is_empty() {
            warn!("no auth tokens configured; every protected request will be rejected");
            Arc::new(RejectAll)
        } else {
            Arc::new(StaticTokenVerifier::new(self.tokens.clone()))
        }
    }
}

/// Turn a raw port value into a usable port, falling back to [`DEFAULT_PORT`] when it is
/// missing, unparsable or below 1.
pub fn resolve_port(value: Option<&str>) -> u16 {
    value
        .and_then(|raw| raw.trim().parse::<u16>().ok())
        .filter(|port| *port >= 1)
        .unwrap_or(DEFAULT_PORT)
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    store: StoreBackend,
    #[serde(default)]
    auth: RawAuth,
}

#[derive(Debug, Default, Deserialize)]
struct RawAuth {
    #[serde(default)]
    tokens: Vec<RawToken>,
}

#[derive(Debug, Deserialize)]
/// A token accepted by the static verifier and the identity it stands for.
struct RawToken {
    token: String,
    uid: String,
    email: String,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let tokens = value
            .auth
            .tokens
            .into_iter()
            .map(|raw| {
                (
                    raw.token,
                    Identity {
                        uid: raw.uid,
                        email: raw.email,
                    },
                )
            })
            .collect();

        Self {
            port: value.port.unwrap_or(DEFAULT_PORT),
            store: value.store,
            tokens,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn port_falls_back_to_default() {
        assert_eq!(resolve_port(None), DEFAULT_PORT);
        assert_eq!(resolve_port(Some("")), DEFAULT_PORT);
        assert_eq!(resolve_port(Some("0")), DEFAULT_PORT);
        assert_eq!(resolve_port(Some("-3")), DEFAULT_PORT);
        assert_eq!(resolve_port(Some("http")), DEFAULT_PORT);
        assert_eq!(resolve_port(Some("3000")), 3000);
    }

    #[test]
    fn defaults_use_memory_store_and_default_port() {
        let config = AppConfig::default();
        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.store(), StoreBackend::Memory);
    }

    #[test]
    fn env_overrides_win_over_file() {
        let raw: RawConfig =
            serde_json::from_str(r#"{ "port": 9000, "store": "couch" }"#).unwrap();
        let config = AppConfig::from(raw)
            .with_env_overrides(env_of(&[("SERVER_PORT", "7000"), ("STORE_BACKEND", "mongodb")]));

        assert_eq!(config.port(), 7000);
        assert_eq!(config.store(), StoreBackend::Mongo);
    }

    #[test]
    fn unknown_backend_override_is_ignored() {
        let config = AppConfig::default().with_env_overrides(env_of(&[("STORE_BACKEND", "redis")]));
        assert_eq!(config.store(), StoreBackend::Memory);
    }

    #[tokio::test]
    async fn configured_tokens_build_a_static_verifier() {
        let raw: RawConfig = serde_json::from_str(
            r#"{ "auth": { "tokens": [ { "token": "dev", "uid": "u1", "email": "u1@example.com" } ] } }"#,
        )
        .unwrap();
        let verifier = AppConfig::from(raw).token_verifier();

        let identity = verifier.verify("dev").await.unwrap();
        assert_eq!(identity.uid, "u1");
        assert!(verifier.verify("other").await.is_err());
    }

    #[tokio::test]
    async fn no_tokens_fail_closed() {
        let verifier = AppConfig::default().token_verifier();
        assert!(verifier.verify("dev").await.is_err());
    }
}
