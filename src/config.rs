//! Application-level configuration loading: backend location, identity provider
//! settings and the timer cadence of the live board.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LEAGUE_CONSOLE_CONFIG_PATH";

const DEFAULT_BACKEND_URL: &str = "http://localhost:4000";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_TRANSITION_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_ADMIN_CACHE_TTL: Duration = Duration::from_secs(60);

/// Settings of the external identity provider issuing bearer tokens.
///
/// The console never talks to the provider itself; the values are exposed to
/// frontends so they can request tokens for the right tenant and audience.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityConfig {
    /// Identity provider domain (tenant).
    pub domain: Option<String>,
    /// API audience the access tokens are issued for.
    pub audience: Option<String>,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Base URL of the authoritative league REST backend.
    pub backend_url: String,
    /// TCP port the console listens on.
    pub port: u16,
    /// Period of the authoritative match list refetch.
    pub poll_interval: Duration,
    /// Period of the clock recomputation while a match is live.
    pub tick_interval: Duration,
    /// Upper bound for a single backend HTTP request.
    pub request_timeout: Duration,
    /// Upper bound for a remote transition before it is aborted locally.
    pub transition_timeout: Duration,
    /// How long a verified admin token is trusted without asking the backend again.
    pub admin_cache_ttl: Duration,
    /// Identity provider settings.
    pub identity: IdentityConfig,
}

impl AppConfig {
    /// Load the configuration from disk, fall back to built-in defaults, then
    /// apply environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let base = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    info!(path = %path.display(), "loaded console configuration");
                    raw.into()
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
        };

        base.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides looked up through `lookup` (the process environment in production).
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("BACKEND_URL").filter(|value| !value.trim().is_empty()) {
            self.backend_url = normalize_base_url(&url);
        }

        if let Some(port) = lookup("PORT")
            .or_else(|| lookup("SERVER_PORT"))
            .and_then(|value| value.parse::<u16>().ok())
        {
            self.port = port;
        }

        if let Some(secs) = lookup("POLL_INTERVAL_SECS")
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            self.poll_interval = Duration::from_secs(secs);
        }

        if let Some(domain) = lookup("AUTH_DOMAIN") {
            self.identity.domain = Some(domain);
        }
        if let Some(audience) = lookup("AUTH_AUDIENCE") {
            self.identity.audience = Some(audience);
        }

        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            port: DEFAULT_PORT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            tick_interval: DEFAULT_TICK_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            transition_timeout: DEFAULT_TRANSITION_TIMEOUT,
            admin_cache_ttl: DEFAULT_ADMIN_CACHE_TTL,
            identity: IdentityConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    backend_url: Option<String>,
    port: Option<u16>,
    poll_interval_secs: Option<u64>,
    tick_interval_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    transition_timeout_secs: Option<u64>,
    admin_cache_ttl_secs: Option<u64>,
    identity: Option<RawIdentity>,
}

#[derive(Debug, Deserialize)]
/// JSON representation of the identity provider block.
struct RawIdentity {
    domain: Option<String>,
    audience: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        let positive_secs = |secs: Option<u64>, fallback: Duration| {
            secs.filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(fallback)
        };

        Self {
            backend_url: value
                .backend_url
                .as_deref()
                .map(normalize_base_url)
                .unwrap_or(defaults.backend_url),
            port: value.port.unwrap_or(defaults.port),
            poll_interval: positive_secs(value.poll_interval_secs, defaults.poll_interval),
            tick_interval: value
                .tick_interval_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick_interval),
            request_timeout: positive_secs(value.request_timeout_secs, defaults.request_timeout),
            transition_timeout: positive_secs(
                value.transition_timeout_secs,
                defaults.transition_timeout,
            ),
            admin_cache_ttl: value
                .admin_cache_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.admin_cache_ttl),
            identity: value
                .identity
                .map(|raw| IdentityConfig {
                    domain: raw.domain,
                    audience: raw.audience,
                })
                .unwrap_or_default(),
        }
    }
}

/// Strip trailing slashes so endpoint paths can be appended verbatim.
fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
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
    use super::*;

    #[test]
    fn raw_config_fills_missing_fields_with_defaults() {
        let json = r#"{"backendUrl": "https://league.example/", "pollIntervalSecs": 10}"#;
        let raw: RawConfig = serde_json::from_str(json).unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.backend_url, "https://league.example");
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.tick_interval, DEFAULT_TICK_INTERVAL);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn zero_intervals_are_ignored() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"pollIntervalSecs": 0, "tickIntervalMs": 0}"#).unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.tick_interval, DEFAULT_TICK_INTERVAL);
    }

    #[test]
    fn environment_overrides_take_precedence() {
        let config = AppConfig::default().with_overrides(|key| match key {
            "BACKEND_URL" => Some("http://backend:9000/".into()),
            "SERVER_PORT" => Some("9090".into()),
            "AUTH_AUDIENCE" => Some("league-api".into()),
            _ => None,
        });

        assert_eq!(config.backend_url, "http://backend:9000");
        assert_eq!(config.port, 9090);
        assert_eq!(config.identity.audience.as_deref(), Some("league-api"));
        assert_eq!(config.identity.domain, None);
    }

    #[test]
    fn invalid_port_override_keeps_previous_value() {
        let config = AppConfig::default().with_overrides(|key| match key {
            "PORT" => Some("not-a-port".into()),
            _ => None,
        });
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
