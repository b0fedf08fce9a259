//! Application configuration loaded from environment variables.

use std::time::Duration;

/// Server configuration with defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `PERSIST_DEBOUNCE_MS`: quiet period before a selection is saved (default: `500`)
/// - `SESSION_IDLE_SECS`: idle time after which a live session is evicted (default: `1800`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub persist_debounce_ms: u64,
    pub session_idle_secs: u64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`; unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            persist_debounce_ms: lookup("PERSIST_DEBOUNCE_MS")
                .and_then(|ms| ms.parse().ok())
                .unwrap_or(defaults.persist_debounce_ms),
            session_idle_secs: lookup("SESSION_IDLE_SECS")
                .and_then(|secs| secs.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.session_idle_secs),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            persist_debounce_ms: 500,
            session_idle_secs: 1800,
        }
    }
}
