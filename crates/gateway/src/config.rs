//! Gateway configuration loaded from environment variables.

use std::time::Duration;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Gateway configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `8080`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json` (default: `text`)
/// - `INVENTORY_SERVICE_URL`: default `"http://localhost:8081"`
/// - `ORDER_SERVICE_URL`: default `"http://localhost:8082"`
/// - `UPSTREAM_TIMEOUT_SECS`: per-request timeout (default: `30`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub inventory_url: String,
    pub order_url: String,
    pub upstream_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: get("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: get("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: match get("LOG_FORMAT") {
                Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
            inventory_url: get("INVENTORY_SERVICE_URL").unwrap_or(defaults.inventory_url),
            order_url: get("ORDER_SERVICE_URL").unwrap_or(defaults.order_url),
            upstream_timeout: get("UPSTREAM_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.upstream_timeout),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            inventory_url: "http://localhost:8081".to_string(),
            order_url: "http://localhost:8082".to_string(),
            upstream_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert_eq!(config.order_url, "http://localhost:8082");
        assert_eq!(config.upstream_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(|key| match key {
            "PORT" => Some("9000".to_string()),
            "ORDER_SERVICE_URL" => Some("http://orders:8082".to_string()),
            "UPSTREAM_TIMEOUT_SECS" => Some("5".to_string()),
            "LOG_FORMAT" => Some("json".to_string()),
            _ => None,
        });
        assert_eq!(config.port, 9000);
        assert_eq!(config.order_url, "http://orders:8082");
        assert_eq!(config.inventory_url, "http://localhost:8081");
        assert_eq!(config.upstream_timeout, Duration::from_secs(5));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_unparseable_port_falls_back() {
        let config = Config::from_lookup(|key| (key == "PORT").then(|| "http".to_string()));
        assert_eq!(config.port, 8080);
    }
}
