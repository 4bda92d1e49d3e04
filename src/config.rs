use anyhow::{Context, Result};

mod auth;
mod kafka;
mod services;

pub use auth::AuthConfig;
pub use kafka::KafkaConfig;
pub use services::ServicesConfig;

// ============================================================================
// Configuration Constants
// ============================================================================

const DEFAULT_PORT: u16 = 8082;
const DEFAULT_RUST_LOG: &str = "info";

// Body limit for routes whose body is buffered (identity fallback + RPC payload)
pub const MAX_REQUEST_BODY_SIZE: usize = 2 * 1024 * 1024; // 2 MB

/// Output format of the tracing subscriber
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("LOG_FORMAT must be 'text' or 'json', got '{}'", other),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub log_format: LogFormat,
    pub max_request_body_size: usize,
    pub auth: AuthConfig,
    pub services: ServicesConfig,
    pub kafka: KafkaConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: env_parse("PORT", DEFAULT_PORT)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.to_string()),
            log_format: match std::env::var("LOG_FORMAT") {
                Ok(value) => LogFormat::parse(&value)?,
                Err(_) => LogFormat::Text,
            },
            max_request_body_size: env_parse("MAX_REQUEST_BODY_SIZE", MAX_REQUEST_BODY_SIZE)?,
            auth: AuthConfig::from_env()?,
            services: ServicesConfig::from_env()?,
            kafka: KafkaConfig::from_env()?,
        })
    }
}

/// Reads an optional variable, falling back to `default` when unset.
/// A value that is set but does not parse is a startup error.
pub(crate) fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

pub(crate) fn env_string(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_parse_uses_default_when_unset() {
        std::env::remove_var("LOYALTY_GATEWAY_TEST_PORT");
        let port: u16 = env_parse("LOYALTY_GATEWAY_TEST_PORT", 8082).unwrap();
        assert_eq!(port, 8082);
    }

    #[test]
    #[serial]
    fn test_env_parse_rejects_garbage() {
        std::env::set_var("LOYALTY_GATEWAY_TEST_PORT", "eighty");
        let result: Result<u16> = env_parse("LOYALTY_GATEWAY_TEST_PORT", 8082);
        std::env::remove_var("LOYALTY_GATEWAY_TEST_PORT");

        let err = result.unwrap_err().to_string();
        assert!(err.contains("LOYALTY_GATEWAY_TEST_PORT"));
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::parse("text").unwrap(), LogFormat::Text);
        assert!(LogFormat::parse("xml").is_err());
    }
}
