// ============================================================================
// Kafka Configuration
// ============================================================================

use anyhow::Result;

use super::{env_parse, env_string};

#[derive(Clone, Debug)]
pub struct KafkaConfig {
    /// Whether usage events are published (false = events are dropped)
    pub enabled: bool,
    /// Comma-separated list of Kafka brokers (e.g., "kafka1:9092,kafka2:9092")
    pub brokers: String,
    /// Topic receiving usage events
    pub topic: String,
    pub ssl_enabled: bool,
    /// SASL mechanism (e.g., "SCRAM-SHA-256", "PLAIN")
    pub sasl_mechanism: Option<String>,
    pub sasl_username: Option<String>,
    pub sasl_password: Option<String>,
    /// How long a background send waits for the broker acknowledgment
    pub send_timeout_ms: u64,
}

impl KafkaConfig {
    pub(crate) fn from_env() -> Result<Self> {
        Ok(Self {
            enabled: env_parse("KAFKA_ENABLED", true)?,
            brokers: env_string("KAFKA_BROKERS", "kafka:9092"),
            topic: env_string("KAFKA_TOPIC", "stats"),
            ssl_enabled: env_parse("KAFKA_SSL_ENABLED", false)?,
            sasl_mechanism: std::env::var("KAFKA_SASL_MECHANISM").ok(),
            sasl_username: std::env::var("KAFKA_SASL_USERNAME").ok(),
            sasl_password: std::env::var("KAFKA_SASL_PASSWORD").ok(),
            send_timeout_ms: env_parse("KAFKA_SEND_TIMEOUT_MS", 5000)?,
        })
    }

    /// Configuration with publishing turned off, used when no broker is wanted
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            brokers: "localhost:9092".to_string(),
            topic: "stats".to_string(),
            ssl_enabled: false,
            sasl_mechanism: None,
            sasl_username: None,
            sasl_password: None,
            send_timeout_ms: 5000,
        }
    }
}
