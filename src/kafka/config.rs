use anyhow::Result;
use rdkafka::config::ClientConfig;
use tracing::info;

use crate::config::KafkaConfig;

/// Builds the `rdkafka` client configuration from `KafkaConfig`.
///
/// A disabled config still yields a minimal client so a placeholder producer
/// can be created. SASL is configured only when mechanism, username and
/// password are all present.
pub fn create_client_config(config: &KafkaConfig) -> Result<ClientConfig> {
    let mut client_config = ClientConfig::new();
    client_config.set("bootstrap.servers", &config.brokers);

    if !config.enabled {
        return Ok(client_config);
    }

    client_config.set("security.protocol", "plaintext");

    if config.ssl_enabled {
        info!("Enabling SSL/TLS for Kafka connection");
        client_config.set("security.protocol", "ssl");
    }

    if let (Some(mechanism), Some(username), Some(password)) = (
        &config.sasl_mechanism,
        &config.sasl_username,
        &config.sasl_password,
    ) {
        info!(sasl_mechanism = %mechanism, "Configuring SASL authentication");
        client_config
            .set("sasl.mechanism", mechanism)
            .set("sasl.username", username)
            .set("sasl.password", password);

        if config.ssl_enabled {
            client_config.set("security.protocol", "sasl_ssl");
        } else {
            client_config.set("security.protocol", "sasl_plaintext");
        }
    }

    Ok(client_config)
}
