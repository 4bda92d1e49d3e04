use anyhow::{Context, Result};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::config::create_client_config;
use super::types::StatEvent;
use crate::config::KafkaConfig;

/// Kafka producer for usage events
///
/// Events are analytics, not records of truth: the producer favours low
/// latency over durability (`acks=1`, short linger) and never retries from
/// the request path.
pub struct StatsProducer {
    producer: Arc<FutureProducer>,
    topic: String,
    send_timeout: Duration,
    enabled: bool,
}

impl StatsProducer {
    /// Create a producer from the application configuration.
    ///
    /// With `KAFKA_ENABLED=false` a placeholder client is created and every
    /// send is a no-op.
    pub fn new(config: &KafkaConfig) -> Result<Self> {
        let send_timeout = Duration::from_millis(config.send_timeout_ms);

        if !config.enabled {
            info!("Kafka producer disabled (KAFKA_ENABLED=false), usage events are dropped");
            let producer = create_client_config(config)?
                .create()
                .context("Failed to create disabled Kafka producer")?;

            return Ok(Self {
                producer: Arc::new(producer),
                topic: config.topic.clone(),
                send_timeout,
                enabled: false,
            });
        }

        info!("Initializing Kafka producer...");
        let producer: FutureProducer = create_client_config(config)?
            .set("acks", "1")
            .set("compression.type", "lz4")
            .set("linger.ms", "5")
            .set("message.timeout.ms", config.send_timeout_ms.to_string())
            .create()
            .context("Failed to create Kafka producer")?;

        info!("Kafka producer initialized successfully for topic '{}'", config.topic);

        Ok(Self {
            producer: Arc::new(producer),
            topic: config.topic.clone(),
            send_timeout,
            enabled: true,
        })
    }

    /// Send one event and wait for the broker acknowledgment.
    ///
    /// Returns `(-1, -1)` when the producer is disabled.
    pub async fn send_event(&self, event: &StatEvent) -> Result<(i32, i64)> {
        if !self.enabled {
            return Ok((-1, -1));
        }

        event.validate().context("Invalid usage event")?;

        let payload = serde_json::to_vec(event).context("Failed to serialize usage event")?;

        let record = FutureRecord::to(&self.topic)
            .key(event.user_id.as_bytes())
            .payload(&payload);

        match self
            .producer
            .send(record, Timeout::After(self.send_timeout))
            .await
        {
            Ok((partition, offset)) => {
                debug!(
                    partition = partition,
                    offset = offset,
                    event_type = ?event.event_type,
                    user_id = %event.user_id,
                    "Usage event published"
                );
                Ok((partition, offset))
            }
            Err((kafka_err, _)) => Err(anyhow::anyhow!("Kafka send failed: {}", kafka_err)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Flush pending events (for graceful shutdown)
    pub fn flush(&self, timeout: Duration) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        info!("Flushing Kafka producer (timeout: {:?})", timeout);

        self.producer
            .flush(Timeout::After(timeout))
            .context("Failed to flush Kafka producer")?;

        info!("Kafka producer flushed successfully");
        Ok(())
    }

    /// Publish in a background task. Failures are logged and dropped.
    pub(crate) fn spawn_send(&self, event: StatEvent) {
        if !self.enabled {
            return;
        }

        let producer = self.clone();
        tokio::spawn(async move {
            if let Err(e) = producer.send_event(&event).await {
                warn!(
                    error = %e,
                    event_type = ?event.event_type,
                    user_id = %event.user_id,
                    topic = %producer.topic,
                    "Failed to publish usage event"
                );
            }
        });
    }
}

// Clone shares the underlying client
impl Clone for StatsProducer {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
            topic: self.topic.clone(),
            send_timeout: self.send_timeout,
            enabled: self.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kafka::types::EventType;

    #[test]
    fn test_disabled_producer_creation() {
        let producer = StatsProducer::new(&KafkaConfig::disabled());

        assert!(producer.is_ok());
        let producer = producer.unwrap();
        assert!(!producer.is_enabled());
        assert_eq!(producer.topic(), "stats");
    }

    #[tokio::test]
    async fn test_disabled_producer_send() {
        let producer = StatsProducer::new(&KafkaConfig::disabled()).unwrap();
        let event = StatEvent::new(EventType::PromoViewed, "u1", "p1");

        let result = producer.send_event(&event).await;
        assert_eq!(result.unwrap(), (-1, -1));
    }

    #[test]
    fn test_disabled_producer_flush() {
        let producer = StatsProducer::new(&KafkaConfig::disabled()).unwrap();
        assert!(producer.flush(Duration::from_secs(1)).is_ok());
    }
}
