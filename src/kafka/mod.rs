// Kafka module for usage events
//
// Tracked gateway actions (registration, promo views and clicks, comment views
// and publications) are published to a single topic, keyed by the acting user.
// Publishing is fire-and-forget: the request path never waits on the broker.

pub mod config;
pub mod producer;
pub mod sink;
pub mod types;

// Re-export commonly used types
pub use producer::StatsProducer;
pub use sink::EventSink;
pub use types::{EventType, StatEvent};
