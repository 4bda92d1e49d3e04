use super::producer::StatsProducer;
use super::types::StatEvent;

/// Destination for fire-and-forget usage events.
///
/// `emit` must return immediately; delivery failures stay inside the sink.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: StatEvent);
}

impl EventSink for StatsProducer {
    fn emit(&self, event: StatEvent) {
        self.spawn_send(event);
    }
}
