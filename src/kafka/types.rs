use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Kind of tracked action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    UserRegistered,
    PromoViewed,
    PromoClick,
    CommentViewed,
    CommentPublished,
}

/// Usage event as stored in Kafka.
///
/// Serialized to JSON; the partition key is `user_id` so that one user's
/// actions stay ordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatEvent {
    pub event_type: EventType,

    /// Acting user
    pub user_id: String,

    /// Entity the action was about (user, promo or comment id)
    pub object_id: String,

    /// Promo a comment belongs to, only set for comment events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_id: Option<String>,

    /// Unix timestamp in seconds
    pub timestamp: i64,
}

impl StatEvent {
    pub fn new(event_type: EventType, user_id: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            event_type,
            user_id: user_id.into(),
            object_id: object_id.into(),
            promo_id: None,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn with_promo(mut self, promo_id: impl Into<String>) -> Self {
        self.promo_id = Some(promo_id.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.user_id.is_empty() {
            anyhow::bail!("user_id is required");
        }
        if self.object_id.is_empty() {
            anyhow::bail!("object_id is required");
        }
        Ok(())
    }
}
