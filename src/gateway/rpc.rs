// ============================================================================
// RPC Gateway
// ============================================================================
//
// Typed calls to the identity and loyalty backends on behalf of a resolved
// Identity. The Identity is injected as the authorship field of each call
// (`author_id` / `requester_id`); callers never supply it.
//
// Every call is bounded by the configured RPC timeout. A timeout becomes
// `AppError::Unavailable` (503); a backend status goes through the error
// translator. Tracked actions emit a usage event after the call succeeds.
//
// ============================================================================

use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tonic::Status;

use crate::auth::Identity;
use crate::error::{AppError, AppResult};
use crate::kafka::{EventSink, EventType, StatEvent};
use crate::proto::identity::v1::User;
use crate::proto::loyalty::v1::{
    Comment, CreateCommentRequest, CreatePromoRequest, DeletePromoRequest, GetCommentRequest,
    GetPromoRequest, ListPromoCommentsRequest, ListPromoCommentsResponse, ListPromosRequest,
    Promo, UpdatePromoRequest,
};

/// Identity backend capability used by the gateway
#[tonic::async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Profile of the user owning `token`
    async fn profile_by_token(&self, token: &str) -> Result<User, Status>;
}

/// Loyalty backend capability: promos and their comments
#[tonic::async_trait]
pub trait LoyaltyBackend: Send + Sync {
    async fn create_promo(&self, request: CreatePromoRequest) -> Result<Promo, Status>;
    async fn get_promo(&self, request: GetPromoRequest) -> Result<Promo, Status>;
    async fn update_promo(&self, request: UpdatePromoRequest) -> Result<Promo, Status>;
    async fn delete_promo(&self, request: DeletePromoRequest) -> Result<(), Status>;
    async fn list_promos(&self, request: ListPromosRequest) -> Result<Vec<Promo>, Status>;
    async fn create_comment(&self, request: CreateCommentRequest) -> Result<Comment, Status>;
    async fn get_comment(&self, request: GetCommentRequest) -> Result<Comment, Status>;
    async fn list_promo_comments(
        &self,
        request: ListPromoCommentsRequest,
    ) -> Result<ListPromoCommentsResponse, Status>;
}

// ===== Request payloads =====

#[derive(Debug, Deserialize)]
pub struct NewPromo {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub discount_rate: f64,
    #[serde(default)]
    pub promo_code: String,
}

#[derive(Debug, Deserialize)]
pub struct PromoUpdate {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub discount_rate: f64,
}

#[derive(Debug, Deserialize)]
pub struct NewComment {
    pub promo_id: String,
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentPage {
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub page_token: String,
}

pub struct RpcGateway {
    identity: Arc<dyn IdentityBackend>,
    loyalty: Arc<dyn LoyaltyBackend>,
    events: Arc<dyn EventSink>,
    timeout: Duration,
}

impl RpcGateway {
    pub fn new(
        identity: Arc<dyn IdentityBackend>,
        loyalty: Arc<dyn LoyaltyBackend>,
        events: Arc<dyn EventSink>,
        timeout: Duration,
    ) -> Self {
        Self {
            identity,
            loyalty,
            events,
            timeout,
        }
    }

    /// Runs one backend call under the per-call timeout.
    async fn call<T, F>(&self, operation: &'static str, call: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, Status>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(status)) => {
                tracing::debug!(
                    operation = operation,
                    code = ?status.code(),
                    message = %status.message(),
                    "Backend returned an error status"
                );
                Err(AppError::Rpc(status))
            }
            Err(_) => {
                tracing::warn!(
                    operation = operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Backend call timed out"
                );
                Err(AppError::unavailable(format!(
                    "{} timed out after {:?}",
                    operation, self.timeout
                )))
            }
        }
    }

    fn emit(&self, event: StatEvent) {
        self.events.emit(event);
    }

    // ===== Identity =====

    pub async fn profile(&self, token: &str) -> AppResult<User> {
        self.call("GetProfile", self.identity.profile_by_token(token))
            .await
    }

    // ===== Promos =====

    pub async fn create_promo(&self, user: &Identity, promo: NewPromo) -> AppResult<Promo> {
        let request = CreatePromoRequest {
            title: promo.title,
            description: promo.description,
            author_id: user.to_string(),
            discount_rate: promo.discount_rate,
            promo_code: promo.promo_code,
        };
        self.call("CreatePromo", self.loyalty.create_promo(request))
            .await
    }

    pub async fn get_promo(&self, user: &Identity, id: &str) -> AppResult<Promo> {
        let promo = self.fetch_promo(user, id).await?;
        self.emit(StatEvent::new(EventType::PromoViewed, user.as_str(), &promo.id));
        Ok(promo)
    }

    pub async fn update_promo(
        &self,
        user: &Identity,
        id: &str,
        update: PromoUpdate,
    ) -> AppResult<Promo> {
        let request = UpdatePromoRequest {
            id: id.to_string(),
            title: update.title,
            description: update.description,
            author_id: user.to_string(),
            discount_rate: update.discount_rate,
        };
        self.call("UpdatePromo", self.loyalty.update_promo(request))
            .await
    }

    pub async fn delete_promo(&self, user: &Identity, id: &str) -> AppResult<()> {
        let request = DeletePromoRequest {
            id: id.to_string(),
            author_id: user.to_string(),
        };
        self.call("DeletePromo", self.loyalty.delete_promo(request))
            .await
    }

    pub async fn list_promos(&self, user: &Identity) -> AppResult<Vec<Promo>> {
        let request = ListPromosRequest {
            requester_id: user.to_string(),
        };
        self.call("ListPromos", self.loyalty.list_promos(request))
            .await
    }

    /// Records a click on an existing promo.
    pub async fn record_click(&self, user: &Identity, promo_id: &str) -> AppResult<()> {
        let promo = self.fetch_promo(user, promo_id).await?;
        self.emit(StatEvent::new(EventType::PromoClick, user.as_str(), &promo.id));
        Ok(())
    }

    async fn fetch_promo(&self, user: &Identity, id: &str) -> AppResult<Promo> {
        let request = GetPromoRequest {
            id: id.to_string(),
            requester_id: user.to_string(),
        };
        self.call("GetPromo", self.loyalty.get_promo(request)).await
    }

    // ===== Comments =====

    pub async fn create_comment(&self, user: &Identity, comment: NewComment) -> AppResult<Comment> {
        let request = CreateCommentRequest {
            promo_id: comment.promo_id,
            author_id: user.to_string(),
            text: comment.text,
        };
        let comment = self
            .call("CreateComment", self.loyalty.create_comment(request))
            .await?;

        self.emit(
            StatEvent::new(EventType::CommentPublished, user.as_str(), &comment.id)
                .with_promo(&comment.promo_id),
        );
        Ok(comment)
    }

    pub async fn get_comment(&self, user: &Identity, id: &str) -> AppResult<Comment> {
        let request = GetCommentRequest {
            id: id.to_string(),
            requester_id: user.to_string(),
        };
        let comment = self
            .call("GetComment", self.loyalty.get_comment(request))
            .await?;

        self.emit(
            StatEvent::new(EventType::CommentViewed, user.as_str(), &comment.id)
                .with_promo(&comment.promo_id),
        );
        Ok(comment)
    }

    pub async fn list_promo_comments(
        &self,
        user: &Identity,
        promo_id: &str,
        page: CommentPage,
    ) -> AppResult<ListPromoCommentsResponse> {
        let request = ListPromoCommentsRequest {
            promo_id: promo_id.to_string(),
            requester_id: user.to_string(),
            page_size: page.page_size,
            page_token: page.page_token,
        };
        self.call("ListPromoComments", self.loyalty.list_promo_comments(request))
            .await
    }
}
