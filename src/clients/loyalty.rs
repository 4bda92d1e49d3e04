//! Client for the PromoService and CommentService

use std::time::Duration;
use tonic::transport::Channel;
use tonic::Status;

use crate::gateway::rpc::LoyaltyBackend;
use crate::proto::loyalty::v1::{
    comment_service_client::CommentServiceClient, promo_service_client::PromoServiceClient,
    Comment, CreateCommentRequest, CreatePromoRequest, DeletePromoRequest, GetCommentRequest,
    GetPromoRequest, ListPromoCommentsRequest, ListPromoCommentsResponse, ListPromosRequest,
    Promo, UpdatePromoRequest,
};

/// A configured gRPC client for both PromoService and CommentService.
#[derive(Clone)]
pub struct LoyaltyClient {
    channel: Channel,
}

impl LoyaltyClient {
    /// Connects to the loyalty backend. Fails if it is unreachable.
    pub async fn connect(endpoint: &str, connect_timeout: Duration) -> Result<Self, tonic::transport::Error> {
        let channel = super::connect(endpoint, connect_timeout).await?;
        Ok(Self { channel })
    }

    /// Gets a client for the PromoService.
    pub fn promos(&self) -> PromoServiceClient<Channel> {
        PromoServiceClient::new(self.channel.clone())
    }

    /// Gets a client for the CommentService.
    pub fn comments(&self) -> CommentServiceClient<Channel> {
        CommentServiceClient::new(self.channel.clone())
    }
}

#[tonic::async_trait]
impl LoyaltyBackend for LoyaltyClient {
    async fn create_promo(&self, request: CreatePromoRequest) -> Result<Promo, Status> {
        Ok(self.promos().create_promo(request).await?.into_inner())
    }

    async fn get_promo(&self, request: GetPromoRequest) -> Result<Promo, Status> {
        Ok(self.promos().get_promo(request).await?.into_inner())
    }

    async fn update_promo(&self, request: UpdatePromoRequest) -> Result<Promo, Status> {
        Ok(self.promos().update_promo(request).await?.into_inner())
    }

    async fn delete_promo(&self, request: DeletePromoRequest) -> Result<(), Status> {
        self.promos().delete_promo(request).await?;
        Ok(())
    }

    async fn list_promos(&self, request: ListPromosRequest) -> Result<Vec<Promo>, Status> {
        Ok(self.promos().list_promos(request).await?.into_inner().promos)
    }

    async fn create_comment(&self, request: CreateCommentRequest) -> Result<Comment, Status> {
        Ok(self.comments().create_comment(request).await?.into_inner())
    }

    async fn get_comment(&self, request: GetCommentRequest) -> Result<Comment, Status> {
        Ok(self.comments().get_comment(request).await?.into_inner())
    }

    async fn list_promo_comments(
        &self,
        request: ListPromoCommentsRequest,
    ) -> Result<ListPromoCommentsResponse, Status> {
        Ok(self.comments().list_promo_comments(request).await?.into_inner())
    }
}
