//! Client for the identity AuthService

use std::time::Duration;
use tonic::transport::Channel;
use tonic::Status;

use crate::gateway::rpc::IdentityBackend;
use crate::proto::identity::v1::{auth_service_client::AuthServiceClient, AuthRequest, User};

#[derive(Clone)]
pub struct IdentityClient {
    channel: Channel,
}

impl IdentityClient {
    /// Connects to the identity backend. Fails if it is unreachable.
    pub async fn connect(endpoint: &str, connect_timeout: Duration) -> Result<Self, tonic::transport::Error> {
        let channel = super::connect(endpoint, connect_timeout).await?;
        Ok(Self { channel })
    }

    /// Gets a client for the AuthService.
    pub fn auth(&self) -> AuthServiceClient<Channel> {
        AuthServiceClient::new(self.channel.clone())
    }
}

#[tonic::async_trait]
impl IdentityBackend for IdentityClient {
    async fn profile_by_token(&self, token: &str) -> Result<User, Status> {
        let request = AuthRequest {
            token: token.to_string(),
        };
        Ok(self.auth().get_profile(request).await?.into_inner())
    }
}
