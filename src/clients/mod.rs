//! gRPC clients for the backends the gateway calls.
//!
//! Each client owns one `Channel`, connected eagerly at startup. Channels are
//! cheap to clone and safe to share across requests.

pub mod identity;
pub mod loyalty;

pub use identity::IdentityClient;
pub use loyalty::LoyaltyClient;

use std::time::Duration;
use tonic::transport::{Channel, Endpoint};

async fn connect(endpoint: &str, connect_timeout: Duration) -> Result<Channel, tonic::transport::Error> {
    Endpoint::from_shared(endpoint.to_string())?
        .connect_timeout(connect_timeout)
        .tcp_nodelay(true)
        .connect()
        .await
}
