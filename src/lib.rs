// ============================================================================
// Loyalty Gateway
// ============================================================================
//
// Authentication-aware API gateway in front of the identity and loyalty
// backends. See `gateway` for the request flow.
//
// ============================================================================

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod kafka;

/// Generated gRPC types and stubs
pub mod proto {
    pub mod identity {
        pub mod v1 {
            tonic::include_proto!("identity.v1");
        }
    }

    pub mod loyalty {
        pub mod v1 {
            tonic::include_proto!("loyalty.v1");
        }
    }
}

pub use auth::{Identity, TokenAuthority};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use gateway::{build_router, GatewayState};
