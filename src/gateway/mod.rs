// ============================================================================
// API Gateway
// ============================================================================
//
// Single public HTTP surface in front of the identity and loyalty backends.
//
// - Identity routes (register, login, profile, user lookup) are forwarded
//   verbatim to the identity backend over HTTP.
// - Promo, comment and click routes resolve the caller's Identity first and
//   then call the loyalty backend over gRPC on its behalf.
//
// The gateway holds no mutable shared state: backend channels, the HTTP
// client and the event sink are built once at startup and shared read-only.
//
// ============================================================================

pub mod forwarder;
pub mod identity;
pub mod router;
pub mod rpc;
pub mod status;

pub use forwarder::RequestForwarder;
pub use identity::IdentityResolver;
pub use router::{build_router, GatewayState};
pub use rpc::{IdentityBackend, LoyaltyBackend, RpcGateway};
