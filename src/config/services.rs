// ============================================================================
// Backend Services Configuration
// ============================================================================

use anyhow::Result;
use std::time::Duration;

use super::{env_parse, env_string};

const DEFAULT_IDENTITY_HTTP_URL: &str = "http://auth-service:8080";
const DEFAULT_IDENTITY_GRPC_URL: &str = "http://auth-service:50051";
const DEFAULT_LOYALTY_GRPC_URL: &str = "http://loyalty-service:8083";

const DEFAULT_RPC_TIMEOUT_SECS: u64 = 5;
const DEFAULT_FORWARD_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct ServicesConfig {
    /// Base URL for routes forwarded verbatim and for the login/profile fallback
    pub identity_http_url: String,
    pub identity_grpc_url: String,
    pub loyalty_grpc_url: String,
    /// Bound on every RPC and on each identity HTTP round-trip
    pub rpc_timeout_secs: u64,
    pub forward_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl ServicesConfig {
    pub(crate) fn from_env() -> Result<Self> {
        Ok(Self {
            identity_http_url: trim_base(env_string("IDENTITY_HTTP_URL", DEFAULT_IDENTITY_HTTP_URL)),
            identity_grpc_url: env_string("IDENTITY_GRPC_URL", DEFAULT_IDENTITY_GRPC_URL),
            loyalty_grpc_url: env_string("LOYALTY_GRPC_URL", DEFAULT_LOYALTY_GRPC_URL),
            rpc_timeout_secs: env_parse("RPC_TIMEOUT_SECS", DEFAULT_RPC_TIMEOUT_SECS)?,
            forward_timeout_secs: env_parse("FORWARD_TIMEOUT_SECS", DEFAULT_FORWARD_TIMEOUT_SECS)?,
            connect_timeout_secs: env_parse("CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        })
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    pub fn forward_timeout(&self) -> Duration {
        Duration::from_secs(self.forward_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

// Paths are appended verbatim, so the base must not end with '/'
fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
