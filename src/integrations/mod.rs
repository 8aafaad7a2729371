//! Record sources backed by external services.

pub mod mcp_client {
    pub use crate::mcp_client::*;
}

pub mod circuit_breaker {
    pub use crate::circuit_breaker::*;
}
