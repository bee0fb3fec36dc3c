//! Inquiry relay: `POST /send-email` relayed as an owner notification and a
//! confirmation to the visitor

pub mod config;
pub mod handlers;
pub mod rate_limit;
pub mod server;

pub use config::{RateLimitConfig, ServerConfig};
pub use handlers::{AppState, Inquiry, InquiryRequest};
pub use rate_limit::RateLimiter;
pub use server::{build_router, run_server};
