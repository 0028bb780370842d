//! Outbound HTTP

pub mod harness;

pub use harness::{DEFAULT_USER_AGENT, ReqwestHttpClient};
