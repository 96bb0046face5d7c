/// commonlog - alert dispatch to chat platforms
///
/// This library routes alerts to Slack or Lark, choosing the destination
/// channel from the alert level, attaching diagnostic payloads, and caching
/// the credentials and chat identifiers the platforms require.
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod credentials;
pub mod error;
pub mod formatting;
pub mod notification;

// Re-export core types for convenience
pub use crate::core::*;
pub use crate::error::{DispatchError, Result};
pub use crate::notification::{FailurePolicy, Logger};
