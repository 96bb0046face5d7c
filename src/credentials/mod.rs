//! Remote credential resolution: tenant tokens and chat identifiers.
//!
//! Both lookups go through `cache::get_or_fetch`, so a warm cache answers
//! without any remote call.

pub mod directory;
pub mod token;

pub use directory::{resolve_chat_id, DirectoryListing, ListingShape};
pub use token::{get_access_token, token_ttl};
