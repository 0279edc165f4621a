//! # Brocade
//!
//! A typed client for a media vector index server. The server owns vector
//! indexing, nearest-neighbor search, and image embedding through its
//! built-in vectorizer module; this crate provides the client surface:
//!
//! - Explicit connection handle with a configurable target address
//! - Collection (schema) management with a declared vectorizer and typed
//!   properties
//! - Record upload with base64 payload transport, single or batched with
//!   bounded concurrency and per-item failure isolation
//! - Listing, fetching, and batch deletion of records
//! - Near-media similarity queries returning server-computed certainties
//!
//! A `brocade` CLI binary exercises all of the above.

pub mod batch;
pub mod cli;
pub mod client;
pub mod error;
pub mod object;
pub mod query;
pub mod schema;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
