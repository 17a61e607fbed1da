//! # Heartfy Engine
//!
//! The client-side engine behind the Heartfy social feed: sessions, the
//! realtime mirror, feed personalization, likes and follows, moderation,
//! and the admin badge authority.
//!
//! ## Features
//!
//! - **Backend-agnostic**: all remote access goes through the
//!   [`store::DocumentStore`] trait; the transport is left to the
//!   application. An in-memory implementation ships for development and
//!   tests.
//! - **Single-threaded event model**: subscription snapshots are buffered
//!   in channels and drained by [`client::FeedClient::pump`] on the
//!   caller's task; no locks, no background workers.
//! - **Optimistic interactions**: likes and follows patch local state
//!   immediately and reconcile against the next snapshot.
//! - **Degraded sessions**: a store outage at login yields a read-only
//!   session instead of an error.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use heartfy_engine::client::FeedClient;
//! use heartfy_engine::config::EngineConfig;
//! use heartfy_engine::identity::AuthIdentity;
//! use heartfy_engine::store::memory::MemoryStore;
//! # #[tokio::main]
//! # async fn main() -> heartfy_engine::Result<()> {
//! let mut client = FeedClient::new(MemoryStore::new(), EngineConfig::default());
//! let identity = AuthIdentity::new("uid-1").with_email("ana@example.com");
//! client.login(identity).await?;
//! client.pump();
//!
//! client.toggle_like("post-1").await?;
//! for post in client.home_feed("natureza") {
//!     println!("{}", post.id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod badges;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod feed;
pub mod identity;
pub mod interact;
pub mod mirror;
pub mod moderation;
pub mod post;
pub mod profile;
pub mod report;
pub mod sanitize;
pub mod session;
pub mod store;
pub mod types;

pub use error::{HeartfyError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
