//! Riftgate - rate-limited gateway to a game-data API
//!
//! Riftgate funnels every call made with one API credential through a single
//! FIFO queue, admits calls one at a time under a dual-window rate limit,
//! and offers a bounded exponential backoff for polling lookups such as
//! "is this player in a live match yet".
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use riftgate::{CancelSignal, RiftgateConfig, RiotClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RiftgateConfig::load()?;
//!     let client = RiotClient::new(&std::env::var("RIOT_API_KEY")?, &config)?;
//!
//!     let account = client.account_by_riot_id("Hide on bush", "KR1").await?;
//!     let game = client
//!         .wait_for_live_game(account.puuid(), &CancelSignal::never())
//!         .await?;
//!     println!("{:?}", game);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `riftgate_error` - Error taxonomy and upstream failure classification
//! - `riftgate_rate_limit` - Dual-window limiter, retry policy, cancellation, configuration
//! - `riftgate_gateway` - FIFO queue with a single-flight drain loop
//! - `riftgate_riot` - Endpoint client and polling probes
//!
//! This crate (`riftgate`) re-exports everything for convenience.

pub use riftgate_error::*;
pub use riftgate_gateway::*;
pub use riftgate_rate_limit::*;
pub use riftgate_riot::*;
