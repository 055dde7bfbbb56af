//! Game-data API client for Riftgate.
//!
//! [`RiotClient`] exposes the account, summoner, league, challenge, match
//! and spectator endpoints. Each call is one [`Transport`] GET submitted to
//! the client's gateway, so a single credential never exceeds its budgets
//! no matter how many callers share the client.
//!
//! # Example
//!
//! ```no_run
//! use riftgate_rate_limit::RiftgateConfig;
//! use riftgate_riot::RiotClient;
//!
//! # async fn run() -> riftgate_error::RiftgateResult<()> {
//! let config = RiftgateConfig::load()?;
//! let client = RiotClient::new("RGAPI-...", &config)?;
//! let account = client.account_by_riot_id("Hide on bush", "KR1").await?;
//! println!("{}", account.puuid());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod models;
mod probes;
mod transport;

pub use client::RiotClient;
pub use models::{
    Account, AccountBuilder, CLASSIC_MODE, CurrentGameInfo, CurrentGameInfoBuilder, FeaturedGames,
    FeaturedGamesBuilder, GameParticipant, GameParticipantBuilder, LeagueEntry, LeagueEntryBuilder,
    Summoner, SummonerBuilder,
};
pub use transport::{ReqwestTransport, Transport, classify_response};
