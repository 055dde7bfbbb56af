//! Polling helpers that wait for a game to become observable.

use crate::client::RiotClient;
use crate::models::{CurrentGameInfo, FeaturedGames};
use riftgate_error::RiftgateResult;
use riftgate_rate_limit::{CancelSignal, ProbeOutcome, absent_on_not_found};
use tracing::{debug, info, instrument};

impl RiotClient {
    /// Poll until the player is in a live match.
    ///
    /// "Not in game" answers are retried with the client's backoff; every
    /// probe is still paced by the gateway.
    ///
    /// # Errors
    ///
    /// - `RetryErrorKind::Exhausted` if no match appears within the attempt budget
    /// - `RetryErrorKind::Cancelled` or `GatewayErrorKind::Cancelled` once `cancel` fires
    /// - any non-retryable upstream failure, such as an expired key
    #[instrument(skip(self, cancel))]
    pub async fn wait_for_live_game(
        &self,
        puuid: &str,
        cancel: &CancelSignal,
    ) -> RiftgateResult<CurrentGameInfo> {
        let client = self;
        let game = self
            .retry_policy()
            .retry_with_cancel(cancel, move || async move {
                absent_on_not_found(
                    client
                        .get::<CurrentGameInfo>(client.current_game_url(puuid), Some(cancel))
                        .await,
                )
            })
            .await?;
        info!(game_id = game.game_id(), game_mode = %game.game_mode(), "Live game found");
        Ok(game)
    }

    /// Poll the featured list until it holds at least one classic game.
    ///
    /// # Errors
    ///
    /// Same as [`wait_for_live_game`](Self::wait_for_live_game).
    #[instrument(skip(self, cancel))]
    pub async fn featured_classic_games(
        &self,
        cancel: &CancelSignal,
    ) -> RiftgateResult<Vec<CurrentGameInfo>> {
        let client = self;
        self.retry_policy()
            .retry_with_cancel(cancel, move || client.probe_featured_classic(cancel))
            .await
    }

    async fn probe_featured_classic(
        &self,
        cancel: &CancelSignal,
    ) -> RiftgateResult<ProbeOutcome<Vec<CurrentGameInfo>>> {
        let featured: FeaturedGames = self.get(self.featured_games_url(), Some(cancel)).await?;
        let total = featured.game_list().len();
        let classic = featured.into_classic();
        debug!(total, classic = classic.len(), "Featured games fetched");
        if classic.is_empty() {
            Ok(ProbeOutcome::NotReady)
        } else {
            Ok(ProbeOutcome::Ready(classic))
        }
    }
}
