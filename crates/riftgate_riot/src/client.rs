//! Endpoint client for the game-data API.

use crate::models::{Account, CurrentGameInfo, FeaturedGames, LeagueEntry, Summoner};
use crate::transport::{ReqwestTransport, Transport};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use riftgate_error::{ConfigError, JsonError, RiftgateError, RiftgateResult};
use riftgate_gateway::Gateway;
use riftgate_rate_limit::{CancelSignal, RetryPolicy, RiftgateConfig, RoutingConfig};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const TOKEN_HEADER: &str = "x-riot-token";

/// Client for one API credential.
///
/// Every call, whatever its routing host, is funneled through the same
/// [`Gateway`], so the credential's budgets cover all endpoints together.
/// Cloning shares the gateway.
#[derive(Clone)]
pub struct RiotClient {
    gateway: Gateway,
    transport: Arc<dyn Transport>,
    headers: HeaderMap,
    routing: RoutingConfig,
    retry: RetryPolicy,
}

impl std::fmt::Debug for RiotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiotClient")
            .field("gateway", &self.gateway)
            .field("routing", &self.routing)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl RiotClient {
    /// Create a client that talks to the network over HTTPS.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `api_key` is not a valid header value.
    pub fn new(api_key: &str, config: &RiftgateConfig) -> RiftgateResult<Self> {
        Self::with_transport(api_key, config, Arc::new(ReqwestTransport::new()))
    }

    /// Create a client on top of a custom transport.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `api_key` is empty or not a valid
    /// header value.
    pub fn with_transport(
        api_key: &str,
        config: &RiftgateConfig,
        transport: Arc<dyn Transport>,
    ) -> RiftgateResult<Self> {
        if api_key.trim().is_empty() {
            return Err(ConfigError::new("API key is empty").into());
        }
        let mut token = HeaderValue::from_str(api_key.trim())
            .map_err(|e| ConfigError::new(format!("API key is not a valid header value: {}", e)))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(TOKEN_HEADER), token);

        Ok(Self {
            gateway: Gateway::new(&config.limiter),
            transport,
            headers,
            routing: config.routing.clone(),
            retry: RetryPolicy::from(&config.retry),
        })
    }

    /// The gateway pacing this client's calls.
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Backoff used by the polling helpers.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    fn platform_url(&self, path: &str) -> String {
        format!("https://{}.api.riotgames.com{}", self.routing.platform, path)
    }

    fn regional_url(&self, path: &str) -> String {
        format!("https://{}.api.riotgames.com{}", self.routing.region, path)
    }

    /// Submit one GET through the gateway and decode the payload.
    pub(crate) async fn get<T>(&self, url: String, cancel: Option<&CancelSignal>) -> RiftgateResult<T>
    where
        T: DeserializeOwned,
    {
        let transport = Arc::clone(&self.transport);
        let headers = self.headers.clone();
        let operation = move || async move { transport.get(&url, &headers).await.map_err(RiftgateError::from) };

        let value: Value = match cancel {
            Some(cancel) => self.gateway.submit_with_cancel(cancel, operation).await?,
            None => self.gateway.submit(operation).await?,
        };

        serde_json::from_value(value).map_err(|e| {
            warn!(error = %e, "Response did not match the expected shape");
            JsonError::new(e.to_string()).into()
        })
    }

    /// Look up an account by Riot ID.
    #[instrument(skip(self))]
    pub async fn account_by_riot_id(&self, game_name: &str, tag_line: &str) -> RiftgateResult<Account> {
        let path = format!(
            "/riot/account/v1/accounts/by-riot-id/{}/{}",
            urlencoding::encode(game_name),
            urlencoding::encode(tag_line)
        );
        self.get(self.regional_url(&path), None).await
    }

    /// Look up an account by player id.
    #[instrument(skip(self))]
    pub async fn account_by_puuid(&self, puuid: &str) -> RiftgateResult<Account> {
        let path = format!("/riot/account/v1/accounts/by-puuid/{}", urlencoding::encode(puuid));
        self.get(self.regional_url(&path), None).await
    }

    /// Summoner profile on the configured platform.
    #[instrument(skip(self))]
    pub async fn summoner_by_puuid(&self, puuid: &str) -> RiftgateResult<Summoner> {
        let path = format!("/lol/summoner/v4/summoners/by-puuid/{}", urlencoding::encode(puuid));
        self.get(self.platform_url(&path), None).await
    }

    /// Ranked standings; empty when the player is unranked.
    #[instrument(skip(self))]
    pub async fn league_entries(&self, puuid: &str) -> RiftgateResult<Vec<LeagueEntry>> {
        let path = format!("/lol/league/v4/entries/by-puuid/{}", urlencoding::encode(puuid));
        self.get(self.platform_url(&path), None).await
    }

    /// Challenge progress, as returned by the provider.
    #[instrument(skip(self))]
    pub async fn player_challenges(&self, puuid: &str) -> RiftgateResult<Value> {
        let path = format!("/lol/challenges/v1/player-data/{}", urlencoding::encode(puuid));
        self.get(self.platform_url(&path), None).await
    }

    /// Ids of the player's matches, newest first.
    #[instrument(skip(self))]
    pub async fn match_ids(&self, puuid: &str, start: u32, count: u32) -> RiftgateResult<Vec<String>> {
        let path = format!(
            "/lol/match/v5/matches/by-puuid/{}/ids?start={}&count={}",
            urlencoding::encode(puuid),
            start,
            count
        );
        self.get(self.regional_url(&path), None).await
    }

    /// Full match record.
    #[instrument(skip(self))]
    pub async fn match_detail(&self, match_id: &str) -> RiftgateResult<Value> {
        let path = format!("/lol/match/v5/matches/{}", urlencoding::encode(match_id));
        self.get(self.regional_url(&path), None).await
    }

    /// Minute-by-minute match timeline.
    #[instrument(skip(self))]
    pub async fn match_timeline(&self, match_id: &str) -> RiftgateResult<Value> {
        let path = format!("/lol/match/v5/matches/{}/timeline", urlencoding::encode(match_id));
        self.get(self.regional_url(&path), None).await
    }

    /// The player's live match.
    ///
    /// # Errors
    ///
    /// `UpstreamErrorKind::NotFound` when the player is not in a game.
    #[instrument(skip(self))]
    pub async fn current_game(&self, puuid: &str) -> RiftgateResult<CurrentGameInfo> {
        self.get(self.current_game_url(puuid), None).await
    }

    pub(crate) fn current_game_url(&self, puuid: &str) -> String {
        let path = format!(
            "/lol/spectator/v5/active-games/by-summoner/{}",
            urlencoding::encode(puuid)
        );
        self.platform_url(&path)
    }

    /// Games currently showcased by the provider.
    #[instrument(skip(self))]
    pub async fn featured_games(&self) -> RiftgateResult<FeaturedGames> {
        self.get(self.featured_games_url(), None).await
    }

    pub(crate) fn featured_games_url(&self) -> String {
        self.platform_url("/lol/spectator/v5/featured-games")
    }

    /// Match ids followed by every match detail.
    ///
    /// Details are queued together and arrive in id order. A detail that
    /// fails is logged and left out; only a failure to list the ids fails
    /// the call.
    #[instrument(skip(self))]
    pub async fn match_history(&self, puuid: &str, start: u32, count: u32) -> RiftgateResult<Vec<Value>> {
        let ids = self.match_ids(puuid, start, count).await?;
        debug!(matches = ids.len(), "Fetching match details");

        let details = futures::future::join_all(ids.iter().map(|id| self.match_detail(id))).await;

        Ok(ids
            .iter()
            .zip(details)
            .filter_map(|(id, detail)| match detail {
                Ok(detail) => Some(detail),
                Err(e) => {
                    warn!(match_id = %id, error = %e, "Skipping match detail");
                    None
                }
            })
            .collect())
    }
}
