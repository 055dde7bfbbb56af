//! Tests for the endpoint client against a scripted transport.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use riftgate_error::{
    GatewayErrorKind, RetryErrorKind, RiftgateErrorKind, UpstreamError, UpstreamErrorKind,
};
use riftgate_rate_limit::{CancelSignal, LimiterConfig, RetryConfig, RiftgateConfig, RoutingConfig};
use riftgate_riot::{RiotClient, Transport};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const KEY: &str = "RGAPI-test-key";

/// Replays scripted answers per URL fragment and records every call.
///
/// The last answer of a route is repeated once the script runs out. URLs
/// with no matching route answer 404.
#[derive(Default)]
struct MockTransport {
    routes: Mutex<Vec<(String, VecDeque<Result<Value, UpstreamError>>)>>,
    calls: Mutex<Vec<(String, HeaderMap, Instant)>>,
}

impl MockTransport {
    fn route(self, fragment: &str, answers: Vec<Result<Value, UpstreamError>>) -> Self {
        self.routes.lock().push((fragment.to_string(), answers.into()));
        self
    }

    fn urls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(url, _, _)| url.clone()).collect()
    }

    fn times(&self) -> Vec<Instant> {
        self.calls.lock().iter().map(|(_, _, at)| *at).collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<Value, UpstreamError> {
        self.calls
            .lock()
            .push((url.to_string(), headers.clone(), Instant::now()));

        let mut routes = self.routes.lock();
        let Some((_, answers)) = routes.iter_mut().find(|(fragment, _)| url.contains(fragment.as_str()))
        else {
            return Err(UpstreamError::new(UpstreamErrorKind::NotFound));
        };
        if answers.len() > 1 {
            answers.pop_front().unwrap()
        } else {
            answers.front().cloned().unwrap()
        }
    }
}

fn upstream(kind: UpstreamErrorKind) -> Result<Value, UpstreamError> {
    Err(UpstreamError::new(kind))
}

fn config() -> RiftgateConfig {
    RiftgateConfig {
        limiter: LimiterConfig {
            short_window_budget: 20,
            short_window_ms: 1_000,
            long_window_budget: 100,
            long_window_ms: 120_000,
            min_spacing_ms: 60,
        },
        retry: RetryConfig {
            max_attempts: 5,
            base_delay_ms: 100,
            max_delay_ms: 1_000,
            jitter_ceiling_ms: 0,
        },
        routing: RoutingConfig {
            platform: "jp1".to_string(),
            region: "asia".to_string(),
        },
    }
}

fn client(mock: &Arc<MockTransport>) -> RiotClient {
    RiotClient::with_transport(KEY, &config(), Arc::clone(mock) as Arc<dyn Transport>).unwrap()
}

fn game(id: i64, mode: &str) -> Value {
    json!({ "gameId": id, "gameMode": mode, "gameType": "MATCHED", "participants": [] })
}

#[tokio::test(start_paused = true)]
async fn test_account_lookup_encodes_riot_id_and_sends_token_header() {
    let mock = Arc::new(MockTransport::default().route(
        "by-riot-id",
        vec![Ok(json!({ "puuid": "p-1", "gameName": "Hide on bush", "tagLine": "KR 1" }))],
    ));

    let account = client(&mock).account_by_riot_id("Hide on bush", "KR 1").await.unwrap();

    assert_eq!(account.puuid(), "p-1");
    let calls = mock.calls.lock();
    let (url, headers, _) = &calls[0];
    assert_eq!(
        url,
        "https://asia.api.riotgames.com/riot/account/v1/accounts/by-riot-id/Hide%20on%20bush/KR%201"
    );
    assert_eq!(headers.get("x-riot-token").unwrap().to_str().unwrap(), KEY);
    assert!(!url.contains(KEY));
}

#[tokio::test(start_paused = true)]
async fn test_endpoints_use_their_routing_host() {
    let mock = Arc::new(
        MockTransport::default()
            .route("/ids?", vec![Ok(json!(["JP1_1", "JP1_2"]))])
            .route("/lol/league/v4/entries/by-puuid/", vec![Ok(json!([]))])
            .route("/lol/summoner/v4/", vec![Ok(json!({
                "puuid": "p-1", "profileIconId": 7, "revisionDate": 1, "summonerLevel": 300
            }))]),
    );
    let client = client(&mock);

    let ids = client.match_ids("p-1", 20, 10).await.unwrap();
    let entries = client.league_entries("p-1").await.unwrap();
    let summoner = client.summoner_by_puuid("p-1").await.unwrap();

    assert_eq!(ids, vec!["JP1_1".to_string(), "JP1_2".to_string()]);
    assert!(entries.is_empty());
    assert_eq!(*summoner.summoner_level(), 300);
    assert_eq!(
        mock.urls(),
        vec![
            "https://asia.api.riotgames.com/lol/match/v5/matches/by-puuid/p-1/ids?start=20&count=10"
                .to_string(),
            "https://jp1.api.riotgames.com/lol/league/v4/entries/by-puuid/p-1".to_string(),
            "https://jp1.api.riotgames.com/lol/summoner/v4/summoners/by-puuid/p-1".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_all_endpoints_share_one_gateway() {
    let mock = Arc::new(
        MockTransport::default()
            .route("/riot/account/", vec![Ok(json!({ "puuid": "p-1" }))])
            .route("/lol/challenges/", vec![Ok(json!({ "totalPoints": {} }))])
            .route("/timeline", vec![Ok(json!({ "info": {} }))]),
    );
    let client = client(&mock);

    let (account, challenges, timeline) = tokio::join!(
        client.account_by_puuid("p-1"),
        client.player_challenges("p-1"),
        client.match_timeline("JP1_1"),
    );
    account.unwrap();
    challenges.unwrap();
    timeline.unwrap();

    let times = mock.times();
    assert_eq!(times.len(), 3);
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(60));
    }
}

#[tokio::test(start_paused = true)]
async fn test_not_in_game_is_classified_not_found() {
    let mock = Arc::new(MockTransport::default());

    let err = client(&mock).current_game("p-1").await.unwrap_err();

    assert_eq!(err.upstream_kind(), Some(&UpstreamErrorKind::NotFound));
    assert_eq!(
        mock.urls(),
        vec!["https://jp1.api.riotgames.com/lol/spectator/v5/active-games/by-summoner/p-1".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_unexpected_payload_is_a_json_error() {
    let mock = Arc::new(MockTransport::default().route("/riot/account/", vec![Ok(json!({ "name": 3 }))]));

    let err = client(&mock).account_by_puuid("p-1").await.unwrap_err();

    assert!(matches!(err.kind(), RiftgateErrorKind::Json(_)));
}

#[test]
fn test_empty_api_key_is_rejected() {
    let mock = Arc::new(MockTransport::default());
    let err = RiotClient::with_transport("  ", &config(), mock).unwrap_err();
    assert!(matches!(err.kind(), RiftgateErrorKind::Config(_)));
}

#[tokio::test(start_paused = true)]
async fn test_match_history_skips_failed_details_in_order() {
    let mock = Arc::new(
        MockTransport::default()
            .route("/ids?", vec![Ok(json!(["M_1", "M_2", "M_3"]))])
            .route("/matches/M_1", vec![Ok(json!({ "id": 1 }))])
            .route("/matches/M_2", vec![upstream(UpstreamErrorKind::UpstreamServerError { status: 503 })])
            .route("/matches/M_3", vec![Ok(json!({ "id": 3 }))]),
    );

    let history = client(&mock).match_history("p-1", 0, 3).await.unwrap();

    assert_eq!(history, vec![json!({ "id": 1 }), json!({ "id": 3 })]);
    assert_eq!(mock.urls().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_live_game_polls_through_not_found() {
    let mock = Arc::new(MockTransport::default().route(
        "/active-games/",
        vec![
            upstream(UpstreamErrorKind::NotFound),
            upstream(UpstreamErrorKind::NotFound),
            Ok(game(42, "CLASSIC")),
        ],
    ));
    let start = Instant::now();

    let (_handle, cancel) = CancelSignal::pair();
    let found = client(&mock).wait_for_live_game("p-1", &cancel).await.unwrap();

    assert_eq!(*found.game_id(), 42);
    assert_eq!(mock.urls().len(), 3);
    assert_eq!(Instant::now() - start, Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_live_game_stops_on_expired_key() {
    let mock = Arc::new(
        MockTransport::default().route("/active-games/", vec![upstream(UpstreamErrorKind::Unauthorized)]),
    );

    let err = client(&mock)
        .wait_for_live_game("p-1", &CancelSignal::never())
        .await
        .unwrap_err();

    assert_eq!(err.upstream_kind(), Some(&UpstreamErrorKind::Unauthorized));
    assert_eq!(mock.urls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_live_game_exhausts_attempts() {
    let mock = Arc::new(MockTransport::default());

    let err = client(&mock)
        .wait_for_live_game("p-1", &CancelSignal::never())
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind(),
        RiftgateErrorKind::Retry(e) if matches!(e.kind(), RetryErrorKind::Exhausted { attempts: 5, .. })
    ));
    assert_eq!(mock.urls().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_featured_classic_games_waits_for_classic_mode() {
    let mock = Arc::new(MockTransport::default().route(
        "/featured-games",
        vec![
            Ok(json!({ "gameList": [game(1, "ARAM")] })),
            Ok(json!({ "gameList": [game(2, "ARAM"), game(3, "CLASSIC")] })),
        ],
    ));

    let games = client(&mock)
        .featured_classic_games(&CancelSignal::never())
        .await
        .unwrap();

    assert_eq!(games.len(), 1);
    assert_eq!(*games[0].game_id(), 3);
    assert_eq!(mock.urls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_poll_makes_no_calls() {
    let mock = Arc::new(MockTransport::default());
    let (handle, cancel) = CancelSignal::pair();
    handle.cancel();

    let err = client(&mock).featured_classic_games(&cancel).await.unwrap_err();

    assert!(matches!(
        err.kind(),
        RiftgateErrorKind::Retry(e) if matches!(e.kind(), RetryErrorKind::Cancelled { attempts: 0 })
    ));
    assert!(mock.urls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_queued_abandons_probe() {
    let mock = Arc::new(MockTransport::default().route(
        "/riot/account/",
        vec![Ok(json!({ "puuid": "p-1" }))],
    ));
    let client = client(&mock);
    let (handle, cancel) = CancelSignal::pair();

    // Fill the queue so the live-game probe waits for admission.
    let backlog: Vec<_> = (0..5).map(|_| client.account_by_puuid("p-1")).collect();
    let canceller = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.cancel();
    };

    let (backlog, probe, ()) = tokio::join!(
        futures::future::join_all(backlog),
        client.wait_for_live_game("p-1", &cancel),
        canceller,
    );

    assert!(backlog.iter().all(Result::is_ok));
    assert!(matches!(
        probe.unwrap_err().kind(),
        RiftgateErrorKind::Gateway(e) if e.kind() == &GatewayErrorKind::Cancelled
    ));
    assert!(!mock.urls().iter().any(|url| url.contains("/active-games/")));
}
