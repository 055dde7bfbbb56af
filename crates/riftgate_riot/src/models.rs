//! Typed response models for the game-data endpoints.
//!
//! Only the fields callers rely on are typed. Match detail, match timeline
//! and challenge payloads are large and version-dependent, so the client
//! hands them out as raw `serde_json::Value`.

use serde::{Deserialize, Serialize};

/// Account identity, routed by region.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, derive_getters::Getters, derive_builder::Builder,
)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct Account {
    /// Globally unique player id
    puuid: String,
    /// Riot ID name part (absent for accounts that never set one)
    #[serde(default)]
    #[builder(default)]
    game_name: Option<String>,
    /// Riot ID tag part
    #[serde(default)]
    #[builder(default)]
    tag_line: Option<String>,
}

/// Summoner profile on one platform.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, derive_getters::Getters, derive_builder::Builder,
)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct Summoner {
    /// Globally unique player id
    puuid: String,
    /// Profile icon id
    profile_icon_id: i64,
    /// Last profile modification, epoch milliseconds
    revision_date: i64,
    /// Summoner level
    summoner_level: i64,
}

/// One ranked queue standing.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, derive_getters::Getters, derive_builder::Builder,
)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct LeagueEntry {
    /// League id
    league_id: String,
    /// Player id
    puuid: String,
    /// Queue, e.g. `RANKED_SOLO_5x5`
    queue_type: String,
    /// Tier, e.g. `GOLD`
    tier: String,
    /// Division within the tier, e.g. `II`
    rank: String,
    /// League points
    league_points: i32,
    /// Ranked wins
    wins: i32,
    /// Ranked losses
    losses: i32,
    /// On a winning streak
    #[serde(default)]
    #[builder(default)]
    hot_streak: bool,
    /// Played many games in this league
    #[serde(default)]
    #[builder(default)]
    veteran: bool,
    /// Recently joined this league
    #[serde(default)]
    #[builder(default)]
    fresh_blood: bool,
    /// Subject to decay
    #[serde(default)]
    #[builder(default)]
    inactive: bool,
}

/// Participant of a live or featured game.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, derive_getters::Getters, derive_builder::Builder,
)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct GameParticipant {
    /// Player id (hidden for some featured games)
    #[serde(default)]
    #[builder(default)]
    puuid: Option<String>,
    /// Riot ID as `name#tag`
    #[serde(default)]
    #[builder(default)]
    riot_id: Option<String>,
    /// Champion played
    champion_id: i64,
    /// Team, 100 or 200
    team_id: i64,
    /// First summoner spell
    #[serde(default)]
    #[builder(default)]
    spell1_id: i64,
    /// Second summoner spell
    #[serde(default)]
    #[builder(default)]
    spell2_id: i64,
    /// Bot-controlled participant
    #[serde(default)]
    #[builder(default)]
    bot: bool,
}

/// A match currently being played.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, derive_getters::Getters, derive_builder::Builder,
)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct CurrentGameInfo {
    /// Game id
    game_id: i64,
    /// Mode, e.g. `CLASSIC` or `ARAM`
    game_mode: String,
    /// Type, e.g. `MATCHED`
    #[serde(default)]
    #[builder(default)]
    game_type: String,
    /// Queue id
    #[serde(default)]
    #[builder(default)]
    game_queue_config_id: Option<i64>,
    /// Map id
    #[serde(default)]
    #[builder(default)]
    map_id: i64,
    /// Platform hosting the game
    #[serde(default)]
    #[builder(default)]
    platform_id: String,
    /// Start time, epoch milliseconds
    #[serde(default)]
    #[builder(default)]
    game_start_time: i64,
    /// Elapsed seconds
    #[serde(default)]
    #[builder(default)]
    game_length: i64,
    /// All participants
    #[serde(default)]
    #[builder(default)]
    participants: Vec<GameParticipant>,
}

impl CurrentGameInfo {
    /// Whether this is a regular Summoner's Rift style game.
    pub fn is_classic(&self) -> bool {
        self.game_mode == CLASSIC_MODE
    }
}

/// Game mode of standard matches.
pub const CLASSIC_MODE: &str = "CLASSIC";

/// Featured games list.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, derive_getters::Getters, derive_builder::Builder,
)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct FeaturedGames {
    /// Games currently showcased
    #[serde(default, alias = "game_list")]
    #[builder(default)]
    game_list: Vec<CurrentGameInfo>,
    /// Suggested seconds until the list should be fetched again
    #[serde(default)]
    #[builder(default)]
    client_refresh_interval: Option<i64>,
}

impl FeaturedGames {
    /// Consume the list, keeping only classic games.
    pub fn into_classic(self) -> Vec<CurrentGameInfo> {
        self.game_list
            .into_iter()
            .filter(CurrentGameInfo::is_classic)
            .collect()
    }
}
