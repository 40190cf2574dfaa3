use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One clan member as persisted in `clan_members` and served by the API.
///
/// `player_tag` is the immutable key. Current-period counters are overwritten
/// on every sync; the `total_*` achievement fields only ever grow; the
/// `*_tickets` fields are caches of the score functions in [`crate::tickets`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub player_name: String,
    pub player_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord_handle: Option<String>,

    pub current_trophies: i32,
    pub current_donations: i32,
    pub current_capital_gold: i32,
    pub current_clan_games: i32,

    pub total_trophies: i32,
    pub total_donations: i32,
    pub total_capital_gold_achievement: i32,
    pub total_clan_games_achievement: i32,

    pub perfect_wars: i32,
    pub wars_missed: i32,
    pub perfect_month: i32,
    pub cwl_performance: i32,
    #[serde(default)]
    pub bonus_tickets: i32,
    #[serde(default)]
    pub disqualified: bool,

    pub trophy_tickets: i32,
    pub donation_tickets: i32,
    pub clan_games_tickets: i32,
    pub raid_tickets: i32,
    pub total_tickets: i32,

    pub last_reset_donations: i32,
    pub last_reset_capital_gold: i32,
    pub last_reset_clan_games: i32,
    #[serde(default)]
    pub last_reset_date: Option<DateTime<Utc>>,
    /// Set by the store on first insert; absent on a record not yet written.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Counts reported by one completed roster sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub synced_members: usize,
    pub deleted_members: usize,
}
