use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::PLAYER_CACHE_TTL_SECS;
use crate::state::AppState;

const EVICTION_INTERVAL_SECS: u64 = 300; // 5 minutes

/// Periodic sweep over the player cache. Size-based eviction happens inline on
/// insert; this task only clears entries that aged past the TTL without being
/// replaced.
pub async fn run(state: AppState) {
    let mut interval = tokio::time::interval(Duration::from_secs(EVICTION_INTERVAL_SECS));

    loop {
        interval.tick().await;

        let evicted = evict_stale_entries(&state, Utc::now());
        if evicted > 0 {
            info!(
                "evicted {evicted} stale player cache entries ({} remaining)",
                state.player_cache.len()
            );
        }
    }
}

fn evict_stale_entries(state: &AppState, now: DateTime<Utc>) -> usize {
    let before = state.player_cache.len();
    state.player_cache.retain(|_, cached| {
        now.signed_duration_since(cached.fetched_at).num_seconds() < PLAYER_CACHE_TTL_SECS
    });
    before.saturating_sub(state.player_cache.len())
}
