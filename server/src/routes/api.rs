use std::fmt::Write as _;

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use chrono::Utc;
use clanhall_shared::{Member, fill_missing_tickets};
use tracing::warn;

use crate::config::{CLASHKING_PLAYER_URL, MAX_PLAYER_CACHE_ENTRIES, PLAYER_CACHE_TTL_SECS};
use crate::db_rows;
use crate::state::{AppState, CachedPlayer, ObservabilitySnapshot};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";
const MAX_PLAYER_TAG_LEN: usize = 15;

/// Full roster, highest ticket score first. Ticket caches left at zero by
/// older imports are recomputed on the way out.
pub async fn get_members(State(state): State<AppState>) -> Result<Json<Vec<Member>>, StatusCode> {
    state.observability.record_members_request();

    let Some(pool) = state.db.as_ref() else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let mut members = db_rows::fetch_all_members(pool).await.map_err(|e| {
        warn!("Failed to load clan members: {e}");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    for member in &mut members {
        fill_missing_tickets(member);
    }
    members.sort_by(|a, b| b.total_tickets.cmp(&a.total_tickets));

    Ok(Json(members))
}

pub async fn get_player(
    State(state): State<AppState>,
    Path(raw_tag): Path<String>,
) -> Result<Response, StatusCode> {
    state.observability.record_player_request();
    let tag = normalize_player_tag(&raw_tag)?;

    // Check cache
    if let Some(cached) = state.player_cache.get(&tag) {
        let age = Utc::now()
            .signed_duration_since(cached.fetched_at)
            .num_seconds();
        if age < PLAYER_CACHE_TTL_SECS {
            state.observability.record_player_cache_hit();
            return Ok(json_text_response(
                cached.data.clone(),
                "public, max-age=60",
            ));
        }
    }
    state.observability.record_player_cache_miss();

    let url = player_details_url(&tag)?;
    let resp = state.http_client.get(url).send().await.map_err(|_| {
        state.observability.record_player_upstream_error();
        StatusCode::BAD_GATEWAY
    })?;

    if !resp.status().is_success() {
        state.observability.record_player_upstream_error();
        return Err(StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY));
    }

    let data = resp.text().await.map_err(|_| {
        state.observability.record_player_upstream_error();
        StatusCode::BAD_GATEWAY
    })?;

    cache_player_payload(&state, tag, data.clone());

    Ok(json_text_response(data, "public, max-age=60"))
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let last_sync_at = (*state.last_sync_at.read().await).map(|at| at.to_rfc3339());
    let observability = state.observability.snapshot();
    Json(serde_json::json!({
        "status": "ok",
        "database_available": state.db.is_some(),
        "player_cache_size": state.player_cache.len(),
        "last_sync_at": last_sync_at,
        "observability": {
            "members_requests_total": observability.members_requests_total,
            "sync_requests_total": observability.sync_requests_total,
            "sync_blocked_total": observability.sync_blocked_total,
            "sync_failures_total": observability.sync_failures_total,
            "members_synced_total": observability.members_synced_total,
            "members_deleted_total": observability.members_deleted_total,
            "player_requests_total": observability.player_requests_total,
            "player_cache_hits_total": observability.player_cache_hits_total,
            "player_cache_misses_total": observability.player_cache_misses_total,
            "player_upstream_errors_total": observability.player_upstream_errors_total,
        }
    }))
}

pub async fn metrics(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let database_available = state.db.is_some();
    let player_cache_size = state.player_cache.len();
    let observability = state.observability.snapshot();

    let body = render_prometheus_metrics(database_available, player_cache_size, observability);

    (
        [
            (header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        body,
    )
}

fn render_prometheus_metrics(
    database_available: bool,
    player_cache_size: usize,
    observability: ObservabilitySnapshot,
) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "# HELP clanhall_database_available Whether the roster store is available (1 or 0)."
    );
    let _ = writeln!(body, "# TYPE clanhall_database_available gauge");
    let _ = writeln!(
        body,
        "clanhall_database_available {}",
        u8::from(database_available)
    );

    let _ = writeln!(
        body,
        "# HELP clanhall_player_cache_size Current number of player entries in cache."
    );
    let _ = writeln!(body, "# TYPE clanhall_player_cache_size gauge");
    let _ = writeln!(body, "clanhall_player_cache_size {player_cache_size}");

    let _ = writeln!(
        body,
        "# HELP clanhall_members_requests_total Total /api/members requests."
    );
    let _ = writeln!(body, "# TYPE clanhall_members_requests_total counter");
    let _ = writeln!(
        body,
        "clanhall_members_requests_total {}",
        observability.members_requests_total
    );

    let _ = writeln!(
        body,
        "# HELP clanhall_sync_requests_total Total /api/sync requests."
    );
    let _ = writeln!(body, "# TYPE clanhall_sync_requests_total counter");
    let _ = writeln!(
        body,
        "clanhall_sync_requests_total {}",
        observability.sync_requests_total
    );

    let _ = writeln!(
        body,
        "# HELP clanhall_sync_blocked_total Total refresh requests rejected by cooldown or an in-flight sync."
    );
    let _ = writeln!(body, "# TYPE clanhall_sync_blocked_total counter");
    let _ = writeln!(
        body,
        "clanhall_sync_blocked_total {}",
        observability.sync_blocked_total
    );

    let _ = writeln!(
        body,
        "# HELP clanhall_sync_failures_total Total roster syncs that ended in an error."
    );
    let _ = writeln!(body, "# TYPE clanhall_sync_failures_total counter");
    let _ = writeln!(
        body,
        "clanhall_sync_failures_total {}",
        observability.sync_failures_total
    );

    let _ = writeln!(
        body,
        "# HELP clanhall_members_synced_total Total member records written by roster syncs."
    );
    let _ = writeln!(body, "# TYPE clanhall_members_synced_total counter");
    let _ = writeln!(
        body,
        "clanhall_members_synced_total {}",
        observability.members_synced_total
    );

    let _ = writeln!(
        body,
        "# HELP clanhall_members_deleted_total Total member records deleted by roster syncs."
    );
    let _ = writeln!(body, "# TYPE clanhall_members_deleted_total counter");
    let _ = writeln!(
        body,
        "clanhall_members_deleted_total {}",
        observability.members_deleted_total
    );

    let _ = writeln!(
        body,
        "# HELP clanhall_player_requests_total Total /api/player requests."
    );
    let _ = writeln!(body, "# TYPE clanhall_player_requests_total counter");
    let _ = writeln!(
        body,
        "clanhall_player_requests_total {}",
        observability.player_requests_total
    );

    let _ = writeln!(
        body,
        "# HELP clanhall_player_cache_hits_total Total player lookups served from cache."
    );
    let _ = writeln!(body, "# TYPE clanhall_player_cache_hits_total counter");
    let _ = writeln!(
        body,
        "clanhall_player_cache_hits_total {}",
        observability.player_cache_hits_total
    );

    let _ = writeln!(
        body,
        "# HELP clanhall_player_cache_misses_total Total player lookups fetched upstream."
    );
    let _ = writeln!(body, "# TYPE clanhall_player_cache_misses_total counter");
    let _ = writeln!(
        body,
        "clanhall_player_cache_misses_total {}",
        observability.player_cache_misses_total
    );

    let _ = writeln!(
        body,
        "# HELP clanhall_player_upstream_errors_total Total upstream failures while serving /api/player."
    );
    let _ = writeln!(body, "# TYPE clanhall_player_upstream_errors_total counter");
    let _ = writeln!(
        body,
        "clanhall_player_upstream_errors_total {}",
        observability.player_upstream_errors_total
    );

    body
}

/// Canonical tag form: uppercase, single leading `#`. Rejects anything that
/// is not 1-15 ASCII alphanumerics.
fn normalize_player_tag(raw: &str) -> Result<String, StatusCode> {
    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if bare.is_empty() || bare.len() > MAX_PLAYER_TAG_LEN {
        return Err(StatusCode::BAD_REQUEST);
    }
    if !bare.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(format!("#{}", bare.to_ascii_uppercase()))
}

fn player_details_url(tag: &str) -> Result<reqwest::Url, StatusCode> {
    let mut url = reqwest::Url::parse(CLASHKING_PLAYER_URL)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let Ok(mut path_segments) = url.path_segments_mut() else {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    };
    path_segments.push(tag);
    drop(path_segments);
    Ok(url)
}

fn cache_player_payload(state: &AppState, tag: String, data: String) {
    if !state.player_cache.contains_key(&tag) {
        while state.player_cache.len() >= MAX_PLAYER_CACHE_ENTRIES {
            if !evict_oldest_player_entry(state) {
                break;
            }
        }
    }

    state.player_cache.insert(
        tag,
        CachedPlayer {
            data,
            fetched_at: Utc::now(),
        },
    );
}

fn evict_oldest_player_entry(state: &AppState) -> bool {
    let Some(oldest_tag) = state
        .player_cache
        .iter()
        .min_by_key(|entry| entry.value().fetched_at)
        .map(|entry| entry.key().clone())
    else {
        return false;
    };
    state.player_cache.remove(&oldest_tag).is_some()
}

fn json_text_response(body: String, cache_control: &'static str) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    response
}
