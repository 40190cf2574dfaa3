use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sqlx::PgPool;
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use crate::config::{upstream_connect_timeout, upstream_http_timeout};
use crate::policy::RefreshPolicy;

#[derive(Clone)]
pub struct AppState {
    pub http_client: reqwest::Client,
    /// PostgreSQL pool for the roster. None if DATABASE_URL is not set.
    pub db: Option<PgPool>,
    /// Held for the duration of a sync; one writer at a time, manual or
    /// scheduled.
    pub sync_lock: Arc<Mutex<()>>,
    /// Start time of the most recent sync attempt. Feeds the cooldown policy
    /// and the health endpoint.
    pub last_sync_at: Arc<RwLock<Option<DateTime<Utc>>>>,
    pub refresh_policy: RefreshPolicy,
    pub player_cache: Arc<DashMap<String, CachedPlayer>>,
    pub observability: Arc<ObservabilityCounters>,
}

#[derive(Debug, Clone)]
pub struct CachedPlayer {
    pub data: String,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ObservabilityCounters {
    members_requests_total: AtomicU64,
    sync_requests_total: AtomicU64,
    sync_blocked_total: AtomicU64,
    sync_failures_total: AtomicU64,
    members_synced_total: AtomicU64,
    members_deleted_total: AtomicU64,
    player_requests_total: AtomicU64,
    player_cache_hits_total: AtomicU64,
    player_cache_misses_total: AtomicU64,
    player_upstream_errors_total: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct ObservabilitySnapshot {
    pub members_requests_total: u64,
    pub sync_requests_total: u64,
    pub sync_blocked_total: u64,
    pub sync_failures_total: u64,
    pub members_synced_total: u64,
    pub members_deleted_total: u64,
    pub player_requests_total: u64,
    pub player_cache_hits_total: u64,
    pub player_cache_misses_total: u64,
    pub player_upstream_errors_total: u64,
}

impl ObservabilityCounters {
    pub fn snapshot(&self) -> ObservabilitySnapshot {
        ObservabilitySnapshot {
            members_requests_total: self.members_requests_total.load(Ordering::Relaxed),
            sync_requests_total: self.sync_requests_total.load(Ordering::Relaxed),
            sync_blocked_total: self.sync_blocked_total.load(Ordering::Relaxed),
            sync_failures_total: self.sync_failures_total.load(Ordering::Relaxed),
            members_synced_total: self.members_synced_total.load(Ordering::Relaxed),
            members_deleted_total: self.members_deleted_total.load(Ordering::Relaxed),
            player_requests_total: self.player_requests_total.load(Ordering::Relaxed),
            player_cache_hits_total: self.player_cache_hits_total.load(Ordering::Relaxed),
            player_cache_misses_total: self.player_cache_misses_total.load(Ordering::Relaxed),
            player_upstream_errors_total: self.player_upstream_errors_total.load(Ordering::Relaxed),
        }
    }

    pub fn record_members_request(&self) {
        self.members_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sync_request(&self) {
        self.sync_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sync_blocked(&self) {
        self.sync_blocked_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sync_failure(&self) {
        self.sync_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_members_synced(&self, count: u64) {
        self.members_synced_total.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_members_deleted(&self, count: u64) {
        self.members_deleted_total
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_player_request(&self) {
        self.player_requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_player_cache_hit(&self) {
        self.player_cache_hits_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_player_cache_miss(&self) {
        self.player_cache_misses_total
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_player_upstream_error(&self) {
        self.player_upstream_errors_total
            .fetch_add(1, Ordering::Relaxed);
    }
}

impl AppState {
    pub fn new(db: Option<PgPool>) -> Self {
        let request_timeout = upstream_http_timeout();
        let connect_timeout = upstream_connect_timeout();
        let http_client = reqwest::Client::builder()
            .user_agent("clanhall/0.1")
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .or_else(|e| {
                warn!(
                    error = %e,
                    "failed to build configured HTTP client, retrying without custom user-agent"
                );
                reqwest::Client::builder()
                    .timeout(request_timeout)
                    .connect_timeout(connect_timeout)
                    .build()
            })
            .unwrap_or_else(|e| {
                panic!("failed to build timeout-configured HTTP client: {e}");
            });
        Self {
            http_client,
            db,
            sync_lock: Arc::new(Mutex::new(())),
            last_sync_at: Arc::new(RwLock::new(None)),
            refresh_policy: RefreshPolicy::from_config(),
            player_cache: Arc::new(DashMap::new()),
            observability: Arc::new(ObservabilityCounters::default()),
        }
    }
}
