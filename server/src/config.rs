use std::time::Duration;

pub const CLASHKING_PLAYER_URL: &str = "https://api.clashk.ing/player";

pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 21600; // every 6 hours
pub const DEFAULT_REFRESH_COOLDOWN_SECS: i64 = 3600; // 1 hour
pub const PLAYER_CACHE_TTL_SECS: i64 = 600; // 10 minutes
pub const MAX_PLAYER_CACHE_ENTRIES: usize = 64;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS: u64 = 3;
pub const SERVER_PORT: u16 = 3000;

/// Roster source. `SHEET_CSV_URL` wins when set; otherwise `SHEET_ID` is
/// expanded to the Google Sheets CSV-export URL. Neither has a built-in
/// default: an unconfigured server refuses to sync.
pub fn sheet_csv_url() -> Result<String, String> {
    if let Ok(url) = std::env::var("SHEET_CSV_URL") {
        let trimmed = url.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }
    match std::env::var("SHEET_ID") {
        Ok(id) if !id.trim().is_empty() => Ok(format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format=csv&gid=0",
            id.trim()
        )),
        _ => Err("SHEET_CSV_URL or SHEET_ID must be set".to_string()),
    }
}

/// Admin bearer token. Env-supplied only; when unset, no request can hold the
/// admin role.
pub fn admin_token() -> Option<String> {
    std::env::var("ADMIN_TOKEN")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Scheduled sync period. `None` (interval of 0) disables the background task.
pub fn sync_interval_secs() -> Option<u64> {
    let value = std::env::var("SYNC_INTERVAL_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(DEFAULT_SYNC_INTERVAL_SECS);
    (value > 0).then_some(value)
}

pub fn refresh_cooldown_secs() -> i64 {
    std::env::var("REFRESH_COOLDOWN_SECS")
        .ok()
        .and_then(|value| value.parse::<i64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_REFRESH_COOLDOWN_SECS)
}

pub fn db_max_connections() -> u32 {
    std::env::var("DB_MAX_CONNECTIONS")
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
}

pub fn upstream_http_timeout() -> Duration {
    std::env::var("UPSTREAM_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_HTTP_TIMEOUT_SECS))
}

pub fn upstream_connect_timeout() -> Duration {
    std::env::var("UPSTREAM_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_UPSTREAM_CONNECT_TIMEOUT_SECS))
}

#[cfg(test)]
mod tests {
    use super::{
        DEFAULT_REFRESH_COOLDOWN_SECS, DEFAULT_SYNC_INTERVAL_SECS, admin_token,
        refresh_cooldown_secs, sheet_csv_url, sync_interval_secs,
    };

    #[test]
    fn sheet_url_prefers_explicit_url_over_sheet_id() {
        temp_env::with_vars(
            [
                ("SHEET_CSV_URL", Some("https://example.com/roster.csv")),
                ("SHEET_ID", Some("abc123")),
            ],
            || {
                assert_eq!(
                    sheet_csv_url().expect("url should resolve"),
                    "https://example.com/roster.csv"
                );
            },
        );
    }

    #[test]
    fn sheet_url_expands_sheet_id() {
        temp_env::with_vars(
            [("SHEET_CSV_URL", None), ("SHEET_ID", Some(" abc123 "))],
            || {
                assert_eq!(
                    sheet_csv_url().expect("url should resolve"),
                    "https://docs.google.com/spreadsheets/d/abc123/export?format=csv&gid=0"
                );
            },
        );
    }

    #[test]
    fn sheet_url_requires_configuration() {
        temp_env::with_vars(
            [("SHEET_CSV_URL", None::<&str>), ("SHEET_ID", None::<&str>)],
            || {
                assert!(sheet_csv_url().is_err());
            },
        );
    }

    #[test]
    fn admin_token_has_no_default_and_ignores_blank_values() {
        temp_env::with_var("ADMIN_TOKEN", None::<&str>, || {
            assert_eq!(admin_token(), None);
        });
        temp_env::with_var("ADMIN_TOKEN", Some("   "), || {
            assert_eq!(admin_token(), None);
        });
        temp_env::with_var("ADMIN_TOKEN", Some(" s3cret "), || {
            assert_eq!(admin_token(), Some("s3cret".to_string()));
        });
    }

    #[test]
    fn sync_interval_zero_disables_the_scheduled_task() {
        temp_env::with_var("SYNC_INTERVAL_SECS", Some("0"), || {
            assert_eq!(sync_interval_secs(), None);
        });
        temp_env::with_var("SYNC_INTERVAL_SECS", Some("900"), || {
            assert_eq!(sync_interval_secs(), Some(900));
        });
        temp_env::with_var("SYNC_INTERVAL_SECS", None::<&str>, || {
            assert_eq!(sync_interval_secs(), Some(DEFAULT_SYNC_INTERVAL_SECS));
        });
    }

    #[test]
    fn refresh_cooldown_rejects_non_positive_overrides() {
        temp_env::with_var("REFRESH_COOLDOWN_SECS", Some("-5"), || {
            assert_eq!(refresh_cooldown_secs(), DEFAULT_REFRESH_COOLDOWN_SECS);
        });
        temp_env::with_var("REFRESH_COOLDOWN_SECS", Some("120"), || {
            assert_eq!(refresh_cooldown_secs(), 120);
        });
    }
}
