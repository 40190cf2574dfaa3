use clanhall_shared::Member;
use sqlx::Row as _;

/// Row wrapper for `clan_members`. The column set is too wide for sqlx's
/// tuple mapping, so the fields are pulled out by name.
pub struct MemberRow(pub Member);

impl<'r> sqlx::FromRow<'r, sqlx::PgRow> for MemberRow {
    fn from_row(row: &'r sqlx::PgRow) -> Result<Self, sqlx::Error> {
        Ok(MemberRow(Member {
            player_name: row.try_get("player_name")?,
            player_tag: row.try_get("player_tag")?,
            discord_handle: row.try_get("discord_handle")?,
            current_trophies: row.try_get("current_trophies")?,
            current_donations: row.try_get("current_donations")?,
            current_capital_gold: row.try_get("current_capital_gold")?,
            current_clan_games: row.try_get("current_clan_games")?,
            total_trophies: row.try_get("total_trophies")?,
            total_donations: row.try_get("total_donations")?,
            total_capital_gold_achievement: row.try_get("total_capital_gold_achievement")?,
            total_clan_games_achievement: row.try_get("total_clan_games_achievement")?,
            perfect_wars: row.try_get("perfect_wars")?,
            wars_missed: row.try_get("wars_missed")?,
            perfect_month: row.try_get("perfect_month")?,
            cwl_performance: row.try_get("cwl_performance")?,
            bonus_tickets: row.try_get("bonus_tickets")?,
            disqualified: row.try_get("disqualified")?,
            trophy_tickets: row.try_get("trophy_tickets")?,
            donation_tickets: row.try_get("donation_tickets")?,
            clan_games_tickets: row.try_get("clan_games_tickets")?,
            raid_tickets: row.try_get("raid_tickets")?,
            total_tickets: row.try_get("total_tickets")?,
            last_reset_donations: row.try_get("last_reset_donations")?,
            last_reset_capital_gold: row.try_get("last_reset_capital_gold")?,
            last_reset_clan_games: row.try_get("last_reset_clan_games")?,
            last_reset_date: row.try_get("last_reset_date")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }))
    }
}

pub async fn fetch_all_members(pool: &sqlx::PgPool) -> Result<Vec<Member>, String> {
    let rows: Vec<MemberRow> = sqlx::query_as("SELECT * FROM clan_members")
        .fetch_all(pool)
        .await
        .map_err(|e| format!("load clan members: {e}"))?;
    Ok(rows.into_iter().map(|row| row.0).collect())
}
