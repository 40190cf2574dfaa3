use crate::member::Member;

pub const DONATIONS_PER_TICKET: i32 = 2500;
pub const CLAN_GAMES_POINTS_PER_TICKET: i32 = 800;
pub const CLAN_GAMES_TICKET_CAP: i32 = 5;
pub const CAPITAL_GOLD_PER_TICKET: i32 = 10_000;

/// Trophy thresholds paired with the tickets awarded at or above each.
/// Checked top-down; anything below the last threshold scores 0.
pub const TROPHY_TICKET_STEPS: [(i32, i32); 5] = [
    (6000, 12),
    (5900, 10),
    (5800, 8),
    (5700, 7),
    (5600, 5),
];

pub fn trophy_tickets(trophies: i32) -> i32 {
    TROPHY_TICKET_STEPS
        .iter()
        .find(|(threshold, _)| trophies >= *threshold)
        .map(|(_, tickets)| *tickets)
        .unwrap_or(0)
}

pub fn donation_tickets(donations: i32) -> i32 {
    donations.max(0) / DONATIONS_PER_TICKET
}

pub fn clan_games_tickets(points: i32) -> i32 {
    (points.max(0) / CLAN_GAMES_POINTS_PER_TICKET).min(CLAN_GAMES_TICKET_CAP)
}

pub fn raid_tickets(capital_gold: i32) -> i32 {
    capital_gold.max(0) / CAPITAL_GOLD_PER_TICKET
}

/// Total score: the four cached category tickets plus the manually curated
/// columns carried through from the sheet.
pub fn total_tickets(member: &Member) -> i32 {
    member.trophy_tickets
        + member.donation_tickets
        + member.clan_games_tickets
        + member.raid_tickets
        + member.perfect_wars
        + member.wars_missed
        + member.perfect_month
        + member.cwl_performance
        + member.bonus_tickets
}

/// Recompute every cached score from the current counters. Used by the
/// importer after counters are refreshed.
pub fn compute_tickets(member: &mut Member) {
    member.trophy_tickets = trophy_tickets(member.current_trophies);
    member.donation_tickets = donation_tickets(member.current_donations);
    member.clan_games_tickets = clan_games_tickets(member.current_clan_games);
    member.raid_tickets = raid_tickets(member.current_capital_gold);
    member.total_tickets = total_tickets(member);
}

/// Read-side fallback: a zero cached score is recomputed from its counter,
/// and a zero total is rebuilt from the (possibly backfilled) parts. A
/// genuinely earned zero recomputes to zero again, so the backfill is
/// idempotent.
pub fn fill_missing_tickets(member: &mut Member) {
    if member.trophy_tickets == 0 {
        member.trophy_tickets = trophy_tickets(member.current_trophies);
    }
    if member.donation_tickets == 0 {
        member.donation_tickets = donation_tickets(member.current_donations);
    }
    if member.clan_games_tickets == 0 {
        member.clan_games_tickets = clan_games_tickets(member.current_clan_games);
    }
    if member.raid_tickets == 0 {
        member.raid_tickets = raid_tickets(member.current_capital_gold);
    }
    if member.total_tickets == 0 {
        member.total_tickets = total_tickets(member);
    }
}

#[cfg(test)]
mod tests {
    use super::{
        clan_games_tickets, compute_tickets, donation_tickets, fill_missing_tickets, raid_tickets,
        total_tickets, trophy_tickets,
    };
    use crate::member::Member;
    use chrono::Utc;

    fn member_with_counters(
        trophies: i32,
        donations: i32,
        capital_gold: i32,
        clan_games: i32,
    ) -> Member {
        Member {
            player_name: "Ash".to_string(),
            player_tag: "#ABC".to_string(),
            discord_handle: None,
            current_trophies: trophies,
            current_donations: donations,
            current_capital_gold: capital_gold,
            current_clan_games: clan_games,
            total_trophies: trophies,
            total_donations: donations,
            total_capital_gold_achievement: capital_gold,
            total_clan_games_achievement: clan_games,
            perfect_wars: 0,
            wars_missed: 0,
            perfect_month: 0,
            cwl_performance: 0,
            bonus_tickets: 0,
            disqualified: false,
            trophy_tickets: 0,
            donation_tickets: 0,
            clan_games_tickets: 0,
            raid_tickets: 0,
            total_tickets: 0,
            last_reset_donations: 0,
            last_reset_capital_gold: 0,
            last_reset_clan_games: 0,
            last_reset_date: None,
            created_at: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn trophy_tickets_match_every_breakpoint() {
        assert_eq!(trophy_tickets(0), 0);
        assert_eq!(trophy_tickets(5599), 0);
        assert_eq!(trophy_tickets(5600), 5);
        assert_eq!(trophy_tickets(5699), 5);
        assert_eq!(trophy_tickets(5700), 7);
        assert_eq!(trophy_tickets(5799), 7);
        assert_eq!(trophy_tickets(5800), 8);
        assert_eq!(trophy_tickets(5899), 8);
        assert_eq!(trophy_tickets(5900), 10);
        assert_eq!(trophy_tickets(5999), 10);
        assert_eq!(trophy_tickets(6000), 12);
        assert_eq!(trophy_tickets(7200), 12);
    }

    #[test]
    fn trophy_tickets_are_monotonic_non_decreasing() {
        let mut previous = trophy_tickets(5000);
        for trophies in 5001..6500 {
            let tickets = trophy_tickets(trophies);
            assert!(
                tickets >= previous,
                "tickets dropped from {previous} to {tickets} at {trophies} trophies"
            );
            previous = tickets;
        }
    }

    #[test]
    fn donation_tickets_floor_at_the_threshold() {
        assert_eq!(donation_tickets(0), 0);
        assert_eq!(donation_tickets(2499), 0);
        assert_eq!(donation_tickets(2500), 1);
        assert_eq!(donation_tickets(7499), 2);
    }

    #[test]
    fn clan_games_tickets_cap_at_five() {
        assert_eq!(clan_games_tickets(799), 0);
        assert_eq!(clan_games_tickets(800), 1);
        assert_eq!(clan_games_tickets(4000), 5);
        assert_eq!(clan_games_tickets(4800), 5);
    }

    #[test]
    fn raid_tickets_floor_per_ten_thousand_gold() {
        assert_eq!(raid_tickets(9999), 0);
        assert_eq!(raid_tickets(10000), 1);
        assert_eq!(raid_tickets(99999), 9);
    }

    #[test]
    fn negative_counters_score_zero() {
        assert_eq!(donation_tickets(-2500), 0);
        assert_eq!(clan_games_tickets(-800), 0);
        assert_eq!(raid_tickets(-10000), 0);
        assert_eq!(trophy_tickets(-1), 0);
    }

    #[test]
    fn compute_tickets_fills_all_cached_scores() {
        let mut member = member_with_counters(6000, 2500, 10000, 800);
        member.perfect_wars = 1;

        compute_tickets(&mut member);

        assert_eq!(member.trophy_tickets, 12);
        assert_eq!(member.donation_tickets, 1);
        assert_eq!(member.clan_games_tickets, 1);
        assert_eq!(member.raid_tickets, 1);
        assert_eq!(member.total_tickets, 16);
    }

    #[test]
    fn total_includes_manual_and_bonus_columns() {
        let mut member = member_with_counters(5999, 0, 0, 0);
        member.trophy_tickets = 10;
        member.perfect_wars = 2;
        member.wars_missed = 1;
        member.perfect_month = 3;
        member.cwl_performance = 5;
        member.bonus_tickets = 4;

        assert_eq!(total_tickets(&member), 25);
    }

    #[test]
    fn fill_missing_tickets_backfills_only_zero_fields() {
        let mut member = member_with_counters(6000, 2500, 10000, 800);
        member.trophy_tickets = 10; // stale cache, non-zero: left alone
        member.total_tickets = 13;

        fill_missing_tickets(&mut member);

        assert_eq!(member.trophy_tickets, 10);
        assert_eq!(member.donation_tickets, 1);
        assert_eq!(member.clan_games_tickets, 1);
        assert_eq!(member.raid_tickets, 1);
        assert_eq!(member.total_tickets, 13);
    }

    #[test]
    fn fill_missing_tickets_rebuilds_zero_total_from_backfilled_parts() {
        let mut member = member_with_counters(6000, 2500, 10000, 800);
        member.perfect_wars = 1;

        fill_missing_tickets(&mut member);

        assert_eq!(member.total_tickets, 16);
    }

    #[test]
    fn fill_missing_tickets_is_idempotent_for_genuine_zeros() {
        let mut member = member_with_counters(0, 0, 0, 0);
        fill_missing_tickets(&mut member);
        let first_pass = member.clone();
        fill_missing_tickets(&mut member);
        assert_eq!(member, first_pass);
        assert_eq!(member.total_tickets, 0);
    }
}
