//! Elo updates after a completed elimination match.

use crate::models::TeamRating;

/// Chance that a team rated `rating` beats one rated `opponent`.
pub fn expected_score(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - rating) / 400.0))
}

/// Apply one result to both ratings, with step size `k`.
pub fn record_result(winner: &mut TeamRating, loser: &mut TeamRating, k: f64) {
    let winner_expected = expected_score(winner.rating, loser.rating);
    let loser_expected = expected_score(loser.rating, winner.rating);
    winner.rating += k * (1.0 - winner_expected);
    loser.rating -= k * loser_expected;

    winner.matches_played += 1;
    winner.wins += 1;
    loser.matches_played += 1;
    loser.losses += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn even_teams_move_by_half_k() {
        let mut w = TeamRating::new(Uuid::new_v4(), 1000.0);
        let mut l = TeamRating::new(Uuid::new_v4(), 1000.0);
        record_result(&mut w, &mut l, 32.0);
        assert!((w.rating - 1016.0).abs() < 1e-9);
        assert!((l.rating - 984.0).abs() < 1e-9);
        assert_eq!((w.wins, w.losses, l.wins, l.losses), (1, 0, 0, 1));
    }

    #[test]
    fn upset_moves_more_than_expected_win() {
        let mut favourite = TeamRating::new(Uuid::new_v4(), 1400.0);
        let mut underdog = TeamRating::new(Uuid::new_v4(), 1000.0);
        record_result(&mut underdog, &mut favourite, 32.0);
        let gained = underdog.rating - 1000.0;
        assert!(gained > 16.0 && gained < 32.0);
        assert!((1400.0 - favourite.rating - gained).abs() < 1e-9);
    }
}
