//! Single-elimination bracket: generation, winner propagation, round names.

use crate::logic::scoring::award_walkover;
use crate::models::{
    Bracket, EngineError, Match, MatchId, MatchStatus, Side, TeamId, TournamentId,
};
use std::collections::HashSet;

/// Seed pairs (1-based) for round 1 of a bracket with `size` slots, in match order.
///
/// Seed `i` meets seed `size + 1 - i`, and the halves are laid out so that seeds 1 and 2
/// can only meet in the final. For 8 slots: (1,8), (4,5), (3,6), (2,7).
pub fn round_one_pairs(size: usize) -> Vec<(usize, usize)> {
    let mut tops = vec![1];
    while tops.len() * 2 < size {
        let complement = tops.len() * 2 + 1;
        tops = tops
            .iter()
            .enumerate()
            .flat_map(|(idx, &s)| {
                if idx % 2 == 0 {
                    [s, complement - s]
                } else {
                    [complement - s, s]
                }
            })
            .collect();
    }
    tops.into_iter().map(|t| (t, size + 1 - t)).collect()
}

/// Build a bracket for `seeded` (best seed first).
///
/// The field is padded with byes up to the next power of two; a bye match is completed
/// at once for the present team and its winner moved into round 2.
pub fn generate(
    tournament_id: TournamentId,
    seeded: &[TeamId],
) -> Result<(Bracket, Vec<Match>), EngineError> {
    if seeded.len() < 2 {
        return Err(EngineError::InsufficientTeams {
            required: 2,
            found: seeded.len(),
        });
    }
    let mut seen = HashSet::new();
    if let Some(dup) = seeded.iter().find(|t| !seen.insert(**t)) {
        return Err(EngineError::invalid(format!("team {dup} is seeded twice")));
    }

    let size = seeded.len().next_power_of_two();
    let max_round = size.trailing_zeros();
    let seed = |s: usize| seeded.get(s - 1).copied();

    let mut rounds: Vec<Vec<Match>> = Vec::with_capacity(max_round as usize);
    let first: Vec<Match> = round_one_pairs(size)
        .into_iter()
        .enumerate()
        .map(|(i, (a, b))| {
            let mut m = Match::new(tournament_id, 1, i as u32 + 1);
            m.team1_id = seed(a);
            m.team2_id = seed(b);
            m
        })
        .collect();
    rounds.push(first);
    for round in 2..=max_round {
        let count = size >> round;
        rounds.push(
            (1..=count as u32)
                .map(|n| Match::new(tournament_id, round, n))
                .collect(),
        );
    }

    // Byes only ever sit in the team 2 slot (seeds above the field size).
    if let [round1, round2, ..] = rounds.as_mut_slice() {
        for m in round1.iter_mut().filter(|m| m.team2_id.is_none()) {
            award_walkover(m, Side::One)?;
            let (number, _side) = destination_slot(m);
            if let Some(dest) = round2.get_mut(number as usize - 1) {
                advance_winner(m, dest)?;
            }
        }
    }

    let bracket = Bracket {
        tournament_id,
        max_round,
        rounds: rounds
            .iter()
            .map(|r| r.iter().map(|m| m.id).collect())
            .collect(),
    };
    Ok((bracket, rounds.into_iter().flatten().collect()))
}

/// Match number in the next round and the slot the winner of `m` goes to.
pub fn destination_slot(m: &Match) -> (u32, Side) {
    let number = m.match_number.div_ceil(2);
    let side = if m.match_number % 2 == 1 {
        Side::One
    } else {
        Side::Two
    };
    (number, side)
}

/// Id of the match the winner of `m` advances to, or None for the final.
pub fn destination(bracket: &Bracket, m: &Match) -> Option<(MatchId, Side)> {
    let (number, side) = destination_slot(m);
    bracket.match_at(m.round + 1, number).map(|id| (id, side))
}

/// Put the winner of completed `source` into its slot of `dest`.
///
/// Returns whether `dest` changed. The same winner twice is a no-op; a different team
/// already in the slot is a `SlotConflict`.
pub fn advance_winner(source: &Match, dest: &mut Match) -> Result<bool, EngineError> {
    if source.status != MatchStatus::Completed {
        return Err(EngineError::InvalidState {
            status: source.status,
        });
    }
    let winner = source.winner_id.ok_or(EngineError::TeamsNotDecided)?;
    let (_, side) = destination_slot(source);
    match dest.team(side) {
        None => {
            dest.set_team(side, Some(winner));
            dest.touch();
            Ok(true)
        }
        Some(current) if current == winner => Ok(false),
        Some(occupant) => Err(EngineError::SlotConflict {
            match_id: dest.id,
            occupant,
        }),
    }
}

/// Empty one team slot of a match that has no result yet, resetting its draft.
pub fn clear_slot(m: &mut Match, side: Side) -> Result<Option<TeamId>, EngineError> {
    use MatchStatus::*;
    let untouched = m.team1_report.is_none() && m.team2_report.is_none();
    if !matches!(m.status, Scheduled | Drafting | AwaitingScores) || !untouched {
        return Err(EngineError::InvalidState { status: m.status });
    }
    let previous = m.team(side);
    m.set_team(side, None);
    m.draft = None;
    m.play_order.clear();
    m.status = Scheduled;
    m.touch();
    Ok(previous)
}

/// Display name of a round, counted back from the final.
pub fn round_name(round: u32, max_round: u32) -> String {
    match max_round.saturating_sub(round) + 1 {
        1 => "Final".to_string(),
        2 => "Semifinal".to_string(),
        3 => "Quarterfinal".to_string(),
        4 => "Round of 16".to_string(),
        _ => format!("Round {round}"),
    }
}
