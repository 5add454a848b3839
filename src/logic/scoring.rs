//! Match state machine: captain score reports, referee decisions, completion.

use crate::models::{EngineError, Match, MatchStatus, ScoreReport, Side, UserId};
use chrono::Utc;

/// Store a captain's report for `side` and settle the match if both sides now agree.
///
/// Agreeing reports confirm the match, disagreeing ones put it in `Disputed`.
/// A tied report is rejected outright since it could never be confirmed.
pub fn report_score(
    m: &mut Match,
    side: Side,
    team_score: u32,
    opponent_score: u32,
    reported_by: UserId,
) -> Result<(), EngineError> {
    if team_score == opponent_score {
        return Err(EngineError::TiedScore(team_score));
    }
    if !m.status.accepts_reports() {
        return Err(EngineError::InvalidState { status: m.status });
    }

    *m.report_mut(side) = Some(ScoreReport::new(team_score, opponent_score, reported_by));

    if let (Some(r1), Some(r2)) = (m.team1_report, m.team2_report) {
        if r1.agrees_with(&r2) {
            settle(m, r1.team_score, r1.opponent_score, false)?;
        } else {
            m.status = MatchStatus::Disputed;
        }
    }
    m.touch();
    Ok(())
}

/// Drop both captain reports (and a not yet completed result); back to `AwaitingScores`.
pub fn reset_score(m: &mut Match) -> Result<(), EngineError> {
    use MatchStatus::*;
    if !matches!(m.status, AwaitingScores | Disputed | Confirmed) {
        return Err(EngineError::InvalidState { status: m.status });
    }
    m.clear_result();
    m.status = AwaitingScores;
    m.touch();
    Ok(())
}

/// Referee decision: set the result directly, overriding whatever the captains reported.
pub fn confirm_match(m: &mut Match, team1_score: u32, team2_score: u32) -> Result<(), EngineError> {
    if team1_score == team2_score {
        return Err(EngineError::TiedScore(team1_score));
    }
    if !matches!(m.status, MatchStatus::AwaitingScores | MatchStatus::Disputed) {
        return Err(EngineError::InvalidState { status: m.status });
    }
    settle(m, team1_score, team2_score, true)?;
    m.touch();
    Ok(())
}

/// Move a confirmed match to `Completed`.
///
/// Returns `false` when the match was already completed, so retried calls are harmless.
pub fn complete_match(m: &mut Match) -> Result<bool, EngineError> {
    match m.status {
        MatchStatus::Completed => Ok(false),
        MatchStatus::Confirmed => {
            m.status = MatchStatus::Completed;
            m.completed_at = Some(Utc::now());
            m.touch();
            Ok(true)
        }
        status => Err(EngineError::InvalidState { status }),
    }
}

/// Void the result of a match and reopen it for reporting. Does not touch the bracket.
pub fn nullify_match(m: &mut Match) -> Result<(), EngineError> {
    use MatchStatus::*;
    if !matches!(m.status, AwaitingScores | Disputed | Confirmed | Completed) {
        return Err(EngineError::InvalidState { status: m.status });
    }
    if m.walkover {
        return Err(EngineError::invalid("a walkover has no result to nullify"));
    }
    m.clear_result();
    m.status = AwaitingScores;
    m.touch();
    Ok(())
}

/// Cancel a match for good. Completed matches must be nullified first.
pub fn cancel_match(m: &mut Match) -> Result<(), EngineError> {
    if !m.status.is_open() {
        return Err(EngineError::InvalidState { status: m.status });
    }
    m.clear_result();
    m.status = MatchStatus::Nullified;
    m.touch();
    Ok(())
}

/// Complete a match whose opponent slot is a bye in favour of `side`.
pub fn award_walkover(m: &mut Match, side: Side) -> Result<(), EngineError> {
    if m.status != MatchStatus::Scheduled {
        return Err(EngineError::InvalidState { status: m.status });
    }
    let winner = m.team(side).ok_or(EngineError::TeamsNotDecided)?;
    m.winner_id = Some(winner);
    m.walkover = true;
    m.status = MatchStatus::Completed;
    m.completed_at = Some(Utc::now());
    m.touch();
    Ok(())
}

/// Record a final score pair and its winner, and mark the match `Confirmed`.
fn settle(m: &mut Match, team1_score: u32, team2_score: u32, by_referee: bool) -> Result<(), EngineError> {
    let (team1, team2) = m.teams().ok_or(EngineError::TeamsNotDecided)?;
    let winner = match team1_score.cmp(&team2_score) {
        std::cmp::Ordering::Greater => team1,
        std::cmp::Ordering::Less => team2,
        std::cmp::Ordering::Equal => return Err(EngineError::TiedScore(team1_score)),
    };
    m.confirmed_score_team1 = Some(team1_score);
    m.confirmed_score_team2 = Some(team2_score);
    m.winner_id = Some(winner);
    m.referee_override = by_referee;
    m.status = MatchStatus::Confirmed;
    Ok(())
}
