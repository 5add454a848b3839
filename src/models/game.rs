//! Elimination match, its status, and the two sides playing it.

use crate::models::draft::Draft;
use crate::models::team::{TeamId, UserId};
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which slot of a match a team occupies.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    One,
    Two,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

/// Lifecycle of an elimination match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Waiting for teams and/or the map draft to begin.
    #[default]
    Scheduled,
    /// Captains are banning and picking maps.
    Drafting,
    /// Maps are decided; captains may report scores.
    AwaitingScores,
    /// Captain reports disagree; a referee has to step in.
    Disputed,
    /// Result is settled but not yet propagated.
    Confirmed,
    /// Result is final and the winner has advanced.
    Completed,
    /// Cancelled by a referee. Absorbing.
    Nullified,
}

impl MatchStatus {
    /// Statuses in which a captain may (re)submit a score report.
    pub fn accepts_reports(self) -> bool {
        matches!(self, MatchStatus::AwaitingScores | MatchStatus::Disputed)
    }

    /// Still waiting on something before the winner is known.
    pub fn is_open(self) -> bool {
        !matches!(self, MatchStatus::Completed | MatchStatus::Nullified)
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Drafting => "drafting",
            MatchStatus::AwaitingScores => "awaiting_scores",
            MatchStatus::Disputed => "disputed",
            MatchStatus::Confirmed => "confirmed",
            MatchStatus::Completed => "completed",
            MatchStatus::Nullified => "nullified",
        };
        f.write_str(s)
    }
}

/// A score as asserted by one team's captain, from that team's point of view.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub team_score: u32,
    pub opponent_score: u32,
    pub reported_by: UserId,
    pub reported_at: DateTime<Utc>,
}

impl ScoreReport {
    pub fn new(team_score: u32, opponent_score: u32, reported_by: UserId) -> Self {
        Self {
            team_score,
            opponent_score,
            reported_by,
            reported_at: Utc::now(),
        }
    }

    /// Two reports from opposite sides agree when each one's own score is the other's opponent score.
    pub fn agrees_with(&self, other: &ScoreReport) -> bool {
        self.team_score == other.opponent_score && self.opponent_score == other.team_score
    }
}

/// A single elimination match inside a bracket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// 1-based round; round 1 is the first round of the bracket.
    pub round: u32,
    /// 1-based position within the round.
    pub match_number: u32,
    /// None until seeded or fed by the previous round.
    pub team1_id: Option<TeamId>,
    pub team2_id: Option<TeamId>,
    pub team1_report: Option<ScoreReport>,
    pub team2_report: Option<ScoreReport>,
    pub confirmed_score_team1: Option<u32>,
    pub confirmed_score_team2: Option<u32>,
    pub winner_id: Option<TeamId>,
    pub status: MatchStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub draft: Option<Draft>,
    /// Maps to be played, in order, once the draft is over.
    pub play_order: Vec<String>,
    /// Won by default because the opponent slot was a bye.
    pub walkover: bool,
    /// Result was set by a referee rather than agreed by captains.
    pub referee_override: bool,
    /// Bumped on every change so clients can tell stale snapshots apart.
    pub version: u64,
}

impl Match {
    pub fn new(tournament_id: TournamentId, round: u32, match_number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            round,
            match_number,
            team1_id: None,
            team2_id: None,
            team1_report: None,
            team2_report: None,
            confirmed_score_team1: None,
            confirmed_score_team2: None,
            winner_id: None,
            status: MatchStatus::Scheduled,
            scheduled_at: None,
            completed_at: None,
            draft: None,
            play_order: Vec::new(),
            walkover: false,
            referee_override: false,
            version: 0,
        }
    }

    pub fn team(&self, side: Side) -> Option<TeamId> {
        match side {
            Side::One => self.team1_id,
            Side::Two => self.team2_id,
        }
    }

    pub fn set_team(&mut self, side: Side, team: Option<TeamId>) {
        match side {
            Side::One => self.team1_id = team,
            Side::Two => self.team2_id = team,
        }
    }

    /// Which side `team` plays on, if any.
    pub fn side_of(&self, team: TeamId) -> Option<Side> {
        if self.team1_id == Some(team) {
            Some(Side::One)
        } else if self.team2_id == Some(team) {
            Some(Side::Two)
        } else {
            None
        }
    }

    /// Both team ids, once both slots are filled.
    pub fn teams(&self) -> Option<(TeamId, TeamId)> {
        Some((self.team1_id?, self.team2_id?))
    }

    pub fn report(&self, side: Side) -> Option<&ScoreReport> {
        match side {
            Side::One => self.team1_report.as_ref(),
            Side::Two => self.team2_report.as_ref(),
        }
    }

    pub fn report_mut(&mut self, side: Side) -> &mut Option<ScoreReport> {
        match side {
            Side::One => &mut self.team1_report,
            Side::Two => &mut self.team2_report,
        }
    }

    /// Confirmed scores as (team1, team2), when both are set.
    pub fn confirmed_scores(&self) -> Option<(u32, u32)> {
        Some((self.confirmed_score_team1?, self.confirmed_score_team2?))
    }

    /// Drop reports, confirmed scores and the winner.
    pub fn clear_result(&mut self) {
        self.team1_report = None;
        self.team2_report = None;
        self.confirmed_score_team1 = None;
        self.confirmed_score_team2 = None;
        self.winner_id = None;
        self.completed_at = None;
        self.referee_override = false;
    }

    /// Record that the match changed.
    pub fn touch(&mut self) {
        self.version += 1;
    }
}
