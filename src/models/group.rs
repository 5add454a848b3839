//! Group phase: round-robin matches and the standings derived from them.

use crate::models::team::TeamId;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a group-phase match.
pub type GroupMatchId = Uuid;

/// A round-robin match. Unlike elimination matches, draws are allowed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupMatch {
    pub id: GroupMatchId,
    pub group_name: String,
    pub team1_id: TeamId,
    pub team2_id: TeamId,
    pub team1_score: u32,
    pub team2_score: u32,
    pub played: bool,
}

impl GroupMatch {
    pub fn new(group_name: impl Into<String>, team1_id: TeamId, team2_id: TeamId) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_name: group_name.into(),
            team1_id,
            team2_id,
            team1_score: 0,
            team2_score: 0,
            played: false,
        }
    }
}

/// One row of a group table. Never stored, always recomputed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupStanding {
    pub group_name: String,
    pub team_id: TeamId,
    pub matches_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub points: u32,
}

impl GroupStanding {
    pub fn new(group_name: impl Into<String>, team_id: TeamId) -> Self {
        Self {
            group_name: group_name.into(),
            team_id,
            ..Self::default()
        }
    }

    /// Add one played match from this team's point of view.
    pub fn record(&mut self, scored: u32, conceded: u32) {
        self.matches_played += 1;
        self.goals_for = self.goals_for.saturating_add(scored);
        self.goals_against = self.goals_against.saturating_add(conceded);
        self.goal_difference = i64::from(self.goals_for) - i64::from(self.goals_against);
        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => {
                self.wins += 1;
                self.points += 3;
            }
            std::cmp::Ordering::Equal => {
                self.draws += 1;
                self.points += 1;
            }
            std::cmp::Ordering::Less => self.losses += 1,
        }
    }
}

/// A named group: its teams in draw order and its round-robin matches.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub teams: Vec<TeamId>,
    pub matches: Vec<GroupMatch>,
}

impl Group {
    pub fn unplayed(&self) -> usize {
        self.matches.iter().filter(|m| !m.played).count()
    }
}

/// Read model of a whole group phase (for API / display).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupStageView {
    pub tournament_id: TournamentId,
    pub finalized: bool,
    pub groups: Vec<GroupView>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupView {
    pub name: String,
    pub matches: Vec<GroupMatch>,
    pub standings: Vec<GroupStanding>,
}
