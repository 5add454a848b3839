//! Single-elimination bracket layout and its read model.

use crate::models::game::{Match, MatchId};
use crate::models::team::TeamId;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};

/// Layout of a generated bracket. Fixed once generated; only the matches it points at change.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub tournament_id: TournamentId,
    pub max_round: u32,
    /// `rounds[r - 1][m - 1]` is match `m` of round `r`.
    pub rounds: Vec<Vec<MatchId>>,
}

impl Bracket {
    pub fn match_at(&self, round: u32, match_number: u32) -> Option<MatchId> {
        let r = usize::try_from(round.checked_sub(1)?).ok()?;
        let m = usize::try_from(match_number.checked_sub(1)?).ok()?;
        self.rounds.get(r)?.get(m).copied()
    }

    /// The single match of the last round.
    pub fn final_match(&self) -> Option<MatchId> {
        self.match_at(self.max_round, 1)
    }
}

/// Bracket for display: rounds with derived names and current match state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BracketView {
    pub tournament_id: TournamentId,
    pub max_round: u32,
    pub rounds: Vec<RoundView>,
    pub champion_id: Option<TeamId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundView {
    pub round: u32,
    pub name: String,
    pub matches: Vec<Match>,
}
