//! Engine errors and the kinds they are reported as.

use crate::models::game::{MatchId, MatchStatus};
use crate::models::group::GroupMatchId;
use crate::models::team::TeamId;
use crate::models::tournament::TournamentId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad class of an [`EngineError`], used by callers to decide what to do next.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input; nothing was changed.
    Validation,
    /// The actor is not the required captain, referee or admin.
    Permission,
    /// The operation is not valid for the current state.
    Sequence,
    /// Another writer got there first; re-read and retry.
    Conflict,
    /// A business rule on the result was violated (tied elimination score).
    InvalidResult,
    /// An id does not refer to anything the engine knows.
    NotFound,
}

/// Errors that can occur during match, draft, bracket and group operations.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("map {0:?} is not in the tournament map pool")]
    UnknownMap(String),
    #[error("team {0} does not play in this match")]
    NotParticipant(TeamId),
    #[error("both teams must be decided first")]
    TeamsNotDecided,

    #[error("only the team captain may do this")]
    NotCaptain,
    #[error("only a referee or moderator may do this")]
    NotReferee,
    #[error("only an organizer or admin may do this")]
    NotAdmin,

    #[error("not allowed while the match is {status}")]
    InvalidState { status: MatchStatus },
    #[error("it is not your turn, team {expected} acts next")]
    NotYourTurn { expected: TeamId },
    #[error("map {0:?} was already banned or picked")]
    MapAlreadyUsed(String),
    #[error("all {best_of} maps have already been picked")]
    PicksExhausted { best_of: u32 },
    #[error("already started")]
    AlreadyStarted,
    #[error("group stage is incomplete, {unplayed} match(es) not played")]
    IncompleteGroupStage { unplayed: usize },
    #[error("need at least {required} teams, got {found}")]
    InsufficientTeams { required: usize, found: usize },
    #[error("group stage is already finalized")]
    GroupStageFinalized,

    #[error("slot in match {match_id} is already taken by team {occupant}")]
    SlotConflict { match_id: MatchId, occupant: TeamId },

    #[error("elimination matches cannot end in a draw ({0}:{0})")]
    TiedScore(u32),

    #[error("match {0} not found")]
    MatchNotFound(MatchId),
    #[error("tournament {0} not found")]
    TournamentNotFound(TournamentId),
    #[error("team {0} not found")]
    TeamNotFound(TeamId),
    #[error("group match {0} not found")]
    GroupMatchNotFound(GroupMatchId),
    #[error("tournament {0} has no bracket yet")]
    BracketNotFound(TournamentId),
    #[error("tournament {0} has no group stage")]
    GroupStageNotFound(TournamentId),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        use EngineError::*;
        match self {
            InvalidInput(_) | UnknownMap(_) | NotParticipant(_) | TeamsNotDecided => {
                ErrorKind::Validation
            }
            NotCaptain | NotReferee | NotAdmin => ErrorKind::Permission,
            InvalidState { .. }
            | NotYourTurn { .. }
            | MapAlreadyUsed(_)
            | PicksExhausted { .. }
            | AlreadyStarted
            | IncompleteGroupStage { .. }
            | InsufficientTeams { .. }
            | GroupStageFinalized => ErrorKind::Sequence,
            SlotConflict { .. } => ErrorKind::Conflict,
            TiedScore(_) => ErrorKind::InvalidResult,
            MatchNotFound(_)
            | TournamentNotFound(_)
            | TeamNotFound(_)
            | GroupMatchNotFound(_)
            | BracketNotFound(_)
            | GroupStageNotFound(_) => ErrorKind::NotFound,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        EngineError::InvalidInput(msg.into())
    }
}
