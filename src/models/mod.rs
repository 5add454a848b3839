//! Data structures for the match engine: tournaments, teams, matches, drafts, groups.

mod bracket;
mod draft;
mod error;
mod game;
mod group;
mod rating;
mod team;
mod tournament;

pub use bracket::{Bracket, BracketView, RoundView};
pub use draft::{BanPickEntry, BanPickOutcome, BanPickView, Draft, DraftAction};
pub use error::{EngineError, ErrorKind};
pub use game::{Match, MatchId, MatchStatus, ScoreReport, Side};
pub use group::{Group, GroupMatch, GroupMatchId, GroupStageView, GroupStanding, GroupView};
pub use rating::TeamRating;
pub use team::{Actor, Role, Team, TeamId, UserId};
pub use tournament::{NewTournament, Tournament, TournamentFormat, TournamentId, TournamentStatus};
