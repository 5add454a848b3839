//! Esports match engine: library with models, business logic and the lock-holding engine.

pub mod audit;
pub mod config;
pub mod engine;
pub mod logic;
pub mod models;

pub use audit::ActionLogEntry;
pub use config::EngineConfig;
pub use engine::{Completion, Engine};
pub use models::{
    Actor, BanPickEntry, BanPickOutcome, BanPickView, Bracket, BracketView, Draft, DraftAction,
    EngineError, ErrorKind, Group, GroupMatch, GroupMatchId, GroupStageView, GroupStanding,
    GroupView, Match, MatchId, MatchStatus, NewTournament, Role, RoundView, ScoreReport, Side,
    Team, TeamId, TeamRating, Tournament, TournamentFormat, TournamentId, TournamentStatus, UserId,
};
