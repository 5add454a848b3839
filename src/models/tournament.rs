//! Tournament and TournamentStatus.

use crate::models::error::EngineError;
use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// How the tournament is played out.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    #[default]
    SingleElimination,
    /// Round-robin groups first, top teams go on to a single-elimination playoff.
    GroupThenPlayoff,
}

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Teams registering; no matches yet.
    #[default]
    Registration,
    /// Group matches are being played.
    GroupStage,
    /// Bracket generated; elimination matches in progress.
    Playoffs,
    /// Final completed; champion known.
    Completed,
}

/// Parameters for creating a tournament (admin panel form).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewTournament {
    pub name: String,
    #[serde(default)]
    pub format: TournamentFormat,
    #[serde(default = "default_team_size")]
    pub team_size: u32,
    #[serde(default = "default_best_of")]
    pub best_of: u32,
    #[serde(default)]
    pub map_pool: Vec<String>,
}

fn default_team_size() -> u32 {
    5
}

fn default_best_of() -> u32 {
    1
}

/// A tournament: settings shared by every match plus its phase.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    pub team_size: u32,
    /// Maps played per elimination match.
    pub best_of: u32,
    /// Ordered, duplicate-free list of map names.
    pub map_pool: Vec<String>,
    pub status: TournamentStatus,
    /// Winner of the final, once it is completed.
    pub champion_id: Option<TeamId>,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Validate settings and create a tournament in Registration.
    pub fn new(settings: NewTournament) -> Result<Self, EngineError> {
        let name = settings.name.trim();
        if name.is_empty() {
            return Err(EngineError::invalid("tournament name must not be empty"));
        }
        if settings.team_size == 0 {
            return Err(EngineError::invalid("team size must be at least 1"));
        }
        if settings.best_of == 0 {
            return Err(EngineError::invalid("best_of must be at least 1"));
        }

        let mut map_pool: Vec<String> = Vec::with_capacity(settings.map_pool.len());
        for map in &settings.map_pool {
            let map = map.trim();
            if map.is_empty() {
                return Err(EngineError::invalid("map names must not be empty"));
            }
            if map_pool.iter().any(|m| m.eq_ignore_ascii_case(map)) {
                return Err(EngineError::invalid(format!("map {map:?} is listed twice")));
            }
            map_pool.push(map.to_string());
        }
        if map_pool.is_empty() {
            return Err(EngineError::invalid("map pool must contain at least one map"));
        }
        if map_pool.len() < settings.best_of as usize {
            return Err(EngineError::invalid(format!(
                "map pool has {} maps, best_of {} needs at least that many",
                map_pool.len(),
                settings.best_of
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            format: settings.format,
            team_size: settings.team_size,
            best_of: settings.best_of,
            map_pool,
            status: TournamentStatus::Registration,
            champion_id: None,
            created_at: Utc::now(),
        })
    }
}
