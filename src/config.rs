//! Engine settings. Defaults match the standard esports format: 16+ teams in four
//! groups, two qualifiers each.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fewest registered teams a group stage may be created with.
    pub min_group_stage_teams: usize,
    pub default_group_count: usize,
    /// Teams per group that go on to the playoff bracket.
    pub qualifiers_per_group: usize,
    /// Entries kept in the action log before the oldest are dropped.
    pub action_log_capacity: usize,
    /// Rating every team starts from.
    pub initial_rating: f64,
    /// Elo step size.
    pub rating_k: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_group_stage_teams: 16,
            default_group_count: 4,
            qualifiers_per_group: 2,
            action_log_capacity: 1000,
            initial_rating: 1000.0,
            rating_k: 32.0,
        }
    }
}
