//! Team strength rating, updated from elimination results.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};

/// Elo rating of a team together with its elimination record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamRating {
    pub team_id: TeamId,
    pub rating: f64,
    pub matches_played: u32,
    pub wins: u32,
    pub losses: u32,
}

impl TeamRating {
    pub fn new(team_id: TeamId, rating: f64) -> Self {
        Self {
            team_id,
            rating,
            matches_played: 0,
            wins: 0,
            losses: 0,
        }
    }
}
