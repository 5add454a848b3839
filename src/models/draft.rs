//! Map ban/pick draft state kept on a match.

use crate::models::game::{Match, MatchId, MatchStatus};
use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a team does with a map on its turn.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftAction {
    Ban,
    Pick,
}

/// One committed draft action.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BanPickEntry {
    pub map_name: String,
    pub action: DraftAction,
    /// The team whose turn it was (also when a referee acted for it).
    pub acting_team_id: TeamId,
    /// 1-based, strictly increasing within a match.
    pub pick_order: u32,
    pub by_referee: bool,
    pub created_at: DateTime<Utc>,
}

/// Draft of a single match: the pool snapshot, the fixed turn order and what happened so far.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub map_pool: Vec<String>,
    pub best_of: u32,
    /// Acts on even turns (first, third, ...).
    pub first_team: TeamId,
    pub second_team: TeamId,
    pub entries: Vec<BanPickEntry>,
}

impl Draft {
    pub fn new(map_pool: Vec<String>, best_of: u32, first_team: TeamId, second_team: TeamId) -> Self {
        Self {
            map_pool,
            best_of,
            first_team,
            second_team,
            entries: Vec::new(),
        }
    }

    /// Team that acts next.
    pub fn team_on_turn(&self) -> TeamId {
        if self.entries.len() % 2 == 0 {
            self.first_team
        } else {
            self.second_team
        }
    }

    pub fn entry_for(&self, map_name: &str) -> Option<&BanPickEntry> {
        self.entries.iter().find(|e| e.map_name == map_name)
    }

    fn count(&self, action: DraftAction) -> usize {
        self.entries.iter().filter(|e| e.action == action).count()
    }

    pub fn picks(&self) -> usize {
        self.count(DraftAction::Pick)
    }

    /// Maps not banned so far (picked or still open).
    pub fn remaining_maps(&self) -> usize {
        self.map_pool.len() - self.count(DraftAction::Ban)
    }

    pub fn is_complete(&self) -> bool {
        self.remaining_maps() <= self.best_of as usize
    }

    /// Picked maps in pick order, then the untouched maps in pool order.
    pub fn play_order(&self) -> Vec<String> {
        let picked = self
            .entries
            .iter()
            .filter(|e| e.action == DraftAction::Pick)
            .map(|e| e.map_name.clone());
        let open = self
            .map_pool
            .iter()
            .filter(|m| self.entry_for(m).is_none())
            .cloned();
        picked.chain(open).collect()
    }
}

/// Draft state of a match as shown to captains (for API / display).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BanPickView {
    pub match_id: MatchId,
    pub status: MatchStatus,
    pub map_pool: Vec<String>,
    pub best_of: u32,
    pub entries: Vec<BanPickEntry>,
    /// None before the draft starts and after it ends.
    pub next_team: Option<TeamId>,
    pub remaining_maps: usize,
    pub complete: bool,
    pub play_order: Vec<String>,
}

impl BanPickView {
    pub fn from_match(m: &Match) -> Self {
        match &m.draft {
            Some(d) => Self {
                match_id: m.id,
                status: m.status,
                map_pool: d.map_pool.clone(),
                best_of: d.best_of,
                entries: d.entries.clone(),
                next_team: (!d.is_complete()).then(|| d.team_on_turn()),
                remaining_maps: d.remaining_maps(),
                complete: d.is_complete(),
                play_order: m.play_order.clone(),
            },
            None => Self {
                match_id: m.id,
                status: m.status,
                map_pool: Vec::new(),
                best_of: 0,
                entries: Vec::new(),
                next_team: None,
                remaining_maps: 0,
                complete: false,
                play_order: m.play_order.clone(),
            },
        }
    }
}

/// Result of a ban/pick submission.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BanPickOutcome {
    pub entry: BanPickEntry,
    /// The same action had already been committed; nothing changed.
    pub duplicate: bool,
    pub draft_complete: bool,
}
