//! Bounded in-memory log of referee and admin actions.

use crate::models::{Actor, Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

/// One staff action, newest entries have the highest `seq`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub seq: u64,
    pub user_id: UserId,
    pub role: Role,
    pub action: String,
    /// "match", "tournament", "group_match", ...
    pub target_type: String,
    pub target_id: Uuid,
    pub description: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ActionLog {
    capacity: usize,
    inner: Mutex<(u64, VecDeque<ActionLogEntry>)>,
}

impl ActionLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new((0, VecDeque::new())),
        }
    }

    pub fn record(
        &self,
        actor: &Actor,
        action: &str,
        target_type: &str,
        target_id: Uuid,
        description: impl Into<String>,
    ) {
        let description = description.into();
        log::info!(
            "{:?} {} {} on {} {}: {}",
            actor.role,
            actor.user_id,
            action,
            target_type,
            target_id,
            description
        );
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let (seq, entries) = &mut *guard;
        *seq += 1;
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(ActionLogEntry {
            seq: *seq,
            user_id: actor.user_id,
            role: actor.role,
            action: action.to_string(),
            target_type: target_type.to_string(),
            target_id,
            description,
            at: Utc::now(),
        });
    }

    /// Up to `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<ActionLogEntry> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.1.iter().rev().take(limit).cloned().collect()
    }
}
