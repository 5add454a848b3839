//! Teams, users and the acting identity behind every engine call.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in matches, drafts and standings).
pub type TeamId = Uuid;

/// Unique identifier for a user account (captains, referees, admins).
pub type UserId = Uuid;

/// A registered team. Owned by the roster service; the engine only reads it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub logo_url: Option<String>,
    /// The only user allowed to report scores and draft maps for this team.
    pub captain_id: UserId,
}

impl Team {
    /// Create a new team with a fresh id and no logo.
    pub fn new(name: impl Into<String>, captain_id: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            logo_url: None,
            captain_id,
        }
    }

    pub fn is_captain(&self, user_id: UserId) -> bool {
        self.captain_id == user_id
    }
}

/// Site role of a user, as assigned by the admin panel.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Player,
    Referee,
    Moderator,
    Organizer,
    Admin,
}

impl Role {
    /// Referees and everyone above them may resolve and override matches.
    pub fn can_officiate(self) -> bool {
        !matches!(self, Role::Player)
    }

    /// Organizers and admins may create stages and generate brackets.
    pub fn can_administer(self) -> bool {
        matches!(self, Role::Organizer | Role::Admin)
    }
}

/// The authenticated user performing an operation.
///
/// Built server-side from a verified session, never from request bodies.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}
