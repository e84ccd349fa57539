//! Membership entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::team::{TeamId, TeamRole};
use crate::domain::user::UserId;

/// A user's membership in a team. Unique on (team_id, user_id);
/// re-admitting an existing member updates the role in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    /// Team the membership belongs to
    team_id: TeamId,
    /// Member user
    user_id: UserId,
    /// Role within the team
    role: TeamRole,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl Membership {
    /// Create a new membership
    pub fn new(team_id: TeamId, user_id: UserId, role: TeamRole) -> Self {
        let now = Utc::now();

        Self {
            team_id,
            user_id,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Restore a membership from stored fields
    pub fn from_parts(
        team_id: TeamId,
        user_id: UserId,
        role: TeamRole,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            team_id,
            user_id,
            role,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn role(&self) -> TeamRole {
        self.role
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Update the role
    pub fn set_role(&mut self, role: TeamRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }
}
