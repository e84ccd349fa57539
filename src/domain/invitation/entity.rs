//! Invitation entity and related types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::team::{TeamId, TeamRole};
use crate::domain::user::UserId;

/// Invitation tokens expire after this many days
pub const INVITATION_TTL_DAYS: i64 = 7;

/// Maximum accepted length of a raw invitation token, in bytes
pub const MAX_TOKEN_LENGTH: usize = 128;

/// Lifecycle state of an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    /// Issued and not yet redeemed
    Pending,
    /// Redeemed by the invited user
    Accepted,
    /// Marked expired after its deadline passed
    Expired,
    /// Withdrawn by a team manager before redemption
    Revoked,
}

impl InvitationStatus {
    /// Parse a status from its wire representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "expired" => Some(Self::Expired),
            "revoked" => Some(Self::Revoked),
            _ => None,
        }
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Expired => write!(f, "expired"),
            Self::Revoked => write!(f, "revoked"),
        }
    }
}

/// An invitation for an email address to join a team with a given role.
///
/// The token doubles as the primary key; redemption always goes through an
/// exact token lookup. The email is stored lowercased and matched
/// case-insensitively against the caller at acceptance time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    /// Opaque single-use token
    token: String,
    /// Team the invitation grants access to
    team_id: TeamId,
    /// Invited email address, lowercased
    email: String,
    /// Role granted on acceptance
    role: TeamRole,
    /// Current lifecycle state
    status: InvitationStatus,
    /// Deadline after which the token can no longer be redeemed
    expires_at: DateTime<Utc>,
    /// User who issued the invitation
    invited_by: UserId,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// When the invitation was redeemed, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    accepted_at: Option<DateTime<Utc>>,
}

impl Invitation {
    /// Create a new pending invitation with the standard TTL
    pub fn new(
        token: impl Into<String>,
        team_id: TeamId,
        email: impl Into<String>,
        role: TeamRole,
        invited_by: UserId,
    ) -> Self {
        let now = Utc::now();

        Self {
            token: token.into(),
            team_id,
            email: email.into().to_lowercase(),
            role,
            status: InvitationStatus::Pending,
            expires_at: now + Duration::days(INVITATION_TTL_DAYS),
            invited_by,
            created_at: now,
            accepted_at: None,
        }
    }

    /// Restore an invitation from stored fields
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        token: String,
        team_id: TeamId,
        email: String,
        role: TeamRole,
        status: InvitationStatus,
        expires_at: DateTime<Utc>,
        invited_by: UserId,
        created_at: DateTime<Utc>,
        accepted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            token,
            team_id,
            email,
            role,
            status,
            expires_at,
            invited_by,
            created_at,
            accepted_at,
        }
    }

    // Getters

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> TeamRole {
        self.role
    }

    pub fn status(&self) -> InvitationStatus {
        self.status
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn invited_by(&self) -> &UserId {
        &self.invited_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn accepted_at(&self) -> Option<DateTime<Utc>> {
        self.accepted_at
    }

    /// Check if the invitation is still pending
    pub fn is_pending(&self) -> bool {
        self.status == InvitationStatus::Pending
    }

    /// Check if the deadline has passed at the given instant.
    /// A token presented exactly at its deadline is already invalid.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Check whether the invited email matches the given address,
    /// case-insensitively. Does not assume the stored side was
    /// lowercased at creation.
    pub fn matches_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }

    // Mutators

    /// Mark the invitation as accepted at the given instant
    pub fn mark_accepted(&mut self, at: DateTime<Utc>) {
        self.status = InvitationStatus::Accepted;
        self.accepted_at = Some(at);
    }

    /// Mark the invitation as expired
    pub fn mark_expired(&mut self) {
        self.status = InvitationStatus::Expired;
    }

    /// Mark the invitation as revoked
    pub fn mark_revoked(&mut self) {
        self.status = InvitationStatus::Revoked;
    }
}
