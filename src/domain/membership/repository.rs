//! Membership repository trait

use async_trait::async_trait;

use super::entity::Membership;
use crate::domain::team::TeamId;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Repository for managing team memberships
#[async_trait]
pub trait MembershipRepository: Send + Sync + std::fmt::Debug {
    /// Insert a membership, or update the role if the (team, user) pair
    /// already exists. Must be atomic against concurrent upserts for the
    /// same pair.
    async fn upsert(&self, membership: Membership) -> Result<Membership, DomainError>;

    /// Get a membership by team and user
    async fn get(
        &self,
        team_id: &TeamId,
        user_id: &UserId,
    ) -> Result<Option<Membership>, DomainError>;

    /// List all memberships of a team
    async fn list_for_team(&self, team_id: &TeamId) -> Result<Vec<Membership>, DomainError>;

    /// List all memberships of a user
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Membership>, DomainError>;

    /// Remove a membership. Returns true if a row was deleted.
    async fn remove(&self, team_id: &TeamId, user_id: &UserId) -> Result<bool, DomainError>;
}
