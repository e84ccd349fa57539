//! Invitation repository trait

use async_trait::async_trait;

use super::entity::Invitation;
use crate::domain::team::TeamId;
use crate::domain::DomainError;

/// Repository for managing invitations
#[async_trait]
pub trait InvitationRepository: Send + Sync + std::fmt::Debug {
    /// Get an invitation by exact token match
    async fn get_by_token(&self, token: &str) -> Result<Option<Invitation>, DomainError>;

    /// Create a new invitation
    async fn create(&self, invitation: Invitation) -> Result<Invitation, DomainError>;

    /// Update an existing invitation
    async fn update(&self, invitation: Invitation) -> Result<Invitation, DomainError>;

    /// List invitations issued for a team
    async fn list_for_team(&self, team_id: &TeamId) -> Result<Vec<Invitation>, DomainError>;
}
