//! Team management

use std::sync::Arc;

use crate::domain::membership::{Membership, MembershipRepository};
use crate::domain::team::{Team, TeamId, TeamRepository, TeamRole};
use crate::domain::user::User;
use crate::domain::DomainError;

/// Service for team lifecycle and membership management
#[derive(Debug, Clone)]
pub struct TeamService {
    teams: Arc<dyn TeamRepository>,
    memberships: Arc<dyn MembershipRepository>,
}

impl TeamService {
    pub fn new(teams: Arc<dyn TeamRepository>, memberships: Arc<dyn MembershipRepository>) -> Self {
        Self { teams, memberships }
    }

    /// Create a team. The creator becomes its owner.
    pub async fn create(
        &self,
        id: TeamId,
        name: &str,
        description: Option<String>,
        creator: &User,
    ) -> Result<Team, DomainError> {
        let mut team = Team::new(id.clone(), name)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        if let Some(description) = description {
            team = team.with_description(description);
        }

        let team = self.teams.create(team).await?;

        self.memberships
            .upsert(Membership::new(id, creator.id().clone(), TeamRole::Owner))
            .await?;

        tracing::info!(team_id = %team.id(), creator = %creator.id(), "Team created");

        Ok(team)
    }

    /// Update a team's name or description. The caller must be able to
    /// manage members.
    pub async fn update(
        &self,
        team_id: &TeamId,
        caller: &User,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Team, DomainError> {
        let membership = self.require_membership(team_id, caller).await?;

        if !membership.role().can_manage_members() {
            return Err(DomainError::forbidden(
                "Only owners and admins can update the team",
            ));
        }

        let mut team = self
            .teams
            .get(team_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", team_id)))?;

        if let Some(name) = name {
            team.set_name(name)
                .map_err(|e| DomainError::validation(e.to_string()))?;
        }

        if let Some(description) = description {
            team.set_description(Some(description));
        }

        self.teams.update(team).await
    }

    /// Get a team. The caller must be a member.
    pub async fn get(&self, team_id: &TeamId, caller: &User) -> Result<Team, DomainError> {
        self.require_membership(team_id, caller).await?;

        self.teams
            .get(team_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", team_id)))
    }

    /// List a team's members. The caller must be a member.
    pub async fn members(
        &self,
        team_id: &TeamId,
        caller: &User,
    ) -> Result<Vec<Membership>, DomainError> {
        self.require_membership(team_id, caller).await?;
        self.memberships.list_for_team(team_id).await
    }

    /// List the teams the caller belongs to
    pub async fn teams_for_user(&self, caller: &User) -> Result<Vec<Membership>, DomainError> {
        self.memberships.list_for_user(caller.id()).await
    }

    /// Remove a member from a team. The caller must be able to manage
    /// members; owners cannot be removed.
    pub async fn remove_member(
        &self,
        team_id: &TeamId,
        caller: &User,
        member_id: &crate::domain::user::UserId,
    ) -> Result<(), DomainError> {
        let caller_membership = self.require_membership(team_id, caller).await?;

        if !caller_membership.role().can_manage_members() {
            return Err(DomainError::forbidden(
                "Only owners and admins can remove members",
            ));
        }

        let target = self
            .memberships
            .get(team_id, member_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Member not found"))?;

        if target.role() == TeamRole::Owner {
            return Err(DomainError::invalid_state("Team owners cannot be removed"));
        }

        self.memberships.remove(team_id, member_id).await?;

        tracing::info!(%team_id, member = %member_id, "Member removed");

        Ok(())
    }

    async fn require_membership(
        &self,
        team_id: &TeamId,
        caller: &User,
    ) -> Result<Membership, DomainError> {
        self.memberships
            .get(team_id, caller.id())
            .await?
            .ok_or_else(|| DomainError::forbidden("Not a member of this team"))
    }
}
