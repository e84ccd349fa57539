//! Invitation issuing and acceptance

use std::sync::Arc;

use chrono::Utc;

use crate::domain::invitation::{Invitation, InvitationRepository, MAX_TOKEN_LENGTH};
use crate::domain::membership::{Membership, MembershipRepository};
use crate::domain::team::{TeamId, TeamRepository, TeamRole};
use crate::domain::user::{validate_email, User};
use crate::domain::DomainError;
use crate::infrastructure::invitation::token::InviteTokenGenerator;
use crate::infrastructure::mail::{EmailMessage, Mailer};

/// Result of a successful acceptance
#[derive(Debug, Clone)]
pub struct AcceptOutcome {
    /// Team the caller was admitted to
    pub team_id: TeamId,
    /// Role granted
    pub role: TeamRole,
    /// Set when the membership was created but invitation bookkeeping
    /// failed afterwards. The caller is in the team either way.
    pub warning: Option<String>,
}

/// Service for issuing and accepting team invitations
#[derive(Debug, Clone)]
pub struct InvitationService {
    invitations: Arc<dyn InvitationRepository>,
    memberships: Arc<dyn MembershipRepository>,
    teams: Arc<dyn TeamRepository>,
    mailer: Arc<dyn Mailer>,
    token_generator: InviteTokenGenerator,
    from_address: String,
}

impl InvitationService {
    pub fn new(
        invitations: Arc<dyn InvitationRepository>,
        memberships: Arc<dyn MembershipRepository>,
        teams: Arc<dyn TeamRepository>,
        mailer: Arc<dyn Mailer>,
        from_address: impl Into<String>,
    ) -> Self {
        Self {
            invitations,
            memberships,
            teams,
            mailer,
            token_generator: InviteTokenGenerator::default(),
            from_address: from_address.into(),
        }
    }

    /// Issue an invitation for an email address to join a team.
    ///
    /// The inviter must hold a role that can manage members. Ownership
    /// cannot be granted by invitation. The token is delivered to the
    /// invitee by email; a delivery failure is surfaced to the caller
    /// while the invitation record stays pending, so the token can be
    /// re-sent without reissuing.
    pub async fn issue(
        &self,
        team_id: &TeamId,
        inviter: &User,
        invitee_email: &str,
        role: TeamRole,
    ) -> Result<Invitation, DomainError> {
        if !inviter.email_verified() {
            return Err(DomainError::unauthorized(
                "Email address must be verified before inviting others",
            ));
        }

        if !role.is_invitable() {
            return Err(DomainError::validation(format!(
                "Role '{}' cannot be granted through an invitation",
                role
            )));
        }

        let invitee_email = invitee_email.to_lowercase();
        validate_email(&invitee_email)
            .map_err(|e| DomainError::validation(format!("Invalid invitee email: {}", e)))?;

        let team = self
            .teams
            .get(team_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", team_id)))?;

        let inviter_membership = self
            .memberships
            .get(team_id, inviter.id())
            .await?
            .ok_or_else(|| {
                DomainError::forbidden("Only team members can issue invitations")
            })?;

        if !inviter_membership.role().can_manage_members() {
            return Err(DomainError::forbidden(
                "Only owners and admins can issue invitations",
            ));
        }

        let token = self.token_generator.generate();
        let invitation = Invitation::new(
            token,
            team_id.clone(),
            invitee_email.clone(),
            role,
            inviter.id().clone(),
        );

        let invitation = self.invitations.create(invitation).await?;

        tracing::info!(
            team_id = %team_id,
            invitee = %invitee_email,
            %role,
            "Invitation issued"
        );

        self.mailer
            .send(EmailMessage {
                from: self.from_address.clone(),
                to: invitee_email,
                subject: format!("You've been invited to join {}", team.name()),
                html: invitation_email_body(team.name(), invitation.token(), role),
            })
            .await
            .map_err(|e| {
                DomainError::delivery(format!(
                    "Invitation stored but the email could not be delivered: {}",
                    e
                ))
            })?;

        Ok(invitation)
    }

    /// Accept an invitation token on behalf of the caller.
    ///
    /// Validation short-circuits in a fixed order: caller identity,
    /// token shape, token existence, invitation status, expiry, then
    /// email binding. Only when every gate passes is the caller admitted
    /// to the team; the membership write happens before the invitation
    /// status write so a crash between the two leaves the caller in the
    /// team with a still-pending invitation, which a retry converges.
    pub async fn accept(&self, token: &str, caller: &User) -> Result<AcceptOutcome, DomainError> {
        if !caller.email_verified() {
            return Err(DomainError::unauthorized(
                "Email address must be verified before accepting invitations",
            ));
        }

        if token.is_empty() || token.len() > MAX_TOKEN_LENGTH {
            return Err(DomainError::validation("Malformed invitation token"));
        }

        let mut invitation = self
            .invitations
            .get_by_token(token)
            .await?
            .ok_or_else(|| DomainError::not_found("Invitation not found"))?;

        if !invitation.is_pending() {
            return Err(DomainError::invalid_state(format!(
                "Invitation is not pending (status: {})",
                invitation.status()
            )));
        }

        let now = Utc::now();

        // Checked independently of status; status alone cannot reflect
        // time passing without a background sweep.
        if invitation.is_expired_at(now) {
            return Err(DomainError::expired("Invitation has expired"));
        }

        if !invitation.matches_email(caller.email()) {
            return Err(DomainError::forbidden(
                "Invitation was issued for a different account",
            ));
        }

        let membership = Membership::new(
            invitation.team_id().clone(),
            caller.id().clone(),
            invitation.role(),
        );

        // Membership first. If this fails the invitation stays pending
        // and the caller can retry.
        self.memberships.upsert(membership).await?;

        let team_id = invitation.team_id().clone();
        let role = invitation.role();

        invitation.mark_accepted(now);

        // The caller is already in the team at this point, so a failed
        // status write downgrades to a warning instead of an error.
        let warning = match self.invitations.update(invitation).await {
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(
                    %team_id,
                    error = %e,
                    "Membership created but invitation status update failed"
                );
                Some("Joined the team, but invitation bookkeeping failed".to_string())
            }
        };

        tracing::info!(%team_id, user_id = %caller.id(), %role, "Invitation accepted");

        Ok(AcceptOutcome {
            team_id,
            role,
            warning,
        })
    }

    /// List invitations issued for a team. The caller must be able to
    /// manage members.
    pub async fn list_for_team(
        &self,
        team_id: &TeamId,
        caller: &User,
    ) -> Result<Vec<Invitation>, DomainError> {
        let membership = self
            .memberships
            .get(team_id, caller.id())
            .await?
            .ok_or_else(|| DomainError::forbidden("Only team members can list invitations"))?;

        if !membership.role().can_manage_members() {
            return Err(DomainError::forbidden(
                "Only owners and admins can list invitations",
            ));
        }

        self.invitations.list_for_team(team_id).await
    }
}

fn invitation_email_body(team_name: &str, token: &str, role: TeamRole) -> String {
    format!(
        "<p>You have been invited to join <strong>{}</strong> as {}.</p>\
         <p>Use this invitation code to join: <code>{}</code></p>\
         <p>The invitation expires in 7 days.</p>",
        team_name, role, token
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invitation::mock::MockInvitationRepository;
    use crate::domain::invitation::InvitationStatus;
    use crate::domain::membership::mock::MockMembershipRepository;
    use crate::domain::team::mock::MockTeamRepository;
    use crate::domain::team::Team;
    use crate::domain::user::UserId;
    use crate::infrastructure::mail::NoopMailer;
    use chrono::Duration;

    fn team_id() -> TeamId {
        TeamId::new("acme-content").unwrap()
    }

    fn verified_user(email: &str) -> User {
        let mut user = User::new(UserId::generate(), email, "Test User", "hashed").unwrap();
        user.mark_email_verified();
        user
    }

    fn pending_invitation(token: &str, email: &str) -> Invitation {
        Invitation::new(
            token,
            team_id(),
            email,
            TeamRole::Editor,
            UserId::generate(),
        )
    }

    #[derive(Debug)]
    struct FailingMailer;

    #[async_trait::async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _message: EmailMessage) -> Result<(), DomainError> {
            Err(DomainError::delivery("provider unreachable"))
        }
    }

    struct ServiceBuilder {
        invitations: MockInvitationRepository,
        memberships: MockMembershipRepository,
        teams: MockTeamRepository,
    }

    impl ServiceBuilder {
        fn new() -> Self {
            Self {
                invitations: MockInvitationRepository::new(),
                memberships: MockMembershipRepository::new(),
                teams: MockTeamRepository::new(),
            }
        }

        fn with_team(mut self) -> Self {
            self.teams = self
                .teams
                .with_team(Team::new(team_id(), "Acme Content").unwrap());
            self
        }

        fn with_invitation(mut self, invitation: Invitation) -> Self {
            self.invitations = self.invitations.with_invitation(invitation);
            self
        }

        fn with_membership(mut self, membership: Membership) -> Self {
            self.memberships = self.memberships.with_membership(membership);
            self
        }

        fn with_upsert_error(mut self, error: DomainError) -> Self {
            self.memberships = self.memberships.with_upsert_error(error);
            self
        }

        fn with_update_error(mut self, error: DomainError) -> Self {
            self.invitations = self.invitations.with_update_error(error);
            self
        }

        fn build(self) -> (InvitationService, Arc<MockMembershipRepository>) {
            let memberships = Arc::new(self.memberships);
            let service = InvitationService::new(
                Arc::new(self.invitations),
                memberships.clone(),
                Arc::new(self.teams),
                Arc::new(NoopMailer::new()),
                "noreply@example.com",
            );
            (service, memberships)
        }
    }

    #[tokio::test]
    async fn test_accept_success_creates_membership() {
        let caller = verified_user("a@x.com");
        let (service, memberships) = ServiceBuilder::new()
            .with_invitation(pending_invitation("inv_valid", "a@x.com"))
            .build();

        let outcome = service.accept("inv_valid", &caller).await.unwrap();
        assert_eq!(outcome.team_id, team_id());
        assert_eq!(outcome.role, TeamRole::Editor);
        assert!(outcome.warning.is_none());

        let membership = memberships
            .get(&team_id(), caller.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(membership.role(), TeamRole::Editor);
    }

    #[tokio::test]
    async fn test_accept_marks_invitation_accepted() {
        let caller = verified_user("a@x.com");
        let invitations = Arc::new(
            MockInvitationRepository::new()
                .with_invitation(pending_invitation("inv_valid", "a@x.com")),
        );
        let service = InvitationService::new(
            invitations.clone(),
            Arc::new(MockMembershipRepository::new()),
            Arc::new(MockTeamRepository::new()),
            Arc::new(NoopMailer::new()),
            "noreply@example.com",
        );

        service.accept("inv_valid", &caller).await.unwrap();

        let stored = invitations.get_by_token("inv_valid").await.unwrap().unwrap();
        assert_eq!(stored.status(), InvitationStatus::Accepted);
        assert!(stored.accepted_at().is_some());
    }

    #[tokio::test]
    async fn test_accept_unverified_email_rejected() {
        let caller = User::new(UserId::generate(), "a@x.com", "Test", "hashed").unwrap();
        let (service, _) = ServiceBuilder::new()
            .with_invitation(pending_invitation("inv_valid", "a@x.com"))
            .build();

        let result = service.accept("inv_valid", &caller).await;
        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_accept_empty_token() {
        let caller = verified_user("a@x.com");
        let (service, _) = ServiceBuilder::new().build();

        let result = service.accept("", &caller).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_accept_oversized_token() {
        let caller = verified_user("a@x.com");
        let (service, _) = ServiceBuilder::new().build();

        let token = "x".repeat(MAX_TOKEN_LENGTH + 1);
        let result = service.accept(&token, &caller).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_accept_unknown_token_not_found() {
        let caller = verified_user("a@x.com");
        let (service, _) = ServiceBuilder::new().build();

        let result = service.accept("inv_missing", &caller).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_accept_already_accepted_is_invalid_state() {
        let caller = verified_user("a@x.com");
        let mut invitation = pending_invitation("inv_done", "a@x.com");
        invitation.mark_accepted(Utc::now());

        let (service, _) = ServiceBuilder::new().with_invitation(invitation).build();

        let result = service.accept("inv_done", &caller).await;
        assert!(matches!(result, Err(DomainError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_accept_revoked_is_invalid_state() {
        let caller = verified_user("a@x.com");
        let mut invitation = pending_invitation("inv_revoked", "a@x.com");
        invitation.mark_revoked();

        let (service, _) = ServiceBuilder::new().with_invitation(invitation).build();

        let result = service.accept("inv_revoked", &caller).await;
        assert!(matches!(result, Err(DomainError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_accept_status_checked_before_expiry() {
        // An accepted invitation that is also past its deadline reports
        // the status problem, not the expiry.
        let caller = verified_user("a@x.com");
        let mut invitation = Invitation::from_parts(
            "inv_old".to_string(),
            team_id(),
            "a@x.com".to_string(),
            TeamRole::Editor,
            InvitationStatus::Pending,
            Utc::now() - Duration::days(1),
            UserId::generate(),
            Utc::now() - Duration::days(8),
            None,
        );
        invitation.mark_accepted(Utc::now() - Duration::days(2));

        let (service, _) = ServiceBuilder::new().with_invitation(invitation).build();

        let result = service.accept("inv_old", &caller).await;
        assert!(matches!(result, Err(DomainError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_accept_expired_pending_invitation() {
        let caller = verified_user("a@x.com");
        let invitation = Invitation::from_parts(
            "inv_expired".to_string(),
            team_id(),
            "a@x.com".to_string(),
            TeamRole::Editor,
            InvitationStatus::Pending,
            Utc::now() - Duration::seconds(1),
            UserId::generate(),
            Utc::now() - Duration::days(8),
            None,
        );

        let (service, memberships) = ServiceBuilder::new().with_invitation(invitation).build();

        let result = service.accept("inv_expired", &caller).await;
        assert!(matches!(result, Err(DomainError::Expired { .. })));

        // No membership was created
        let listed = memberships.list_for_team(&team_id()).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_accept_email_mismatch_forbidden() {
        let caller = verified_user("b@x.com");
        let (service, memberships) = ServiceBuilder::new()
            .with_invitation(pending_invitation("inv_valid", "a@x.com"))
            .build();

        let result = service.accept("inv_valid", &caller).await;
        assert!(matches!(result, Err(DomainError::Forbidden { .. })));

        let listed = memberships.list_for_team(&team_id()).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_accept_email_match_is_case_insensitive() {
        let caller = verified_user("Ada@Example.COM");
        let (service, _) = ServiceBuilder::new()
            .with_invitation(pending_invitation("inv_valid", "ada@example.com"))
            .build();

        let outcome = service.accept("inv_valid", &caller).await;
        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn test_accept_membership_failure_leaves_invitation_pending() {
        let caller = verified_user("a@x.com");
        let invitations = Arc::new(
            MockInvitationRepository::new()
                .with_invitation(pending_invitation("inv_valid", "a@x.com")),
        );
        let memberships = Arc::new(
            MockMembershipRepository::new()
                .with_upsert_error(DomainError::storage("connection reset")),
        );
        let service = InvitationService::new(
            invitations.clone(),
            memberships,
            Arc::new(MockTeamRepository::new()),
            Arc::new(NoopMailer::new()),
            "noreply@example.com",
        );

        let result = service.accept("inv_valid", &caller).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));

        let stored = invitations.get_by_token("inv_valid").await.unwrap().unwrap();
        assert_eq!(stored.status(), InvitationStatus::Pending);
    }

    #[tokio::test]
    async fn test_accept_bookkeeping_failure_succeeds_with_warning() {
        let caller = verified_user("a@x.com");
        let (service, memberships) = ServiceBuilder::new()
            .with_invitation(pending_invitation("inv_valid", "a@x.com"))
            .with_update_error(DomainError::storage("connection reset"))
            .build();

        let outcome = service.accept("inv_valid", &caller).await.unwrap();
        assert!(outcome.warning.is_some());

        // The caller is in the team despite the warning
        let membership = memberships.get(&team_id(), caller.id()).await.unwrap();
        assert!(membership.is_some());
    }

    #[tokio::test]
    async fn test_accept_twice_is_idempotent_on_membership() {
        let caller = verified_user("a@x.com");
        let (service, memberships) = ServiceBuilder::new()
            .with_invitation(pending_invitation("inv_valid", "a@x.com"))
            .build();

        service.accept("inv_valid", &caller).await.unwrap();

        // Second call fails the status gate, but exactly one membership
        // row exists.
        let second = service.accept("inv_valid", &caller).await;
        assert!(matches!(second, Err(DomainError::InvalidState { .. })));

        let listed = memberships.list_for_team(&team_id()).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_accept_concurrent_calls_single_membership() {
        let caller = verified_user("a@x.com");
        let (service, memberships) = ServiceBuilder::new()
            .with_invitation(pending_invitation("inv_valid", "a@x.com"))
            .build();
        let service = Arc::new(service);

        let mut handles = Vec::new();

        for _ in 0..8 {
            let service = service.clone();
            let caller = caller.clone();
            handles.push(tokio::spawn(async move {
                service.accept("inv_valid", &caller).await
            }));
        }

        let mut memberships_created = 0;

        for handle in handles {
            let result = handle.await.unwrap();
            // Late arrivals may observe the already-flipped status; what
            // matters is that nobody fails on the membership write and
            // exactly one row exists afterwards.
            match result {
                Ok(_) => memberships_created += 1,
                Err(DomainError::InvalidState { .. }) => {}
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert!(memberships_created >= 1);

        let listed = memberships.list_for_team(&team_id()).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_issue_success() {
        let inviter = verified_user("owner@x.com");
        let (service, _) = ServiceBuilder::new()
            .with_team()
            .with_membership(Membership::new(
                team_id(),
                inviter.id().clone(),
                TeamRole::Owner,
            ))
            .build();

        let invitation = service
            .issue(&team_id(), &inviter, "New@Member.com", TeamRole::Editor)
            .await
            .unwrap();

        assert!(invitation.token().starts_with("inv_"));
        assert_eq!(invitation.email(), "new@member.com");
        assert_eq!(invitation.role(), TeamRole::Editor);
        assert!(invitation.is_pending());
    }

    #[tokio::test]
    async fn test_issue_delivery_failure_keeps_invitation() {
        let inviter = verified_user("owner@x.com");
        let invitations = Arc::new(MockInvitationRepository::new());
        let memberships = MockMembershipRepository::new().with_membership(Membership::new(
            team_id(),
            inviter.id().clone(),
            TeamRole::Owner,
        ));
        let teams =
            MockTeamRepository::new().with_team(Team::new(team_id(), "Acme Content").unwrap());
        let service = InvitationService::new(
            invitations.clone(),
            Arc::new(memberships),
            Arc::new(teams),
            Arc::new(FailingMailer),
            "noreply@example.com",
        );

        let result = service
            .issue(&team_id(), &inviter, "new@member.com", TeamRole::Editor)
            .await;
        assert!(matches!(result, Err(DomainError::Delivery { .. })));

        // The invitation survives the failed delivery and can be re-sent
        let stored = invitations.list_for_team(&team_id()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].is_pending());
    }

    #[tokio::test]
    async fn test_issue_editor_cannot_invite() {
        let inviter = verified_user("editor@x.com");
        let (service, _) = ServiceBuilder::new()
            .with_team()
            .with_membership(Membership::new(
                team_id(),
                inviter.id().clone(),
                TeamRole::Editor,
            ))
            .build();

        let result = service
            .issue(&team_id(), &inviter, "new@member.com", TeamRole::Editor)
            .await;
        assert!(matches!(result, Err(DomainError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_issue_non_member_cannot_invite() {
        let inviter = verified_user("outsider@x.com");
        let (service, _) = ServiceBuilder::new().with_team().build();

        let result = service
            .issue(&team_id(), &inviter, "new@member.com", TeamRole::Editor)
            .await;
        assert!(matches!(result, Err(DomainError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_issue_owner_role_not_invitable() {
        let inviter = verified_user("owner@x.com");
        let (service, _) = ServiceBuilder::new()
            .with_team()
            .with_membership(Membership::new(
                team_id(),
                inviter.id().clone(),
                TeamRole::Owner,
            ))
            .build();

        let result = service
            .issue(&team_id(), &inviter, "new@member.com", TeamRole::Owner)
            .await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_issue_unknown_team() {
        let inviter = verified_user("owner@x.com");
        let (service, _) = ServiceBuilder::new().build();

        let result = service
            .issue(&team_id(), &inviter, "new@member.com", TeamRole::Editor)
            .await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_issue_invalid_invitee_email() {
        let inviter = verified_user("owner@x.com");
        let (service, _) = ServiceBuilder::new()
            .with_team()
            .with_membership(Membership::new(
                team_id(),
                inviter.id().clone(),
                TeamRole::Owner,
            ))
            .build();

        let result = service
            .issue(&team_id(), &inviter, "not-an-email", TeamRole::Editor)
            .await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_list_for_team_requires_manager() {
        let editor = verified_user("editor@x.com");
        let (service, _) = ServiceBuilder::new()
            .with_team()
            .with_membership(Membership::new(
                team_id(),
                editor.id().clone(),
                TeamRole::Editor,
            ))
            .build();

        let result = service.list_for_team(&team_id(), &editor).await;
        assert!(matches!(result, Err(DomainError::Forbidden { .. })));
    }
}
