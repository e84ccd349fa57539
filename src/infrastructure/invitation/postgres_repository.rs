//! PostgreSQL invitation repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::invitation::{Invitation, InvitationRepository, InvitationStatus};
use crate::domain::team::{TeamId, TeamRole};
use crate::domain::user::UserId;
use crate::domain::DomainError;

const INVITATION_COLUMNS: &str =
    "token, team_id, email, role, status, expires_at, invited_by, created_at, accepted_at";

/// PostgreSQL implementation of InvitationRepository
#[derive(Debug, Clone)]
pub struct PostgresInvitationRepository {
    pool: PgPool,
}

impl PostgresInvitationRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationRepository for PostgresInvitationRepository {
    async fn get_by_token(&self, token: &str) -> Result<Option<Invitation>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM invitations WHERE token = $1",
            INVITATION_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get invitation: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_invitation(&row)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, invitation: Invitation) -> Result<Invitation, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO invitations (token, team_id, email, role, status, expires_at,
                                     invited_by, created_at, accepted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(invitation.token())
        .bind(invitation.team_id().as_str())
        .bind(invitation.email())
        .bind(invitation.role().to_string())
        .bind(invitation.status().to_string())
        .bind(invitation.expires_at())
        .bind(invitation.invited_by().as_str())
        .bind(invitation.created_at())
        .bind(invitation.accepted_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict("Invitation token already exists")
            } else {
                DomainError::storage(format!("Failed to create invitation: {}", e))
            }
        })?;

        Ok(invitation)
    }

    async fn update(&self, invitation: Invitation) -> Result<Invitation, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET status = $2, accepted_at = $3
            WHERE token = $1
            "#,
        )
        .bind(invitation.token())
        .bind(invitation.status().to_string())
        .bind(invitation.accepted_at())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update invitation: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Invitation not found"));
        }

        Ok(invitation)
    }

    async fn list_for_team(&self, team_id: &TeamId) -> Result<Vec<Invitation>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM invitations WHERE team_id = $1 ORDER BY created_at",
            INVITATION_COLUMNS
        ))
        .bind(team_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list invitations: {}", e)))?;

        let mut invitations = Vec::with_capacity(rows.len());

        for row in rows {
            invitations.push(row_to_invitation(&row)?);
        }

        Ok(invitations)
    }
}

fn row_to_invitation(row: &sqlx::postgres::PgRow) -> Result<Invitation, DomainError> {
    let team_id: String = row.get("team_id");
    let role: String = row.get("role");
    let status: String = row.get("status");
    let invited_by: String = row.get("invited_by");

    let team_id = TeamId::new(&team_id)
        .map_err(|e| DomainError::storage(format!("Invalid team ID in database: {}", e)))?;
    let invited_by = UserId::new(&invited_by)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;
    let role = TeamRole::parse(&role)
        .ok_or_else(|| DomainError::storage(format!("Invalid role in database: {}", role)))?;
    let status = InvitationStatus::parse(&status)
        .ok_or_else(|| DomainError::storage(format!("Invalid status in database: {}", status)))?;

    Ok(Invitation::from_parts(
        row.get("token"),
        team_id,
        row.get("email"),
        role,
        status,
        row.get("expires_at"),
        invited_by,
        row.get("created_at"),
        row.get("accepted_at"),
    ))
}
