//! PostgreSQL membership repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::membership::{Membership, MembershipRepository};
use crate::domain::team::{TeamId, TeamRole};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// PostgreSQL implementation of MembershipRepository
#[derive(Debug, Clone)]
pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn upsert(&self, membership: Membership) -> Result<Membership, DomainError> {
        // ON CONFLICT on the pair key makes concurrent admissions of the
        // same user converge on a single row.
        sqlx::query(
            r#"
            INSERT INTO team_members (team_id, user_id, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (team_id, user_id)
            DO UPDATE SET role = EXCLUDED.role, updated_at = NOW()
            "#,
        )
        .bind(membership.team_id().as_str())
        .bind(membership.user_id().as_str())
        .bind(membership.role().to_string())
        .bind(membership.created_at())
        .bind(membership.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to upsert membership: {}", e)))?;

        Ok(membership)
    }

    async fn get(
        &self,
        team_id: &TeamId,
        user_id: &UserId,
    ) -> Result<Option<Membership>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT team_id, user_id, role, created_at, updated_at
            FROM team_members
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id.as_str())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get membership: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_membership(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_for_team(&self, team_id: &TeamId) -> Result<Vec<Membership>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT team_id, user_id, role, created_at, updated_at
            FROM team_members
            WHERE team_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(team_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list team members: {}", e)))?;

        let mut memberships = Vec::with_capacity(rows.len());

        for row in rows {
            memberships.push(row_to_membership(&row)?);
        }

        Ok(memberships)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Membership>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT team_id, user_id, role, created_at, updated_at
            FROM team_members
            WHERE user_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list user memberships: {}", e)))?;

        let mut memberships = Vec::with_capacity(rows.len());

        for row in rows {
            memberships.push(row_to_membership(&row)?);
        }

        Ok(memberships)
    }

    async fn remove(&self, team_id: &TeamId, user_id: &UserId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
            .bind(team_id.as_str())
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to remove membership: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_membership(row: &sqlx::postgres::PgRow) -> Result<Membership, DomainError> {
    let team_id: String = row.get("team_id");
    let user_id: String = row.get("user_id");
    let role: String = row.get("role");

    let team_id = TeamId::new(&team_id)
        .map_err(|e| DomainError::storage(format!("Invalid team ID in database: {}", e)))?;
    let user_id = UserId::new(&user_id)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;
    let role = TeamRole::parse(&role)
        .ok_or_else(|| DomainError::storage(format!("Invalid role in database: {}", role)))?;

    Ok(Membership::from_parts(
        team_id,
        user_id,
        role,
        row.get("created_at"),
        row.get("updated_at"),
    ))
}
