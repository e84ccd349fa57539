//! Invitation endpoints - issuing and acceptance

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::invitation::{Invitation, InvitationStatus};
use crate::domain::team::{TeamId, TeamRole};

#[derive(Debug, Deserialize)]
pub struct IssueInvitationRequest {
    pub email: String,
    #[serde(default)]
    pub role: TeamRole,
}

#[derive(Debug, Serialize)]
pub struct IssueInvitationResponse {
    pub token: String,
    pub email: String,
    pub role: TeamRole,
    pub expires_at: DateTime<Utc>,
}

pub async fn issue_invitation(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(team_id): Path<String>,
    Json(request): Json<IssueInvitationRequest>,
) -> Result<(StatusCode, Json<IssueInvitationResponse>), ApiError> {
    let team_id = TeamId::new(team_id).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let invitation = state
        .invitation_service
        .issue(&team_id, &user, &request.email, request.role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(IssueInvitationResponse {
            token: invitation.token().to_string(),
            email: invitation.email().to_string(),
            role: invitation.role(),
            expires_at: invitation.expires_at(),
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct InvitationSummary {
    pub email: String,
    pub role: TeamRole,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<Invitation> for InvitationSummary {
    fn from(invitation: Invitation) -> Self {
        Self {
            email: invitation.email().to_string(),
            role: invitation.role(),
            status: invitation.status(),
            expires_at: invitation.expires_at(),
            created_at: invitation.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvitationListResponse {
    pub invitations: Vec<InvitationSummary>,
}

pub async fn list_invitations(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(team_id): Path<String>,
) -> Result<Json<InvitationListResponse>, ApiError> {
    let team_id = TeamId::new(team_id).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let invitations = state
        .invitation_service
        .list_for_team(&team_id, &user)
        .await?
        .into_iter()
        .map(InvitationSummary::from)
        .collect();

    Ok(Json(InvitationListResponse { invitations }))
}

#[derive(Debug, Deserialize)]
pub struct AcceptInvitationRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AcceptInvitationResponse {
    pub success: bool,
    pub team_id: String,
    pub role: TeamRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

pub async fn accept_invitation(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<AcceptInvitationRequest>,
) -> Result<Json<AcceptInvitationResponse>, ApiError> {
    let outcome = state
        .invitation_service
        .accept(&request.token, &user)
        .await?;

    Ok(Json(AcceptInvitationResponse {
        success: true,
        team_id: outcome.team_id.as_str().to_string(),
        role: outcome.role,
        warning: outcome.warning,
    }))
}
