//! Team management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::membership::Membership;
use crate::domain::team::{Team, TeamId, TeamRole};
use crate::domain::user::UserId;

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub async fn create_team(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    let team_id = TeamId::new(request.id).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let team = state
        .team_service
        .create(team_id, &request.name, request.description, &user)
        .await?;

    Ok((StatusCode::CREATED, Json(team)))
}

#[derive(Debug, Serialize)]
pub struct TeamSummary {
    pub team_id: String,
    pub role: TeamRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TeamListResponse {
    pub teams: Vec<TeamSummary>,
}

pub async fn list_teams(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<TeamListResponse>, ApiError> {
    let teams = state
        .team_service
        .teams_for_user(&user)
        .await?
        .into_iter()
        .map(|m| TeamSummary {
            team_id: m.team_id().as_str().to_string(),
            role: m.role(),
            joined_at: m.created_at(),
        })
        .collect();

    Ok(Json(TeamListResponse { teams }))
}

pub async fn get_team(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(team_id): Path<String>,
) -> Result<Json<Team>, ApiError> {
    let team_id = TeamId::new(team_id).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let team = state.team_service.get(&team_id, &user).await?;

    Ok(Json(team))
}

#[derive(Debug, Deserialize)]
pub struct UpdateTeamRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

pub async fn update_team(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(team_id): Path<String>,
    Json(request): Json<UpdateTeamRequest>,
) -> Result<Json<Team>, ApiError> {
    let team_id = TeamId::new(team_id).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let team = state
        .team_service
        .update(&team_id, &user, request.name, request.description)
        .await?;

    Ok(Json(team))
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub user_id: String,
    pub role: TeamRole,
    pub joined_at: DateTime<Utc>,
}

impl From<Membership> for MemberResponse {
    fn from(membership: Membership) -> Self {
        Self {
            user_id: membership.user_id().as_str().to_string(),
            role: membership.role(),
            joined_at: membership.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberListResponse {
    pub members: Vec<MemberResponse>,
}

pub async fn list_members(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(team_id): Path<String>,
) -> Result<Json<MemberListResponse>, ApiError> {
    let team_id = TeamId::new(team_id).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let members = state
        .team_service
        .members(&team_id, &user)
        .await?
        .into_iter()
        .map(MemberResponse::from)
        .collect();

    Ok(Json(MemberListResponse { members }))
}

pub async fn remove_member(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((team_id, member_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let team_id = TeamId::new(team_id).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let member_id = UserId::new(member_id).map_err(|e| ApiError::bad_request(e.to_string()))?;

    state
        .team_service
        .remove_member(&team_id, &user, &member_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
