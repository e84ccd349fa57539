//! Versioned API surface

mod invitations;
mod teams;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::api::state::AppState;

/// Create the v1 router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(
            "/teams",
            post(teams::create_team).get(teams::list_teams),
        )
        .route(
            "/teams/{team_id}",
            get(teams::get_team).patch(teams::update_team),
        )
        .route("/teams/{team_id}/members", get(teams::list_members))
        .route(
            "/teams/{team_id}/members/{member_id}",
            delete(teams::remove_member),
        )
        .route(
            "/teams/{team_id}/invitations",
            post(invitations::issue_invitation).get(invitations::list_invitations),
        )
        .route("/invitations/accept", post(invitations::accept_invitation))
}
