//! Shared application state

use std::sync::Arc;

use sqlx::PgPool;

use crate::infrastructure::auth::JwtGenerator;
use crate::infrastructure::invitation::InvitationService;
use crate::infrastructure::team::TeamService;
use crate::infrastructure::user::UserService;

/// State shared across all request handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt_service: Arc<dyn JwtGenerator>,
    pub user_service: Arc<UserService>,
    pub team_service: Arc<TeamService>,
    pub invitation_service: Arc<InvitationService>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        jwt_service: Arc<dyn JwtGenerator>,
        user_service: Arc<UserService>,
        team_service: Arc<TeamService>,
        invitation_service: Arc<InvitationService>,
    ) -> Self {
        Self {
            pool,
            jwt_service,
            user_service,
            team_service,
            invitation_service,
        }
    }
}
