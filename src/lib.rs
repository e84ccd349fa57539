//! ContentForge Team API
//!
//! Team membership and invitation service for the ContentForge platform:
//! - Account registration with email verification
//! - Team creation and member management
//! - Token-bound invitations with expiry and email binding

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use api::state::AppState;
use infrastructure::auth::{Argon2Hasher, JwtConfig, JwtService};
use infrastructure::invitation::{InvitationService, PostgresInvitationRepository};
use infrastructure::mail::{Mailer, NoopMailer, ResendMailer};
use infrastructure::membership::PostgresMembershipRepository;
use infrastructure::storage::{connect_pool, run_storage_migrations};
use infrastructure::team::{PostgresTeamRepository, TeamService};
use infrastructure::user::{PostgresUserRepository, UserService};

/// Create the application state with all services initialized
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let pool = connect_pool(&config.database.url, config.database.max_connections).await?;

    run_storage_migrations(&pool).await?;

    let users = Arc::new(PostgresUserRepository::new(pool.clone()));
    let teams = Arc::new(PostgresTeamRepository::new(pool.clone()));
    let memberships = Arc::new(PostgresMembershipRepository::new(pool.clone()));
    let invitations = Arc::new(PostgresInvitationRepository::new(pool.clone()));

    let mailer: Arc<dyn Mailer> = if config.mail.resend_api_key.is_empty() {
        info!("No mail API key configured, email delivery disabled");
        Arc::new(NoopMailer::new())
    } else {
        Arc::new(ResendMailer::new(&config.mail.resend_api_key)?)
    };

    let jwt_service = Arc::new(JwtService::new(JwtConfig::new(
        &config.auth.jwt_secret,
        config.auth.jwt_expiration_hours,
    )));

    let user_service = Arc::new(UserService::new(
        users.clone(),
        Arc::new(Argon2Hasher::new()),
        mailer.clone(),
        &config.mail.from_address,
    ));

    let team_service = Arc::new(TeamService::new(teams.clone(), memberships.clone()));

    let invitation_service = Arc::new(InvitationService::new(
        invitations,
        memberships,
        teams,
        mailer,
        &config.mail.from_address,
    ));

    Ok(AppState::new(
        pool,
        jwt_service,
        user_service,
        team_service,
        invitation_service,
    ))
}
