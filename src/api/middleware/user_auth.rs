//! User authentication middleware using JWT tokens

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::{User, UserId};
use crate::domain::DomainError;

/// Extractor that requires a valid JWT token
///
/// Extracts the JWT token from:
/// - Authorization header: `Bearer <jwt_token>`
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_token(&parts.headers)?;

        debug!("Validating JWT token");

        let claims = state
            .jwt_service
            .validate(&token)
            .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?;

        let user_id = UserId::new(claims.user_id())
            .map_err(|_| ApiError::unauthorized("Invalid token subject"))?;

        // A missing user means a stale credential; anything else (for
        // example a storage outage) keeps its own status mapping.
        let user = state
            .user_service
            .get(&user_id)
            .await
            .map_err(|e| match e {
                DomainError::NotFound { .. } => ApiError::unauthorized("User not found"),
                other => ApiError::from(other),
            })?;

        if !user.is_active() {
            return Err(ApiError::unauthorized("User account is suspended"));
        }

        Ok(RequireUser(user))
    }
}

/// Extract JWT token from Authorization header
pub fn extract_jwt_token(headers: &axum::http::HeaderMap) -> Result<String, ApiError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(token.trim().to_string());
        }
    }

    Err(ApiError::unauthorized(
        "Authentication required. Provide JWT token via 'Authorization: Bearer <token>' header",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::{HeaderMap, Request, StatusCode};
    use sqlx::PgPool;

    use crate::domain::invitation::mock::MockInvitationRepository;
    use crate::domain::membership::mock::MockMembershipRepository;
    use crate::domain::team::mock::MockTeamRepository;
    use crate::domain::user::{UserRepository, UserStatus};
    use crate::infrastructure::auth::{Argon2Hasher, JwtConfig, JwtGenerator, JwtService};
    use crate::infrastructure::invitation::InvitationService;
    use crate::infrastructure::mail::NoopMailer;
    use crate::infrastructure::team::TeamService;
    use crate::infrastructure::user::UserService;

    /// User repository that fails every call, standing in for a
    /// database outage.
    #[derive(Debug)]
    struct OutageUserRepository;

    #[async_trait::async_trait]
    impl UserRepository for OutageUserRepository {
        async fn get(&self, _id: &UserId) -> Result<Option<User>, DomainError> {
            Err(DomainError::storage("connection pool exhausted"))
        }

        async fn get_by_email(&self, _email: &str) -> Result<Option<User>, DomainError> {
            Err(DomainError::storage("connection pool exhausted"))
        }

        async fn get_by_verification_token(
            &self,
            _token: &str,
        ) -> Result<Option<User>, DomainError> {
            Err(DomainError::storage("connection pool exhausted"))
        }

        async fn create(&self, _user: User) -> Result<User, DomainError> {
            Err(DomainError::storage("connection pool exhausted"))
        }

        async fn update(&self, _user: User) -> Result<User, DomainError> {
            Err(DomainError::storage("connection pool exhausted"))
        }
    }

    fn state_with_users(users: Arc<dyn UserRepository>) -> (AppState, Arc<dyn JwtGenerator>) {
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        let jwt_service: Arc<dyn JwtGenerator> =
            Arc::new(JwtService::new(JwtConfig::new("test-secret-key", 24)));

        let user_service = Arc::new(UserService::new(
            users,
            Arc::new(Argon2Hasher::new()),
            Arc::new(NoopMailer::new()),
            "noreply@example.com",
        ));
        let team_service = Arc::new(TeamService::new(
            Arc::new(MockTeamRepository::new()),
            Arc::new(MockMembershipRepository::new()),
        ));
        let invitation_service = Arc::new(InvitationService::new(
            Arc::new(MockInvitationRepository::new()),
            Arc::new(MockMembershipRepository::new()),
            Arc::new(MockTeamRepository::new()),
            Arc::new(NoopMailer::new()),
            "noreply@example.com",
        ));

        let state = AppState::new(
            pool,
            jwt_service.clone(),
            user_service,
            team_service,
            invitation_service,
        );
        (state, jwt_service)
    }

    fn parts_with_bearer(token: &str) -> axum::http::request::Parts {
        let request = Request::builder()
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(())
            .unwrap();
        request.into_parts().0
    }

    fn test_user() -> User {
        User::new(
            UserId::new("test-user").unwrap(),
            "test@example.com",
            "Test User",
            "hashed",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_storage_outage_is_not_unauthorized() {
        let (state, jwt_service) = state_with_users(Arc::new(OutageUserRepository));
        let token = jwt_service.generate(&test_user()).unwrap();
        let mut parts = parts_with_bearer(&token);

        let result = RequireUser::from_request_parts(&mut parts, &state).await;
        let err = result.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unknown_user_is_unauthorized() {
        let (state, jwt_service) =
            state_with_users(Arc::new(crate::domain::user::mock::MockUserRepository::new()));
        let token = jwt_service.generate(&test_user()).unwrap();
        let mut parts = parts_with_bearer(&token);

        let result = RequireUser::from_request_parts(&mut parts, &state).await;
        let err = result.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_suspended_user_is_unauthorized() {
        let mut user = test_user();
        user.set_status(UserStatus::Suspended);
        let (state, jwt_service) = state_with_users(Arc::new(
            crate::domain::user::mock::MockUserRepository::new().with_user(user.clone()),
        ));
        let token = jwt_service.generate(&user).unwrap();
        let mut parts = parts_with_bearer(&token);

        let result = RequireUser::from_request_parts(&mut parts, &state).await;
        let err = result.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer eyJhbGciOiJIUzI1NiJ9.test".parse().unwrap(),
        );

        let result = extract_jwt_token(&headers);
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "eyJhbGciOiJIUzI1NiJ9.test");
    }

    #[test]
    fn test_missing_token() {
        let headers = HeaderMap::new();

        let result = extract_jwt_token(&headers);
        assert!(result.is_err());

        let err = result.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_invalid_auth_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());

        let result = extract_jwt_token(&headers);
        assert!(result.is_err());
    }

    #[test]
    fn test_trimmed_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer   token-with-spaces   ".parse().unwrap(),
        );

        let result = extract_jwt_token(&headers);
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "token-with-spaces");
    }
}
