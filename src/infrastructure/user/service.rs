//! User registration, verification and authentication

use std::sync::Arc;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::auth::PasswordHasher;
use crate::infrastructure::invitation::InviteTokenGenerator;
use crate::infrastructure::mail::{EmailMessage, Mailer};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Service for user account lifecycle
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    mailer: Arc<dyn Mailer>,
    token_generator: InviteTokenGenerator,
    from_address: String,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        mailer: Arc<dyn Mailer>,
        from_address: impl Into<String>,
    ) -> Self {
        Self {
            users,
            hasher,
            mailer,
            token_generator: InviteTokenGenerator::new("vt_"),
            from_address: from_address.into(),
        }
    }

    /// Register a new account and send a verification email
    pub async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<User, DomainError> {
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        if name.trim().is_empty() {
            return Err(DomainError::validation("Name cannot be empty"));
        }

        if self.users.get_by_email(email).await?.is_some() {
            return Err(DomainError::conflict("An account with this email already exists"));
        }

        let hash = self.hasher.hash(password)?;
        let mut user = User::new(UserId::generate(), email, name, hash)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let verification_token = self.token_generator.generate();
        user.set_verification_token(&verification_token);

        let user = self.users.create(user).await?;

        tracing::info!(user_id = %user.id(), "User registered");

        self.mailer
            .send(EmailMessage {
                from: self.from_address.clone(),
                to: user.email().to_string(),
                subject: "Verify your email address".to_string(),
                html: format!(
                    "<p>Welcome! Confirm your email with this code: <code>{}</code></p>",
                    verification_token
                ),
            })
            .await?;

        Ok(user)
    }

    /// Mark an email address as verified by its verification token
    pub async fn verify_email(&self, token: &str) -> Result<User, DomainError> {
        let mut user = self
            .users
            .get_by_verification_token(token)
            .await?
            .ok_or_else(|| DomainError::not_found("Verification token not found"))?;

        user.mark_email_verified();
        let user = self.users.update(user).await?;

        tracing::info!(user_id = %user.id(), "Email verified");

        Ok(user)
    }

    /// Authenticate by email and password
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let mut user = self
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| DomainError::unauthorized("Invalid email or password"))?;

        if !self.hasher.verify(password, user.password_hash())? {
            return Err(DomainError::unauthorized("Invalid email or password"));
        }

        if !user.is_active() {
            return Err(DomainError::forbidden("Account is suspended"));
        }

        user.record_login();
        let user = self.users.update(user).await?;

        Ok(user)
    }

    /// Get a user by ID
    pub async fn get(&self, id: &UserId) -> Result<User, DomainError> {
        self.users
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::mock::MockUserRepository;
    use crate::infrastructure::auth::Argon2Hasher;
    use crate::infrastructure::mail::NoopMailer;

    fn service() -> (UserService, Arc<MockUserRepository>) {
        let users = Arc::new(MockUserRepository::new());
        let service = UserService::new(
            users.clone(),
            Arc::new(Argon2Hasher::new()),
            Arc::new(NoopMailer::new()),
            "noreply@example.com",
        );
        (service, users)
    }

    #[tokio::test]
    async fn test_register_and_verify() {
        let (service, users) = service();

        let user = service
            .register("Ada@Example.com", "Ada", "sup3r-secret")
            .await
            .unwrap();
        assert_eq!(user.email(), "ada@example.com");
        assert!(!user.email_verified());

        let token = users
            .get(user.id())
            .await
            .unwrap()
            .unwrap()
            .verification_token()
            .unwrap()
            .to_string();

        let verified = service.verify_email(&token).await.unwrap();
        assert!(verified.email_verified());
        assert!(verified.verification_token().is_none());
    }

    #[tokio::test]
    async fn test_register_short_password() {
        let (service, _) = service();

        let result = service.register("ada@example.com", "Ada", "short").await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (service, _) = service();

        service
            .register("ada@example.com", "Ada", "sup3r-secret")
            .await
            .unwrap();

        let result = service
            .register("ADA@example.com", "Other Ada", "sup3r-secret")
            .await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_verify_unknown_token() {
        let (service, _) = service();

        let result = service.verify_email("vt_unknown").await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let (service, _) = service();

        service
            .register("ada@example.com", "Ada", "sup3r-secret")
            .await
            .unwrap();

        let user = service
            .authenticate("ada@example.com", "sup3r-secret")
            .await
            .unwrap();
        assert!(user.last_login_at().is_some());

        let result = service.authenticate("ada@example.com", "wrong").await;
        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));

        let result = service.authenticate("nobody@example.com", "sup3r-secret").await;
        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
    }
}
