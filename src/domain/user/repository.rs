//! User repository trait

use async_trait::async_trait;

use super::entity::{User, UserId};
use crate::domain::DomainError;

/// Repository for managing user accounts
#[async_trait]
pub trait UserRepository: Send + Sync + std::fmt::Debug {
    /// Get a user by ID
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by email address (lowercased lookup)
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Get a user by their pending email verification token
    async fn get_by_verification_token(&self, token: &str) -> Result<Option<User>, DomainError>;

    /// Create a new user
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Update an existing user
    async fn update(&self, user: User) -> Result<User, DomainError>;
}


#[cfg(test)]
mod tests {
    use super::mock::MockUserRepository;
    use super::*;

    fn make_user(email: &str) -> User {
        User::new(UserId::generate(), email, "Test User", "hashed").unwrap()
    }

    #[tokio::test]
    async fn test_mock_create_and_get_by_email() {
        let repo = MockUserRepository::new();
        let user = make_user("ada@example.com");
        let id = user.id().clone();

        repo.create(user).await.unwrap();

        let fetched = repo.get(&id).await.unwrap();
        assert!(fetched.is_some());

        let by_email = repo.get_by_email("ADA@example.com").await.unwrap();
        assert!(by_email.is_some());
        assert_eq!(by_email.unwrap().id(), &id);
    }

    #[tokio::test]
    async fn test_mock_duplicate_email() {
        let repo = MockUserRepository::new();
        repo.create(make_user("ada@example.com")).await.unwrap();

        let result = repo.create(make_user("ada@example.com")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_get_by_verification_token() {
        let mut user = make_user("ada@example.com");
        user.set_verification_token("vt_lookup");
        let repo = MockUserRepository::new().with_user(user);

        let found = repo.get_by_verification_token("vt_lookup").await.unwrap();
        assert!(found.is_some());

        let missing = repo.get_by_verification_token("vt_other").await.unwrap();
        assert!(missing.is_none());
    }
}
