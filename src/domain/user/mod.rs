//! User domain - accounts and email verification

mod entity;
mod repository;
mod validation;

pub use entity::{User, UserId, UserStatus};
pub use repository::UserRepository;
pub use validation::{validate_email, validate_user_id, UserValidationError};

#[cfg(test)]
pub use repository::mock;
