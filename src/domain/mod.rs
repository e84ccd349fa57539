//! Domain entities, repository traits and errors

pub mod error;
pub mod invitation;
pub mod membership;
pub mod team;
pub mod user;

pub use error::DomainError;
