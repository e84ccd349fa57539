//! Membership domain - (team, user) role assignments

mod entity;
mod repository;

pub use entity::Membership;
pub use repository::MembershipRepository;

#[cfg(test)]
pub use repository::mock;
