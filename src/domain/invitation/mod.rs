//! Invitation domain - token-bound team invitations

mod entity;
mod repository;

pub use entity::{Invitation, InvitationStatus, INVITATION_TTL_DAYS, MAX_TOKEN_LENGTH};
pub use repository::InvitationRepository;

#[cfg(test)]
pub use repository::mock;
