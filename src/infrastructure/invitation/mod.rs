//! Invitation infrastructure - tokens, persistence and the accept flow

mod postgres_repository;
mod service;
mod token;

pub use postgres_repository::PostgresInvitationRepository;
pub use service::{AcceptOutcome, InvitationService};
pub use token::InviteTokenGenerator;
