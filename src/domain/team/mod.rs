//! Team domain - teams and membership roles

mod entity;
mod repository;
mod validation;

pub use entity::{Team, TeamId, TeamRole};
pub use repository::TeamRepository;
pub use validation::{validate_team_id, validate_team_name, TeamValidationError};

#[cfg(test)]
pub use repository::mock;
