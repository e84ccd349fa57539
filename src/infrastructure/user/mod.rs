//! User infrastructure - persistence and account lifecycle

mod postgres_repository;
mod service;

pub use postgres_repository::PostgresUserRepository;
pub use service::UserService;
