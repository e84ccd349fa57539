//! CLI module for the ContentForge team API
//!
//! Provides subcommands for running the service:
//! - `serve`: run the HTTP API server
//! - `migrate`: apply or revert database migrations

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// ContentForge Team API - team membership and invitations
#[derive(Parser)]
#[command(name = "contentforge-team-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Manage database migrations
    Migrate(migrate::MigrateArgs),
}
