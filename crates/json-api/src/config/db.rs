//! Database Config

use clap::Args;

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string for the application role
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,
}
