use clap::{Args, Subcommand};
use storefront_app::{
    database::{self, Db},
    domain::inventory::PgInventoryService,
};

mod create;
mod restock;

#[derive(Debug, Args)]
pub(crate) struct VariantCommand {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: VariantSubcommand,
}

#[derive(Debug, Subcommand)]
enum VariantSubcommand {
    /// Add a purchasable variant to the catalogue
    Create(create::CreateVariantArgs),

    /// Set a variant's stock level
    Restock(restock::RestockVariantArgs),
}

pub(crate) async fn run(command: VariantCommand) -> Result<(), String> {
    let database_url = command
        .database_url
        .ok_or_else(|| "--database-url or DATABASE_URL is required".to_string())?;

    let pool = database::connect(&database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgInventoryService::new(Db::new(pool));

    match command.command {
        VariantSubcommand::Create(args) => create::run(&service, args).await,
        VariantSubcommand::Restock(args) => restock::run(&service, args).await,
    }
}
