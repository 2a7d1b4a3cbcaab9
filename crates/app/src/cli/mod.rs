use clap::{Parser, Subcommand};

mod db;
mod order;
mod session;
mod variant;

#[derive(Debug, Parser)]
#[command(name = "storefront-app", about = "Storefront admin CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Variant(variant::VariantCommand),
    Session(session::SessionCommand),
    Order(order::OrderCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Variant(command) => variant::run(command).await,
            Commands::Session(command) => session::run(command).await,
            Commands::Order(command) => order::run(command).await,
        }
    }
}
