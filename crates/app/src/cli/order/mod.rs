use clap::{Args, Subcommand};

mod confirm;

#[derive(Debug, Args)]
pub(crate) struct OrderCommand {
    #[command(subcommand)]
    command: OrderSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrderSubcommand {
    /// Verify an order's payment and reconcile it, finishing any interrupted
    /// stock decrements
    Confirm(confirm::ConfirmOrderArgs),
}

pub(crate) async fn run(command: OrderCommand) -> Result<(), String> {
    match command.command {
        OrderSubcommand::Confirm(args) => confirm::run(args).await,
    }
}
