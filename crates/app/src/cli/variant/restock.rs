use clap::Args;
use storefront_app::domain::inventory::{InventoryService, PgInventoryService, models::VariantUuid};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct RestockVariantArgs {
    /// Variant to restock
    #[arg(long)]
    variant_uuid: Uuid,

    /// New stock level
    #[arg(long)]
    stock: u64,
}

pub(crate) async fn run(service: &PgInventoryService, args: RestockVariantArgs) -> Result<(), String> {
    let variant = service
        .restock(VariantUuid::from_uuid(args.variant_uuid), args.stock)
        .await
        .map_err(|error| format!("failed to restock variant: {error}"))?;

    println!("variant_uuid: {}", variant.uuid);
    println!("stock: {}", variant.stock);

    Ok(())
}
