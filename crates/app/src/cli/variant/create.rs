use clap::Args;
use storefront_app::domain::inventory::{
    InventoryService, PgInventoryService,
    models::{NewVariant, ProductUuid, VariantUuid},
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateVariantArgs {
    /// Product the variant belongs to
    #[arg(long)]
    product_uuid: Uuid,

    /// Unit price in minor currency units
    #[arg(long)]
    price: u64,

    /// Initial stock level
    #[arg(long, default_value_t = 0)]
    stock: u64,

    /// Optional variant UUID; generated when omitted
    #[arg(long)]
    variant_uuid: Option<Uuid>,
}

pub(crate) async fn run(service: &PgInventoryService, args: CreateVariantArgs) -> Result<(), String> {
    let variant = service
        .create_variant(NewVariant {
            uuid: args.variant_uuid.map_or_else(VariantUuid::new, VariantUuid::from_uuid),
            product_uuid: ProductUuid::from_uuid(args.product_uuid),
            price: args.price,
            stock: args.stock,
        })
        .await
        .map_err(|error| format!("failed to create variant: {error}"))?;

    println!("variant_uuid: {}", variant.uuid);
    println!("product_uuid: {}", variant.product_uuid);
    println!("price: {}", variant.price);
    println!("stock: {}", variant.stock);

    Ok(())
}
