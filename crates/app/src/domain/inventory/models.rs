//! Inventory Models

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Product marker. Product details are managed by the catalogue.
#[derive(Debug)]
pub struct Product;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Variant UUID
pub type VariantUuid = TypedUuid<Variant>;

/// Variant Model
///
/// A purchasable configuration of a product with its own price and stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub uuid: VariantUuid,
    pub product_uuid: ProductUuid,
    pub price: u64,
    pub stock: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Variant Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariant {
    pub uuid: VariantUuid,
    pub product_uuid: ProductUuid,
    pub price: u64,
    pub stock: u64,
}
