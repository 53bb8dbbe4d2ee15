use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::cart::CartLineView;

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    /// Replace the quantity instead of adding to it.
    #[serde(default)]
    pub update: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartRequest {
    pub quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub item_count: u64,
    #[schema(value_type = String, example = "99.95")]
    pub total_amount: Decimal,
}
