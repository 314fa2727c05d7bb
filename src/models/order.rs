//! Order creation request/response types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "client username is required"))]
    pub client_username: String,
    #[serde(default)]
    pub table_id: Option<Value>,
    #[serde(default)]
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "order must contain at least one item"))]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub menu_item_id: Value,
    pub quantity: u32,
    pub price: Decimal,
    #[serde(default)]
    pub variations: Vec<OrderItemVariationRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemVariationRequest {
    pub variation_id: Value,
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl CreateOrderRequest {
    /// Sum of item prices times quantities plus variation surcharges.
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| {
                let variations: Decimal =
                    item.variations.iter().filter_map(|v| v.price).sum();
                (item.price + variations) * Decimal::from(item.quantity)
            })
            .sum()
    }
}

/// Rows created during order fan-out, returned as the upstream representation.
#[derive(Debug, Clone, Serialize)]
pub struct OrderCreated {
    pub order: Value,
    pub items: Vec<Value>,
    pub variations: Vec<Value>,
    pub total: Decimal,
}
