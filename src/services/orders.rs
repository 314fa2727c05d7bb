//! Order creation and lookup.
//!
//! Creation fans out to three sequential inserts: the order row, its items,
//! then item variations. There is deliberately no compensating rollback: a
//! later-step failure leaves the earlier rows in place and the error names
//! the step that failed, so operators can reconcile upstream.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, instrument};
use validator::Validate;

use crate::errors::ServiceError;
use crate::models::order::{CreateOrderRequest, OrderCreated};
use crate::supabase::{eq, Filter, SupabaseClient};

#[derive(Clone)]
pub struct OrderService {
    supabase: Arc<SupabaseClient>,
}

impl OrderService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    #[instrument(skip(self, request), fields(client = %request.client_username))]
    pub async fn create(&self, request: CreateOrderRequest) -> Result<OrderCreated, ServiceError> {
        request.validate()?;
        let total = request.total();

        let order_row = json!({
            "client_username": request.client_username,
            "table_id": request.table_id,
            "notes": request.notes,
            "status": "pending",
            "total": total.to_string(),
        });
        let order = self
            .supabase
            .insert("orders", &order_row)
            .await?
            .into_iter()
            .next()
            .ok_or(ServiceError::InternalServerError)?;
        let order_id = order
            .get("id")
            .cloned()
            .ok_or(ServiceError::InternalServerError)?;
        let order_id_str = id_string(&order_id);

        let item_rows: Vec<Value> = request
            .items
            .iter()
            .map(|item| {
                json!({
                    "order_id": order_id,
                    "menu_item_id": item.menu_item_id,
                    "quantity": item.quantity,
                    "price": item.price.to_string(),
                })
            })
            .collect();
        let items = self
            .supabase
            .insert("order_items", &Value::Array(item_rows))
            .await
            .map_err(|err| {
                tracing::error!(order_id = %order_id_str, error = %err, "order_items insert failed");
                ServiceError::PartialOrderFailure {
                    order_id: order_id_str.clone(),
                    step: "order_items".into(),
                }
            })?;

        // Pair created item rows with the request by position to attach
        // variations to the right item ids.
        let mut variation_rows: Vec<Value> = Vec::new();
        for (created, requested) in items.iter().zip(request.items.iter()) {
            if requested.variations.is_empty() {
                continue;
            }
            let item_id = created.get("id").cloned().unwrap_or(Value::Null);
            for variation in &requested.variations {
                variation_rows.push(json!({
                    "order_item_id": item_id,
                    "variation_id": variation.variation_id,
                    "price": variation.price.map(|p| p.to_string()),
                }));
            }
        }

        let variations = if variation_rows.is_empty() {
            Vec::new()
        } else {
            self.supabase
                .insert("order_item_variations", &Value::Array(variation_rows))
                .await
                .map_err(|err| {
                    tracing::error!(
                        order_id = %order_id_str,
                        error = %err,
                        "order_item_variations insert failed"
                    );
                    ServiceError::PartialOrderFailure {
                        order_id: order_id_str.clone(),
                        step: "order_item_variations".into(),
                    }
                })?
        };

        info!(
            order_id = %order_id_str,
            items = items.len(),
            variations = variations.len(),
            total = %total,
            "order created"
        );

        Ok(OrderCreated {
            order,
            items,
            variations,
            total,
        })
    }

    pub async fn list(
        &self,
        id: Option<&str>,
        client_username: Option<&str>,
    ) -> Result<Vec<Value>, ServiceError> {
        let mut filters: Vec<Filter> = Vec::new();
        if let Some(id) = id {
            filters.push(eq("id", id));
        }
        if let Some(client) = client_username {
            filters.push(eq("client_username", client));
        }
        self.supabase.select("orders", &filters).await
    }

    pub async fn update(&self, id: &str, body: Value) -> Result<Value, ServiceError> {
        self.supabase
            .patch("orders", &[eq("id", id)], &body)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))
    }

    // ----- tables -----

    pub async fn list_tables(&self) -> Result<Vec<Value>, ServiceError> {
        self.supabase.select("tables", &[]).await
    }

    pub async fn create_table(&self, body: Value) -> Result<Value, ServiceError> {
        self.supabase
            .insert("tables", &body)
            .await?
            .into_iter()
            .next()
            .ok_or(ServiceError::InternalServerError)
    }

    pub async fn update_table(&self, id: &str, body: Value) -> Result<Value, ServiceError> {
        self.supabase
            .patch("tables", &[eq("id", id)], &body)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound(format!("Table {} not found", id)))
    }

    pub async fn delete_table(&self, id: &str) -> Result<usize, ServiceError> {
        let deleted = self.supabase.delete("tables", &[eq("id", id)]).await?;
        Ok(deleted.len())
    }
}

fn id_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
