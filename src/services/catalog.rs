//! Menu catalog: items, categories, and variation assignments.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::auth::SessionToken;
use crate::errors::ServiceError;
use crate::supabase::{eq, Filter, SupabaseClient};

#[derive(Clone)]
pub struct CatalogService {
    supabase: Arc<SupabaseClient>,
    allow_cross_user_operations: bool,
    fallback_username: Option<String>,
}

impl CatalogService {
    pub fn new(
        supabase: Arc<SupabaseClient>,
        allow_cross_user_operations: bool,
        fallback_username: Option<String>,
    ) -> Self {
        Self {
            supabase,
            allow_cross_user_operations,
            fallback_username,
        }
    }

    // ----- menu items -----

    pub async fn list_items(
        &self,
        category_id: Option<&str>,
        username: Option<&str>,
    ) -> Result<Vec<Value>, ServiceError> {
        let mut filters: Vec<Filter> = Vec::new();
        if let Some(category) = category_id {
            filters.push(eq("category_id", category));
        }
        if let Some(user) = username {
            filters.push(eq("username", user));
        }
        self.supabase.select("menu_items", &filters).await
    }

    pub async fn get_item(&self, id: &str) -> Result<Value, ServiceError> {
        self.supabase
            .select("menu_items", &[eq("id", id)])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound(format!("Menu item {} not found", id)))
    }

    pub async fn create_item(&self, body: Value) -> Result<Value, ServiceError> {
        self.supabase
            .insert("menu_items", &body)
            .await?
            .into_iter()
            .next()
            .ok_or(ServiceError::InternalServerError)
    }

    pub async fn update_item(&self, id: &str, body: Value) -> Result<Value, ServiceError> {
        self.supabase
            .patch("menu_items", &[eq("id", id)], &body)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound(format!("Menu item {} not found", id)))
    }

    pub async fn delete_item(&self, id: &str) -> Result<usize, ServiceError> {
        let deleted = self.supabase.delete("menu_items", &[eq("id", id)]).await?;
        Ok(deleted.len())
    }

    // ----- menu categories -----

    pub async fn list_categories(&self) -> Result<Vec<Value>, ServiceError> {
        self.supabase.select("menu_categories", &[]).await
    }

    pub async fn create_category(&self, body: Value) -> Result<Value, ServiceError> {
        self.supabase
            .insert("menu_categories", &body)
            .await?
            .into_iter()
            .next()
            .ok_or(ServiceError::InternalServerError)
    }

    pub async fn update_category(&self, id: &str, body: Value) -> Result<Value, ServiceError> {
        self.supabase
            .patch("menu_categories", &[eq("id", id)], &body)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", id)))
    }

    /// Deleting a category that no longer exists succeeds: the caller asked
    /// for a state that already holds.
    pub async fn delete_category(&self, id: &str) -> Result<usize, ServiceError> {
        let deleted = self
            .supabase
            .delete("menu_categories", &[eq("id", id)])
            .await?;
        Ok(deleted.len())
    }

    // ----- variation assignment -----

    pub async fn list_variations(&self) -> Result<Vec<Value>, ServiceError> {
        self.supabase.select("items_variations", &[]).await
    }

    pub async fn list_assignments(&self, menu_item_id: &str) -> Result<Vec<Value>, ServiceError> {
        self.supabase
            .select("menu_item_variations", &[eq("menu_item_id", menu_item_id)])
            .await
    }

    #[instrument(skip(self, body))]
    pub async fn assign_variation(
        &self,
        username: &str,
        mut body: Value,
    ) -> Result<Value, ServiceError> {
        body["username"] = Value::String(username.to_string());
        self.supabase
            .insert("menu_item_variations", &body)
            .await?
            .into_iter()
            .next()
            .ok_or(ServiceError::InternalServerError)
    }

    pub async fn unassign_variation(
        &self,
        username: &str,
        menu_item_id: &str,
        variation_id: &str,
    ) -> Result<usize, ServiceError> {
        let deleted = self
            .supabase
            .delete(
                "menu_item_variations",
                &[
                    eq("menu_item_id", menu_item_id),
                    eq("variation_id", variation_id),
                    eq("username", username),
                ],
            )
            .await?;
        Ok(deleted.len())
    }

    /// Resolve the acting username for a variation operation, trying in
    /// order: explicit header, the owner of the referenced menu item, the
    /// decoded session token, then the configured fallback (only when
    /// cross-user operations are allowed).
    pub async fn resolve_username(
        &self,
        header: Option<&str>,
        menu_item_id: Option<&str>,
        token: Option<&SessionToken>,
    ) -> Result<String, ServiceError> {
        if let Some(explicit) = header.map(str::trim).filter(|s| !s.is_empty()) {
            return Ok(explicit.to_string());
        }

        if let Some(item_id) = menu_item_id {
            if let Some(owner) = self.menu_item_owner(item_id).await? {
                debug!(item_id, owner = %owner, "username resolved from menu item");
                return Ok(owner);
            }
        }

        if let Some(token) = token {
            return Ok(token.username.clone());
        }

        if self.allow_cross_user_operations {
            if let Some(fallback) = self
                .fallback_username
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
            {
                return Ok(fallback.to_string());
            }
        }

        Err(ServiceError::BadRequest(
            "unable to resolve a username for this variation operation".into(),
        ))
    }

    /// Owner of a menu item; tolerates both column casings.
    async fn menu_item_owner(&self, item_id: &str) -> Result<Option<String>, ServiceError> {
        let rows = self
            .supabase
            .select("menu_items", &[eq("id", item_id)])
            .await?;
        Ok(rows.into_iter().next().and_then(|row| {
            row.get("username")
                .or_else(|| row.get("USERNAME"))
                .and_then(Value::as_str)
                .map(str::to_string)
        }))
    }
}
