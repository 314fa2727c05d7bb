use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::errors::ServiceError;
use crate::models::{LocatedClient, CLIENT_PROBES};
use crate::supabase::{eq, SupabaseClient};

/// Client lookup and CRUD against the upstream `clients`/`userfile` tables.
#[derive(Clone)]
pub struct ClientService {
    supabase: Arc<SupabaseClient>,
}

impl ClientService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Walks the probe sequence until one table/column combination returns a
    /// row. A probe the upstream rejects with 400/404 (missing table or
    /// column) is a miss, not a failure; server errors, transport errors
    /// and timeouts propagate.
    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str) -> Result<LocatedClient, ServiceError> {
        for probe in CLIENT_PROBES.iter() {
            let result = self
                .supabase
                .select(probe.table, &[eq(probe.username_col, username)])
                .await;
            match result {
                Ok(rows) => {
                    if let Some(row) = rows.into_iter().next() {
                        debug!(
                            table = probe.table,
                            column = probe.username_col,
                            "client located"
                        );
                        return Ok(LocatedClient { probe, row });
                    }
                }
                // The schema is known to be inconsistent; a 400/404 just
                // means this table/column combination does not exist.
                // Upstream outages (5xx) are real failures and propagate.
                Err(ServiceError::UpstreamStatus { status, body })
                    if status == 400 || status == 404 =>
                {
                    warn!(
                        table = probe.table,
                        column = probe.username_col,
                        status,
                        body = %body,
                        "client probe rejected, trying next"
                    );
                }
                Err(other) => return Err(other),
            }
        }
        Err(ServiceError::NotFound("Client not found".into()))
    }

    pub async fn list(&self) -> Result<Vec<Value>, ServiceError> {
        self.supabase.select("clients", &[]).await
    }

    pub async fn get(&self, id: &str) -> Result<Value, ServiceError> {
        self.supabase
            .select("clients", &[eq("id", id)])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound(format!("Client {} not found", id)))
    }

    pub async fn create(&self, body: Value) -> Result<Value, ServiceError> {
        self.supabase
            .insert("clients", &body)
            .await?
            .into_iter()
            .next()
            .ok_or(ServiceError::InternalServerError)
    }

    pub async fn update(&self, id: &str, body: Value) -> Result<Value, ServiceError> {
        self.supabase
            .patch("clients", &[eq("id", id)], &body)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound(format!("Client {} not found", id)))
    }

    /// Deleting an absent client is a success: the desired state already
    /// holds.
    pub async fn delete(&self, id: &str) -> Result<usize, ServiceError> {
        let deleted = self.supabase.delete("clients", &[eq("id", id)]).await?;
        Ok(deleted.len())
    }
}
