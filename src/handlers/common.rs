use serde::Deserialize;

use crate::errors::ServiceError;

/// Query parameters for CRUD endpoints keyed by `?id=`.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn require_id(&self) -> Result<&str, ServiceError> {
        self.id()
            .ok_or_else(|| ServiceError::BadRequest("missing required query parameter 'id'".into()))
    }
}
