//! Collection CRUD endpoints

use std::sync::Arc;

use paperlens_core::{decode, HttpClient, HttpMethod};
use paperlens_domain::constants::{collection_paper_path, collection_path, COLLECTIONS_PATH};
use paperlens_domain::{
    CollectionCreate, CollectionDetail, CollectionInfo, CollectionUpdate, Result,
};
use serde_json::Value;
use tracing::{info, instrument, warn};

/// Typed access to the `/collections` endpoints.
#[derive(Debug, Clone)]
pub struct CollectionService {
    http: Arc<HttpClient>,
}

impl CollectionService {
    /// Service over a shared `HttpClient`.
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// All collections of the current user.
    ///
    /// A payload that is not an array yields an empty list.
    pub async fn list(&self) -> Result<Vec<CollectionInfo>> {
        let payload = self.http.call(HttpMethod::Get, COLLECTIONS_PATH, None, &[]).await?;
        if !payload.is_array() {
            warn!(kind = json_kind(&payload), "unexpected collections payload");
            return Ok(Vec::new());
        }
        decode(payload)
    }

    /// Create a collection.
    #[instrument(skip(self, collection), fields(name = %collection.name))]
    pub async fn create(&self, collection: &CollectionCreate) -> Result<CollectionInfo> {
        let created: CollectionInfo = self.http.post(COLLECTIONS_PATH, collection).await?;
        info!(collection_id = created.id, "collection created");
        Ok(created)
    }

    /// Collection with its papers.
    pub async fn detail(&self, collection_id: i64) -> Result<CollectionDetail> {
        self.http.get(&collection_path(collection_id)).await
    }

    /// Rename or re-describe a collection.
    pub async fn update(
        &self,
        collection_id: i64,
        update: &CollectionUpdate,
    ) -> Result<CollectionInfo> {
        self.http.put(&collection_path(collection_id), update).await
    }

    /// Delete a collection.
    #[instrument(skip(self))]
    pub async fn delete(&self, collection_id: i64) -> Result<()> {
        self.http.delete(&collection_path(collection_id)).await
    }

    /// Add a paper to a collection.
    #[instrument(skip(self))]
    pub async fn add_paper(&self, collection_id: i64, arxiv_id: &str) -> Result<()> {
        self.http.post_unit::<Value>(&collection_paper_path(collection_id, arxiv_id), None).await
    }

    /// Remove a paper from a collection.
    #[instrument(skip(self))]
    pub async fn remove_paper(&self, collection_id: i64, arxiv_id: &str) -> Result<()> {
        self.http.delete(&collection_paper_path(collection_id, arxiv_id)).await
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
