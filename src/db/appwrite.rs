// src/db/appwrite.rs

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::Value;

use super::{Collection, DocumentStore, Query, StoreError};
use crate::config::StoreConfig;

/// REST client for an Appwrite database.
pub struct AppwriteStore {
    client: reqwest::Client,
    endpoint: String,
    database_id: String,
    employees_collection_id: String,
    bookings_collection_id: String,
}

#[derive(Deserialize)]
struct DocumentList {
    documents: Vec<Value>,
}

impl AppwriteStore {
    pub fn new(cfg: &StoreConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("X-Appwrite-Project", HeaderValue::from_str(&cfg.project_id)?);
        let mut key = HeaderValue::from_str(&cfg.api_key)?;
        key.set_sensitive(true);
        headers.insert("X-Appwrite-Key", key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
            database_id: cfg.database_id.clone(),
            employees_collection_id: cfg.employees_collection_id.clone(),
            bookings_collection_id: cfg.bookings_collection_id.clone(),
        })
    }

    fn collection_id(&self, collection: Collection) -> &str {
        match collection {
            Collection::Employees => &self.employees_collection_id,
            Collection::Bookings => &self.bookings_collection_id,
        }
    }

    fn documents_url(&self, collection: Collection) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint,
            self.database_id,
            self.collection_id(collection)
        )
    }
}

/// Each query travels as its own `queries[]` parameter holding the JSON form.
fn query_params(queries: &[Query]) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
    queries
        .iter()
        .map(|q| serde_json::to_string(q).map(|s| ("queries[]", s)))
        .collect()
}

#[async_trait]
impl DocumentStore for AppwriteStore {
    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<Vec<Value>, StoreError> {
        let params = query_params(queries).map_err(StoreError::Query)?;

        let resp = self
            .client
            .get(self.documents_url(collection))
            .query(&params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Status { status: status.as_u16(), body });
        }

        let list: DocumentList = resp.json().await?;
        Ok(list.documents)
    }
}
