// src/db/mod.rs

use async_trait::async_trait;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::config::StoreConfig;

pub mod appwrite;
pub mod fetch;
pub mod memory;

pub use appwrite::AppwriteStore;
pub use fetch::{fetch_all, DEFAULT_PAGE_LIMIT, MAX_PAGES};
pub use memory::InMemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode {collection} document: {source}")]
    Decode {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode query: {0}")]
    Query(serde_json::Error),

    #[error("{collection} document without an $id")]
    MissingId { collection: Collection },

    #[error("gave up paging {collection} after {pages} pages")]
    PageCapExceeded { collection: Collection, pages: usize },
}

/// The two collections this service reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Employees,
    Bookings,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Employees => f.write_str("employees"),
            Collection::Bookings => f.write_str("bookings"),
        }
    }
}

/// One query constraint, in the store's filter language.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Matches when the attribute equals any of the values.
    Equal(String, Vec<Value>),
    GreaterThanEqual(String, Value),
    LessThanEqual(String, Value),
    Select(Vec<String>),
    Limit(usize),
    CursorAfter(String),
}

impl Query {
    pub fn equal(attr: &str, value: impl Into<Value>) -> Self {
        Query::Equal(attr.into(), vec![value.into()])
    }

    pub fn equal_any<I, V>(attr: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Query::Equal(attr.into(), values.into_iter().map(Into::into).collect())
    }

    pub fn gte(attr: &str, value: impl Into<Value>) -> Self {
        Query::GreaterThanEqual(attr.into(), value.into())
    }

    pub fn lte(attr: &str, value: impl Into<Value>) -> Self {
        Query::LessThanEqual(attr.into(), value.into())
    }

    pub fn select(attrs: &[&str]) -> Self {
        Query::Select(attrs.iter().map(|a| a.to_string()).collect())
    }

    fn method(&self) -> &'static str {
        match self {
            Query::Equal(..) => "equal",
            Query::GreaterThanEqual(..) => "greaterThanEqual",
            Query::LessThanEqual(..) => "lessThanEqual",
            Query::Select(_) => "select",
            Query::Limit(_) => "limit",
            Query::CursorAfter(_) => "cursorAfter",
        }
    }
}

// Wire form: {"method": "...", "attribute": "...", "values": [...]}
impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("method", self.method())?;
        match self {
            Query::Equal(attr, values) => {
                map.serialize_entry("attribute", attr)?;
                map.serialize_entry("values", values)?;
            }
            Query::GreaterThanEqual(attr, v) | Query::LessThanEqual(attr, v) => {
                map.serialize_entry("attribute", attr)?;
                map.serialize_entry("values", &[v])?;
            }
            Query::Select(attrs) => map.serialize_entry("values", attrs)?,
            Query::Limit(n) => map.serialize_entry("values", &[n])?,
            Query::CursorAfter(id) => map.serialize_entry("values", &[id])?,
        }
        map.end()
    }
}

/// Read side of the document database.
///
/// One call is one store round trip; the store caps how many documents it
/// returns, so callers that need everything go through [`fetch_all`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<Vec<Value>, StoreError>;
}

pub fn connect(cfg: &StoreConfig) -> anyhow::Result<AppwriteStore> {
    let store = AppwriteStore::new(cfg)?;
    tracing::info!(endpoint = %cfg.endpoint, database = %cfg.database_id, "document store client ready");
    Ok(store)
}
