// src/db/fetch.rs

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Collection, DocumentStore, Query, StoreError};

pub const DEFAULT_PAGE_LIMIT: usize = 2000;

/// Upper bound on round trips for one `fetch_all` call.
pub const MAX_PAGES: usize = 1000;

/// Page through `collection` until the store runs dry.
///
/// Appends `limit` and, after the first page, `cursorAfter(<last $id>)` to
/// `queries`. A page shorter than `page_limit` is the last one, so an exact
/// multiple of `page_limit` costs one extra empty round trip. The first
/// failing page aborts the whole fetch.
pub async fn fetch_all<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    queries: &[Query],
    page_limit: usize,
) -> Result<Vec<T>, StoreError> {
    let page_limit = page_limit.max(1);
    let mut out = Vec::new();
    let mut cursor: Option<String> = None;

    for page in 0..MAX_PAGES {
        let mut page_queries = queries.to_vec();
        page_queries.push(Query::Limit(page_limit));
        if let Some(id) = &cursor {
            page_queries.push(Query::CursorAfter(id.clone()));
        }

        let docs = store.list_documents(collection, &page_queries).await?;
        let fetched = docs.len();
        tracing::debug!(%collection, page, fetched, "fetched page");

        if let Some(last) = docs.last() {
            cursor = Some(document_id(last, collection)?);
        }
        for doc in docs {
            let item = serde_json::from_value(doc)
                .map_err(|source| StoreError::Decode { collection, source })?;
            out.push(item);
        }

        if fetched < page_limit {
            return Ok(out);
        }
    }

    tracing::error!(%collection, pages = MAX_PAGES, "page cap reached, aborting fetch");
    Err(StoreError::PageCapExceeded { collection, pages: MAX_PAGES })
}

fn document_id(doc: &Value, collection: Collection) -> Result<String, StoreError> {
    doc.get("$id")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(StoreError::MissingId { collection })
}
