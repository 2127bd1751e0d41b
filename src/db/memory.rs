// src/db/memory.rs

use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{Collection, DocumentStore, Query, StoreError};

/// Store double that evaluates queries over in-process documents.
///
/// Documents keep their insertion order, which plays the part of the
/// store's natural (id) order for cursor paging.
#[derive(Default)]
pub struct InMemoryStore {
    employees: Vec<Value>,
    bookings: Vec<Value>,
    failing: bool,
    queries: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employees(mut self, docs: Vec<Value>) -> Self {
        self.employees = docs;
        self
    }

    pub fn with_bookings(mut self, docs: Vec<Value>) -> Self {
        self.bookings = docs;
        self
    }

    /// Every call answers with a 503.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Number of `list_documents` calls served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(AtomicOrdering::SeqCst)
    }

    fn docs(&self, collection: Collection) -> &[Value] {
        match collection {
            Collection::Employees => &self.employees,
            Collection::Bookings => &self.bookings,
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<Vec<Value>, StoreError> {
        self.queries.fetch_add(1, AtomicOrdering::SeqCst);
        if self.failing {
            return Err(StoreError::Status { status: 503, body: "store unavailable".into() });
        }

        let matched: Vec<&Value> = self
            .docs(collection)
            .iter()
            .filter(|doc| queries.iter().all(|q| matches(doc, q)))
            .collect();

        let start = queries
            .iter()
            .find_map(|q| match q {
                Query::CursorAfter(id) => Some(id),
                _ => None,
            })
            .and_then(|id| matched.iter().position(|d| d.get("$id").and_then(Value::as_str) == Some(id.as_str())))
            .map_or(0, |pos| pos + 1);

        let limit = queries
            .iter()
            .find_map(|q| match q {
                Query::Limit(n) => Some(*n),
                _ => None,
            })
            .unwrap_or(25);

        let select = queries.iter().find_map(|q| match q {
            Query::Select(attrs) => Some(attrs),
            _ => None,
        });

        Ok(matched
            .into_iter()
            .skip(start)
            .take(limit)
            .map(|doc| match select {
                Some(attrs) => project(doc, attrs),
                None => doc.clone(),
            })
            .collect())
    }
}

fn matches(doc: &Value, query: &Query) -> bool {
    match query {
        Query::Equal(attr, values) => doc
            .get(attr)
            .map_or(false, |field| values.iter().any(|v| compare(field, v) == Some(Ordering::Equal))),
        Query::GreaterThanEqual(attr, v) => doc
            .get(attr)
            .and_then(|field| compare(field, v))
            .map_or(false, |o| o != Ordering::Less),
        Query::LessThanEqual(attr, v) => doc
            .get(attr)
            .and_then(|field| compare(field, v))
            .map_or(false, |o| o != Ordering::Greater),
        Query::Select(_) | Query::Limit(_) | Query::CursorAfter(_) => true,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

// `$`-prefixed system attributes always come back, like the real store.
fn project(doc: &Value, attrs: &[String]) -> Value {
    let Some(obj) = doc.as_object() else {
        return doc.clone();
    };
    let kept: Map<String, Value> = obj
        .iter()
        .filter(|(k, _)| k.starts_with('$') || attrs.iter().any(|a| a == *k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Value::Object(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn evaluates_range_membership_and_projection() {
        let store = InMemoryStore::new().with_bookings(vec![
            json!({"$id": "a", "bookMonth": 1, "branch": "Kochi", "destination": "Bali"}),
            json!({"$id": "b", "bookMonth": 4, "branch": "Delhi", "destination": "Paris"}),
            json!({"$id": "c", "bookMonth": 6, "branch": "Kochi", "destination": "Rome"}),
        ]);
        let docs = store
            .list_documents(
                Collection::Bookings,
                &[
                    Query::gte("bookMonth", 2),
                    Query::lte("bookMonth", 6),
                    Query::equal_any("branch", ["Kochi", "Mumbai"]),
                    Query::select(&["destination"]),
                ],
            )
            .await
            .unwrap();
        assert_eq!(docs, vec![json!({"$id": "c", "destination": "Rome"})]);
        assert_eq!(store.query_count(), 1);
    }
}
