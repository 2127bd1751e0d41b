// src/routes/branch_summary.rs

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::db::{fetch_all, Collection, Query};
use crate::error::{AppError, Outcome};
use crate::models::{Booking, BranchSummary};

use super::{booking_window, int_param, DateMode};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchSummaryBody {
    #[serde(deserialize_with = "int_param")]
    pub year: i64,
    #[serde(deserialize_with = "int_param")]
    pub month_from: i64,
    #[serde(deserialize_with = "int_param")]
    pub month_to: i64,
}

#[derive(Debug, Serialize)]
pub struct BranchSummaryReport {
    pub branches: Vec<BranchSummary>,
}

#[derive(Debug, Default)]
struct BranchTally {
    revenue: i64,
    margin: i64,
    bookings: i64,
    consultants: HashSet<String>,
}

/// Per-branch totals over booked months. Errors propagate to the caller.
pub async fn branch_summary(state: &AppState, body: BranchSummaryBody) -> Outcome<BranchSummaryReport> {
    Outcome::propagate(build(state, &body).await)
}

async fn build(state: &AppState, body: &BranchSummaryBody) -> Result<BranchSummaryReport, AppError> {
    let mut queries = booking_window(DateMode::Booked, body.year, body.month_from, body.month_to);
    queries.push(Query::select(&["branch", "salesHandleName", "bookingValue", "finalMargin"]));
    let bookings: Vec<Booking> =
        fetch_all(state.store.as_ref(), Collection::Bookings, &queries, state.page_limit).await?;

    let branches = summarize_branches(&bookings);
    tracing::info!(branches = branches.len(), bookings = bookings.len(), "branch summary computed");
    Ok(BranchSummaryReport { branches })
}

fn summarize_branches(bookings: &[Booking]) -> Vec<BranchSummary> {
    let mut tallies: HashMap<&str, BranchTally> = HashMap::new();
    for b in bookings {
        let t = tallies.entry(b.branch.as_str()).or_default();
        t.revenue = t.revenue.saturating_add(b.booking_value);
        t.margin = t.margin.saturating_add(b.final_margin);
        t.bookings += 1;
        t.consultants.insert(b.sales_handle_name.clone());
    }

    let mut rows: Vec<BranchSummary> = tallies
        .into_iter()
        .map(|(branch, t)| BranchSummary {
            branch: branch.to_string(),
            total_revenue: t.revenue,
            total_margin: t.margin,
            total_bookings: t.bookings,
            consultant_count: t.consultants.len(),
        })
        .collect();
    rows.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue).then_with(|| a.branch.cmp(&b.branch)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn booking(id: &str, branch: &str, who: &str, value: &str, month: i64, cancelled: bool) -> Value {
        json!({
            "$id": id, "branch": branch, "salesHandleName": who,
            "bookingValue": value, "finalMargin": "10",
            "bookYear": 2024, "bookMonth": month, "bookingCancelled": cancelled
        })
    }

    #[tokio::test]
    async fn groups_by_branch_and_counts_consultants() {
        let store = InMemoryStore::new().with_bookings(vec![
            booking("1", "Kochi", "Asha", "1000", 4, false),
            booking("2", "Kochi", "Asha", "500", 5, false),
            booking("3", "Kochi", "Ravi", "250", 6, false),
            booking("4", "Delhi", "Neha", "5000", 4, false),
            booking("5", "Delhi", "Neha", "9999", 4, true),
            booking("6", "Delhi", "Neha", "9999", 9, false),
        ]);
        let state = AppState::with_store(Arc::new(store));
        let body = BranchSummaryBody { year: 2024, month_from: 4, month_to: 6 };

        let Outcome::Ok(report) = branch_summary(&state, body).await else {
            panic!("branch summary should succeed");
        };
        assert_eq!(
            report.branches,
            vec![
                BranchSummary {
                    branch: "Delhi".into(),
                    total_revenue: 5000,
                    total_margin: 10,
                    total_bookings: 1,
                    consultant_count: 1,
                },
                BranchSummary {
                    branch: "Kochi".into(),
                    total_revenue: 1750,
                    total_margin: 30,
                    total_bookings: 3,
                    consultant_count: 2,
                },
            ]
        );
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let state = AppState::with_store(Arc::new(InMemoryStore::new().failing()));
        let body = BranchSummaryBody { year: 2024, month_from: 1, month_to: 3 };
        assert!(matches!(
            branch_summary(&state, body).await,
            Outcome::Failed(AppError::Store(_))
        ));
    }
}
