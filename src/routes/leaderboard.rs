// src/routes/leaderboard.rs

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::analytics::{aggregate_by_consultant, find_target, score_consultant};
use crate::app::AppState;
use crate::db::{fetch_all, Collection, Query};
use crate::error::{AppError, Outcome};
use crate::models::{Booking, ConsultantMetric, Target};

use super::{booking_window, branch_filter, eligible_employees, int_param, DateMode};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardBody {
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(deserialize_with = "int_param")]
    pub target_year: i64,
    #[serde(deserialize_with = "int_param")]
    pub year: i64,
    pub quarter: String,
    #[serde(deserialize_with = "int_param")]
    pub month_from: i64,
    #[serde(deserialize_with = "int_param")]
    pub month_to: i64,
    #[serde(default)]
    pub date_mode: DateMode,
    #[serde(default)]
    pub exclude_branch_head: bool,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardReport {
    pub by_bookings: Vec<ConsultantMetric>,
    pub by_margin: Vec<ConsultantMetric>,
    pub error: bool,
}

/// Ranked consultants against their quarter targets.
///
/// Never fails outright: any error yields empty rankings with `error: true`.
pub async fn leaderboard(state: &AppState, body: LeaderboardBody) -> Outcome<LeaderboardReport> {
    Outcome::degrade(build(state, &body).await, || LeaderboardReport { error: true, ..Default::default() })
}

async fn build(state: &AppState, body: &LeaderboardBody) -> Result<LeaderboardReport, AppError> {
    // 1) Eligible employees
    let employees = eligible_employees(state, branch_filter(&body.branch), body.exclude_branch_head).await?;

    // 2) Targets, first employee per name wins
    let mut seen = HashSet::new();
    let mut roster: Vec<(String, Option<Target>)> = Vec::new();
    for e in &employees {
        if seen.insert(e.name.clone()) {
            roster.push((e.name.clone(), find_target(e, body.target_year, &body.quarter)?));
        }
    }
    if roster.is_empty() {
        return Ok(LeaderboardReport::default());
    }

    // 3) Bookings by those employees in the window
    let mut queries = booking_window(body.date_mode, body.year, body.month_from, body.month_to);
    queries.push(Query::equal_any("salesHandleName", roster.iter().map(|(name, _)| name.as_str())));
    queries.push(Query::select(&["salesHandleName", "bookingValue", "finalMargin"]));
    let bookings: Vec<Booking> =
        fetch_all(state.store.as_ref(), Collection::Bookings, &queries, state.page_limit).await?;

    // 4) + 5) Aggregate and join
    let tallies = aggregate_by_consultant(&bookings);
    let metrics: Vec<ConsultantMetric> = roster
        .iter()
        .map(|(name, target)| {
            let tally = tallies.get(name).copied().unwrap_or_default();
            score_consultant(name, &tally, target.as_ref())
        })
        .collect();

    tracing::info!(
        consultants = metrics.len(),
        bookings = bookings.len(),
        "leaderboard computed"
    );
    Ok(rank(metrics))
}

/// Two independent orderings; ties keep roster order.
fn rank(metrics: Vec<ConsultantMetric>) -> LeaderboardReport {
    let mut by_bookings = metrics.clone();
    by_bookings.sort_by(|a, b| b.booking_achieved.cmp(&a.booking_achieved));
    let mut by_margin = metrics;
    by_margin.sort_by(|a, b| b.margin_achieved.cmp(&a.margin_achieved));
    LeaderboardReport { by_bookings, by_margin, error: false }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn body(extra: Value) -> LeaderboardBody {
        let mut base = json!({
            "targetYear": 2024, "year": 2024, "quarter": "Q4", "monthFrom": 10, "monthTo": 12
        });
        if let (Some(b), Some(e)) = (base.as_object_mut(), extra.as_object()) {
            b.extend(e.clone());
        }
        serde_json::from_value(base).unwrap()
    }

    fn bookings(who: &str, n: usize, margin: i64, month: i64) -> Vec<Value> {
        (0..n)
            .map(|i| json!({
                "$id": format!("{who}-{i}"),
                "salesHandleName": who,
                "bookingValue": "1000",
                "finalMargin": margin.to_string(),
                "bookYear": 2024,
                "bookMonth": month,
                "travelYear": 2025,
                "travelMonth": 1,
                "bookingCancelled": false
            }))
            .collect()
    }

    fn store() -> InMemoryStore {
        let mut all = bookings("A", 12, 100, 11);
        all.extend(bookings("B", 3, 50, 10));
        InMemoryStore::new()
            .with_employees(vec![
                json!({"$id": "e1", "name": "A", "branch": "Kochi", "designation": "Travel Consultant",
                       "targets": [r#"{"year":"2024","quarter":"Q4","totalBookings":10,"margin":1000}"#]}),
                json!({"$id": "e2", "name": "B", "branch": "Delhi", "designation": "Branch Head", "targets": []}),
                json!({"$id": "e3", "name": "M", "branch": "Kochi", "designation": "Accountant", "targets": []}),
            ])
            .with_bookings(all)
    }

    fn state(store: InMemoryStore) -> AppState {
        AppState::with_store(Arc::new(store))
    }

    #[tokio::test]
    async fn ranks_against_targets() {
        let Outcome::Ok(report) = leaderboard(&state(store()), body(json!({}))).await else {
            panic!("leaderboard should succeed");
        };
        assert!(!report.error);
        let names: Vec<_> = report.by_bookings.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);

        let a = &report.by_bookings[0];
        assert_eq!(a.booking_achieved, 12);
        assert_eq!(a.booking_percentage, 120);
        assert!(a.is_booking_exceeded);
        assert_eq!(a.margin_achieved, 1200);
        assert_eq!(a.margin_percentage, 120);

        let b = &report.by_bookings[1];
        assert_eq!(b.booking_achieved, 3);
        assert_eq!(b.booking_percentage, 300);
        assert!(b.is_booking_exceeded);
        assert_eq!(b.margin_percentage, 15000);

        assert_eq!(report.by_margin[0].name, "A");
    }

    #[tokio::test]
    async fn excluding_branch_head_drops_top_tier() {
        let Outcome::Ok(report) =
            leaderboard(&state(store()), body(json!({"excludeBranchHead": true}))).await
        else {
            panic!("leaderboard should succeed");
        };
        let names: Vec<_> = report.by_margin.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["A"]);
    }

    #[tokio::test]
    async fn branch_filter_scopes_employees() {
        let Outcome::Ok(report) = leaderboard(&state(store()), body(json!({"branch": "Delhi"}))).await else {
            panic!("leaderboard should succeed");
        };
        assert_eq!(report.by_bookings.len(), 1);
        assert_eq!(report.by_bookings[0].name, "B");
    }

    #[tokio::test]
    async fn travel_mode_uses_travel_fields() {
        let Outcome::Ok(report) = leaderboard(
            &state(store()),
            body(json!({"dateMode": "travel", "year": 2025, "monthFrom": 1, "monthTo": 1})),
        )
        .await
        else {
            panic!("leaderboard should succeed");
        };
        assert_eq!(report.by_bookings[0].booking_achieved, 12);
        assert_eq!(report.by_bookings[1].booking_achieved, 3);
    }

    #[tokio::test]
    async fn store_failure_degrades_to_empty_lists() {
        match leaderboard(&state(InMemoryStore::new().failing()), body(json!({}))).await {
            Outcome::Degraded { data, .. } => {
                assert!(data.error);
                assert!(data.by_bookings.is_empty());
                assert!(data.by_margin.is_empty());
            }
            other => panic!("expected degraded outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_target_degrades() {
        let store = InMemoryStore::new().with_employees(vec![json!({
            "$id": "e1", "name": "A", "designation": "Travel Consultant", "targets": ["{oops"]
        })]);
        assert!(matches!(
            leaderboard(&state(store), body(json!({}))).await,
            Outcome::Degraded { .. }
        ));
    }
}
