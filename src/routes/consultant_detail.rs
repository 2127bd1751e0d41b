// src/routes/consultant_detail.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analytics::{aggregate_by_consultant, find_target, score_consultant};
use crate::app::AppState;
use crate::db::{fetch_all, Collection, Query};
use crate::error::{AppError, Outcome};
use crate::models::{Booking, ConsultantMetric, Employee, Target};

use super::{booking_window, int_param, DateMode};

const RECENT_BOOKINGS: usize = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantDetailBody {
    pub name: String,
    #[serde(deserialize_with = "int_param")]
    pub target_year: i64,
    pub quarter: String,
    #[serde(deserialize_with = "int_param")]
    pub year: i64,
    #[serde(deserialize_with = "int_param")]
    pub month_from: i64,
    #[serde(deserialize_with = "int_param")]
    pub month_to: i64,
}

#[derive(Debug, Serialize)]
pub struct Profile {
    pub name: String,
    pub branch: String,
    pub designation: String,
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct MonthlyBreakdown {
    pub month: i64,
    pub revenue: i64,
    pub bookings: i64,
    pub margin: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantDetail {
    pub profile: Profile,
    pub target: Option<Target>,
    pub summary: ConsultantMetric,
    pub monthly: Vec<MonthlyBreakdown>,
    pub recent_bookings: Vec<Booking>,
}

/// One consultant's profile, month-by-month figures and latest bookings.
/// Errors propagate to the caller.
pub async fn consultant_detail(state: &AppState, body: ConsultantDetailBody) -> Outcome<ConsultantDetail> {
    Outcome::propagate(build(state, &body).await)
}

async fn build(state: &AppState, body: &ConsultantDetailBody) -> Result<ConsultantDetail, AppError> {
    let employees: Vec<Employee> = fetch_all(
        state.store.as_ref(),
        Collection::Employees,
        &[Query::equal("name", body.name.as_str())],
        state.page_limit,
    )
    .await?;
    let employee = employees
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("consultant '{}'", body.name)))?;
    let target = find_target(&employee, body.target_year, &body.quarter)?;

    let mut queries = booking_window(DateMode::Booked, body.year, body.month_from, body.month_to);
    queries.push(Query::equal("salesHandleName", body.name.as_str()));
    let bookings: Vec<Booking> =
        fetch_all(state.store.as_ref(), Collection::Bookings, &queries, state.page_limit).await?;

    let tally = aggregate_by_consultant(&bookings).remove(&employee.name).unwrap_or_default();
    let summary = score_consultant(&employee.name, &tally, target.as_ref());
    let monthly = monthly_breakdown(&bookings);
    let recent_bookings = recent(bookings);

    Ok(ConsultantDetail {
        profile: Profile {
            name: employee.name,
            branch: employee.branch,
            designation: employee.designation,
        },
        target,
        summary,
        monthly,
        recent_bookings,
    })
}

fn monthly_breakdown(bookings: &[Booking]) -> Vec<MonthlyBreakdown> {
    let mut months: BTreeMap<i64, MonthlyBreakdown> = BTreeMap::new();
    for b in bookings {
        let month = b.book_month.unwrap_or(0);
        let m = months.entry(month).or_insert_with(|| MonthlyBreakdown { month, ..Default::default() });
        m.revenue = m.revenue.saturating_add(b.booking_value);
        m.margin = m.margin.saturating_add(b.final_margin);
        m.bookings += 1;
    }
    months.into_values().collect()
}

/// Last [`RECENT_BOOKINGS`] records in reverse fetch order.
///
/// Positional: this is "most recent" only because the store returns
/// documents in creation order.
fn recent(mut bookings: Vec<Booking>) -> Vec<Booking> {
    let start = bookings.len().saturating_sub(RECENT_BOOKINGS);
    let mut tail = bookings.split_off(start);
    tail.reverse();
    tail
}
