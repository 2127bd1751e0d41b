// src/routes/mod.rs

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::app::AppState;
use crate::db::{fetch_all, Collection, Query};
use crate::error::AppError;
use crate::models::Employee;

pub mod branch_summary;
pub mod consultant_detail;
pub mod country_wise;
pub mod dispatch;
pub mod health;
pub mod leaderboard;
pub mod notification;

/// Designations that rank on reports, lowest tier first.
pub const ELIGIBLE_DESIGNATIONS: &[&str] = &[
    "Travel Consultant",
    "Senior Travel Consultant",
    "Team Leader",
    "Branch Head",
];

/// Which pair of month/year fields a report filters on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    #[default]
    Booked,
    Travel,
}

impl DateMode {
    pub fn month_field(self) -> &'static str {
        match self {
            DateMode::Booked => "bookMonth",
            DateMode::Travel => "travelMonth",
        }
    }

    pub fn year_field(self) -> &'static str {
        match self {
            DateMode::Booked => "bookYear",
            DateMode::Travel => "travelYear",
        }
    }
}

/// Non-cancelled bookings in `year` with `month_from..=month_to`.
pub fn booking_window(mode: DateMode, year: i64, month_from: i64, month_to: i64) -> Vec<Query> {
    vec![
        Query::equal("bookingCancelled", false),
        Query::equal(mode.year_field(), year),
        Query::gte(mode.month_field(), month_from),
        Query::lte(mode.month_field(), month_to),
    ]
}

/// Employees holding an eligible designation, optionally in one branch.
pub async fn eligible_employees(
    state: &AppState,
    branch: Option<&str>,
    exclude_top_tier: bool,
) -> Result<Vec<Employee>, AppError> {
    let tiers = if exclude_top_tier {
        &ELIGIBLE_DESIGNATIONS[..ELIGIBLE_DESIGNATIONS.len() - 1]
    } else {
        ELIGIBLE_DESIGNATIONS
    };

    let mut queries = vec![
        Query::equal_any("designation", tiers.iter().copied()),
        Query::select(&["name", "branch", "designation", "targets"]),
    ];
    if let Some(b) = branch {
        queries.push(Query::equal("branch", b));
    }

    let employees = fetch_all(state.store.as_ref(), Collection::Employees, &queries, state.page_limit).await?;
    Ok(employees)
}

/// Distinct names in fetch order.
pub fn unique_names(employees: &[Employee]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    employees
        .iter()
        .filter(|e| seen.insert(e.name.as_str()))
        .map(|e| e.name.clone())
        .collect()
}

/// `""` and `"all"` mean no branch filter.
pub fn branch_filter(branch: &Option<String>) -> Option<&str> {
    branch
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty() && !b.eq_ignore_ascii_case("all"))
}

/// Accepts `2024` as well as `"2024"` in request payloads.
pub fn int_param<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    match Value::deserialize(d)? {
        Value::Number(n) => n.as_i64().ok_or_else(|| serde::de::Error::custom("expected an integer")),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected an integer, got '{s}'"))),
        other => Err(serde::de::Error::custom(format!("expected an integer, got {other}"))),
    }
}
