// src/routes/country_wise.rs

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::analytics::summarize_countries;
use crate::app::AppState;
use crate::db::{fetch_all, Collection, Query};
use crate::error::{AppError, Outcome};
use crate::models::{Booking, CountrySummary};

use super::{branch_filter, eligible_employees, unique_names};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryWiseBody {
    #[serde(default)]
    pub branch: Option<String>,
    pub date_from: String,
    pub date_to: String,
}

#[derive(Debug, Default, Serialize)]
pub struct CountryWiseReport {
    pub countries: Vec<CountrySummary>,
    pub error: bool,
}

/// Booking and traveller distribution per destination country.
///
/// Never fails outright: any error yields an empty list with `error: true`.
pub async fn country_wise(state: &AppState, body: CountryWiseBody) -> Outcome<CountryWiseReport> {
    Outcome::degrade(build(state, &body).await, || CountryWiseReport { error: true, ..Default::default() })
}

async fn build(state: &AppState, body: &CountryWiseBody) -> Result<CountryWiseReport, AppError> {
    let from = range_bound(&body.date_from, false)?;
    let to = range_bound(&body.date_to, true)?;

    let employees = eligible_employees(state, branch_filter(&body.branch), false).await?;
    let names = unique_names(&employees);
    if names.is_empty() {
        return Ok(CountryWiseReport::default());
    }

    let queries = vec![
        Query::equal("bookingCancelled", false),
        Query::equal_any("salesHandleName", names),
        Query::gte("bookedDate", from),
        Query::lte("bookedDate", to),
        Query::select(&["salesHandleName", "countries", "adults", "children"]),
    ];
    let bookings: Vec<Booking> =
        fetch_all(state.store.as_ref(), Collection::Bookings, &queries, state.page_limit).await?;

    let countries = summarize_countries(&bookings);
    tracing::info!(countries = countries.len(), bookings = bookings.len(), "country-wise computed");
    Ok(CountryWiseReport { countries, error: false })
}

/// Store timestamp for one end of an inclusive range. A bare date covers the
/// whole day; full timestamps pass through unchanged.
fn range_bound(raw: &str, end_of_day: bool) -> Result<String, AppError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let time = if end_of_day { "23:59:59.999" } else { "00:00:00.000" };
        return Ok(format!("{}T{time}+00:00", date.format("%Y-%m-%d")));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|_| raw.to_string())
        .map_err(|e| AppError::InvalidPayload(format!("invalid date '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn booking(id: &str, who: &str, date: &str, countries: &[&str], adults: i64) -> Value {
        json!({
            "$id": id, "salesHandleName": who, "bookedDate": date,
            "countries": countries, "adults": adults, "children": "1", "bookingCancelled": false
        })
    }

    fn store() -> InMemoryStore {
        InMemoryStore::new()
            .with_employees(vec![
                json!({"$id": "e1", "name": "Asha", "branch": "Kochi", "designation": "Travel Consultant"}),
                json!({"$id": "e2", "name": "Neha", "branch": "Delhi", "designation": "Branch Head"}),
            ])
            .with_bookings(vec![
                booking("1", "Asha", "2024-03-01T09:00:00.000+00:00", &["DUBAI", "Thailand"], 2),
                booking("2", "Neha", "2024-03-31T18:30:00.000+00:00", &["United Arab Emirates"], 1),
                booking("3", "Asha", "2024-04-01T00:00:00.000+00:00", &["Japan"], 4),
                booking("4", "Ghost", "2024-03-10T00:00:00.000+00:00", &["Peru"], 1),
            ])
    }

    fn body(branch: Option<&str>) -> CountryWiseBody {
        CountryWiseBody {
            branch: branch.map(Into::into),
            date_from: "2024-03-01".into(),
            date_to: "2024-03-31".into(),
        }
    }

    #[tokio::test]
    async fn folds_aliases_within_date_range() {
        let state = AppState::with_store(Arc::new(store()));
        let Outcome::Ok(report) = country_wise(&state, body(None)).await else {
            panic!("country-wise should succeed");
        };
        let rows: Vec<_> = report.countries.iter().map(|c| (c.name.as_str(), c.count, c.traveler_count)).collect();
        assert_eq!(rows, [("Dubai", 2, 5), ("Thailand", 1, 3)]);
        assert_eq!(report.countries[0].assignees["Neha"], 1);
        assert_eq!(report.countries[0].assignee_travellers["Asha"], 3);
    }

    #[tokio::test]
    async fn branch_scopes_salespeople() {
        let state = AppState::with_store(Arc::new(store()));
        let Outcome::Ok(report) = country_wise(&state, body(Some("Delhi"))).await else {
            panic!("country-wise should succeed");
        };
        assert_eq!(report.countries.len(), 1);
        assert_eq!(report.countries[0].count, 1);
        assert!(report.countries[0].assignees.contains_key("Neha"));
    }

    #[tokio::test]
    async fn bad_date_degrades() {
        let state = AppState::with_store(Arc::new(store()));
        let mut b = body(None);
        b.date_from = "last tuesday".into();
        match country_wise(&state, b).await {
            Outcome::Degraded { data, reason } => {
                assert!(data.error);
                assert!(data.countries.is_empty());
                assert!(reason.contains("last tuesday"));
            }
            other => panic!("expected degraded outcome, got {other:?}"),
        }
    }

    #[test]
    fn bare_dates_cover_whole_days() {
        assert_eq!(range_bound("2024-03-31", true).unwrap(), "2024-03-31T23:59:59.999+00:00");
        assert_eq!(range_bound("2024-03-01", false).unwrap(), "2024-03-01T00:00:00.000+00:00");
        assert_eq!(
            range_bound("2024-03-01T10:00:00.000+05:30", false).unwrap(),
            "2024-03-01T10:00:00.000+05:30"
        );
    }
}
