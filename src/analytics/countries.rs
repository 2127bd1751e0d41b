// src/analytics/countries.rs

use std::collections::{BTreeMap, HashMap};

use crate::models::{Booking, CountrySummary};

/// Countries listed individually before the rest fold into "Others".
pub const TOP_COUNTRIES: usize = 10;

pub const OTHERS: &str = "Others";

// lower-cased alias -> canonical bucket
const ALIASES: &[(&str, &str)] = &[
    ("dubai", "Dubai"),
    ("uae", "Dubai"),
    ("united arab emirates", "Dubai"),
];

/// Trimmed country name with known aliases folded; `None` for blanks.
pub fn canonical_country(raw: &str) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() {
        return None;
    }
    let lower = name.to_lowercase();
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map_or(name, |&(_, canonical)| canonical);
    Some(canonical.to_string())
}

#[derive(Debug, Default)]
struct CountryTally {
    count: i64,
    travellers: i64,
    assignees: BTreeMap<String, i64>,
    assignee_travellers: BTreeMap<String, i64>,
}

impl CountryTally {
    fn add(&mut self, assignee: &str, travellers: i64) {
        self.count = self.count.saturating_add(1);
        self.travellers = self.travellers.saturating_add(travellers);
        bump(&mut self.assignees, assignee, 1);
        bump(&mut self.assignee_travellers, assignee, travellers);
    }

    fn into_summary(self, name: String) -> CountrySummary {
        CountrySummary {
            name,
            count: self.count,
            assignees: self.assignees,
            traveler_count: self.travellers,
            assignee_travellers: self.assignee_travellers,
        }
    }
}

fn bump(map: &mut BTreeMap<String, i64>, key: &str, by: i64) {
    let slot = map.entry(key.to_string()).or_default();
    *slot = slot.saturating_add(by);
}

/// Per-country booking and traveller counts, top [`TOP_COUNTRIES`] first.
///
/// Every listed entry counts, so a booking naming "Dubai" and "UAE" adds two
/// to the Dubai row. Countries past the cut are merged into one "Others" row,
/// which is left out when nothing was folded.
pub fn summarize_countries(bookings: &[Booking]) -> Vec<CountrySummary> {
    let mut tallies: HashMap<String, CountryTally> = HashMap::new();
    for b in bookings {
        let travellers = b.travellers();
        for country in b.countries.iter().filter_map(|c| canonical_country(c)) {
            tallies.entry(country).or_default().add(&b.sales_handle_name, travellers);
        }
    }

    let mut rows: Vec<CountrySummary> = tallies
        .into_iter()
        .map(|(name, tally)| tally.into_summary(name))
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    fold_tail(rows, TOP_COUNTRIES)
}

/// Keep the first `keep` rows and merge the remainder into "Others".
pub fn fold_tail(mut rows: Vec<CountrySummary>, keep: usize) -> Vec<CountrySummary> {
    if rows.len() <= keep {
        return rows;
    }
    let tail = rows.split_off(keep);
    let mut others = CountrySummary { name: OTHERS.to_string(), ..Default::default() };
    for row in tail {
        others.count = others.count.saturating_add(row.count);
        others.traveler_count = others.traveler_count.saturating_add(row.traveler_count);
        for (who, n) in &row.assignees {
            bump(&mut others.assignees, who, *n);
        }
        for (who, n) in &row.assignee_travellers {
            bump(&mut others.assignee_travellers, who, *n);
        }
    }
    if others.count > 0 {
        rows.push(others);
    }
    rows
}
