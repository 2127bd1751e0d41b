// src/models/mod.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ───────────────────────────────────────
// Store documents
// ───────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "$id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub designation: String,
    /// Serialized `Target` records, one JSON string each.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub targets: Vec<String>,
}

/// Per-quarter goal stored on an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    #[serde(deserialize_with = "string_or_number")]
    pub year: String,
    pub quarter: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_bookings: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub margin: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "$id", default)]
    pub id: String,
    #[serde(rename = "bookingID", default, deserialize_with = "string_or_number")]
    pub booking_id: String,
    #[serde(default)]
    pub sales_handle_name: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub booking_value: i64,
    #[serde(default, deserialize_with = "lenient_int")]
    pub final_margin: i64,
    #[serde(default, deserialize_with = "lenient_opt_int")]
    pub book_month: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_int")]
    pub book_year: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_int")]
    pub travel_month: Option<i64>,
    #[serde(default, deserialize_with = "lenient_opt_int")]
    pub travel_year: Option<i64>,
    #[serde(default)]
    pub booked_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub booking_cancelled: bool,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub countries: Vec<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub adults: i64,
    #[serde(default, deserialize_with = "lenient_int")]
    pub children: i64,
    #[serde(default)]
    pub status: Option<String>,
}

impl Booking {
    pub fn travellers(&self) -> i64 {
        self.adults.saturating_add(self.children)
    }
}

// ───────────────────────────────────────
// Derived report rows
// ───────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantMetric {
    pub name: String,
    pub revenue: i64,
    pub booking_achieved: i64,
    pub margin_achieved: i64,
    pub booking_target: f64,
    pub margin_target: f64,
    pub booking_percentage: i64,
    pub margin_percentage: i64,
    pub is_booking_exceeded: bool,
    pub is_margin_exceeded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchSummary {
    pub branch: String,
    pub total_revenue: i64,
    pub total_margin: i64,
    pub total_bookings: i64,
    pub consultant_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySummary {
    pub name: String,
    pub count: i64,
    pub assignees: BTreeMap<String, i64>,
    pub traveler_count: i64,
    pub assignee_travellers: BTreeMap<String, i64>,
}

// ───────────────────────────────────────
// Lenient field decoding
// ───────────────────────────────────────

/// Integer prefix of a string, the way a browser's `parseInt` reads it:
/// `" 12.7kg"` is 12, `"abc"` is `None`. Digit runs past the `i64` range
/// clamp to `i64::MAX` / `i64::MIN`.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    let clamped = if sign < 0 { i64::MIN } else { i64::MAX };
    Some(digits[..end].parse::<i64>().map_or(clamped, |n| sign * n))
}

fn int_from_value(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

fn lenient_int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(int_from_value(&Value::deserialize(d)?).unwrap_or(0))
}

fn lenient_opt_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(int_from_value(&Value::deserialize(d)?))
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn null_as_empty<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}

fn null_as_false<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(d)?.unwrap_or(false))
}
