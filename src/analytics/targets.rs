// src/analytics/targets.rs

use std::fmt::Display;

use crate::error::AppError;
use crate::models::{Employee, Target};

/// First target on `employee` for (`year`, `quarter`).
///
/// Every entry up to the match is decoded; a malformed one fails the lookup
/// instead of being skipped. Years are compared as strings, quarters as given.
pub fn find_target(
    employee: &Employee,
    year: impl Display,
    quarter: &str,
) -> Result<Option<Target>, AppError> {
    let year = year.to_string();
    for raw in &employee.targets {
        let target: Target = serde_json::from_str(raw).map_err(AppError::TargetDecode)?;
        if target.year == year && target.quarter == quarter {
            return Ok(Some(target));
        }
    }
    Ok(None)
}
