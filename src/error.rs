// src/error.rs

use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("malformed target record: {0}")]
    TargetDecode(serde_json::Error),

    #[error("could not encode response: {0}")]
    Encode(serde_json::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Result of one handler invocation.
///
/// Handlers pick the variant that matches their documented error policy:
/// report handlers with a local catch turn failures into `Degraded` (the
/// caller sees a success envelope with an `error` flag in the data), the
/// others surface `Failed` and the dispatcher answers with a 500.
#[derive(Debug)]
pub enum Outcome<T> {
    Ok(T),
    Degraded { data: T, reason: String },
    Failed(AppError),
}

impl<T> Outcome<T> {
    /// Propagating policy: any error becomes `Failed`.
    pub fn propagate(res: Result<T, AppError>) -> Self {
        match res {
            Ok(data) => Outcome::Ok(data),
            Err(e) => Outcome::Failed(e),
        }
    }

    /// Degrading policy: any error is replaced by `fallback`.
    pub fn degrade(res: Result<T, AppError>, fallback: impl FnOnce() -> T) -> Self {
        match res {
            Ok(data) => Outcome::Ok(data),
            Err(e) => Outcome::Degraded { data: fallback(), reason: e.to_string() },
        }
    }
}

impl<T: Serialize> Outcome<T> {
    /// Erase the payload type so the dispatcher can hold every handler in one table.
    pub fn into_json(self) -> Outcome<serde_json::Value> {
        match self {
            Outcome::Ok(data) => match serde_json::to_value(data) {
                Ok(v) => Outcome::Ok(v),
                Err(e) => Outcome::Failed(AppError::Encode(e)),
            },
            Outcome::Degraded { data, reason } => match serde_json::to_value(data) {
                Ok(v) => Outcome::Degraded { data: v, reason },
                Err(e) => Outcome::Failed(AppError::Encode(e)),
            },
            Outcome::Failed(e) => Outcome::Failed(e),
        }
    }
}
