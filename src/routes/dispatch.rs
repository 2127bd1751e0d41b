// src/routes/dispatch.rs

use axum::{extract::State, http::StatusCode, Json};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::AppState;
use crate::error::Outcome;

use super::{branch_summary, consultant_detail, country_wise, leaderboard, notification};

#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchResponse {
    fn failure(status: StatusCode, msg: String) -> (StatusCode, Json<DispatchResponse>) {
        (status, Json(DispatchResponse { success: false, data: None, error: Some(msg) }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Leaderboard,
    BranchSummary,
    ConsultantDetail,
    CountryWise,
    SendWhatsapp,
}

impl RequestType {
    pub const ALL: [RequestType; 5] = [
        RequestType::Leaderboard,
        RequestType::BranchSummary,
        RequestType::ConsultantDetail,
        RequestType::CountryWise,
        RequestType::SendWhatsapp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RequestType::Leaderboard => "leaderboard",
            RequestType::BranchSummary => "branchSummary",
            RequestType::ConsultantDetail => "consultantDetail",
            RequestType::CountryWise => "countryWise",
            RequestType::SendWhatsapp => "sendWhatsapp",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == kind)
    }

    fn valid_types() -> String {
        Self::ALL.map(RequestType::as_str).join(", ")
    }
}

fn decode<T: DeserializeOwned>(kind: RequestType, payload: Value) -> Result<T, String> {
    serde_json::from_value(payload).map_err(|e| format!("Invalid payload for '{}': {e}", kind.as_str()))
}

/// Route one `{type, payload}` request to its handler.
pub async fn dispatch(state: &AppState, req: DispatchRequest) -> (StatusCode, Json<DispatchResponse>) {
    let Some(kind) = RequestType::lookup(&req.kind) else {
        tracing::warn!(kind = %req.kind, "unknown request type");
        return DispatchResponse::failure(
            StatusCode::BAD_REQUEST,
            format!("Unknown request type '{}'. Valid types: {}", req.kind, RequestType::valid_types()),
        );
    };

    let outcome = match run(state, kind, req.payload).await {
        Ok(outcome) => outcome,
        Err(msg) => {
            tracing::warn!(kind = kind.as_str(), error = %msg, "rejected payload");
            return DispatchResponse::failure(StatusCode::BAD_REQUEST, msg);
        }
    };

    match outcome {
        Outcome::Ok(data) => {
            tracing::info!(kind = kind.as_str(), "request served");
            (StatusCode::OK, Json(DispatchResponse { success: true, data: Some(data), error: None }))
        }
        Outcome::Degraded { data, reason } => {
            tracing::warn!(kind = kind.as_str(), %reason, "request served with degraded data");
            (StatusCode::OK, Json(DispatchResponse { success: true, data: Some(data), error: None }))
        }
        Outcome::Failed(e) => {
            tracing::error!(kind = kind.as_str(), error = %e, "request failed");
            DispatchResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn run(state: &AppState, kind: RequestType, payload: Value) -> Result<Outcome<Value>, String> {
    Ok(match kind {
        RequestType::Leaderboard => {
            leaderboard::leaderboard(state, decode(kind, payload)?).await.into_json()
        }
        RequestType::BranchSummary => {
            branch_summary::branch_summary(state, decode(kind, payload)?).await.into_json()
        }
        RequestType::ConsultantDetail => {
            consultant_detail::consultant_detail(state, decode(kind, payload)?).await.into_json()
        }
        RequestType::CountryWise => {
            country_wise::country_wise(state, decode(kind, payload)?).await.into_json()
        }
        RequestType::SendWhatsapp => {
            notification::send_welcome(state, decode(kind, payload)?).await.into_json()
        }
    })
}

/// POST / and POST /api/v1/dispatch
pub async fn handle(
    State(state): State<AppState>,
    Json(req): Json<DispatchRequest>,
) -> (StatusCode, Json<DispatchResponse>) {
    dispatch(&state, req).await
}
