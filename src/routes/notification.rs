// src/routes/notification.rs

use serde::Deserialize;

use crate::app::AppState;
use crate::error::Outcome;
use crate::notify::NotificationResult;

#[derive(Debug, Deserialize)]
pub struct WelcomeBody {
    pub name: String,
    pub phone: String,
}

/// Fire the WhatsApp welcome template. Delivery problems come back as data.
pub async fn send_welcome(state: &AppState, body: WelcomeBody) -> Outcome<NotificationResult> {
    let result = state.notifier.send_welcome(body.name.trim(), body.phone.trim()).await;
    if result.success {
        Outcome::Ok(result)
    } else {
        let reason = result.error.clone().unwrap_or_else(|| "delivery failed".into());
        Outcome::Degraded { data: result, reason }
    }
}
