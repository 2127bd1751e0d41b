// src/notify.rs

use serde::Serialize;
use serde_json::{json, Value};

use crate::config::MessagingConfig;

/// What happened to one outbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Raw provider body on a non-2xx answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Sends the WhatsApp welcome template. One POST per call, never retried.
pub struct WhatsappNotifier {
    client: reqwest::Client,
    cfg: MessagingConfig,
}

impl WhatsappNotifier {
    pub fn new(cfg: MessagingConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self::with_client(client, cfg))
    }

    pub fn with_client(client: reqwest::Client, cfg: MessagingConfig) -> Self {
        Self { client, cfg }
    }

    pub async fn send_welcome(&self, name: &str, phone: &str) -> NotificationResult {
        let body = welcome_payload(&self.cfg, name, phone);

        let resp = match self
            .client
            .post(&self.cfg.api_url)
            .header("X-API-Key", &self.cfg.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "whatsapp request failed");
                return NotificationResult {
                    success: false,
                    status: None,
                    response: None,
                    error: Some(e.to_string()),
                };
            }
        };

        let status = resp.status();
        if status.is_success() {
            tracing::info!(status = status.as_u16(), "whatsapp welcome sent");
            return NotificationResult { success: true, status: Some(status.as_u16()), response: None, error: None };
        }

        let text = resp.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %text, "whatsapp provider rejected message");
        NotificationResult {
            success: false,
            status: Some(status.as_u16()),
            response: Some(text),
            error: Some(format!("provider answered {}", status.as_u16())),
        }
    }
}

/// Fixed welcome template: name in the body, a quick-reply button and a
/// coupon-code button.
pub fn welcome_payload(cfg: &MessagingConfig, name: &str, phone: &str) -> Value {
    json!({
        "channelId": cfg.channel_id,
        "recipient": {
            "name": name,
            "phone": phone,
        },
        "whatsapp": {
            "type": "template",
            "template": {
                "templateName": cfg.template_name,
                "bodyValues": { "name": name },
                "buttons": [
                    {
                        "index": 0,
                        "subType": "quick_reply",
                        "parameters": { "type": "payload", "payload": "EXPLORE_PACKAGES" }
                    },
                    {
                        "index": 1,
                        "subType": "copy_code",
                        "parameters": { "type": "coupon_code", "couponCode": cfg.coupon_code }
                    }
                ]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_recipient_and_both_buttons() {
        let cfg = MessagingConfig { channel_id: "chan-1".into(), ..Default::default() };
        let p = welcome_payload(&cfg, "Meera", "+919800000000");
        assert_eq!(p["channelId"], "chan-1");
        assert_eq!(p["recipient"]["phone"], "+919800000000");
        assert_eq!(p["whatsapp"]["template"]["bodyValues"]["name"], "Meera");
        let buttons = p["whatsapp"]["template"]["buttons"].as_array().unwrap();
        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0]["subType"], "quick_reply");
        assert_eq!(buttons[1]["parameters"]["couponCode"], "WELCOME10");
    }

    // Local stand-in for the provider that answers every POST the same way.
    async fn provider_answering(status: axum::http::StatusCode, body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = axum::Router::new().route("/message", axum::routing::post(move || async move { (status, body) }));
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}/message")
    }

    #[tokio::test]
    async fn rejected_message_keeps_raw_body() {
        let body = r#"{"result":false,"message":"bad phone"}"#;
        let api_url = provider_answering(axum::http::StatusCode::BAD_REQUEST, body).await;
        let notifier = WhatsappNotifier::new(MessagingConfig { api_url, ..Default::default() }).unwrap();

        let res = notifier.send_welcome("Meera", "12345").await;
        assert!(!res.success);
        assert_eq!(res.status, Some(400));
        assert_eq!(res.response.as_deref(), Some(body));
        assert_eq!(res.error.as_deref(), Some("provider answered 400"));
    }

    #[tokio::test]
    async fn accepted_message_is_a_success() {
        let api_url = provider_answering(axum::http::StatusCode::ACCEPTED, r#"{"result":true}"#).await;
        let notifier = WhatsappNotifier::new(MessagingConfig { api_url, ..Default::default() }).unwrap();

        let res = notifier.send_welcome("Meera", "+919800000000").await;
        assert_eq!(
            res,
            NotificationResult { success: true, status: Some(202), response: None, error: None }
        );
    }

    #[tokio::test]
    async fn network_failure_is_reported_not_raised() {
        // nothing listens on port 9 locally
        let cfg = MessagingConfig { api_url: "http://127.0.0.1:9/send".into(), ..Default::default() };
        let notifier = WhatsappNotifier::new(cfg).unwrap();
        let res = notifier.send_welcome("Meera", "+919800000000").await;
        assert!(!res.success);
        assert_eq!(res.status, None);
        assert!(res.error.is_some());
    }
}
