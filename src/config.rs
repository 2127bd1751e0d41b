// src/config.rs

use std::env;

use thiserror::Error;

use crate::db::DEFAULT_PAGE_LIMIT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment or .env file")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Process-wide settings, read once at start-up and handed to constructors.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store: StoreConfig,
    pub messaging: MessagingConfig,
}

/// Document store endpoint and collection identifiers.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: String,
    pub database_id: String,
    pub employees_collection_id: String,
    pub bookings_collection_id: String,
    pub page_limit: usize,
}

/// WhatsApp provider credentials and template settings.
#[derive(Debug, Clone)]
pub struct MessagingConfig {
    pub api_url: String,
    pub api_key: String,
    pub channel_id: String,
    pub template_name: String,
    pub coupon_code: String,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.interakt.ai/v1/public/message/".into(),
            api_key: String::new(),
            channel_id: String::new(),
            template_name: "welcome_offer".into(),
            coupon_code: "WELCOME10".into(),
        }
    }
}

impl Config {
    /// Load from the process environment (after `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = match env::var("PORT") {
            Ok(v) => v.parse().map_err(|_| ConfigError::Invalid { name: "PORT", value: v })?,
            Err(_) => 8080,
        };

        let page_limit = match env::var("STORE_PAGE_LIMIT") {
            Ok(v) => match v.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::Invalid { name: "STORE_PAGE_LIMIT", value: v }),
            },
            Err(_) => DEFAULT_PAGE_LIMIT,
        };

        let store = StoreConfig {
            endpoint: required("APPWRITE_ENDPOINT")?,
            project_id: required("APPWRITE_PROJECT_ID")?,
            api_key: required("APPWRITE_API_KEY")?,
            database_id: required("APPWRITE_DATABASE_ID")?,
            employees_collection_id: required("APPWRITE_EMPLOYEES_COLLECTION_ID")?,
            bookings_collection_id: required("APPWRITE_BOOKINGS_COLLECTION_ID")?,
            page_limit,
        };

        let defaults = MessagingConfig::default();
        let messaging = MessagingConfig {
            api_url: optional("WHATSAPP_API_URL").unwrap_or(defaults.api_url),
            api_key: optional("WHATSAPP_API_KEY").unwrap_or(defaults.api_key),
            channel_id: optional("WHATSAPP_CHANNEL_ID").unwrap_or(defaults.channel_id),
            template_name: optional("WHATSAPP_TEMPLATE_NAME").unwrap_or(defaults.template_name),
            coupon_code: optional("WHATSAPP_COUPON_CODE").unwrap_or(defaults.coupon_code),
        };

        Ok(Self { port, store, messaging })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
