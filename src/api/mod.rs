use crate::catalog::{normalize_catalog, rows_from_payload};
use crate::event::AppEvent;
use crate::insights::{group_insights, insights_from_payload};
use chrono::{SecondsFormat, Utc};
use log::debug;
use serde_json::{json, Value};
use std::fmt;
use std::sync::mpsc;
use tokio::runtime::Handle;

const DEFAULT_CATALOG_URL: &str = "https://hooks.tangram.dev/webhook/chat-info";
const DEFAULT_INSIGHTS_URL: &str = "https://hooks.tangram.dev/webhook/insights";
const DEFAULT_CHAT_URL: &str = "https://hooks.tangram.dev/webhook/chat";

#[derive(Debug)]
pub enum ApiError {
    Transport(reqwest::Error),
    Status(u16),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "request failed: {err}"),
            Self::Status(code) => write!(f, "HTTP error: status {code}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

#[derive(Debug, Clone)]
pub struct Endpoints {
    pub catalog: String,
    pub insights: String,
    pub chat: String,
}

impl Endpoints {
    pub fn from_env() -> Self {
        let var = |name: &str, default: &str| {
            std::env::var(name).unwrap_or_else(|_| default.to_string())
        };

        Self {
            catalog: var("TANGRAM_CATALOG_URL", DEFAULT_CATALOG_URL),
            insights: var("TANGRAM_INSIGHTS_URL", DEFAULT_INSIGHTS_URL),
            chat: var("TANGRAM_CHAT_URL", DEFAULT_CHAT_URL),
        }
    }
}

// One shared client for all three webhooks. Every method returns
// immediately; the outcome arrives on the UI thread as an AppEvent. No
// retries, no timeout, no cancellation.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
}

impl ApiClient {
    pub fn new(endpoints: Endpoints, tx: mpsc::Sender<AppEvent>) -> Result<Self, String> {
        let runtime_handle =
            Handle::try_current().map_err(|err| format!("tokio runtime unavailable: {err}"))?;

        Ok(Self {
            http: reqwest::Client::new(),
            endpoints,
            tx,
            runtime_handle,
        })
    }

    pub fn fetch_catalog(&self) {
        let http = self.http.clone();
        let url = self.endpoints.catalog.clone();
        let tx = self.tx.clone();

        self.runtime_handle.spawn(async move {
            let event = match request_catalog(&http, &url).await {
                Ok(payload) => {
                    let rows = rows_from_payload(&payload);
                    debug!("catalog fetch returned {} rows", rows.len());
                    AppEvent::CatalogLoaded(normalize_catalog(&rows))
                }
                Err(err) => AppEvent::CatalogFailed(err.to_string()),
            };
            let _ = tx.send(event);
        });
    }

    pub fn fetch_insights(&self) {
        let http = self.http.clone();
        let url = self.endpoints.insights.clone();
        let tx = self.tx.clone();

        self.runtime_handle.spawn(async move {
            let event = match request_insights(&http, &url).await {
                Ok(payload) => {
                    let insights = insights_from_payload(&payload);
                    debug!("insight fetch returned {} rows", insights.len());
                    let grouped = group_insights(&insights);
                    AppEvent::InsightsLoaded { insights, grouped }
                }
                Err(err) => AppEvent::InsightsFailed(err.to_string()),
            };
            let _ = tx.send(event);
        });
    }

    // The reply body travels to the UI as raw text; the session controller
    // owns the shape-tolerant decoding.
    pub fn send_chat(&self, message: String) {
        let http = self.http.clone();
        let url = self.endpoints.chat.clone();
        let tx = self.tx.clone();

        self.runtime_handle.spawn(async move {
            let event = match request_chat(&http, &url, &message).await {
                Ok(body) => AppEvent::ChatReply(body),
                Err(err) => AppEvent::ChatFailed(err.to_string()),
            };
            let _ = tx.send(event);
        });
    }
}

async fn request_catalog(http: &reqwest::Client, url: &str) -> Result<Value, ApiError> {
    let body = json!({
        "action": "list_integrations",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    });

    let response = http.post(url).json(&body).send().await?;
    let response = check_status(response)?;
    Ok(response.json::<Value>().await?)
}

async fn request_insights(http: &reqwest::Client, url: &str) -> Result<Value, ApiError> {
    let response = http
        .post(url)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .send()
        .await?;
    let response = check_status(response)?;
    Ok(response.json::<Value>().await?)
}

async fn request_chat(
    http: &reqwest::Client,
    url: &str,
    message: &str,
) -> Result<String, ApiError> {
    let response = http.post(url).json(&json!({ "message": message })).send().await?;
    let response = check_status(response)?;
    Ok(response.text().await?)
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status(response.status().as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_messages_are_human_readable() {
        let status = ApiError::Status(502);
        assert_eq!(status.to_string(), "HTTP error: status 502");
    }

    #[test]
    fn endpoints_fall_back_to_compiled_defaults() {
        // Env vars are not set under the test harness.
        let endpoints = Endpoints::from_env();
        assert!(endpoints.catalog.ends_with("/chat-info"));
        assert!(endpoints.insights.ends_with("/insights"));
        assert!(endpoints.chat.ends_with("/chat"));
    }
}
