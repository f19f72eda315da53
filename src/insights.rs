//! Descriptive insights about a birth date, produced by a remote
//! text-generation model.
//!
//! The request runs on its own task, independent of the live loop. Its
//! progress is tracked as an [`InsightState`]; any failure (no credential,
//! network, bad status, unusable body) degrades to a fixed one-item
//! fallback so the caller always has something to show.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::Client;
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::InsightsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightCategory {
    Historical,
    Celestial,
    Milestone,
    FunFact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub content: String,
    pub category: InsightCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InsightState {
    #[default]
    NotRequested,
    Pending,
    Ready(Vec<Insight>),
    Failed { fallback: Vec<Insight> },
}

impl InsightState {
    /// Insights to display, if the request has finished either way.
    pub fn items(&self) -> Option<&[Insight]> {
        match self {
            InsightState::Ready(items) | InsightState::Failed { fallback: items } => {
                Some(items.as_slice())
            }
            InsightState::NotRequested | InsightState::Pending => None,
        }
    }
}

/// What is shown when the model cannot be reached.
pub fn fallback() -> Vec<Insight> {
    vec![Insight {
        title: "Journey Through Time".to_owned(),
        content: "You are traveling through space and time on planet Earth at approximately \
                  67,000 miles per hour."
            .to_owned(),
        category: InsightCategory::Celestial,
    }]
}

#[derive(Clone)]
pub struct GeminiClient {
    api_key: Arc<String>,
    http: Arc<Client>,
    api_url: String,
    model: String,
}

impl GeminiClient {
    /// Build a client; fails when no API key is configured.
    pub fn new(config: &InsightsConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("GEMINI_API_KEY environment variable not set")?;
        Ok(Self {
            api_key: Arc::new(api_key),
            http: Arc::new(Client::new()),
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            model: config.model.clone(),
        })
    }

    /// `generateContent` with basic retry/backoff on 429 and 5xx.
    async fn generate(&self, body: &Value) -> Result<Value> {
        const MAX_RETRIES: usize = 4;
        let url = format!("{}/models/{}:generateContent", self.api_url, self.model);
        let mut attempt = 0usize;

        loop {
            attempt += 1;

            let resp = self
                .http
                .post(&url)
                .header("x-goog-api-key", &*self.api_key)
                .header("User-Agent", "lifeclock")
                .json(body)
                .send()
                .await
                .map_err(|e| anyhow::anyhow!("Network error sending insights request: {e}"))?;

            let status = resp.status();
            let headers = resp.headers().clone();

            if status.is_success() {
                return resp
                    .json()
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to parse JSON from Gemini: {e}"));
            }

            // If rate limited, honor Retry-After header when present
            if status.as_u16() == 429 && attempt < MAX_RETRIES {
                let wait_secs = headers
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(2);
                sleep(Duration::from_secs(wait_secs)).await;
                continue;
            }

            // Retry on 5xx server errors
            if status.is_server_error() && attempt < MAX_RETRIES {
                let backoff = Duration::from_millis(250u64.saturating_mul(1 << (attempt - 1)));
                sleep(backoff).await;
                continue;
            }

            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(anyhow::anyhow!(
                "Gemini returned HTTP {}: {text}",
                status.as_u16()
            ));
        }
    }

    /// Ask the model for three insights about `birth_date` at `age_years`.
    pub async fn birthday_insights(
        &self,
        birth_date: NaiveDate,
        age_years: u32,
    ) -> Result<Vec<Insight>> {
        let body = request_body(&build_prompt(birth_date, age_years));
        let json = self.generate(&body).await?;
        let text = extract_text(&json)?;
        parse_insights(&text)
    }
}

/// Run one request to completion. Never fails: errors become the fallback.
pub async fn fetch_insights(
    client: Option<&GeminiClient>,
    birth_date: NaiveDate,
    age_years: u32,
) -> InsightState {
    let Some(client) = client else {
        warn!("no insights credential configured, using fallback");
        return InsightState::Failed {
            fallback: fallback(),
        };
    };

    match client.birthday_insights(birth_date, age_years).await {
        Ok(items) => {
            info!(count = items.len(), "insights received");
            InsightState::Ready(items)
        }
        Err(e) => {
            warn!("insights request failed, using fallback: {e:#}");
            InsightState::Failed {
                fallback: fallback(),
            }
        }
    }
}

/// Start a request in the background and watch its state.
pub fn spawn_fetch(
    client: Option<GeminiClient>,
    birth_date: NaiveDate,
    age_years: u32,
) -> watch::Receiver<InsightState> {
    let (tx, rx) = watch::channel(InsightState::Pending);
    tokio::spawn(async move {
        let state = fetch_insights(client.as_ref(), birth_date, age_years).await;
        let _ = tx.send(state);
    });
    rx
}

fn build_prompt(birth_date: NaiveDate, age_years: u32) -> String {
    let formatted = birth_date.format("%B %-d, %Y");
    format!(
        "The user was born on {formatted} and is currently {age_years} years old.\n\
         Generate 3 distinct, interesting, and short insights about this specific birth date and age.\n\
         \n\
         1. A historical event that happened on this exact date (Month Day Year) or close to it.\n\
         2. A celestial/cosmic fact related to this time or age (e.g. \"You have orbited the sun X times\").\n\
         3. A motivational or philosophical milestone for this age group.\n\
         \n\
         Output strictly in JSON format matching the schema."
    )
}

fn request_body(prompt: &str) -> Value {
    serde_json::json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING" },
                        "content": { "type": "STRING" },
                        "category": {
                            "type": "STRING",
                            "enum": ["historical", "celestial", "milestone", "fun-fact"]
                        }
                    },
                    "required": ["title", "content", "category"]
                }
            }
        }
    })
}

/// Pull `candidates[0].content.parts[0].text` out of a response.
fn extract_text(json: &Value) -> Result<String> {
    json.get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .context("Gemini response missing candidates[0].content.parts[0].text")
}

fn parse_insights(text: &str) -> Result<Vec<Insight>> {
    let items: Vec<Insight> =
        serde_json::from_str(text.trim()).context("Failed to deserialize insights")?;
    if items.is_empty() {
        anyhow::bail!("Gemini returned no insights");
    }
    Ok(items)
}
