use anyhow::{Context, Result};
use serde::Deserialize;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Model used for both the vision diagnosis and the query translation.
pub const MODEL: &str = "claude-sonnet-4-20250514";

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Unknown,
}

/// Send a Messages API request and return the first text block of the reply.
pub async fn complete_text(
    client: &reqwest::Client,
    api_key: &str,
    body: &serde_json::Value,
) -> Result<String> {
    let response = client
        .post(API_URL)
        .header("x-api-key", api_key)
        .header("anthropic-version", API_VERSION)
        .header("content-type", "application/json")
        .json(body)
        .send()
        .await
        .context("Failed to send request to Anthropic API")?;

    let status = response.status();
    if !status.is_success() {
        let error_body = response.text().await.unwrap_or_default();
        anyhow::bail!("Anthropic API error ({}): {}", status, error_body);
    }

    let parsed: MessagesResponse = response
        .json()
        .await
        .context("Failed to parse Anthropic API response")?;

    parsed
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Unknown => None,
        })
        .context("Anthropic API response contained no text block")
}

/// Shared client shape for model calls: generous request timeout, bounded
/// connect timeout.
pub fn model_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(10))
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .context("Failed to build HTTP client")
}
