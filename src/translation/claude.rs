use anyhow::{Context, Result};
use async_trait::async_trait;

use super::Translator;
use crate::anthropic;

/// Instruction set for turning a Hebrew YouTube query into an English one.
/// Israeli appliance brands have no English tutorial coverage, so brand names
/// must not survive translation.
const TRANSLATE_PROMPT: &str = r#"Translate this Hebrew YouTube search query to English for finding tutorial videos.

CRITICAL RULES:
1. Remove ALL brand names (Electra/אלקטרה, Tadiran/תדיראן, Amcor/אמקור, Tornado/טורנדו, etc.)
2. Keep it generic - Israeli brands won't have English videos
3. Focus on the device type and problem, not the brand
4. Be VERY SPECIFIC - use exact technical terms like "remote control", "AC remote"
5. For FEATURES (I-feel, timer, turbo), search "how to use" NOT "how to fix"
6. For broken remotes, search "how to fix" or "troubleshoot"

Examples:
"איך להשתמש בתכונת I-feel במזגן" → "how to use AC i-feel function"
"איך לתקן תכונת I-feel בשלט מזגן" → "how to use AC remote i-feel feature"
"איך לכוון טיימר במזגן" → "how to set AC timer"
"שלט מזגן לא עובד" → "AC remote not working troubleshoot"
"איך להחליף סוללות שלט מזגן" → "how to replace AC remote batteries""#;

/// Model-backed translation, the higher-fidelity strategy.
pub struct ClaudeTranslator {
    client: reqwest::Client,
    api_key: String,
}

impl ClaudeTranslator {
    pub fn new(api_key: String) -> Result<Self> {
        Ok(Self {
            client: anthropic::model_client()?,
            api_key,
        })
    }
}

#[async_trait]
impl Translator for ClaudeTranslator {
    async fn translate(&self, phrase: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": anthropic::MODEL,
            "max_tokens": 100,
            "messages": [{
                "role": "user",
                "content": format!(
                    "{}\n\nHebrew query: {}\n\nEnglish translation:",
                    TRANSLATE_PROMPT, phrase
                )
            }]
        });

        let translated = anthropic::complete_text(&self.client, &self.api_key, &body)
            .await
            .context("Translation request failed")?;

        Ok(translated.trim().to_string())
    }
}
