mod claude;
mod lexicon;

pub use claude::ClaudeTranslator;
pub use lexicon::LexiconTranslator;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Turns a primary-language search phrase into a secondary-language one.
/// Implementations may call out to a model or stay fully local; the selector
/// treats any error as "use the deterministic script-strip fallback".
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, phrase: &str) -> Result<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TranslationProvider {
    Claude,
    Lexicon,
}

impl TranslationProvider {
    pub fn from_str(s: &str) -> Self {
        match s {
            "lexicon" => TranslationProvider::Lexicon,
            _ => TranslationProvider::Claude,
        }
    }

    pub fn api_key_name(&self) -> Option<&'static str> {
        match self {
            TranslationProvider::Claude => Some("ANTHROPIC_API_KEY"),
            TranslationProvider::Lexicon => None,
        }
    }
}

/// Concrete translator picked at runtime. Without a model API key the
/// Claude strategy is unusable, so construction degrades to the lexicon.
pub enum RuntimeTranslator {
    Claude(ClaudeTranslator),
    Lexicon(LexiconTranslator),
}

impl RuntimeTranslator {
    pub fn description(&self) -> &'static str {
        match self {
            RuntimeTranslator::Claude(_) => "model-backed translation",
            RuntimeTranslator::Lexicon(_) => "static lexicon translation",
        }
    }
}

#[async_trait]
impl Translator for RuntimeTranslator {
    async fn translate(&self, phrase: &str) -> Result<String> {
        match self {
            RuntimeTranslator::Claude(t) => t.translate(phrase).await,
            RuntimeTranslator::Lexicon(t) => t.translate(phrase).await,
        }
    }
}

pub fn build_runtime_translator(
    provider: TranslationProvider,
    api_key: Option<String>,
) -> Result<RuntimeTranslator> {
    match (provider, api_key) {
        (TranslationProvider::Claude, Some(key)) => {
            Ok(RuntimeTranslator::Claude(ClaudeTranslator::new(key)?))
        }
        _ => Ok(RuntimeTranslator::Lexicon(LexiconTranslator::default())),
    }
}
