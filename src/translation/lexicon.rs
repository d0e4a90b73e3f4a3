use anyhow::Result;
use async_trait::async_trait;

use super::Translator;

/// Similarity floor for catching Latin brand spellings ("Elektra" vs
/// "electra") without swallowing ordinary words ("electric" scores ~0.75).
const BRAND_SIMILARITY: f64 = 0.85;

/// Hebrew prepositional prefixes that glue onto nouns ("במטבח" = "in the
/// kitchen"). One is stripped before a glossary retry.
const HEBREW_PREFIXES: &[char] = &['ב', 'ל', 'ה', 'מ', 'ו', 'כ', 'ש'];

/// Deterministic, offline translation strategy: strip known brand names,
/// substitute common repair vocabulary word by word, drop Hebrew words with
/// no glossary entry. Crude next to the model-backed strategy, but it never
/// fails and needs no credential.
pub struct LexiconTranslator {
    brands: Vec<String>,
    glossary: Vec<(String, String)>,
}

impl LexiconTranslator {
    pub fn new(brands: &[&str], glossary: &[(&str, &str)]) -> Self {
        Self {
            brands: brands.iter().map(|b| b.to_lowercase()).collect(),
            glossary: glossary
                .iter()
                .map(|(he, en)| (he.to_lowercase(), en.to_string()))
                .collect(),
        }
    }

    fn is_brand(&self, word: &str) -> bool {
        self.brands.iter().any(|brand| {
            if is_hebrew_word(brand) {
                word == brand
            } else {
                strsim::normalized_levenshtein(word, brand) >= BRAND_SIMILARITY
            }
        })
    }

    fn lookup(&self, word: &str) -> Option<&str> {
        let direct = self
            .glossary
            .iter()
            .find(|(he, _)| he == word)
            .map(|(_, en)| en.as_str());
        if direct.is_some() {
            return direct;
        }

        let mut chars = word.chars();
        let first = chars.next()?;
        if !HEBREW_PREFIXES.contains(&first) {
            return None;
        }
        let stripped = chars.as_str();
        self.glossary
            .iter()
            .find(|(he, _)| he == stripped)
            .map(|(_, en)| en.as_str())
    }
}

impl Default for LexiconTranslator {
    fn default() -> Self {
        Self::new(
            &[
                "אלקטרה", "תדיראן", "אמקור", "טורנדו",
                "electra", "tadiran", "amcor", "tornado",
            ],
            &[
                ("איך", "how to"),
                ("לתקן", "fix"),
                ("תיקון", "repair"),
                ("להחליף", "replace"),
                ("החלפה", "replacement"),
                ("לכוון", "set"),
                ("להשתמש", "use"),
                ("תכונת", "feature"),
                ("תכונה", "feature"),
                ("מזגן", "air conditioner"),
                ("שלט", "remote control"),
                ("ברז", "faucet"),
                ("מטבח", "kitchen"),
                ("מקלחת", "shower"),
                ("אמבטיה", "bathtub"),
                ("אסלה", "toilet"),
                ("כיור", "sink"),
                ("דלת", "door"),
                ("מנעול", "lock"),
                ("צילינדר", "cylinder"),
                ("מחסנית", "cartridge"),
                ("פלאפר", "flapper"),
                ("סתימה", "clogged drain"),
                ("מתג", "switch"),
                ("אור", "light"),
                ("סוללות", "batteries"),
                ("סוללה", "battery"),
                ("טיימר", "timer"),
                ("טורבו", "turbo"),
                ("מטפטף", "dripping"),
                ("דולף", "leaking"),
                ("דולפת", "leaking"),
                ("תקוע", "stuck"),
                ("עובד", "working"),
                ("לא", "not"),
                ("בעיה", "problem"),
                ("חשמל", "electrical"),
            ],
        )
    }
}

#[async_trait]
impl Translator for LexiconTranslator {
    async fn translate(&self, phrase: &str) -> Result<String> {
        let mut out: Vec<&str> = Vec::new();

        for token in phrase.split_whitespace() {
            let word = token
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if word.is_empty() || self.is_brand(&word) {
                continue;
            }
            if let Some(mapped) = self.lookup(&word) {
                out.push(mapped);
            } else if !is_hebrew_word(&word) {
                // Latin/technical tokens like "I-feel" pass through.
                out.push(token);
            }
        }

        Ok(out.join(" "))
    }
}

fn is_hebrew_word(word: &str) -> bool {
    word.chars().any(|c| ('\u{0590}'..='\u{05FF}').contains(&c))
}
