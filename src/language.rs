use regex::Regex;

/// Search-language settings for one leg of the video lookup: how to ask the
/// search API, which script native titles are written in, and which title
/// keywords mark a video as a tutorial.
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    pub relevance_language: String,
    pub region_code: Option<String>,
    script: Option<Regex>,
    tutorial_keywords: Vec<String>,
}

impl LanguageProfile {
    pub fn new(
        relevance_language: &str,
        region_code: Option<&str>,
        script_class: Option<&str>,
        tutorial_keywords: &[&str],
    ) -> Self {
        Self {
            relevance_language: relevance_language.to_string(),
            region_code: region_code.map(str::to_string),
            // Script classes are fixed patterns, never user input.
            script: script_class.map(|class| Regex::new(class).unwrap()),
            tutorial_keywords: tutorial_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
        }
    }

    /// Hebrew search leg: Israeli region, Hebrew-script titles only.
    pub fn hebrew() -> Self {
        Self::new(
            "he",
            Some("IL"),
            Some(r"[\u{0590}-\u{05FF}]"),
            &["איך", "תיקון", "הדרכה", "למתחילים", "החלפה", "בעצמך"],
        )
    }

    /// English fallback leg: no region restriction, no script filter.
    pub fn english() -> Self {
        Self::new(
            "en",
            None,
            None,
            &["how to", "fix", "repair", "replace", "tutorial", "guide"],
        )
    }

    /// Whether a title is written (at least partly) in this language's
    /// script. Profiles without a script filter accept every title.
    pub fn title_in_script(&self, title: &str) -> bool {
        match &self.script {
            Some(script) => script.is_match(title),
            None => true,
        }
    }

    pub fn has_tutorial_keyword(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.tutorial_keywords.iter().any(|k| title.contains(k))
    }

    /// Remove every character of this language's script, the deterministic
    /// last-resort translation when no translator is reachable.
    pub fn strip_script(&self, text: &str) -> String {
        match &self.script {
            Some(script) => script.replace_all(text, "").trim().to_string(),
            None => text.trim().to_string(),
        }
    }
}

/// A named device feature with its spelled variants in both scripts.
/// "אייפיל" is how Hebrew speech recognition renders "I-feel".
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: String,
    aliases: Vec<String>,
}

impl Feature {
    pub fn new(name: &str, aliases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_lowercase()).collect(),
        }
    }

    pub fn mentioned_in(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.aliases.iter().any(|alias| text.contains(alias))
    }
}

/// The finite set of device features a search phrase can name. A query about
/// a specific feature must never resolve to a generic video about the parent
/// device, so the selector gates candidates through this lexicon.
#[derive(Debug, Clone)]
pub struct FeatureLexicon {
    features: Vec<Feature>,
}

impl FeatureLexicon {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// First feature whose alias appears in the text, if any.
    pub fn detect(&self, text: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.mentioned_in(text))
    }
}

impl Default for FeatureLexicon {
    fn default() -> Self {
        Self::new(vec![
            Feature::new("i-feel", &["i-feel", "אייפיל"]),
            Feature::new("timer", &["timer", "טיימר"]),
            Feature::new("turbo", &["turbo", "טורבו"]),
        ])
    }
}
