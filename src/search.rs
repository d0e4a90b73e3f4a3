use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::language::{FeatureLexicon, LanguageProfile};
use crate::translation::Translator;

const SEARCH_ENDPOINT: &str = "https://www.googleapis.com/youtube/v3/search";
const WATCH_URL: &str = "https://www.youtube.com/watch";
const RESULTS_URL: &str = "https://www.youtube.com/results";

/// Candidate list bound per search leg.
const MAX_RESULTS: u32 = 15;

const NO_MATCH_MESSAGE: &str =
    "לא נמצא סרטון הדרכה ספציפי לבעיה זו. מומלץ לחפש ביוטיוב באנגלית או להתייעץ עם בעל מקצוע.";

/// One ranked search result, kept only for the duration of the request.
#[derive(Debug, Clone)]
pub struct VideoCandidate {
    pub id: String,
    pub title: String,
}

/// Outcome of the tutorial-video lookup, serialized to the wire shapes the
/// result view renders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TutorialVideo {
    Found {
        #[serde(rename = "videoId")]
        video_id: String,
        title: String,
        #[serde(rename = "searchUrl")]
        search_url: String,
    },
    NoMatch {
        #[serde(rename = "noVideo")]
        no_video: bool,
        message: String,
        #[serde(rename = "searchQuery")]
        search_query: String,
    },
    SearchLink {
        #[serde(rename = "searchUrl")]
        search_url: String,
        #[serde(rename = "searchQuery")]
        search_query: String,
    },
}

impl TutorialVideo {
    fn watch(candidate: &VideoCandidate) -> Self {
        TutorialVideo::Found {
            video_id: candidate.id.clone(),
            title: candidate.title.clone(),
            search_url: format!("{}?v={}", WATCH_URL, candidate.id),
        }
    }

    /// Degraded mode when no search credential is configured: hand the user
    /// a plain search-results link for the untouched query.
    pub fn search_link(query: &str) -> Self {
        let url = reqwest::Url::parse_with_params(RESULTS_URL, &[("search_query", query)])
            .expect("static base URL");
        TutorialVideo::SearchLink {
            search_url: url.to_string(),
            search_query: query.to_string(),
        }
    }

    fn no_match(query: &str) -> Self {
        TutorialVideo::NoMatch {
            no_video: true,
            message: NO_MATCH_MESSAGE.to_string(),
            search_query: query.to_string(),
        }
    }
}

/// Ranked video search for one language leg. Abstracted so the selection
/// pipeline can be driven by stub providers in tests.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        phrase: &str,
        language: &LanguageProfile,
    ) -> Result<Vec<VideoCandidate>>;
}

/// YouTube Data API v3 search client.
pub struct YouTubeSearch {
    client: reqwest::Client,
    api_key: String,
}

impl YouTubeSearch {
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, api_key })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: SearchSnippet,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId", default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchSnippet {
    #[serde(default)]
    title: String,
}

#[async_trait]
impl SearchProvider for YouTubeSearch {
    async fn search(
        &self,
        phrase: &str,
        language: &LanguageProfile,
    ) -> Result<Vec<VideoCandidate>> {
        let max_results = MAX_RESULTS.to_string();
        let mut params = vec![
            ("part", "snippet"),
            ("q", phrase),
            ("type", "video"),
            ("maxResults", max_results.as_str()),
            ("key", self.api_key.as_str()),
            ("relevanceLanguage", language.relevance_language.as_str()),
            ("safeSearch", "strict"),
            ("order", "relevance"),
            ("videoDuration", "medium"),
        ];
        if let Some(region) = &language.region_code {
            params.push(("regionCode", region.as_str()));
        }

        let response = self
            .client
            .get(SEARCH_ENDPOINT)
            .query(&params)
            .send()
            .await
            .context("Failed to send YouTube search request")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("YouTube search error ({}): {}", status, error_body);
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .context("Failed to parse YouTube search response")?;

        Ok(parsed
            .items
            .into_iter()
            .filter_map(|item| {
                item.id.video_id.map(|id| VideoCandidate {
                    id,
                    title: item.snippet.title,
                })
            })
            .collect())
    }
}

/// Keyword/script/feature configuration for both search legs. Passed in at
/// construction so tests and other language pairs can substitute their own
/// lists.
pub struct SelectorConfig {
    pub primary: LanguageProfile,
    pub secondary: LanguageProfile,
    pub features: FeatureLexicon,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            primary: LanguageProfile::hebrew(),
            secondary: LanguageProfile::english(),
            features: FeatureLexicon::default(),
        }
    }
}

/// Picks at most one tutorial video for a search phrase: primary-language
/// search with script and feature gating, then a translated
/// secondary-language fallback, then a terminal no-match sentinel. Search or
/// translation failures never escape; they degrade the pipeline to its next
/// stage.
pub struct VideoSelector<S, T> {
    search: Option<S>,
    translator: T,
    config: SelectorConfig,
}

impl<S: SearchProvider, T: Translator> VideoSelector<S, T> {
    /// `search: None` means no credential is configured; selection then
    /// degrades to a direct search-results link.
    pub fn new(search: Option<S>, translator: T, config: SelectorConfig) -> Self {
        Self {
            search,
            translator,
            config,
        }
    }

    pub async fn select(&self, phrase: &str) -> TutorialVideo {
        let Some(search) = &self.search else {
            eprintln!("Video search credential not configured, using search URL fallback");
            return TutorialVideo::search_link(phrase);
        };

        if let Some(video) = self.primary_pass(search, phrase).await {
            return video;
        }
        self.secondary_pass(search, phrase).await
    }

    /// Primary-language leg. `None` falls through to the secondary leg; a
    /// returned video ends the pipeline.
    async fn primary_pass(&self, search: &S, phrase: &str) -> Option<TutorialVideo> {
        let candidates = match search.search(phrase, &self.config.primary).await {
            Ok(candidates) => candidates,
            Err(e) => {
                eprintln!("Primary-language search failed: {e:#}");
                Vec::new()
            }
        };
        eprintln!("Primary search: {} results", candidates.len());

        let native: Vec<&VideoCandidate> = candidates
            .iter()
            .filter(|c| self.config.primary.title_in_script(&c.title))
            .collect();
        eprintln!("Primary search: {} native-script titles", native.len());

        if native.is_empty() {
            return None;
        }

        if let Some(feature) = self.config.features.detect(phrase) {
            // Strict relevance gate: a feature-specific request must never
            // resolve to a generic video about the parent device.
            let relevant = native.iter().find(|c| feature.mentioned_in(&c.title));
            match relevant {
                Some(candidate) => {
                    eprintln!("Selected native video for feature {}: {}", feature.name, candidate.title);
                    Some(TutorialVideo::watch(candidate))
                }
                None => {
                    eprintln!(
                        "No native video mentions feature {}, falling back to secondary language",
                        feature.name
                    );
                    None
                }
            }
        } else {
            let best = native
                .iter()
                .find(|c| self.config.primary.has_tutorial_keyword(&c.title))
                .unwrap_or(&native[0]);
            eprintln!("Selected native video: {}", best.title);
            Some(TutorialVideo::watch(best))
        }
    }

    /// Secondary-language leg: translate, search again, keyword-pick, or end
    /// on the terminal sentinel. Always carries the original query phrase.
    async fn secondary_pass(&self, search: &S, phrase: &str) -> TutorialVideo {
        let translated = match self.translator.translate(phrase).await {
            Ok(t) if !t.trim().is_empty() => t,
            Ok(_) => self.config.primary.strip_script(phrase),
            Err(e) => {
                eprintln!("Translation failed, stripping primary script: {e:#}");
                self.config.primary.strip_script(phrase)
            }
        };

        if translated.trim().is_empty() {
            return TutorialVideo::no_match(phrase);
        }
        eprintln!("Secondary search query: {translated}");

        let candidates = match search.search(&translated, &self.config.secondary).await {
            Ok(candidates) => candidates,
            Err(e) => {
                eprintln!("Secondary-language search failed: {e:#}");
                Vec::new()
            }
        };
        eprintln!("Secondary search: {} results", candidates.len());

        if candidates.is_empty() {
            return TutorialVideo::no_match(phrase);
        }

        let best = candidates
            .iter()
            .find(|c| self.config.secondary.has_tutorial_keyword(&c.title))
            .unwrap_or(&candidates[0]);
        eprintln!("Selected secondary-language video: {}", best.title);
        TutorialVideo::watch(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, title: &str) -> VideoCandidate {
        VideoCandidate {
            id: id.to_string(),
            title: title.to_string(),
        }
    }

    /// Stub provider answering each leg from a fixed list, keyed off the
    /// profile's relevance language.
    struct StubSearch {
        primary: Vec<VideoCandidate>,
        secondary: Vec<VideoCandidate>,
    }

    #[async_trait]
    impl SearchProvider for StubSearch {
        async fn search(
            &self,
            _phrase: &str,
            language: &LanguageProfile,
        ) -> Result<Vec<VideoCandidate>> {
            if language.relevance_language == "he" {
                Ok(self.primary.clone())
            } else {
                Ok(self.secondary.clone())
            }
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchProvider for FailingSearch {
        async fn search(
            &self,
            _phrase: &str,
            _language: &LanguageProfile,
        ) -> Result<Vec<VideoCandidate>> {
            anyhow::bail!("simulated network error")
        }
    }

    struct StubTranslator(&'static str);

    #[async_trait]
    impl Translator for StubTranslator {
        async fn translate(&self, _phrase: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingTranslator;

    #[async_trait]
    impl Translator for FailingTranslator {
        async fn translate(&self, _phrase: &str) -> Result<String> {
            anyhow::bail!("simulated translation outage")
        }
    }

    fn selector<S: SearchProvider>(
        search: Option<S>,
    ) -> VideoSelector<S, StubTranslator> {
        VideoSelector::new(
            search,
            StubTranslator("how to fix it"),
            SelectorConfig::default(),
        )
    }

    fn video_id(video: &TutorialVideo) -> Option<&str> {
        match video {
            TutorialVideo::Found { video_id, .. } => Some(video_id),
            _ => None,
        }
    }

    #[tokio::test]
    async fn picks_first_native_candidate_with_tutorial_keyword() {
        let search = StubSearch {
            primary: vec![
                candidate("v1", "סיור בדירה החדשה שלי"),
                candidate("v2", "איך להחליף מחסנית ברז במטבח"),
                candidate("v3", "הדרכה מלאה: החלפת מחסנית ברז"),
            ],
            secondary: vec![],
        };
        let result = selector(Some(search)).select("איך להחליף מחסנית ברז").await;
        assert_eq!(video_id(&result), Some("v2"));
    }

    #[tokio::test]
    async fn falls_back_to_top_ranked_when_no_keyword_matches() {
        let search = StubSearch {
            primary: vec![
                candidate("v1", "ברז חדש במטבח שלנו"),
                candidate("v2", "מחסנית ברז - סקירה"),
            ],
            secondary: vec![candidate("e1", "How to replace a faucet cartridge")],
        };
        let result = selector(Some(search)).select("החלפת מחסנית ברז").await;
        // Native candidates exist and no feature is named, so the top-ranked
        // native video wins and the secondary leg is never consulted.
        assert_eq!(video_id(&result), Some("v1"));
    }

    #[tokio::test]
    async fn script_filter_skips_foreign_titles() {
        let search = StubSearch {
            primary: vec![
                candidate("v1", "How to fix a dripping faucet"),
                candidate("v2", "Faucet cartridge replacement guide"),
            ],
            secondary: vec![candidate("e1", "How to replace a faucet cartridge")],
        };
        let result = selector(Some(search)).select("איך לתקן ברז מטפטף").await;
        assert_eq!(video_id(&result), Some("e1"));
    }

    #[tokio::test]
    async fn feature_query_requires_feature_in_title() {
        let search = StubSearch {
            primary: vec![
                candidate("v1", "איך לתקן שלט מזגן"),
                candidate("v2", "הדרכה לשלט מזגן אלקטרה"),
            ],
            secondary: vec![candidate("e1", "How to set the AC timer")],
        };
        let result = selector(Some(search)).select("איך לכוון טיימר במזגן").await;
        // Generic remote videos must not satisfy a timer-specific query.
        assert_eq!(video_id(&result), Some("e1"));
    }

    #[tokio::test]
    async fn feature_query_accepts_native_video_naming_the_feature() {
        let search = StubSearch {
            primary: vec![
                candidate("v1", "איך לתקן שלט מזגן"),
                candidate("v2", "כיוון טיימר במזגן - הדרכה"),
            ],
            secondary: vec![],
        };
        let result = selector(Some(search)).select("איך לכוון טיימר במזגן").await;
        assert_eq!(video_id(&result), Some("v2"));
    }

    #[tokio::test]
    async fn feature_gate_ignores_other_features() {
        let search = StubSearch {
            primary: vec![candidate("v1", "מצב טורבו במזגן - הסבר")],
            secondary: vec![candidate("e1", "How to set the AC timer")],
        };
        let result = selector(Some(search)).select("איך לכוון טיימר במזגן").await;
        assert_eq!(video_id(&result), Some("e1"));
    }

    #[tokio::test]
    async fn secondary_leg_prefers_tutorial_keywords_in_rank_order() {
        let search = StubSearch {
            primary: vec![],
            secondary: vec![
                candidate("e1", "My smart AC setup tour"),
                candidate("e2", "How to set the AC timer"),
                candidate("e3", "AC timer repair guide"),
            ],
        };
        let result = selector(Some(search)).select("איך לכוון טיימר במזגן").await;
        assert_eq!(video_id(&result), Some("e2"));
    }

    #[tokio::test]
    async fn search_failures_degrade_to_no_match() {
        let result = selector(Some(FailingSearch))
            .select("איך לתקן ברז מטפטף")
            .await;
        assert_eq!(
            result,
            TutorialVideo::NoMatch {
                no_video: true,
                message: NO_MATCH_MESSAGE.to_string(),
                search_query: "איך לתקן ברז מטפטף".to_string(),
            },
        );
    }

    #[tokio::test]
    async fn translation_failure_falls_back_to_script_strip() {
        let search = StubSearch {
            primary: vec![],
            secondary: vec![candidate("e1", "How to use the AC I-feel function")],
        };
        let selector = VideoSelector::new(
            Some(search),
            FailingTranslator,
            SelectorConfig::default(),
        );
        // After stripping Hebrew, "I-feel" is all that remains of the query,
        // which is still enough to search on.
        let result = selector.select("איך להשתמש בתכונת I-feel במזגן").await;
        assert_eq!(video_id(&result), Some("e1"));
    }

    #[tokio::test]
    async fn fully_native_query_with_failed_translation_ends_in_no_match() {
        let search = StubSearch {
            primary: vec![],
            secondary: vec![candidate("e1", "How to fix a faucet")],
        };
        let selector = VideoSelector::new(
            Some(search),
            FailingTranslator,
            SelectorConfig::default(),
        );
        let result = selector.select("איך לתקן ברז מטפטף").await;
        assert!(matches!(result, TutorialVideo::NoMatch { .. }));
    }

    #[tokio::test]
    async fn missing_credential_returns_search_link_with_original_query() {
        let selector = selector::<StubSearch>(None);
        let result = selector.select("איך להחליף צילינדר מנעול").await;
        match result {
            TutorialVideo::SearchLink {
                search_url,
                search_query,
            } => {
                assert_eq!(search_query, "איך להחליף צילינדר מנעול");
                assert!(search_url.starts_with("https://www.youtube.com/results?search_query="));
                assert!(search_url.contains("%D7%90%D7%99%D7%9A"));
            }
            other => panic!("expected search link, got {other:?}"),
        }
    }

    #[test]
    fn wire_format_matches_client_expectations() {
        let found = TutorialVideo::watch(&candidate("abc123", "איך לתקן"));
        let json = serde_json::to_value(&found).unwrap();
        assert_eq!(json["videoId"], "abc123");
        assert_eq!(json["searchUrl"], "https://www.youtube.com/watch?v=abc123");

        let sentinel = TutorialVideo::no_match("שאילתה");
        let json = serde_json::to_value(&sentinel).unwrap();
        assert_eq!(json["noVideo"], true);
        assert_eq!(json["searchQuery"], "שאילתה");
    }
}
