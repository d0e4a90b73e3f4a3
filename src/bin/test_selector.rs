//! Quick test binary: runs ONLY the tutorial-video selection for a query.
//! Usage: cargo run --bin test_selector -- "איך להחליף מחסנית ברז במטבח"

use homefix_desktop_lib::diagnosis::lookup_api_key;
use homefix_desktop_lib::search::{SelectorConfig, VideoSelector, YouTubeSearch};
use homefix_desktop_lib::translation::{build_runtime_translator, TranslationProvider};

#[tokio::main]
async fn main() {
    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "איך להחליף מחסנית ברז במטבח".to_string());

    let youtube_key = lookup_api_key("YOUTUBE_API_KEY");
    let anthropic_key = lookup_api_key("ANTHROPIC_API_KEY");

    eprintln!(
        "Query: {query} (search key: {}, model key: {})",
        youtube_key.is_some(),
        anthropic_key.is_some(),
    );

    let search = youtube_key.map(|key| YouTubeSearch::new(key).expect("HTTP client"));
    let provider = TranslationProvider::from_str(
        &std::env::var("HOMEFIX_TRANSLATOR").unwrap_or_default(),
    );
    let translator =
        build_runtime_translator(provider, anthropic_key).expect("translator");
    eprintln!("Translator: {}", translator.description());

    let selector = VideoSelector::new(search, translator, SelectorConfig::default());

    let start = std::time::Instant::now();
    let result = selector.select(&query).await;
    eprintln!("Selected in {:.1}s", start.elapsed().as_secs_f64());

    println!("{}", serde_json::to_string_pretty(&result).unwrap());
}
