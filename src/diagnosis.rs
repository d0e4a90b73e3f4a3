use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::anthropic;
use crate::search::{SelectorConfig, TutorialVideo, VideoSelector, YouTubeSearch};
use crate::transcript;
use crate::translation::{build_runtime_translator, TranslationProvider};
use crate::vision::{self, Diagnosis};

/// Input problems rejected before any network call is made.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("No image provided")]
    MissingImage,
    #[error("Anthropic API key not found. Please set ANTHROPIC_API_KEY.")]
    MissingModelKey,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosisRequest {
    /// Photo of the problem, as a data URL or bare base64.
    pub image: String,
    /// Raw speech-recognition transcript, if the user dictated one.
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiKeys {
    pub anthropic: String,
    pub youtube: Option<String>,
}

impl ApiKeys {
    /// Resolve keys from the environment. The vision key is required; the
    /// search key is optional and its absence selects the degraded
    /// search-link mode.
    pub fn from_env() -> Result<Self, RequestError> {
        let anthropic = lookup_api_key("ANTHROPIC_API_KEY").ok_or(RequestError::MissingModelKey)?;
        Ok(Self {
            anthropic,
            youtube: lookup_api_key("YOUTUBE_API_KEY"),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progress {
    pub stage: String,
    pub progress: f64,
}

#[derive(Debug)]
struct DiagnosisJob {
    #[allow(dead_code)]
    id: String,
    progress: Progress,
    result: Option<Diagnosis>,
    canceled: bool,
}

static JOBS: Lazy<Arc<Mutex<HashMap<String, DiagnosisJob>>>> =
    Lazy::new(|| Arc::new(Mutex::new(HashMap::new())));

/// Queue a diagnosis and return its job id. Progress and the result are
/// polled via [`get_progress`] / [`get_result`].
pub fn start_diagnosis(request: DiagnosisRequest, keys: ApiKeys) -> String {
    let job_id = Uuid::new_v4().to_string();

    let job = DiagnosisJob {
        id: job_id.clone(),
        progress: Progress {
            stage: "analyzing".to_string(),
            progress: 0.0,
        },
        result: None,
        canceled: false,
    };
    JOBS.lock().unwrap().insert(job_id.clone(), job);

    let job_id_clone = job_id.clone();
    spawn(async move {
        match run_diagnosis(&job_id_clone, request, keys).await {
            Ok(Some(diagnosis)) => {
                if let Some(job) = JOBS.lock().unwrap().get_mut(&job_id_clone) {
                    job.result = Some(diagnosis);
                    job.progress = Progress {
                        stage: "done".to_string(),
                        progress: 1.0,
                    };
                }
            }
            Ok(None) => {
                set_stage(&job_id_clone, "canceled", 1.0);
            }
            Err(e) => {
                eprintln!("Diagnosis error: {e:?}");
                set_stage(&job_id_clone, "error", 1.0);
            }
        }
    });

    job_id
}

#[cfg(feature = "desktop")]
fn spawn<F>(future: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tauri::async_runtime::spawn(future);
}

#[cfg(not(feature = "desktop"))]
fn spawn<F>(future: F)
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tokio::spawn(future);
}

pub fn get_progress(job_id: &str) -> Option<Progress> {
    JOBS.lock()
        .unwrap()
        .get(job_id)
        .map(|job| job.progress.clone())
}

pub fn get_result(job_id: &str) -> Option<Diagnosis> {
    JOBS.lock()
        .unwrap()
        .get(job_id)
        .and_then(|job| job.result.clone())
}

pub fn cancel_diagnosis(job_id: &str) {
    if let Some(job) = JOBS.lock().unwrap().get_mut(job_id) {
        job.canceled = true;
    }
}

fn is_canceled(job_id: &str) -> bool {
    JOBS.lock()
        .unwrap()
        .get(job_id)
        .map(|job| job.canceled)
        .unwrap_or(true)
}

fn set_stage(job_id: &str, stage: &str, progress: f64) {
    if let Some(job) = JOBS.lock().unwrap().get_mut(job_id) {
        job.progress = Progress {
            stage: stage.to_string(),
            progress,
        };
    }
}

/// The diagnosis pipeline: normalize the transcript, ask the vision model,
/// then resolve the tutorial video. `Ok(None)` means the job was canceled
/// between steps.
async fn run_diagnosis(
    job_id: &str,
    request: DiagnosisRequest,
    keys: ApiKeys,
) -> Result<Option<Diagnosis>> {
    if request.image.trim().is_empty() {
        return Err(RequestError::MissingImage.into());
    }

    let image = vision::prepare_image(&request.image);

    let description = transcript::clean_voice_transcript(request.description.as_deref());
    if let (Some(raw), Some(cleaned)) = (request.description.as_deref(), description.as_deref()) {
        eprintln!(
            "Voice cleaned: {} words -> {} words",
            transcript::word_count(raw),
            transcript::word_count(cleaned),
        );
    }

    set_stage(job_id, "diagnosing", 0.2);
    let client = anthropic::model_client()?;
    let mut diagnosis =
        vision::diagnose_image(&client, &image, description.as_deref(), &keys.anthropic)
            .await
            .context("Vision diagnosis failed")?;

    if is_canceled(job_id) {
        return Ok(None);
    }

    // One tutorial video for the whole repair; the search query never leaves
    // the backend.
    if let Some(query) = diagnosis.video_search_query.take() {
        set_stage(job_id, "searching_video", 0.7);
        diagnosis.tutorial_video = Some(select_tutorial_video(&query, &keys).await?);
    }

    if is_canceled(job_id) {
        return Ok(None);
    }

    Ok(Some(diagnosis))
}

async fn select_tutorial_video(query: &str, keys: &ApiKeys) -> Result<TutorialVideo> {
    let search = match &keys.youtube {
        Some(key) => Some(YouTubeSearch::new(key.clone())?),
        None => None,
    };
    let translator = build_runtime_translator(
        TranslationProvider::Claude,
        Some(keys.anthropic.clone()),
    )?;
    let selector = VideoSelector::new(search, translator, SelectorConfig::default());
    Ok(selector.select(query).await)
}

/// Look up an API key: process environment first, then a `.env` next to the
/// working directory, then the user config dir.
pub fn lookup_api_key(name: &str) -> Option<String> {
    if let Ok(value) = std::env::var(name) {
        let value = value.trim().trim_matches('"').to_string();
        if !value.is_empty() {
            return Some(value);
        }
    }

    for path in env_file_candidates() {
        if let Ok(contents) = std::fs::read_to_string(&path) {
            for line in contents.lines() {
                if let Some(value) = parse_env_line(line, name) {
                    return Some(value);
                }
            }
        }
    }

    None
}

fn env_file_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(".env")];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("homefix").join(".env"));
    }
    candidates
}

fn parse_env_line(line: &str, name: &str) -> Option<String> {
    let line = line.trim();
    let value = line.strip_prefix(name)?.strip_prefix('=')?;
    let value = value.trim().trim_matches('"');
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_env_lines() {
        assert_eq!(
            parse_env_line("YOUTUBE_API_KEY=abc123", "YOUTUBE_API_KEY").as_deref(),
            Some("abc123"),
        );
        assert_eq!(
            parse_env_line("  YOUTUBE_API_KEY=\"quoted\"  ", "YOUTUBE_API_KEY").as_deref(),
            Some("quoted"),
        );
        assert_eq!(parse_env_line("YOUTUBE_API_KEY=", "YOUTUBE_API_KEY"), None);
        assert_eq!(parse_env_line("OTHER_KEY=abc", "YOUTUBE_API_KEY"), None);
    }

    #[test]
    fn job_registry_round_trip() {
        let job_id = Uuid::new_v4().to_string();
        JOBS.lock().unwrap().insert(
            job_id.clone(),
            DiagnosisJob {
                id: job_id.clone(),
                progress: Progress {
                    stage: "analyzing".to_string(),
                    progress: 0.0,
                },
                result: None,
                canceled: false,
            },
        );

        assert_eq!(get_progress(&job_id).unwrap().stage, "analyzing");
        assert!(!is_canceled(&job_id));

        cancel_diagnosis(&job_id);
        assert!(is_canceled(&job_id));

        set_stage(&job_id, "canceled", 1.0);
        assert_eq!(get_progress(&job_id).unwrap().stage, "canceled");
        assert!(get_result(&job_id).is_none());
    }

    #[test]
    fn unknown_jobs_read_as_canceled() {
        assert!(is_canceled("no-such-job"));
        assert!(get_progress("no-such-job").is_none());
        assert!(get_result("no-such-job").is_none());
    }

    #[tokio::test]
    async fn missing_image_is_rejected_before_any_network_call() {
        let request = DiagnosisRequest {
            image: "   ".to_string(),
            description: None,
        };
        let keys = ApiKeys {
            anthropic: "test-key".to_string(),
            youtube: None,
        };
        let err = run_diagnosis("no-such-job", request, keys)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No image provided"));
    }
}
