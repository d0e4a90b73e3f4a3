use serde::Serialize;

use crate::diagnosis::{self, ApiKeys, DiagnosisRequest, Progress};
use crate::vision::Diagnosis;

#[derive(Debug, Serialize)]
pub struct KeyStatus {
    pub vision_ready: bool,
    pub search_ready: bool,
}

/// Lets the UI warn about missing credentials before the first capture.
#[tauri::command]
pub fn check_api_keys() -> KeyStatus {
    KeyStatus {
        vision_ready: diagnosis::lookup_api_key("ANTHROPIC_API_KEY").is_some(),
        search_ready: diagnosis::lookup_api_key("YOUTUBE_API_KEY").is_some(),
    }
}

#[tauri::command]
pub fn start_diagnosis(request: DiagnosisRequest) -> Result<String, String> {
    let keys = ApiKeys::from_env().map_err(|e| e.to_string())?;
    Ok(diagnosis::start_diagnosis(request, keys))
}

#[tauri::command]
pub fn get_diagnosis_progress(job_id: String) -> Result<Progress, String> {
    diagnosis::get_progress(&job_id).ok_or_else(|| "Job not found".to_string())
}

#[tauri::command]
pub fn get_diagnosis_result(job_id: String) -> Result<Diagnosis, String> {
    diagnosis::get_result(&job_id).ok_or_else(|| "Result not found".to_string())
}

#[tauri::command]
pub fn cancel_diagnosis(job_id: String) -> Result<(), String> {
    diagnosis::cancel_diagnosis(&job_id);
    Ok(())
}
