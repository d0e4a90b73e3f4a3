pub mod anthropic;
pub mod diagnosis;
pub mod language;
pub mod search;
pub mod transcript;
pub mod translation;
pub mod vision;

#[cfg(feature = "desktop")]
mod commands;

#[cfg(feature = "desktop")]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .invoke_handler(tauri::generate_handler![
            commands::check_api_keys,
            commands::start_diagnosis,
            commands::get_diagnosis_progress,
            commands::get_diagnosis_result,
            commands::cancel_diagnosis,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

#[cfg(not(feature = "desktop"))]
pub fn run() {}
