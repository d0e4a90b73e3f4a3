fn main() {
    // The tauri context is only generated for desktop shell builds.
    if std::env::var_os("CARGO_FEATURE_DESKTOP").is_some() {
        tauri_build::build();
    }
}
