pub mod app;

use app::commands::{
    check_adb, export_diagnostics_bundle, get_config, list_devices, reset_config,
    save_app_config, send_media_key,
};
use app::logging::init_logging;
use app::state::AppState;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    init_logging();
    tauri::Builder::default()
        .manage(AppState::new())
        .invoke_handler(tauri::generate_handler![
            get_config,
            save_app_config,
            reset_config,
            check_adb,
            list_devices,
            send_media_key,
            export_diagnostics_bundle
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
