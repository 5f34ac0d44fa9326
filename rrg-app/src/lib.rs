mod config;
mod location;
mod state;
mod ui;

use log::LevelFilter;
use rrg_location::{Fix, LocationRequestConfig, REQUEST_CHECK_SETTINGS};
use tauri::{AppHandle, Manager, State, WindowEvent};
use tauri_specta::{ErrorHandlingMode, collect_commands, collect_events};

use std::result::Result as StdResult;

use crate::{
    config::write_config_to_store,
    state::{HelperHandle, create_helper, helper_loop},
    ui::{CloseScreen, ProgressUpdate, SearchTextUpdate, Toast},
};

type Result<T = (), E = String> = StdResult<T, E>;

// == LOCATION COMMANDS ==

#[tauri::command]
#[specta::specta]
/// Get the last accepted location, `null` if there isn't one yet
async fn get_location(helper: State<'_, HelperHandle>) -> Result<Option<Fix>> {
    Ok(helper.get_location().await)
}

#[tauri::command]
#[specta::specta]
/// Whether the user is searching around their current location
async fn uses_gps(helper: State<'_, HelperHandle>) -> Result<bool> {
    Ok(helper.uses_gps().await)
}

#[tauri::command]
#[specta::specta]
/// Start getting the user's location. Progress is reported with [ProgressUpdate], [Toast], and
/// [SearchTextUpdate] events
async fn start_location_updates(helper: State<'_, HelperHandle>) -> Result {
    helper.start_location_updates().await;
    Ok(())
}

#[tauri::command]
#[specta::specta]
/// Stop getting location updates, call when the screen is hidden. Keeps the current location
async fn pause_location_updates(helper: State<'_, HelperHandle>) -> Result {
    helper.pause_and_save_location_updates().await;
    Ok(())
}

#[tauri::command]
#[specta::specta]
/// Forget the current location and stop getting updates, call when the user edits the search
/// box
async fn dismiss_location_updater(helper: State<'_, HelperHandle>) -> Result {
    helper.dismiss_location_updater().await;
    Ok(())
}

#[tauri::command]
#[specta::specta]
/// The user cancelled getting their location from the progress indicator
async fn cancel_location(helper: State<'_, HelperHandle>) -> Result {
    helper.cancel().await;
    Ok(())
}

#[tauri::command]
#[specta::specta]
/// The user finished a settings prompt shown by the frontend, acquisition restarts if they
/// fixed their settings
async fn settings_resolved(resolved: bool, helper: State<'_, HelperHandle>) -> Result {
    helper
        .on_settings_resolution_result(REQUEST_CHECK_SETTINGS, resolved)
        .await;
    Ok(())
}

// == CONFIG COMMANDS ==

#[tauri::command]
#[specta::specta]
/// Get how location is requested
async fn get_location_config(helper: State<'_, HelperHandle>) -> Result<LocationRequestConfig> {
    Ok(helper.clone_config().await)
}

#[tauri::command]
#[specta::specta]
/// Change how location is requested and persist it, takes effect on the next
/// `start_location_updates`
async fn update_location_config(
    config: LocationRequestConfig,
    app: AppHandle,
    helper: State<'_, HelperHandle>,
) -> Result {
    if config.accuracy_threshold_meters <= 0.0 {
        return Err("Accuracy threshold must be positive".to_string());
    }
    write_config_to_store(&app, &config)
        .map_err(|err| err.context("Failed to save location config").to_string())?;
    helper.update_config(config).await;
    Ok(())
}

pub fn mk_specta() -> tauri_specta::Builder {
    tauri_specta::Builder::<tauri::Wry>::new()
        .error_handling(ErrorHandlingMode::Throw)
        .commands(collect_commands![
            get_location,
            uses_gps,
            start_location_updates,
            pause_location_updates,
            dismiss_location_updater,
            cancel_location,
            settings_resolved,
            get_location_config,
            update_location_config,
        ])
        .events(collect_events![
            ProgressUpdate,
            SearchTextUpdate,
            Toast,
            CloseScreen
        ])
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let builder = mk_specta();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(
            tauri_plugin_log::Builder::new()
                .level(LevelFilter::Debug)
                .build(),
        )
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_geolocation::init())
        .plugin(tauri_plugin_store::Builder::default().build())
        .invoke_handler(builder.invoke_handler())
        .setup(move |app| {
            builder.mount_events(app);

            let helper = create_helper(app.handle());
            app.manage(helper.clone());
            helper_loop(helper);
            Ok(())
        })
        .on_window_event(|window, event| {
            if let WindowEvent::Destroyed = event {
                window.state::<HelperHandle>().quit();
            }
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
