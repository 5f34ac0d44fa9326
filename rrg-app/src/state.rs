use std::sync::Arc;

use log::info;
use rrg_location::LocationHelper;
use tauri::AppHandle;

use crate::{config::read_config_from_store, location::TauriLocationPlatform, ui::TauriLocationUi};

pub type Helper = LocationHelper<TauriLocationPlatform, TauriLocationUi>;

pub type HelperHandle = Arc<Helper>;

/// Build the helper for the search screen using the saved request config
pub fn create_helper(app: &AppHandle) -> HelperHandle {
    let config = read_config_from_store(app);
    let platform = TauriLocationPlatform::new(app.clone());
    let ui = TauriLocationUi::new(app.clone());
    Arc::new(Helper::new(config, platform, ui))
}

/// Handle platform callbacks until the helper is told to quit
pub fn helper_loop(helper: HelperHandle) {
    tauri::async_runtime::spawn(async move {
        helper.main_loop().await;
        info!("Location helper stopped");
    });
}
