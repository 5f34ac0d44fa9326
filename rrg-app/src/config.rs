use anyhow::Context;
use log::warn;
use rrg_location::LocationRequestConfig;
use tauri::AppHandle;
use tauri_plugin_store::StoreExt;

const STORE_NAME: &str = "location";
const CONFIG_KEY: &str = "location_config";

/// Read the saved request config, falling back to defaults if there isn't a valid one
pub fn read_config_from_store(app: &AppHandle) -> LocationRequestConfig {
    let store = match app.store(STORE_NAME) {
        Ok(store) => store,
        Err(why) => {
            warn!("Couldn't open store, using default location config: {why:?}");
            return LocationRequestConfig::default();
        }
    };

    let config = store
        .get(CONFIG_KEY)
        .and_then(|v| serde_json::from_value::<LocationRequestConfig>(v).ok());

    store.close_resource();

    config.unwrap_or_default()
}

pub fn write_config_to_store(app: &AppHandle, config: &LocationRequestConfig) -> anyhow::Result<()> {
    let store = app.store(STORE_NAME).context("Couldn't open store")?;

    let value = serde_json::to_value(config).context("Failed to serialize config")?;
    store.set(CONFIG_KEY, value);
    Ok(())
}
