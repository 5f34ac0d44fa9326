mod fix;
mod helper;
mod permissions;
mod platform;
mod settings;
#[cfg(test)]
mod tests;
mod ui;

pub use fix::{Fix, UtcDT};
pub use helper::{AcquisitionState, LocationHelper};
pub use permissions::{
    DEFAULT_SETTINGS_REQ_CODE, LocationPermission, PERMISSIONS, RC_LOCATION_PERM,
    REQUEST_CHECK_SETTINGS, SERVICES_RESOLUTION_REQUEST_CODE,
};
pub use platform::{
    EventReceiver, EventSender, LocationPlatform, PlatformEvent, ServicesStatus, SettingsStatus,
    WatchId, event_channel,
};
pub use settings::{LocationRequestConfig, Priority};
pub use ui::{LocationUi, UiMessage};

pub mod prelude {
    use anyhow::Error as AnyhowError;
    use std::result::Result as StdResult;
    pub type Result<T = (), E = AnyhowError> = StdResult<T, E>;
    pub use anyhow::Context;
}
