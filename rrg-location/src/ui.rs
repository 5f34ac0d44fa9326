use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, specta::Type)]
/// User-facing text the helper can put on screen
pub enum UiMessage {
    /// Shown on the progress indicator while waiting for a fix
    GettingLocation,
    /// Toast once a fix is accepted
    LocationAcquired,
    /// Text put in the search box once a fix is accepted
    CurrentLocation,
    /// Toast when settings can't satisfy the request
    SettingsInadequate,
    /// Shown when asking for the location permission
    PermissionRequired,
    /// Body of the settings redirect dialog
    PermissionRationale,
    /// Title of the settings redirect dialog
    SettingsDialogTitle,
}

impl UiMessage {
    pub fn text(&self) -> &'static str {
        match self {
            Self::GettingLocation => "Getting location...",
            Self::LocationAcquired => "Location acquired!",
            Self::CurrentLocation => "Current Location",
            Self::SettingsInadequate => {
                "Location settings are inadequate, and cannot be fixed here. Fix in Settings."
            }
            Self::PermissionRequired => "This app needs your location to find restaurants near you.",
            Self::PermissionRationale => {
                "Location permission was permanently denied. Enable it in the app settings to search near you."
            }
            Self::SettingsDialogTitle => "Permissions Required",
        }
    }
}

/// The screen hosting the helper, every method is a fire-and-forget side effect
pub trait LocationUi: Send + Sync {
    /// Show the blocking "getting location" indicator, it has a cancel button that should call
    /// [crate::LocationHelper::cancel]
    fn show_progress(&self);
    fn dismiss_progress(&self);
    fn toast(&self, msg: UiMessage);
    fn set_search_text(&self, msg: UiMessage);
    fn clear_search(&self);
    /// Direct the user to the app's settings page to grant a permanently denied permission
    fn show_settings_redirect(&self, request_code: i32);
    /// Show the platform's dialog for fixing location services
    fn show_services_error(&self, error_code: i32, request_code: i32);
    /// Location is unusable on this device, leave the screen
    fn close_screen(&self);
}
