use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::{
    fix::Fix, permissions::LocationPermission, prelude::*, settings::LocationRequestConfig,
};

/// Handle to a running stream of fix updates
pub type WatchId = u32;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Something the platform is telling us asynchronously, these are processed one at a time in
/// [crate::LocationHelper::main_loop]
pub enum PlatformEvent {
    /// A new fix from the update stream with the given id
    Fix(WatchId, Fix),
    /// The update stream with the given id reported an error
    FixError(WatchId, String),
    /// The user answered a permission prompt
    PermissionsResult {
        request_code: i32,
        granted: Vec<LocationPermission>,
        denied: Vec<LocationPermission>,
    },
    /// The user finished (or backed out of) a settings resolution flow
    SettingsResolution { request_code: i32, resolved: bool },
}

pub type EventSender = mpsc::UnboundedSender<PlatformEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<PlatformEvent>;

/// Make a channel for delivering [PlatformEvent]s
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Whether the location services on the device can be used at all
pub enum ServicesStatus {
    Connected,
    /// Services are broken but the user can fix it, contains the platform's error code
    Resolvable(i32),
    /// Services are broken and there's nothing we can do, contains the platform's error code
    Unavailable(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Outcome of checking device location settings against a [LocationRequestConfig]
pub enum SettingsStatus {
    Satisfied,
    /// The user needs to change a setting, the platform can prompt them to
    ResolutionRequired,
    /// Settings can't satisfy the request and can't be changed from here
    Unavailable,
}

pub trait LocationPlatform: Send + Sync {
    /// Check that the services backing location are present and connected
    fn services_status(&self) -> impl Future<Output = ServicesStatus> + Send;

    fn is_connected(&self) -> impl Future<Output = bool> + Send {
        async { self.services_status().await == ServicesStatus::Connected }
    }

    /// Check device settings (location toggle, accuracy mode) against the request
    fn check_settings(
        &self,
        config: &LocationRequestConfig,
    ) -> impl Future<Output = SettingsStatus> + Send;

    /// Prompt the user to fix their settings, the outcome must be sent as a
    /// [PlatformEvent::SettingsResolution] tagged with `request_code`
    fn start_settings_resolution(
        &self,
        request_code: i32,
        events: EventSender,
    ) -> impl Future<Output = Result> + Send;

    /// Check that every permission in `perms` is granted
    fn has_permissions(&self, perms: &[LocationPermission]) -> impl Future<Output = bool> + Send;

    /// Prompt the user for `perms`, the answer must be sent as a
    /// [PlatformEvent::PermissionsResult] tagged with `request_code`
    fn request_permissions(
        &self,
        request_code: i32,
        rationale: &str,
        perms: &[LocationPermission],
        events: EventSender,
    ) -> impl Future<Output = ()> + Send;

    /// Check if the user denied any of `perms` and asked not to be prompted again
    fn permanently_denied(
        &self,
        perms: &[LocationPermission],
    ) -> impl Future<Output = bool> + Send;

    /// Get the last fix the platform knows about, if any
    fn last_location(
        &self,
        config: &LocationRequestConfig,
    ) -> impl Future<Output = Result<Option<Fix>>> + Send;

    /// Subscribe to fix updates, every fix must be sent as a [PlatformEvent::Fix] tagged with
    /// the returned id
    fn request_location_updates(
        &self,
        config: &LocationRequestConfig,
        events: EventSender,
    ) -> impl Future<Output = Result<WatchId>> + Send;

    /// Stop a subscription made with [LocationPlatform::request_location_updates]
    fn remove_location_updates(&self, id: WatchId) -> impl Future<Output = ()> + Send;
}
