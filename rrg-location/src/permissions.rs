use serde::{Deserialize, Serialize};

/// Request code used to match a settings resolution result back to us
pub const REQUEST_CHECK_SETTINGS: i32 = 1;
/// Request code for the runtime location permission prompt
pub const RC_LOCATION_PERM: i32 = 120;
/// Request code for the dialog shown when location services need fixing
pub const SERVICES_RESOLUTION_REQUEST_CODE: i32 = 9000;
/// Request code for the "open app settings" dialog after a permanent denial
pub const DEFAULT_SETTINGS_REQ_CODE: i32 = 16061;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, specta::Type)]
/// A runtime permission needed to get location
pub enum LocationPermission {
    /// Precise location, GPS
    Fine,
    /// Approximate location, network based
    Coarse,
}

/// Everything we need granted before asking for a fix
pub const PERMISSIONS: [LocationPermission; 2] =
    [LocationPermission::Fine, LocationPermission::Coarse];
