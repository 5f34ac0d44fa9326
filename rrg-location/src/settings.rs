use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, specta::Type)]
/// How hard the platform should try to get an accurate fix
pub enum Priority {
    /// Use GPS if available, most accurate but most power hungry
    HighAccuracy,
    /// Block-level accuracy, usually Wi-Fi and cell towers
    BalancedPowerAccuracy,
    /// City-level accuracy
    LowPower,
    /// Don't request fixes, only receive ones other apps caused
    NoPower,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, specta::Type)]
/// How location fixes should be requested from the platform
pub struct LocationRequestConfig {
    /// Desired milliseconds between fix updates
    pub interval_ms: u32,
    /// Fastest rate in milliseconds we're willing to handle updates at
    pub fastest_interval_ms: u32,
    /// Accuracy / power tradeoff
    pub priority: Priority,
    /// Always show the settings prompt, even if the user declined it before
    pub always_show: bool,
    /// Fixes must report an accuracy radius (in meters) strictly below this to be accepted
    pub accuracy_threshold_meters: f64,
    /// Oldest a last-known fix (in milliseconds) may be for the platform to hand it back
    pub max_last_known_age_ms: u32,
}

impl LocationRequestConfig {
    pub fn high_accuracy(&self) -> bool {
        self.priority == Priority::HighAccuracy
    }
}

impl Default for LocationRequestConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            fastest_interval_ms: 1000,
            priority: Priority::HighAccuracy,
            always_show: true,
            accuracy_threshold_meters: 200.0,
            max_last_known_age_ms: 2000,
        }
    }
}
