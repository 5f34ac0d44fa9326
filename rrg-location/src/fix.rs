use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Convenience alias for UTC DT
pub type UtcDT = DateTime<Utc>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, specta::Type)]
/// A single location measurement as reported by the platform's location provider
pub struct Fix {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub long: f64,
    /// Radius of uncertainty in meters, some providers can't report one
    pub accuracy: Option<f64>,
    /// The bearing, optional as GPS can't always determine
    pub heading: Option<f64>,
    /// When the platform took the measurement
    pub timestamp: UtcDT,
}

impl Fix {
    /// Whether this fix is accurate enough to use, a fix without an accuracy never is
    pub fn accurate_within(&self, threshold: f64) -> bool {
        self.accuracy.is_some_and(|acc| acc < threshold)
    }
}
