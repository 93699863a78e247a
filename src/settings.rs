//! Chaser tuning
//!
//! Data-driven balance for the pursuit agent. Loaded from JSON by the host;
//! the crate itself never touches the filesystem.

use serde::{Deserialize, Serialize};

/// Tuning knobs for the chaser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaserSettings {
    /// Cruise speed (world units/s)
    pub base_speed: f32,
    /// Distance to the paddle center that triggers a dash
    pub dash_radius: f32,
    /// Speed multiplier while dashing
    pub dash_multiplier: f32,
    /// Waypoint arrival distance; also the per-tick "no progress" threshold
    pub arrival_threshold: f32,
    /// Seconds without progress before teleporting ahead
    pub stuck_duration: f32,
    /// Fraction of `stuck_duration` after which distress is signalled
    pub distress_onset: f32,
    /// Chaser box width/height
    pub width: f32,
    pub height: f32,
}

impl Default for ChaserSettings {
    fn default() -> Self {
        Self {
            base_speed: 90.0,
            dash_radius: 120.0,
            dash_multiplier: 1.8,
            arrival_threshold: 2.0,
            stuck_duration: 1.5,
            distress_onset: 0.6,
            width: 14.0,
            height: 14.0,
        }
    }
}

impl ChaserSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Parse `json`, falling back to defaults on any error
    pub fn load_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(settings) => {
                log::info!("Loaded chaser settings");
                settings
            }
            Err(e) => {
                log::warn!("Invalid chaser settings ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Clamp values into ranges the agent can work with
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let non_negative = |v: f32, fallback: f32| if v.is_finite() && v >= 0.0 { v } else { fallback };

        self.base_speed = non_negative(self.base_speed, defaults.base_speed);
        self.dash_radius = non_negative(self.dash_radius, defaults.dash_radius);
        self.dash_multiplier = non_negative(self.dash_multiplier, defaults.dash_multiplier).max(1.0);
        self.arrival_threshold = non_negative(self.arrival_threshold, defaults.arrival_threshold);
        self.stuck_duration = non_negative(self.stuck_duration, defaults.stuck_duration);
        self.distress_onset = non_negative(self.distress_onset, defaults.distress_onset).min(1.0);
        self.width = non_negative(self.width, defaults.width);
        self.height = non_negative(self.height, defaults.height);
        self
    }

    /// Speed for this tick given the distance to the paddle
    pub fn speed_at(&self, distance_to_target: f32) -> f32 {
        if distance_to_target <= self.dash_radius {
            self.base_speed * self.dash_multiplier
        } else {
            self.base_speed
        }
    }
}
