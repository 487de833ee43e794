//! Sensor configuration

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Floor on the time between two refresh passes
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound of the configurable extra delay, in seconds
pub const MAX_REFRESH_DELAY: f32 = 1.0;

/// Flood-fill parameters. Distances are in world units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Distance between neighboring grid cells
    pub resolution: f32,
    /// Search radius around the origin
    pub max_distance: f32,
    /// Minimum flat distance for a blocked cell to count as a spawn candidate
    pub min_spawn_dist: f32,
    /// Height of the exclusion band above and below the origin
    pub dead_zone: f32,
    /// Extra delay between passes (seconds, clamped to [0, 1])
    pub refresh_delay: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            max_distance: 10.0,
            min_spawn_dist: 2.0,
            dead_zone: 1.0,
            refresh_delay: 0.0,
        }
    }
}

impl SensorConfig {
    /// Reject configurations no pass could run with
    pub fn validate(&self) -> Result<()> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(Error::Config(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        if !self.max_distance.is_finite() || self.max_distance < 0.0 {
            return Err(Error::Config(format!(
                "max_distance must be finite and non-negative, got {}",
                self.max_distance
            )));
        }
        if self.min_spawn_dist.is_nan() || self.min_spawn_dist < 0.0 {
            return Err(Error::Config(format!(
                "min_spawn_dist must be non-negative, got {}",
                self.min_spawn_dist
            )));
        }
        if self.dead_zone.is_nan() || self.dead_zone < 0.0 {
            return Err(Error::Config(format!(
                "dead_zone must be non-negative, got {}",
                self.dead_zone
            )));
        }
        if self.refresh_delay.is_nan() {
            return Err(Error::Config("refresh_delay is NaN".into()));
        }
        Ok(())
    }

    /// Time to wait after a pass before starting the next one.
    ///
    /// A NaN delay counts as no extra delay.
    pub fn refresh_interval(&self) -> Duration {
        let delay = if self.refresh_delay.is_nan() { 0.0 } else { self.refresh_delay };
        let extra = delay.clamp(0.0, MAX_REFRESH_DELAY);
        MIN_REFRESH_INTERVAL + Duration::from_secs_f32(extra)
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SensorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SensorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_resolution() {
        for resolution in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = SensorConfig { resolution, ..Default::default() };
            assert!(matches!(config.validate(), Err(Error::Config(_))), "{resolution}");
        }
    }

    #[test]
    fn test_rejects_negative_max_distance() {
        let config = SensorConfig { max_distance: -0.5, ..Default::default() };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_max_distance_allowed() {
        let config = SensorConfig { max_distance: 0.0, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_refresh_interval_clamped() {
        let mut config = SensorConfig::default();
        assert_eq!(config.refresh_interval(), Duration::from_millis(100));

        config.refresh_delay = 0.25;
        assert_eq!(config.refresh_interval(), Duration::from_millis(350));

        config.refresh_delay = 5.0;
        assert_eq!(config.refresh_interval(), Duration::from_millis(1100));

        config.refresh_delay = -3.0;
        assert_eq!(config.refresh_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_refresh_interval_nan_delay() {
        let config = SensorConfig { refresh_delay: f32::NAN, ..Default::default() };
        assert!(config.validate().is_err());
        assert_eq!(config.refresh_interval(), MIN_REFRESH_INTERVAL);
    }

    #[test]
    fn test_from_json_partial() {
        let config = SensorConfig::from_json_str(r#"{ "resolution": 0.5, "dead_zone": 0 }"#).unwrap();
        assert_eq!(config.resolution, 0.5);
        assert_eq!(config.dead_zone, 0.0);
        assert_eq!(config.max_distance, SensorConfig::default().max_distance);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            SensorConfig::from_json_str(r#"{ "resolution": -2 }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(SensorConfig::from_json_str("{ nope"), Err(Error::Json(_))));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sensor.json");
        tokio::fs::write(&path, r#"{ "max_distance": 6, "min_spawn_dist": 1.5 }"#)
            .await
            .unwrap();

        let config = SensorConfig::load(&path).await.unwrap();
        assert_eq!(config.max_distance, 6.0);
        assert_eq!(config.min_spawn_dist, 1.5);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SensorConfig::load(dir.path().join("missing.json")).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
