//! Device position sensing.
//!
//! A [`PositionSensor`] is the platform location API. The locator consults it
//! once per acquisition, bounded by [`SensorOptions::timeout`], and rejects
//! cached fixes older than [`SensorOptions::maximum_age`].

use std::future::Future;
use std::time::Duration;

use prixloc_core::Position;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    pub maximum_age: Duration,
}

impl Default for SensorOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::from_secs(60),
        }
    }
}

/// A position reading and how long ago it was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub position: Position,
    pub age: Duration,
}

impl Fix {
    #[must_use]
    pub fn fresh(position: Position) -> Self {
        Self {
            position,
            age: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("geolocation is not supported on this device")]
    Unsupported,

    #[error("geolocation permission denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    Unavailable(String),

    #[error("timed out waiting for a position fix")]
    Timeout,

    #[error("cached fix is {age_secs}s old")]
    Stale { age_secs: u64 },
}

/// Platform location capability.
pub trait PositionSensor: Send + Sync {
    fn current_position(
        &self,
        options: &SensorOptions,
    ) -> impl Future<Output = Result<Fix, SensorError>> + Send;
}

/// A device without geolocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSensor;

impl PositionSensor for NoSensor {
    async fn current_position(&self, _options: &SensorOptions) -> Result<Fix, SensorError> {
        Err(SensorError::Unsupported)
    }
}

/// A sensor that always reports the same fresh fix.
#[derive(Debug, Clone, Copy)]
pub struct FixedSensor(pub Position);

impl PositionSensor for FixedSensor {
    async fn current_position(&self, _options: &SensorOptions) -> Result<Fix, SensorError> {
        Ok(Fix::fresh(self.0))
    }
}

/// Reads the sensor once, enforcing the timeout and maximum fix age.
pub(crate) async fn read_sensor<S: PositionSensor>(
    sensor: &S,
    options: &SensorOptions,
) -> Result<Position, SensorError> {
    let fix = tokio::time::timeout(options.timeout, sensor.current_position(options))
        .await
        .map_err(|_| SensorError::Timeout)??;

    if fix.age > options.maximum_age {
        return Err(SensorError::Stale {
            age_secs: fix.age.as_secs(),
        });
    }
    Ok(fix.position)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowSensor;

    impl PositionSensor for SlowSensor {
        async fn current_position(&self, _options: &SensorOptions) -> Result<Fix, SensorError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Fix::fresh(Position::new(1.0, 1.0).unwrap()))
        }
    }

    struct CachedSensor(Duration);

    impl PositionSensor for CachedSensor {
        async fn current_position(&self, _options: &SensorOptions) -> Result<Fix, SensorError> {
            Ok(Fix {
                position: Position::new(0.39, 9.45).unwrap(),
                age: self.0,
            })
        }
    }

    #[tokio::test]
    async fn no_sensor_reports_unsupported() {
        let result = read_sensor(&NoSensor, &SensorOptions::default()).await;
        assert_eq!(result, Err(SensorError::Unsupported));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_sensor_times_out() {
        let result = read_sensor(&SlowSensor, &SensorOptions::default()).await;
        assert_eq!(result, Err(SensorError::Timeout));
    }

    #[tokio::test]
    async fn cached_fix_within_max_age_is_accepted() {
        let sensor = CachedSensor(Duration::from_secs(59));
        let result = read_sensor(&sensor, &SensorOptions::default()).await;
        assert_eq!(result, Ok(Position::new(0.39, 9.45).unwrap()));
    }

    #[tokio::test]
    async fn cached_fix_older_than_max_age_is_stale() {
        let sensor = CachedSensor(Duration::from_secs(120));
        let result = read_sensor(&sensor, &SensorOptions::default()).await;
        assert_eq!(result, Err(SensorError::Stale { age_secs: 120 }));
    }
}
