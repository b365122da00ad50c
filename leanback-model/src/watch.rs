use crate::ids::VideoId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-video playback position and speed
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WatchState {
    pub video_id: VideoId,
    pub position_ms: i64,
    pub length_ms: i64,
    pub speed: f32,
    /// Unix millis of the last write
    pub timestamp_ms: i64,
}

impl WatchState {
    pub fn new(
        video_id: VideoId,
        position_ms: i64,
        length_ms: i64,
        speed: f32,
        timestamp_ms: i64,
    ) -> Self {
        Self {
            video_id,
            position_ms,
            length_ms,
            speed,
            timestamp_ms,
        }
    }

    pub fn remaining_ms(&self) -> i64 {
        (self.length_ms - self.position_ms).max(0)
    }

    /// Watched fraction as a percentage, clamped to 0..=100
    pub fn percent(&self) -> f32 {
        if self.length_ms <= 0 {
            return 0.0;
        }
        (self.position_ms as f64 / self.length_ms as f64 * 100.0)
            .clamp(0.0, 100.0) as f32
    }

    pub fn is_fully_watched(&self) -> bool {
        self.length_ms > 0 && self.position_ms >= self.length_ms
    }
}

/// Speed as stored on disk (percent of normal speed)
pub fn speed_to_percent(speed: f32) -> i32 {
    (speed * 100.0).round() as i32
}

pub fn speed_from_percent(percent: i32) -> f32 {
    percent as f32 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_clamped() {
        let state = WatchState::new("v".into(), 700, 600, 1.0, 0);
        assert_eq!(state.percent(), 100.0);
        assert_eq!(state.remaining_ms(), 0);
    }

    #[test]
    fn speed_percent_conversion() {
        assert_eq!(speed_to_percent(1.25), 125);
        assert_eq!(speed_from_percent(125), 1.25);
    }
}
