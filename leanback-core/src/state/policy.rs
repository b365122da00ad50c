//! Pure save/restore heuristics.

use leanback_config::StateConfig;
use leanback_model::{Video, WatchState};

/// Position to persist for a save, after end-of-video snapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    pub position_ms: i64,
    pub fully_watched: bool,
}

/// Snap positions close to the end (or, for live, close to the live edge)
/// to the full length so the item reads as finished.
pub fn settle_position(
    is_live: bool,
    position_ms: i64,
    length_ms: i64,
    config: &StateConfig,
) -> Settled {
    let window = if is_live {
        config.live_freshness_ms
    } else {
        config.end_threshold_ms
    };

    if length_ms > 0 && length_ms - position_ms < window {
        Settled {
            position_ms: length_ms,
            fully_watched: true,
        }
    } else {
        Settled {
            position_ms: position_ms.clamp(0, length_ms.max(0)),
            fully_watched: false,
        }
    }
}

/// At or below the music-length threshold.
pub fn is_short(length_ms: i64, config: &StateConfig) -> bool {
    length_ms > 0 && length_ms <= config.music_max_length_ms
}

/// Apply open-time resets to a stored entry. `None` means the entry should
/// be forgotten for this session (position zero, global speed).
pub fn open_state(
    video: &Video,
    stored: WatchState,
    config: &StateConfig,
) -> Option<WatchState> {
    let reset = video.is_live
        || (is_short(stored.length_ms, config) && !config.remember_short_items);
    if !reset {
        return Some(stored);
    }
    config.remember_speed_per_item.then_some(WatchState {
        position_ms: 0,
        ..stored
    })
}

/// Where playback should start once the engine knows the duration.
pub fn restore_position(
    video: &Video,
    local: Option<&WatchState>,
    duration_ms: i64,
    config: &StateConfig,
) -> i64 {
    if video.is_live {
        return 0;
    }

    let length = if duration_ms > 0 {
        duration_ms
    } else {
        local.map_or(0, |state| state.length_ms)
    };

    let server_fresher =
        local.is_none_or(|state| state.timestamp_ms < video.timestamp_ms);
    if server_fresher
        && video.percent_watched > 0.0
        && length > config.music_max_length_ms
    {
        if video.is_fully_watched() {
            return 0;
        }
        return (length as f64 * f64::from(video.percent_watched) / 100.0)
            as i64;
    }

    match local {
        Some(state) if !state.is_fully_watched() => state.position_ms,
        _ => 0,
    }
}

/// Speed to apply once the item is loaded. `position_ms` and `duration_ms`
/// are where the engine will be playing from.
pub fn restore_speed(
    video: &Video,
    local: Option<&WatchState>,
    global_speed: f32,
    position_ms: i64,
    duration_ms: i64,
    config: &StateConfig,
) -> f32 {
    if video.belongs_to_music {
        return 1.0;
    }
    if video.is_live {
        let at_edge = duration_ms > 0
            && duration_ms - position_ms <= config.live_freshness_ms;
        if at_edge || local.is_none() {
            return 1.0;
        }
    }
    match local {
        Some(state) if config.remember_speed_per_item => state.speed,
        _ => global_speed,
    }
}
