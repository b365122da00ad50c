use std::time::Duration;

use leanback_model::{PlaybackTweaks, RepeatPolicy};
use serde::{Deserialize, Serialize};

/// Top-level configuration for a playback session.
///
/// All sections carry defaults so a partial TOML document only needs to name
/// the knobs it changes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Video loading, retry timing and source preferences.
    pub loader: LoaderConfig,
    /// Watch-state persistence heuristics.
    pub state: StateConfig,
    /// Suggestion row continuation.
    pub pagination: PaginationConfig,
    /// Engine knobs the session starts with before any remediation.
    pub tweaks: PlaybackTweaks,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Delay before an engine restart after any engine error.
    pub restart_cooldown_ms: u64,
    /// Delay before retrying a failed format resolution.
    pub resolve_retry_ms: u64,
    /// Reload cadence for scheduled streams that have no data yet.
    pub future_stream_reload_ms: u64,
    /// How long buffering may last before the watchdog checks for a
    /// disguised stream end.
    pub buffering_watchdog_ms: u64,
    /// Watchdog only ends videos whose remaining time is below this.
    pub buffering_end_window_ms: u64,
    /// Poll cadence while waiting for the catalog to confirm a successor.
    pub next_poll_interval_ms: u64,
    /// Delay before skipping an unplayable item that has a successor.
    pub unplayable_skip_ms: u64,
    /// "Previous" restarts the current item past this position.
    pub previous_restart_threshold_ms: u64,
    pub hls_forced: bool,
    pub dash_live_disabled: bool,
    /// Restart shorts on end regardless of repeat policy.
    pub loop_shorts: bool,
    pub repeat_policy: RepeatPolicy,
}

impl LoaderConfig {
    pub fn restart_cooldown(&self) -> Duration {
        Duration::from_millis(self.restart_cooldown_ms)
    }

    pub fn resolve_retry(&self) -> Duration {
        Duration::from_millis(self.resolve_retry_ms)
    }

    pub fn future_stream_reload(&self) -> Duration {
        Duration::from_millis(self.future_stream_reload_ms)
    }

    pub fn buffering_watchdog(&self) -> Duration {
        Duration::from_millis(self.buffering_watchdog_ms)
    }

    pub fn next_poll_interval(&self) -> Duration {
        Duration::from_millis(self.next_poll_interval_ms)
    }

    pub fn unplayable_skip(&self) -> Duration {
        Duration::from_millis(self.unplayable_skip_ms)
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            restart_cooldown_ms: 3_000,
            resolve_retry_ms: 1_000,
            future_stream_reload_ms: 30_000,
            buffering_watchdog_ms: 20_000,
            buffering_end_window_ms: 180_000,
            next_poll_interval_ms: 1_000,
            unplayable_skip_ms: 5_000,
            previous_restart_threshold_ms: 3_000,
            hls_forced: false,
            dash_live_disabled: false,
            loop_shorts: false,
            repeat_policy: RepeatPolicy::All,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Items at or below this length are treated as music/short content.
    pub music_max_length_ms: i64,
    /// Saves this close to the end record the item as fully watched.
    pub end_threshold_ms: i64,
    /// Live positions older (or further from the edge) than this are stale.
    pub live_freshness_ms: i64,
    /// Keep positions for short items instead of restarting them.
    pub remember_short_items: bool,
    /// Restore each item's own speed instead of the last global speed.
    pub remember_speed_per_item: bool,
    pub history_enabled: bool,
    /// Engine ticks between tick-driven saves and history pushes.
    pub history_tick_interval: u32,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            music_max_length_ms: 6 * 60 * 1_000,
            end_threshold_ms: 1_000,
            live_freshness_ms: 60_000,
            remember_short_items: false,
            remember_speed_per_item: false,
            history_enabled: true,
            history_tick_interval: 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Continue a row immediately while fewer items than this are visible.
    pub min_visible_items: usize,
    /// Continue a row immediately while visible/fetched is below this ratio.
    pub min_density: f32,
    pub hide_shorts: bool,
    pub hide_watched: bool,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            min_visible_items: 13,
            min_density: 0.8,
            hide_shorts: false,
            hide_watched: false,
        }
    }
}
