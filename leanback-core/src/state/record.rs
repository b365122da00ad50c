use leanback_model::watch::{speed_from_percent, speed_to_percent};
use leanback_model::{VideoId, WatchState};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Key namespace for persisted watch state. Bump the version segment when
/// the stored layout changes.
pub const KEY_PREFIX: &str = "watch_state/v1/";

pub fn state_key(video_id: &VideoId) -> String {
    let mut key =
        String::with_capacity(KEY_PREFIX.len() + video_id.as_str().len());
    key.push_str(KEY_PREFIX);
    key.push_str(video_id.as_str());
    key
}

/// On-disk layout; the video id lives in the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct StoredWatchState {
    position_ms: i64,
    length_ms: i64,
    speed_percent: i32,
    timestamp_ms: i64,
}

pub fn encode(state: &WatchState) -> Result<Vec<u8>> {
    let stored = StoredWatchState {
        position_ms: state.position_ms,
        length_ms: state.length_ms,
        speed_percent: speed_to_percent(state.speed),
        timestamp_ms: state.timestamp_ms,
    };
    Ok(serde_json::to_vec(&stored)?)
}

pub fn decode(video_id: &VideoId, bytes: &[u8]) -> Result<WatchState> {
    let stored: StoredWatchState = serde_json::from_slice(bytes)?;
    Ok(WatchState::new(
        video_id.clone(),
        stored.position_ms,
        stored.length_ms,
        speed_from_percent(stored.speed_percent),
        stored.timestamp_ms,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_versioned_and_scoped_by_id() {
        assert_eq!(state_key(&"abc123".into()), "watch_state/v1/abc123");
    }

    #[test]
    fn stored_layout_uses_speed_percent() {
        let state = WatchState::new("v".into(), 42_000, 600_000, 1.25, 7);
        let bytes = encode(&state).expect("encode");
        let json: serde_json::Value =
            serde_json::from_slice(&bytes).expect("json");

        assert_eq!(json["speed_percent"], 125);
        assert_eq!(json["position_ms"], 42_000);
        assert_eq!(decode(&"v".into(), &bytes).expect("decode"), state);
    }

    #[test]
    fn corrupt_bytes_are_an_error() {
        assert!(decode(&"v".into(), b"not json").is_err());
    }
}
