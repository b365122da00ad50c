use leanback_model::{ErrorKind, FormatInfo, StreamDescriptor};

use crate::error::UnplayableReason;

/// User/config switches that affect which representation is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourcePreferences {
    pub hls_forced: bool,
    pub dash_live_disabled: bool,
}

/// What to do with a resolved [`FormatInfo`].
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Adaptive formats are usable; build a manifest from them first.
    DecodeManifest,
    Open(StreamDescriptor),
    Unplayable(UnplayableReason),
    /// Nothing to play yet (scheduled stream that has not started).
    Empty,
}

/// Pick one representation by fixed preference order.
///
/// `last_error` is the kind of the most recent engine failure for this
/// session; after a source error the fallback URL list is tried bottom-up
/// because the top entry is the one most likely to be broken.
pub fn select_source(
    info: &FormatInfo,
    prefs: SourcePreferences,
    last_error: Option<ErrorKind>,
) -> Selection {
    if info.is_unplayable {
        return Selection::Unplayable(unplayable_reason(info));
    }

    let live = info.is_live;

    let dash_blocked = live
        && (!info.has_known_start_time()
            || prefs.dash_live_disabled
            || prefs.hls_forced);
    if info.contains_dash_formats() && !dash_blocked {
        return Selection::DecodeManifest;
    }

    if let Some(url) = &info.dash_manifest_url
        && !(prefs.hls_forced && info.contains_hls_url())
    {
        return Selection::Open(StreamDescriptor::DashUrl { url: url.clone() });
    }

    if live && let Some(url) = &info.hls_manifest_url {
        return Selection::Open(StreamDescriptor::HlsUrl { url: url.clone() });
    }

    if info.contains_url_list() {
        let mut urls = info.url_list.clone();
        if last_error == Some(ErrorKind::Source) {
            urls.reverse();
        }
        return Selection::Open(StreamDescriptor::UrlList { urls });
    }

    Selection::Empty
}

fn unplayable_reason(info: &FormatInfo) -> UnplayableReason {
    if info.is_age_restricted {
        return UnplayableReason::AgeRestricted;
    }
    let licensing = info
        .status_message
        .as_deref()
        .map(|message| message.to_ascii_lowercase())
        .is_some_and(|message| {
            message.contains("licens") || message.contains("rights")
        });
    if licensing {
        UnplayableReason::Licensing
    } else {
        UnplayableReason::Blocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://media.example/{path}")).expect("url")
    }

    fn live_info() -> FormatInfo {
        FormatInfo {
            video_id: "live".into(),
            is_live: true,
            start_time_ms: Some(1_700_000_000_000),
            has_dash_formats: true,
            dash_manifest_url: Some(url("live.mpd")),
            hls_manifest_url: Some(url("live.m3u8")),
            ..Default::default()
        }
    }

    #[test]
    fn prefers_dash_manifest_for_vod() {
        let info = FormatInfo {
            has_dash_formats: true,
            url_list: vec![url("a.mp4")],
            ..Default::default()
        };
        assert_eq!(
            select_source(&info, SourcePreferences::default(), None),
            Selection::DecodeManifest
        );
    }

    #[test]
    fn live_without_start_time_skips_the_manifest() {
        let info = FormatInfo {
            start_time_ms: None,
            ..live_info()
        };
        assert_eq!(
            select_source(&info, SourcePreferences::default(), None),
            Selection::Open(StreamDescriptor::DashUrl {
                url: url("live.mpd")
            })
        );
    }

    #[test]
    fn forced_hls_wins_for_live() {
        let prefs = SourcePreferences {
            hls_forced: true,
            ..Default::default()
        };
        assert_eq!(
            select_source(&live_info(), prefs, None),
            Selection::Open(StreamDescriptor::HlsUrl {
                url: url("live.m3u8")
            })
        );
    }

    #[test]
    fn disabled_live_dash_opens_the_manifest_url() {
        let prefs = SourcePreferences {
            dash_live_disabled: true,
            ..Default::default()
        };
        assert_eq!(
            select_source(&live_info(), prefs, None),
            Selection::Open(StreamDescriptor::DashUrl {
                url: url("live.mpd")
            })
        );
    }

    #[test]
    fn url_list_is_reversed_after_a_source_error() {
        let info = FormatInfo {
            url_list: vec![url("hd.mp4"), url("sd.mp4")],
            ..Default::default()
        };

        let selected = select_source(
            &info,
            SourcePreferences::default(),
            Some(ErrorKind::Source),
        );

        assert_eq!(
            selected,
            Selection::Open(StreamDescriptor::UrlList {
                urls: vec![url("sd.mp4"), url("hd.mp4")]
            })
        );
    }

    #[test]
    fn nothing_usable_is_empty() {
        let info = FormatInfo {
            is_live: true,
            ..Default::default()
        };
        assert_eq!(
            select_source(&info, SourcePreferences::default(), None),
            Selection::Empty
        );
    }

    #[test]
    fn age_restriction_is_reported() {
        let info = FormatInfo {
            is_unplayable: true,
            is_age_restricted: true,
            ..Default::default()
        };
        assert_eq!(
            select_source(&info, SourcePreferences::default(), None),
            Selection::Unplayable(UnplayableReason::AgeRestricted)
        );
    }
}
