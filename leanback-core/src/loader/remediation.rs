use leanback_model::{ErrorEvent, ErrorKind, PlaybackTweaks, TrackChannel};
use once_cell::sync::Lazy;
use regex::Regex;

/// The single corrective action chosen for an engine error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remediation {
    SwitchTransport,
    DisableBufferingFeature,
    FallbackFormat(TrackChannel),
    ShrinkBuffer,
    /// Ask the catalog client for its alternate "no playback" workaround.
    RequestPlaybackFix,
    None,
}

impl Remediation {
    pub fn name(&self) -> &'static str {
        match self {
            Remediation::SwitchTransport => "switch_transport",
            Remediation::DisableBufferingFeature => "disable_buffering_feature",
            Remediation::FallbackFormat(_) => "fallback_format",
            Remediation::ShrinkBuffer => "shrink_buffer",
            Remediation::RequestPlaybackFix => "request_playback_fix",
            Remediation::None => "none",
        }
    }

    /// Mutate `tweaks` for this remediation. Returns whether anything
    /// changed; catalog-side fixes are applied by the caller.
    pub fn apply(self, tweaks: &mut PlaybackTweaks) -> bool {
        let before = tweaks.clone();
        match self {
            Remediation::SwitchTransport => {
                tweaks.transport = tweaks.transport.next();
            }
            Remediation::DisableBufferingFeature => {
                tweaks.buffering_feature_enabled = false;
            }
            Remediation::FallbackFormat(TrackChannel::Video) => {
                tweaks.video_format_fallback = true;
            }
            Remediation::FallbackFormat(TrackChannel::Audio) => {
                tweaks.audio_format_fallback = true;
            }
            Remediation::FallbackFormat(TrackChannel::Subtitle) => {
                tweaks.subtitles_disabled = true;
            }
            Remediation::ShrinkBuffer => {
                tweaks.buffer_target = tweaks.buffer_target.shrink();
            }
            Remediation::FallbackFormat(TrackChannel::Unknown)
            | Remediation::RequestPlaybackFix
            | Remediation::None => {}
        }
        *tweaks != before
    }
}

struct Rule {
    kind: Option<ErrorKind>,
    channel: Option<TrackChannel>,
    /// Matched against both the message and the cause
    pattern: Option<Regex>,
    remediation: Remediation,
}

impl Rule {
    fn matches(&self, error: &ErrorEvent) -> bool {
        if self.kind.is_some_and(|kind| kind != error.kind) {
            return false;
        }
        if self.channel.is_some_and(|channel| channel != error.channel) {
            return false;
        }
        match &self.pattern {
            Some(pattern) => {
                pattern.is_match(error.message())
                    || pattern.is_match(error.cause())
            }
            None => true,
        }
    }
}

fn pattern(source: &str) -> Option<Regex> {
    Some(Regex::new(source).expect("remediation pattern should compile"))
}

/// First matching rule wins.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        // Stream URL rejected outright: signature or client profile issue
        Rule {
            kind: Some(ErrorKind::Source),
            channel: None,
            pattern: pattern(r"Response code: (?:403|410)\b"),
            remediation: Remediation::RequestPlaybackFix,
        },
        Rule {
            kind: Some(ErrorKind::Source),
            channel: None,
            pattern: pattern(concat!(
                r"^Unable to connect to|Response code: (?:404|421|429|5\d\d)\b",
                r"|CronetUrlRequest|Software caused connection abort",
                r"|SocketTimeoutException",
            )),
            remediation: Remediation::SwitchTransport,
        },
        Rule {
            kind: None,
            channel: None,
            pattern: pattern(concat!(
                r"Invalid NAL length|Invalid integer size|Top bit not zero",
                r"|(?:ArrayIndexOutOfBounds|IndexOutOfBounds)Exception",
            )),
            remediation: Remediation::DisableBufferingFeature,
        },
        Rule {
            kind: None,
            channel: None,
            pattern: pattern(r"OutOfMemory"),
            remediation: Remediation::ShrinkBuffer,
        },
        Rule {
            kind: Some(ErrorKind::Renderer),
            channel: Some(TrackChannel::Video),
            pattern: None,
            remediation: Remediation::FallbackFormat(TrackChannel::Video),
        },
        Rule {
            kind: Some(ErrorKind::Renderer),
            channel: Some(TrackChannel::Audio),
            pattern: None,
            remediation: Remediation::FallbackFormat(TrackChannel::Audio),
        },
        Rule {
            kind: Some(ErrorKind::Renderer),
            channel: Some(TrackChannel::Subtitle),
            pattern: None,
            remediation: Remediation::FallbackFormat(TrackChannel::Subtitle),
        },
    ]
});

/// Map an engine error to exactly one remediation; opaque errors map to
/// [`Remediation::None`].
pub fn classify(error: &ErrorEvent) -> Remediation {
    RULES
        .iter()
        .find(|rule| rule.matches(error))
        .map(|rule| rule.remediation)
        .unwrap_or(Remediation::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use leanback_model::{BufferTarget, NetworkTransport};

    fn source(message: &str) -> ErrorEvent {
        ErrorEvent::new(ErrorKind::Source, TrackChannel::Unknown)
            .with_message(message)
    }

    #[test]
    fn forbidden_requests_ask_for_a_playback_fix() {
        assert_eq!(
            classify(&source("Response code: 403")),
            Remediation::RequestPlaybackFix
        );
    }

    #[test]
    fn connection_failures_switch_transport() {
        assert_eq!(
            classify(&source("Unable to connect to https://cdn.example")),
            Remediation::SwitchTransport
        );
        assert_eq!(
            classify(&source("Response code: 503")),
            Remediation::SwitchTransport
        );
    }

    #[test]
    fn parser_errors_match_on_cause() {
        let error =
            ErrorEvent::new(ErrorKind::Unexpected, TrackChannel::Unknown)
                .with_cause("java.lang.ArrayIndexOutOfBoundsException");
        assert_eq!(classify(&error), Remediation::DisableBufferingFeature);
    }

    #[test]
    fn renderer_errors_fall_back_per_channel() {
        let error = ErrorEvent::new(ErrorKind::Renderer, TrackChannel::Audio);
        assert_eq!(
            classify(&error),
            Remediation::FallbackFormat(TrackChannel::Audio)
        );
    }

    #[test]
    fn out_of_memory_beats_renderer_fallback() {
        let error = ErrorEvent::new(ErrorKind::Renderer, TrackChannel::Video)
            .with_cause("OutOfMemoryError");
        assert_eq!(classify(&error), Remediation::ShrinkBuffer);
    }

    #[test]
    fn opaque_errors_are_not_remediated() {
        assert_eq!(classify(&source("Source error")), Remediation::None);
    }

    #[test]
    fn apply_reports_changes() {
        let mut tweaks = PlaybackTweaks::default();

        assert!(Remediation::SwitchTransport.apply(&mut tweaks));
        assert_eq!(tweaks.transport, NetworkTransport::Cronet);

        assert!(Remediation::ShrinkBuffer.apply(&mut tweaks));
        assert!(Remediation::ShrinkBuffer.apply(&mut tweaks));
        assert!(!Remediation::ShrinkBuffer.apply(&mut tweaks));
        assert_eq!(tweaks.buffer_target, BufferTarget::Low);

        assert!(!Remediation::None.apply(&mut tweaks));
    }
}
