mod support;

use leanback_config::PlaybackConfig;
use leanback_contracts::CatalogError;
use leanback_core::testing::{CatalogCall, SurfaceCall};
use leanback_core::{Handled, PlaybackEvent, TimerKind};
use leanback_model::{
    ErrorEvent, ErrorKind, FormatInfo, GroupKind, KeyInput, Metadata,
    NetworkTransport, RepeatPolicy, StreamDescriptor, TrackChannel, Video,
    VideoGroup,
};
use support::Harness;
use url::Url;

fn video(id: &str) -> Video {
    Video::new(id, format!("Video {id}"))
}

fn dash_url(id: &str) -> StreamDescriptor {
    StreamDescriptor::DashUrl {
        url: Url::parse(&format!("https://media.example/{id}/manifest.mpd"))
            .expect("url"),
    }
}

fn metadata(id: &str, next: Option<Video>) -> Metadata {
    Metadata {
        video: video(id),
        suggestions: Vec::new(),
        next_video: next,
    }
}

fn metadata_fetches(h: &Harness, id: &str) -> usize {
    h.catalog.count(|call| {
        matches!(
            call,
            CatalogCall::FetchMetadata(video_id) if video_id.as_str() == id
        )
    })
}

fn with_policy(policy: RepeatPolicy) -> PlaybackConfig {
    let mut config = PlaybackConfig::default();
    config.loader.repeat_policy = policy;
    config
}

#[tokio::test]
async fn reopening_the_current_video_resolves_once() {
    let mut h = Harness::new();

    h.session.open(video("a"));
    h.session.open(video("a"));
    h.settle().await;
    h.open(video("a")).await;

    assert_eq!(h.catalog.resolve_count(&"a".into()), 1);
    assert_eq!(h.surface.opened(), vec![dash_url("a")]);
}

#[tokio::test]
async fn opening_b_supersedes_a_in_flight() {
    let mut h = Harness::new();

    h.session.open(video("a"));
    h.session.open(video("b"));
    h.settle().await;

    // Both resolutions ran, but only b reached the engine.
    assert_eq!(h.catalog.resolve_count(&"a".into()), 1);
    assert_eq!(h.catalog.resolve_count(&"b".into()), 1);
    assert_eq!(h.surface.opened(), vec![dash_url("b")]);
    assert_eq!(h.current_id().as_deref(), Some("b"));
}

#[tokio::test]
async fn adaptive_formats_go_through_manifest_decode() {
    let mut h = Harness::new();
    h.catalog.set_formats(
        "a",
        Ok(FormatInfo {
            video_id: "a".into(),
            has_dash_formats: true,
            ..FormatInfo::default()
        }),
    );

    h.open(video("a")).await;

    assert_eq!(
        h.catalog.count(|call| matches!(call, CatalogCall::ResolveManifest(_))),
        1
    );
    assert!(matches!(
        h.surface.opened().as_slice(),
        [StreamDescriptor::DashManifest { .. }]
    ));
}

#[tokio::test]
async fn engine_error_remediates_and_restarts_after_cooldown() {
    let mut h = Harness::new();
    h.open(video("a")).await;
    h.load(0, 600_000).await;

    let error = ErrorEvent::new(ErrorKind::Source, TrackChannel::Unknown)
        .with_message("Response code: 503");
    h.dispatch(PlaybackEvent::EngineError(error.clone()));

    assert!(h.runtime.has_pending_timer(TimerKind::RestartEngine));
    assert_eq!(
        h.session.state().tweaks.transport,
        NetworkTransport::default().next()
    );
    assert!(!h.surface.was_called(&SurfaceCall::Restart));

    h.advance_ms(3_000).await;
    assert!(h.surface.was_called(&SurfaceCall::Restart));

    // A second failure on the same video does not notify again.
    h.dispatch(PlaybackEvent::EngineError(error));
    assert_eq!(h.surface.errors().len(), 1);
}

#[tokio::test]
async fn key_press_cancels_a_pending_restart() {
    let mut h = Harness::new();
    h.open(video("a")).await;
    h.load(0, 600_000).await;

    h.dispatch(PlaybackEvent::EngineError(ErrorEvent::new(
        ErrorKind::Unexpected,
        TrackChannel::Unknown,
    )));
    assert_eq!(h.session.key_down(KeyInput::Left), Handled::No);
    h.advance_ms(10_000).await;

    assert!(!h.surface.was_called(&SurfaceCall::Restart));
}

#[tokio::test]
async fn signing_failures_invalidate_the_cache_and_restart() {
    let mut h = Harness::new();
    h.catalog
        .set_formats("a", Err(CatalogError::Signing("n parameter".into())));

    h.open(video("a")).await;

    assert_eq!(
        h.catalog.count(|call| *call == CatalogCall::InvalidateSigning),
        1
    );
    assert!(h.runtime.has_pending_timer(TimerKind::RestartEngine));
    assert_eq!(h.surface.errors().len(), 1);
}

#[tokio::test]
async fn network_failures_retry_resolution() {
    let mut h = Harness::new();
    h.catalog
        .set_formats("a", Err(CatalogError::Network("reset".into())));
    h.open(video("a")).await;

    h.catalog.set_formats(
        "a",
        Ok(FormatInfo {
            video_id: "a".into(),
            url_list: vec![
                Url::parse("https://media.example/a.mp4").expect("url"),
            ],
            ..FormatInfo::default()
        }),
    );
    h.advance_ms(1_000).await;

    assert_eq!(h.catalog.resolve_count(&"a".into()), 2);
    assert_eq!(h.surface.opened().len(), 1);
}

#[tokio::test]
async fn buffering_stall_near_the_end_is_treated_as_ended() {
    let mut h = Harness::new();
    h.open(video("a")).await;
    h.load(0, 600_000).await;

    h.surface.set_progress(590_000, 600_000);
    h.dispatch(PlaybackEvent::Buffering);
    h.advance_ms(19_999).await;
    assert!(!h.surface.was_called(&SurfaceCall::ShowSuggestions(true)));

    h.advance_ms(1).await;
    assert!(h.surface.was_called(&SurfaceCall::ShowSuggestions(true)));
    assert!(h.surface.was_called(&SurfaceCall::SetPlayWhenReady(false)));

    let stored = h.stored("a").await.expect("final position saved");
    assert_eq!(stored.position_ms, 600_000);
}

#[tokio::test]
async fn playback_resuming_disarms_the_watchdog() {
    let mut h = Harness::new();
    h.open(video("a")).await;
    h.load(590_000, 600_000).await;

    h.dispatch(PlaybackEvent::Buffering);
    h.dispatch(PlaybackEvent::Play);
    h.advance_ms(30_000).await;

    assert!(!h.surface.was_called(&SurfaceCall::ShowSuggestions(true)));
}

#[tokio::test]
async fn close_policy_closes_the_surface() {
    let mut h = Harness::with_config(with_policy(RepeatPolicy::Close));
    h.open(video("a")).await;
    h.load(0, 600_000).await;

    h.dispatch(PlaybackEvent::PlayEnd);

    assert!(h.surface.was_called(&SurfaceCall::Close));
}

#[tokio::test]
async fn close_policy_keeps_the_surface_while_a_dialog_is_open() {
    let mut h = Harness::with_config(with_policy(RepeatPolicy::Close));
    h.open(video("a")).await;
    h.load(0, 600_000).await;
    h.surface.set_dialog_open(true);

    h.dispatch(PlaybackEvent::PlayEnd);

    assert!(!h.surface.was_called(&SurfaceCall::Close));
    assert!(h.surface.was_called(&SurfaceCall::SetPlayWhenReady(false)));
}

#[tokio::test]
async fn repeat_one_restarts_the_item() {
    let mut h = Harness::with_config(with_policy(RepeatPolicy::One));
    h.open(video("a")).await;
    h.load(0, 600_000).await;
    h.surface.clear_calls();

    h.dispatch(PlaybackEvent::PlayEnd);

    assert_eq!(
        h.surface.calls()[..2],
        [SurfaceCall::SetPosition(0), SurfaceCall::SetPlayWhenReady(true)]
    );
    assert_eq!(h.current_id().as_deref(), Some("a"));
}

#[tokio::test]
async fn queued_items_play_before_suggestions() {
    let mut h = Harness::with_config(with_policy(RepeatPolicy::Pause));
    h.open(video("a")).await;
    h.load(0, 600_000).await;

    h.dispatch(PlaybackEvent::Enqueue(video("q")));
    h.dispatch(PlaybackEvent::PlayEnd);
    h.settle().await;

    assert_eq!(h.current_id().as_deref(), Some("q"));
    assert_eq!(h.catalog.resolve_count(&"q".into()), 1);
}

#[tokio::test]
async fn unplayable_item_with_successor_is_skipped() {
    let mut h = Harness::new();
    h.catalog.set_formats(
        "a",
        Ok(FormatInfo {
            video_id: "a".into(),
            is_unplayable: true,
            status_message: Some("Video unavailable".into()),
            ..FormatInfo::default()
        }),
    );
    h.catalog.set_metadata(
        "a",
        Ok(Metadata {
            video: video("a"),
            suggestions: Vec::new(),
            next_video: Some(video("b")),
        }),
    );

    h.open(video("a")).await;
    assert_eq!(h.surface.errors().len(), 1);
    assert!(h.runtime.has_pending_timer(TimerKind::SkipUnplayable));

    h.advance_ms(5_000).await;
    assert_eq!(h.current_id().as_deref(), Some("b"));
    assert_eq!(h.surface.opened(), vec![dash_url("b")]);
}

#[tokio::test]
async fn age_restricted_items_ask_for_sign_in() {
    let mut h = Harness::new();
    h.catalog.set_formats(
        "a",
        Ok(FormatInfo {
            video_id: "a".into(),
            is_unplayable: true,
            is_age_restricted: true,
            ..FormatInfo::default()
        }),
    );

    h.open(video("a")).await;

    assert!(h.surface.was_called(&SurfaceCall::ShowSignIn));
    assert!(h.surface.errors().is_empty());
}

#[tokio::test]
async fn previous_restarts_past_the_threshold() {
    let mut h = Harness::new();
    h.open(video("a")).await;
    h.load(0, 600_000).await;
    h.surface.set_progress(45_000, 600_000);

    assert_eq!(h.session.previous_clicked(), Handled::Yes);
    assert_eq!(h.surface.calls().last(), Some(&SurfaceCall::SetPosition(0)));
}

#[tokio::test]
async fn previous_returns_to_the_prior_queue_item() {
    let mut h = Harness::new();
    h.open(video("a")).await;
    h.open(video("b")).await;
    h.load(1_000, 600_000).await;

    assert_eq!(h.session.previous_clicked(), Handled::Yes);
    h.settle().await;

    assert_eq!(h.current_id().as_deref(), Some("a"));
}

#[tokio::test]
async fn next_at_the_end_of_the_line_shows_suggestions() {
    let mut h = Harness::new();
    h.open(video("a")).await;
    h.load(0, 600_000).await;

    assert_eq!(h.session.next_clicked(), Handled::Yes);
    assert!(h.surface.was_called(&SurfaceCall::ShowSuggestions(true)));
}

#[tokio::test]
async fn rejected_stream_urls_ask_the_catalog_for_a_fix() {
    let mut h = Harness::new();
    h.open(video("a")).await;
    h.load(0, 600_000).await;

    h.dispatch(PlaybackEvent::EngineError(
        ErrorEvent::new(ErrorKind::Source, TrackChannel::Unknown)
            .with_message("Response code: 403"),
    ));

    assert_eq!(
        h.catalog.count(|call| *call == CatalogCall::PlaybackFix),
        1
    );
    assert!(h.runtime.has_pending_timer(TimerKind::RestartEngine));
}

#[tokio::test]
async fn streams_without_sources_yet_reload_later() {
    let mut h = Harness::new();
    h.catalog.set_formats(
        "a",
        Ok(FormatInfo {
            video_id: "a".into(),
            ..FormatInfo::default()
        }),
    );

    h.open(video("a")).await;

    assert!(h.surface.opened().is_empty());
    assert!(h.surface.was_called(&SurfaceCall::ShowMetadata("a".into())));
    assert!(h.runtime.has_pending_timer(TimerKind::ReloadVideo));

    h.advance_ms(29_999).await;
    assert_eq!(h.catalog.resolve_count(&"a".into()), 1);
    h.advance_ms(1).await;
    assert_eq!(h.catalog.resolve_count(&"a".into()), 2);
}

#[tokio::test]
async fn successor_is_polled_until_the_catalog_names_one() {
    let mut h = Harness::new();
    h.catalog
        .set_metadata("a", Err(CatalogError::Network("timeout".into())));
    h.open(video("a")).await;
    h.load(0, 600_000).await;

    h.dispatch(PlaybackEvent::PlayEnd);
    assert!(h.runtime.has_pending_timer(TimerKind::NextPoll));
    h.settle().await;
    assert_eq!(h.current_id().as_deref(), Some("a"));

    h.catalog.set_metadata("a", Ok(metadata("a", Some(video("b")))));
    h.advance_ms(1_000).await;

    assert_eq!(metadata_fetches(&h, "a"), 3);
    assert_eq!(h.current_id().as_deref(), Some("b"));
}

#[tokio::test]
async fn shuffle_picks_another_member_of_the_group() {
    let mut h = Harness::with_config(with_policy(RepeatPolicy::Shuffle));
    let mut playlist = VideoGroup::new("pl", GroupKind::Playlist);
    playlist.videos = vec![video("a"), video("x")];
    h.catalog.set_metadata(
        "a",
        Ok(Metadata {
            suggestions: vec![playlist],
            ..metadata("a", None)
        }),
    );
    h.open(video("a")).await;
    h.load(0, 600_000).await;

    h.dispatch(PlaybackEvent::PlayEnd);
    h.settle().await;

    assert_eq!(h.current_id().as_deref(), Some("x"));
}

#[tokio::test]
async fn stepping_back_does_not_count_as_queued() {
    let mut h = Harness::with_config(with_policy(RepeatPolicy::Close));
    h.open(video("a")).await;
    h.open(video("b")).await;
    h.load(1_000, 600_000).await;

    assert_eq!(h.session.previous_clicked(), Handled::Yes);
    h.settle().await;
    h.load(0, 600_000).await;
    h.dispatch(PlaybackEvent::PlayEnd);

    assert!(h.surface.was_called(&SurfaceCall::Close));
    assert_eq!(h.current_id().as_deref(), Some("a"));
}
