use std::fmt::Debug;

use leanback_model::{ErrorEvent, GroupId, KeyInput, Metadata, Video};

use super::{Completion, DispatchContext, Handled, TimerKind};
use crate::error::HandlerResult;
use crate::runtime::TaskId;

/// A behavior module registered with the [`EventBridge`](super::EventBridge).
///
/// Every method defaults to a no-op so a handler only implements the events
/// it cares about. Broadcast methods return `()`; chain methods return
/// whether the handler claimed the input.
pub trait PlaybackHandler: Send + Debug {
    fn name(&self) -> &'static str;

    fn on_init(&mut self, _ctx: &mut DispatchContext<'_>) -> HandlerResult {
        Ok(())
    }

    fn on_new_video(
        &mut self,
        _video: &Video,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        Ok(())
    }

    fn on_view_attached(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        Ok(())
    }

    fn on_view_detached(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        Ok(())
    }

    fn on_engine_initialized(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        Ok(())
    }

    fn on_engine_released(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        Ok(())
    }

    fn on_engine_error(
        &mut self,
        _error: &ErrorEvent,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        Ok(())
    }

    fn on_video_loaded(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        Ok(())
    }

    fn on_play(&mut self, _ctx: &mut DispatchContext<'_>) -> HandlerResult {
        Ok(())
    }

    fn on_pause(&mut self, _ctx: &mut DispatchContext<'_>) -> HandlerResult {
        Ok(())
    }

    fn on_seek_end(&mut self, _ctx: &mut DispatchContext<'_>) -> HandlerResult {
        Ok(())
    }

    fn on_play_end(&mut self, _ctx: &mut DispatchContext<'_>) -> HandlerResult {
        Ok(())
    }

    fn on_buffering(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        Ok(())
    }

    fn on_tracks_changed(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        Ok(())
    }

    fn on_speed_changed(
        &mut self,
        _speed: f32,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        Ok(())
    }

    fn on_tickle(&mut self, _ctx: &mut DispatchContext<'_>) -> HandlerResult {
        Ok(())
    }

    fn on_metadata_loaded(
        &mut self,
        _metadata: &Metadata,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        Ok(())
    }

    fn on_suggestion_clicked(
        &mut self,
        _video: &Video,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        Ok(())
    }

    fn on_enqueue(
        &mut self,
        _video: &Video,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        Ok(())
    }

    fn on_continue_group(
        &mut self,
        _group_id: &GroupId,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        Ok(())
    }

    fn on_timer(
        &mut self,
        _task: TaskId,
        _timer: TimerKind,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        Ok(())
    }

    fn on_completed(
        &mut self,
        _task: TaskId,
        _completion: &Completion,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        Ok(())
    }

    fn on_key_down(
        &mut self,
        _key: KeyInput,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult<Handled> {
        Ok(Handled::No)
    }

    fn on_previous_clicked(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult<Handled> {
        Ok(Handled::No)
    }

    fn on_next_clicked(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult<Handled> {
        Ok(Handled::No)
    }
}
