//! Suggestion-row continuation.
//!
//! Groups grow in place inside the session's [`GroupRegistry`]; the overlay
//! is handed a filtered copy after every page. At most one page fetch is in
//! flight per group.
//!
//! [`GroupRegistry`]: crate::session::GroupRegistry

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use leanback_config::PaginationConfig;
use leanback_contracts::CatalogClient;
use leanback_model::{GroupId, GroupRef, Metadata, Page, Video, VideoGroup};
use tracing::{debug, trace, warn};

use crate::bridge::{Completion, DispatchContext, PlaybackHandler};
use crate::error::HandlerResult;
use crate::runtime::{TaskHandle, TaskId, TaskRuntime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinueOutcome {
    Started,
    /// A fetch for this group is still outstanding.
    AlreadyInFlight,
    /// The group has no continuation token left.
    Exhausted,
    UnknownGroup,
}

#[derive(Debug)]
pub struct PaginationLoader {
    catalog: Arc<dyn CatalogClient>,
    runtime: Arc<dyn TaskRuntime>,
    config: PaginationConfig,
    in_flight: HashMap<GroupId, TaskHandle>,
    serial: Option<u64>,
}

impl PaginationLoader {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        runtime: Arc<dyn TaskRuntime>,
        config: PaginationConfig,
    ) -> Self {
        Self {
            catalog,
            runtime,
            config,
            in_flight: HashMap::new(),
            serial: None,
        }
    }

    pub fn is_in_flight(&self, group_id: &GroupId) -> bool {
        self.in_flight.contains_key(group_id)
    }

    /// Fetch the next page of a registered group.
    pub fn continue_group(
        &mut self,
        group_id: &GroupId,
        ctx: &mut DispatchContext<'_>,
    ) -> ContinueOutcome {
        if self.in_flight.contains_key(group_id) {
            trace!(
                target: "playback::pagination",
                group_id = %group_id,
                "continuation already in flight"
            );
            return ContinueOutcome::AlreadyInFlight;
        }
        let Some(group) = ctx.session().groups.get(group_id) else {
            return ContinueOutcome::UnknownGroup;
        };
        if !group.has_more() {
            return ContinueOutcome::Exhausted;
        }

        let catalog = Arc::clone(&self.catalog);
        let snapshot = group.clone();
        let handle = self.runtime.spawn(
            "continue_page",
            async move {
                let result = catalog.continue_page(&snapshot).await;
                Completion::Page {
                    group_id: snapshot.id,
                    result,
                }
            }
            .boxed(),
        );
        debug!(
            target: "playback::pagination",
            group_id = %group_id,
            task = %handle.id(),
            "continuing group"
        );
        self.in_flight.insert(group_id.clone(), handle);
        ContinueOutcome::Started
    }

    pub fn cancel_all(&mut self) {
        for (_, handle) in self.in_flight.drain() {
            handle.cancel();
        }
    }

    fn visible(&self, group: &VideoGroup) -> VideoGroup {
        let mut filtered = group.clone();
        filtered.videos.retain(|video| self.is_visible(video));
        filtered
    }

    fn is_visible(&self, video: &Video) -> bool {
        !(self.config.hide_shorts && video.is_shorts)
            && !(self.config.hide_watched && video.is_fully_watched())
    }

    fn needs_more(&self, visible: usize, fetched: usize) -> bool {
        if visible < self.config.min_visible_items {
            return true;
        }
        fetched > 0
            && (visible as f32 / fetched as f32) < self.config.min_density
    }

    /// Push the group's filtered contents to the overlay and keep paging
    /// while the row looks too thin.
    fn show_and_top_up(
        &mut self,
        group_id: &GroupId,
        ctx: &mut DispatchContext<'_>,
    ) {
        let Some(group) = ctx.session().groups.get(group_id) else {
            return;
        };
        let shown = self.visible(group);
        let fetched = group.len();
        let has_more = group.has_more();

        if let Some(surface) = ctx.surface() {
            surface.update_group(&shown);
        }
        if has_more && self.needs_more(shown.len(), fetched) {
            trace!(
                target: "playback::pagination",
                group_id = %group_id,
                visible = shown.len(),
                fetched,
                "row too thin; continuing"
            );
            self.continue_group(group_id, ctx);
        }
    }

    fn on_page(
        &mut self,
        group_id: &GroupId,
        page: &Page,
        ctx: &mut DispatchContext<'_>,
    ) {
        let Some(group) = ctx.session_mut().groups.get_mut(group_id) else {
            return;
        };
        group.append(page.videos.clone(), page.continuation.clone());
        debug!(
            target: "playback::pagination",
            group_id = %group_id,
            added = page.videos.len(),
            total = group.len(),
            exhausted = !group.has_more(),
            "page appended"
        );
        self.show_and_top_up(group_id, ctx);
    }
}

impl PlaybackHandler for PaginationLoader {
    fn name(&self) -> &'static str {
        "pagination_loader"
    }

    fn on_new_video(
        &mut self,
        _video: &Video,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        let serial = ctx.session().serial();
        if self.serial != Some(serial) {
            self.serial = Some(serial);
            self.cancel_all();
        }
        Ok(())
    }

    fn on_view_detached(
        &mut self,
        _ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        self.cancel_all();
        Ok(())
    }

    fn on_metadata_loaded(
        &mut self,
        metadata: &Metadata,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        let mut ids = Vec::with_capacity(metadata.suggestions.len());
        for group in &metadata.suggestions {
            let registered = ctx.session_mut().groups.register(group.clone());
            ids.push(GroupRef {
                id: registered.id.clone(),
                kind: registered.kind,
            });
        }

        // Link the playing item to the bounded row it appears in so
        // previous/reverse/shuffle can walk it.
        let session = ctx.session_mut();
        if let Some(current_id) = session.current_id().cloned() {
            let home = ids
                .iter()
                .filter(|group| group.kind.is_bounded())
                .find(|group| {
                    session
                        .groups
                        .get(&group.id)
                        .is_some_and(|g| g.position_of(&current_id).is_some())
                })
                .cloned();
            if let (Some(home), Some(current)) = (home, session.current_mut())
                && current.group.is_none()
            {
                current.group = Some(home);
            }
        }

        for group in &ids {
            self.show_and_top_up(&group.id, ctx);
        }
        Ok(())
    }

    fn on_continue_group(
        &mut self,
        group_id: &GroupId,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        self.continue_group(group_id, ctx);
        Ok(())
    }

    fn on_completed(
        &mut self,
        task: TaskId,
        completion: &Completion,
        ctx: &mut DispatchContext<'_>,
    ) -> HandlerResult {
        let Completion::Page { group_id, result } = completion else {
            return Ok(());
        };
        if !self
            .in_flight
            .get(group_id)
            .is_some_and(|handle| handle.id() == task)
        {
            trace!(target: "playback::pagination", %task, "stale page");
            return Ok(());
        }
        self.in_flight.remove(group_id);

        match result {
            Ok(page) => self.on_page(group_id, page, ctx),
            Err(err) => warn!(
                target: "playback::pagination",
                group_id = %group_id,
                error = %err,
                "continuation failed"
            ),
        }
        Ok(())
    }
}
