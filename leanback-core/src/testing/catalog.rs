use std::collections::{HashMap, VecDeque};
use std::fmt;

use async_trait::async_trait;
use leanback_contracts::{CatalogClient, CatalogResult};
use leanback_model::{
    DashManifest, FormatInfo, GroupId, Metadata, MetadataRequest, Page, Video,
    VideoGroup, VideoId,
};
use parking_lot::Mutex;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogCall {
    ResolveFormats(VideoId),
    ResolveManifest(VideoId),
    FetchMetadata(VideoId),
    ContinuePage(GroupId),
    PushHistory { video_id: VideoId, position_secs: f64 },
    InvalidateSigning,
    PlaybackFix,
}

#[derive(Default)]
struct Inner {
    formats: HashMap<VideoId, CatalogResult<FormatInfo>>,
    metadata: HashMap<VideoId, CatalogResult<Metadata>>,
    pages: HashMap<GroupId, VecDeque<CatalogResult<Page>>>,
    calls: Vec<CatalogCall>,
}

/// Scripted [`CatalogClient`] that logs every call.
///
/// Unscripted videos resolve to a DASH manifest URL and empty metadata;
/// unscripted groups answer with an empty final page.
#[derive(Default)]
pub struct RecordingCatalog {
    inner: Mutex<Inner>,
}

impl RecordingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Formats that open straight from a DASH manifest URL.
    pub fn dash_formats(video_id: &VideoId) -> FormatInfo {
        FormatInfo {
            video_id: video_id.clone(),
            dash_manifest_url: Url::parse(&format!(
                "https://media.example/{}/manifest.mpd",
                video_id.as_str()
            ))
            .ok(),
            ..FormatInfo::default()
        }
    }

    pub fn set_formats(
        &self,
        video_id: impl Into<VideoId>,
        result: CatalogResult<FormatInfo>,
    ) {
        self.inner.lock().formats.insert(video_id.into(), result);
    }

    pub fn set_metadata(
        &self,
        video_id: impl Into<VideoId>,
        result: CatalogResult<Metadata>,
    ) {
        self.inner.lock().metadata.insert(video_id.into(), result);
    }

    /// Queue the next answer for `continue_page` on a group.
    pub fn push_page(
        &self,
        group_id: impl Into<GroupId>,
        result: CatalogResult<Page>,
    ) {
        self.inner
            .lock()
            .pages
            .entry(group_id.into())
            .or_default()
            .push_back(result);
    }

    pub fn calls(&self) -> Vec<CatalogCall> {
        self.inner.lock().calls.clone()
    }

    pub fn resolve_count(&self, video_id: &VideoId) -> usize {
        self.count(|call| {
            matches!(call, CatalogCall::ResolveFormats(id) if id == video_id)
        })
    }

    pub fn page_requests(&self, group_id: &GroupId) -> usize {
        self.count(|call| {
            matches!(call, CatalogCall::ContinuePage(id) if id == group_id)
        })
    }

    pub fn history_pushes(&self) -> Vec<(VideoId, f64)> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                CatalogCall::PushHistory {
                    video_id,
                    position_secs,
                } => Some((video_id.clone(), *position_secs)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&CatalogCall) -> bool) -> usize {
        self.inner.lock().calls.iter().filter(|call| predicate(call)).count()
    }

    fn record(&self, call: CatalogCall) {
        self.inner.lock().calls.push(call);
    }
}

impl fmt::Debug for RecordingCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(inner) => f
                .debug_struct("RecordingCatalog")
                .field("calls", &inner.calls.len())
                .finish(),
            None => f.write_str("RecordingCatalog { <locked> }"),
        }
    }
}

#[async_trait]
impl CatalogClient for RecordingCatalog {
    async fn resolve_formats(
        &self,
        video_id: &VideoId,
    ) -> CatalogResult<FormatInfo> {
        let mut inner = self.inner.lock();
        inner.calls.push(CatalogCall::ResolveFormats(video_id.clone()));
        inner
            .formats
            .get(video_id)
            .cloned()
            .unwrap_or_else(|| Ok(Self::dash_formats(video_id)))
    }

    async fn resolve_manifest(
        &self,
        formats: &FormatInfo,
    ) -> CatalogResult<DashManifest> {
        self.record(CatalogCall::ResolveManifest(formats.video_id.clone()));
        Ok(DashManifest {
            video_id: formats.video_id.clone(),
            mpd: format!("<MPD id=\"{}\"/>", formats.video_id.as_str()),
        })
    }

    async fn fetch_metadata(
        &self,
        request: &MetadataRequest,
    ) -> CatalogResult<Metadata> {
        let mut inner = self.inner.lock();
        inner
            .calls
            .push(CatalogCall::FetchMetadata(request.video_id.clone()));
        inner
            .metadata
            .get(&request.video_id)
            .cloned()
            .unwrap_or_else(|| {
                Ok(Metadata {
                    video: Video::new(request.video_id.clone(), ""),
                    suggestions: Vec::new(),
                    next_video: None,
                })
            })
    }

    async fn continue_page(&self, group: &VideoGroup) -> CatalogResult<Page> {
        let mut inner = self.inner.lock();
        inner.calls.push(CatalogCall::ContinuePage(group.id.clone()));
        inner
            .pages
            .get_mut(&group.id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(Page::default()))
    }

    async fn push_history_position(
        &self,
        video_id: &VideoId,
        position_secs: f64,
    ) -> CatalogResult<()> {
        self.record(CatalogCall::PushHistory {
            video_id: video_id.clone(),
            position_secs,
        });
        Ok(())
    }

    fn invalidate_signing_cache(&self) {
        self.record(CatalogCall::InvalidateSigning);
    }

    fn request_playback_fix(&self) {
        self.record(CatalogCall::PlaybackFix);
    }
}
