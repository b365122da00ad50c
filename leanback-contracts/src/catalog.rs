use crate::error::CatalogResult;
use async_trait::async_trait;
use leanback_model::{
    DashManifest, FormatInfo, Metadata, MetadataRequest, Page, VideoGroup,
    VideoId,
};
use std::fmt::Debug;

/// Remote catalog/service client.
///
/// Every async call is awaited on a background task and may be dropped
/// mid-flight when the caller cancels it.
#[async_trait]
pub trait CatalogClient: Send + Sync + Debug {
    /// Resolve the stream formats available for a video.
    async fn resolve_formats(&self, video_id: &VideoId)
    -> CatalogResult<FormatInfo>;

    /// Build a DASH manifest from previously resolved formats.
    async fn resolve_manifest(
        &self,
        formats: &FormatInfo,
    ) -> CatalogResult<DashManifest>;

    /// Fetch item metadata, ranked suggestion groups and the successor hint.
    async fn fetch_metadata(
        &self,
        request: &MetadataRequest,
    ) -> CatalogResult<Metadata>;

    /// Fetch the page following the group's continuation token.
    async fn continue_page(&self, group: &VideoGroup) -> CatalogResult<Page>;

    /// Report the server-side "last position" for watch history.
    async fn push_history_position(
        &self,
        video_id: &VideoId,
        position_secs: f64,
    ) -> CatalogResult<()>;

    /// Drop cached signature/cipher data so the next resolution recomputes it.
    fn invalidate_signing_cache(&self);

    /// Ask the client to switch to its alternate "no playback" workaround.
    fn request_playback_fix(&self);
}
