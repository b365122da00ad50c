use std::collections::HashMap;

use leanback_model::{GroupId, GroupRef, Video, VideoGroup};
use rand::seq::IndexedRandom;

/// Owner of every group loaded during a session, keyed by id.
///
/// Videos only carry a [`GroupRef`]; walking a group (previous member,
/// random member, continuation) goes through here.
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    groups: HashMap<GroupId, VideoGroup>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Insert or replace a group, linking each member back to it.
    pub fn register(&mut self, group: VideoGroup) -> &VideoGroup {
        let VideoGroup {
            id,
            kind,
            title,
            videos,
            continuation,
        } = group;

        let mut linked = VideoGroup::new(id.clone(), kind);
        linked.title = title;
        let videos = videos
            .into_iter()
            .map(|mut video| {
                video.group = None;
                video
            })
            .collect();
        linked.append(videos, continuation);

        self.groups.insert(id.clone(), linked);
        &self.groups[&id]
    }

    pub fn get(&self, id: &GroupId) -> Option<&VideoGroup> {
        self.groups.get(id)
    }

    pub fn get_mut(&mut self, id: &GroupId) -> Option<&mut VideoGroup> {
        self.groups.get_mut(id)
    }

    pub fn resolve(&self, group: &GroupRef) -> Option<&VideoGroup> {
        self.groups.get(&group.id)
    }

    /// Member before `video` in its group, if it has one.
    pub fn previous_of(&self, video: &Video) -> Option<&Video> {
        let group = self.resolve(video.group.as_ref()?)?;
        let index = group.position_of(&video.id)?;
        group.get(index.checked_sub(1)?)
    }

    /// A random member of `video`'s group other than `video` itself.
    pub fn random_member(&self, video: &Video) -> Option<&Video> {
        let group = self.resolve(video.group.as_ref()?)?;
        let candidates: Vec<&Video> = group
            .videos
            .iter()
            .filter(|member| member.id != video.id)
            .collect();
        candidates.choose(&mut rand::rng()).copied()
    }
}
