//! Memo of parsed element paths, culled when source UIDs disappear.

use std::collections::HashMap;
use std::sync::Arc;
use ve_core::{CoreResult, ElementPath, ProjectContents};

#[derive(Debug, Clone, Default)]
pub struct ElementPathCache {
    paths: HashMap<String, ElementPath>,
    /// Contents to cull against on the next idle run.
    pending_cull: Option<Arc<ProjectContents>>,
}

impl ElementPathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Cached parse of `s`. Entries may be stale until the next cull.
    pub fn get_or_parse(&mut self, s: &str) -> CoreResult<ElementPath> {
        if let Some(path) = self.paths.get(s) {
            return Ok(path.clone());
        }
        let path = ElementPath::parse(s)?;
        self.paths.insert(s.to_string(), path.clone());
        Ok(path)
    }

    /// Remember `contents` for the next cull. A later call replaces an
    /// earlier one that has not run yet.
    pub fn schedule_cull(&mut self, contents: Arc<ProjectContents>) {
        self.pending_cull = Some(contents);
    }

    pub fn is_cull_pending(&self) -> bool {
        self.pending_cull.is_some()
    }

    /// Drop every cached path that mentions a UID no longer in the source.
    /// Returns how many entries were removed.
    pub fn run_pending_cull(&mut self) -> usize {
        let Some(contents) = self.pending_cull.take() else {
            return 0;
        };
        let existing = contents.all_unique_uids().all;
        let before = self.paths.len();
        self.paths
            .retain(|_, path| path.all_uids().all(|uid| existing.contains(&uid.static_part())));
        let removed = before - self.paths.len();
        log::debug!("element path cache cull removed {removed} of {before}");
        removed
    }
}
