//! Project change sets handed to the sync channels.

use crate::editor_state::EditorState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ve_core::ElementPath;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectChanges {
    pub changed_files: BTreeSet<String>,
    pub removed_files: BTreeSet<String>,
    /// New selection, when it changed and the change should be mirrored.
    pub selected_changed: Option<Vec<ElementPath>>,
}

impl ProjectChanges {
    pub fn is_empty(&self) -> bool {
        self.changed_files.is_empty() && self.removed_files.is_empty() && self.selected_changed.is_none()
    }

    /// `later` applied on top of `self`.
    pub fn combine(mut self, later: ProjectChanges) -> ProjectChanges {
        for file in later.changed_files {
            self.removed_files.remove(&file);
            self.changed_files.insert(file);
        }
        for file in later.removed_files {
            self.changed_files.remove(&file);
            self.removed_files.insert(file);
        }
        if later.selected_changed.is_some() {
            self.selected_changed = later.selected_changed;
        }
        self
    }
}

/// Differences between two editors. Selection changes are left out when
/// `suppress_selection` is set (code-editor or worker-only batches).
pub fn get_project_changes(old: &EditorState, new: &EditorState, suppress_selection: bool) -> ProjectChanges {
    let mut changes = ProjectChanges::default();
    if !std::sync::Arc::ptr_eq(&old.project_contents, &new.project_contents) {
        for (path, file) in new.project_contents.files() {
            if old.project_contents.get(path) != Some(file) {
                changes.changed_files.insert(path.to_string());
            }
        }
        for path in old.project_contents.paths() {
            if new.project_contents.get(path).is_none() {
                changes.removed_files.insert(path.to_string());
            }
        }
    }
    if !suppress_selection && old.selected_views != new.selected_views {
        changes.selected_changed = Some(new.selected_views.clone());
    }
    changes
}
