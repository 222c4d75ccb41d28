//! State patches: the replayable output of running a command.
//!
//! A patch never reads the state it is applied to beyond what it replaces,
//! so the same list can be replayed onto the unpatched editor and onto a
//! separate patched projection.

use crate::editor_state::{CssCursor, EditorState, ElementsToRerender, Notice};
use std::sync::Arc;
use ve_core::project::ProjectFile;
use ve_core::ElementPath;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorStatePatch {
    /// Replace one file of the project contents.
    UpdateFile { path: String, file: Box<ProjectFile> },
    SetCursor(Option<CssCursor>),
    SetHighlightedViews(Vec<ElementPath>),
    SetSelectedViews(Vec<ElementPath>),
    SetElementsToRerender(ElementsToRerender),
    AppendElementsToRerender(Vec<ElementPath>),
    AddReparentedToPaths(Vec<ElementPath>),
    AddToast(Notice),
}

impl EditorStatePatch {
    pub fn apply(&self, editor: &mut EditorState) {
        match self {
            Self::UpdateFile { path, file } => {
                Arc::make_mut(&mut editor.project_contents).insert(path, (**file).clone());
            }
            Self::SetCursor(cursor) => editor.canvas.cursor = *cursor,
            Self::SetHighlightedViews(paths) => editor.highlighted_views = paths.clone(),
            Self::SetSelectedViews(paths) => editor.selected_views = paths.clone(),
            Self::SetElementsToRerender(value) => editor.canvas.elements_to_rerender = value.clone(),
            Self::AppendElementsToRerender(paths) => {
                editor.canvas.elements_to_rerender = editor.canvas.elements_to_rerender.append(paths);
            }
            Self::AddReparentedToPaths(paths) => {
                editor.canvas.reparented_to_paths.extend(paths.iter().cloned());
            }
            Self::AddToast(notice) => editor.add_toast(notice.clone()),
        }
    }
}

/// Replay `patches` onto a copy of `editor`.
pub fn apply_patches(editor: &EditorState, patches: &[EditorStatePatch]) -> EditorState {
    let mut out = editor.clone();
    for patch in patches {
        patch.apply(&mut out);
    }
    out
}
