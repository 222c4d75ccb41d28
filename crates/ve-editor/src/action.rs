//! Editor actions: the closed set of inputs the dispatcher accepts.
//!
//! Three variants only wrap other actions (`Atomic`, `TransientActions`,
//! `MergeWithPrevUndo`). Reducers never see them; [`flatten`] unpacks them
//! first.

use crate::collaborators::{LoginState, WorkerUpdate};
use crate::commands::Command;
use crate::editor_state::{EditorMode, GithubSettings, Notice};
use crate::interaction::{InteractionSessionStart, InteractionUpdate};
use ve_core::metadata::{AllElementProps, DomMetadata, SpyMetadata};
use ve_core::{ElementPath, ProjectContents};

#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    // ─── Composite ───────────────────────────────────────────────────────
    Atomic(Vec<EditorAction>),
    /// Applied like any other actions, but never saved or added to history.
    TransientActions(Vec<EditorAction>),
    /// Folded into the latest history entry instead of adding a new one.
    MergeWithPrevUndo(Vec<EditorAction>),

    // ─── History ─────────────────────────────────────────────────────────
    Undo,
    Redo,
    TruncateHistory,

    // ─── Project ─────────────────────────────────────────────────────────
    Load {
        project_name: String,
        id: Option<String>,
        contents: ProjectContents,
    },
    SetProjectName(String),
    SetProjectId(String),
    SaveCurrentFile,
    UpdateFromCodeEditor {
        path: String,
        saved_content: String,
        /// `None` when the editor buffer matches what is on disk.
        unsaved_content: Option<String>,
    },
    UpdateFromWorker(Vec<WorkerUpdate>),
    ClearParseOrPrintInFlight,
    UpdateFilePath {
        old_path: String,
        new_path: String,
    },
    UpdateGithubSettings(GithubSettings),
    FinishCheckpointTimer,
    ApplyCommands(Vec<Command>),

    // ─── Selection and navigator ─────────────────────────────────────────
    SelectComponents {
        targets: Vec<ElementPath>,
        add_to_selection: bool,
    },
    ClearSelection,
    SetHighlightedViews(Vec<ElementPath>),
    SetHoveredViews(Vec<ElementPath>),
    ToggleCollapse(ElementPath),
    ToggleHidden(ElementPath),
    SwitchEditorMode(EditorMode),

    // ─── Canvas ──────────────────────────────────────────────────────────
    /// Fresh measurements. `None` leaves that part as it is.
    UpdateMetadata {
        dom: Option<DomMetadata>,
        spy: Option<SpyMetadata>,
        all_element_props: Option<AllElementProps>,
    },
    CreateInteractionSession(InteractionSessionStart),
    UpdateInteractionSession(InteractionUpdate),
    ClearInteractionSession {
        apply_changes: bool,
    },
    SetUsersPreferredStrategy(String),

    // ─── Shell ───────────────────────────────────────────────────────────
    AddToast(Notice),
    RemoveToast(String),
    SetLoginState(LoginState),
    SetVscodeReady(bool),
    SendPreviewModel,
}

impl EditorAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Atomic(_) => "ATOMIC",
            Self::TransientActions(_) => "TRANSIENT_ACTIONS",
            Self::MergeWithPrevUndo(_) => "MERGE_WITH_PREV_UNDO",
            Self::Undo => "UNDO",
            Self::Redo => "REDO",
            Self::TruncateHistory => "TRUNCATE_HISTORY",
            Self::Load { .. } => "LOAD",
            Self::SetProjectName(_) => "SET_PROJECT_NAME",
            Self::SetProjectId(_) => "SET_PROJECT_ID",
            Self::SaveCurrentFile => "SAVE_CURRENT_FILE",
            Self::UpdateFromCodeEditor { .. } => "UPDATE_FROM_CODE_EDITOR",
            Self::UpdateFromWorker(_) => "UPDATE_FROM_WORKER",
            Self::ClearParseOrPrintInFlight => "CLEAR_PARSE_OR_PRINT_IN_FLIGHT",
            Self::UpdateFilePath { .. } => "UPDATE_FILE_PATH",
            Self::UpdateGithubSettings(_) => "UPDATE_GITHUB_SETTINGS",
            Self::FinishCheckpointTimer => "FINISH_CHECKPOINT_TIMER",
            Self::ApplyCommands(_) => "APPLY_COMMANDS",
            Self::SelectComponents { .. } => "SELECT_COMPONENTS",
            Self::ClearSelection => "CLEAR_SELECTION",
            Self::SetHighlightedViews(_) => "SET_HIGHLIGHTED_VIEWS",
            Self::SetHoveredViews(_) => "SET_HOVERED_VIEWS",
            Self::ToggleCollapse(_) => "TOGGLE_COLLAPSE",
            Self::ToggleHidden(_) => "TOGGLE_HIDDEN",
            Self::SwitchEditorMode(_) => "SWITCH_EDITOR_MODE",
            Self::UpdateMetadata { .. } => "UPDATE_METADATA",
            Self::CreateInteractionSession(_) => "CREATE_INTERACTION_SESSION",
            Self::UpdateInteractionSession(_) => "UPDATE_INTERACTION_SESSION",
            Self::ClearInteractionSession { .. } => "CLEAR_INTERACTION_SESSION",
            Self::SetUsersPreferredStrategy(_) => "SET_USERS_PREFERRED_STRATEGY",
            Self::AddToast(_) => "ADD_TOAST",
            Self::RemoveToast(_) => "REMOVE_TOAST",
            Self::SetLoginState(_) => "SET_LOGIN_STATE",
            Self::SetVscodeReady(_) => "SET_VSCODE_READY",
            Self::SendPreviewModel => "SEND_PREVIEW_MODEL",
        }
    }

    /// Actions that never change anything worth saving or undoing.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Atomic(actions) | Self::MergeWithPrevUndo(actions) => actions.iter().all(Self::is_transient),
            Self::TransientActions(_)
            | Self::SetHighlightedViews(_)
            | Self::SetHoveredViews(_)
            | Self::UpdateMetadata { .. }
            | Self::CreateInteractionSession(_)
            | Self::UpdateInteractionSession(_)
            | Self::ClearInteractionSession { apply_changes: false }
            | Self::SetUsersPreferredStrategy(_)
            | Self::AddToast(_)
            | Self::RemoveToast(_)
            | Self::SetLoginState(_)
            | Self::UpdateFromWorker(_)
            | Self::ClearParseOrPrintInFlight
            | Self::SendPreviewModel
            | Self::SetVscodeReady(_) => true,
            _ => false,
        }
    }

    pub fn is_undo_or_redo(&self) -> bool {
        matches!(self, Self::Undo | Self::Redo)
    }

    pub fn is_from_code_editor(&self) -> bool {
        matches!(self, Self::UpdateFromCodeEditor { .. })
    }

    pub fn is_worker_update(&self) -> bool {
        matches!(self, Self::UpdateFromWorker(_))
    }

    pub fn is_load(&self) -> bool {
        matches!(self, Self::Load { .. })
    }

    /// Actions that must be saved right away.
    pub fn forces_save(&self) -> bool {
        match self {
            Self::SetProjectName(_) | Self::SetProjectId(_) | Self::SaveCurrentFile => true,
            Self::UpdateFromCodeEditor { unsaved_content, .. } => unsaved_content.is_none(),
            _ => false,
        }
    }
}

/// Every leaf action in order, with composite wrappers unpacked.
pub fn flatten(actions: &[EditorAction]) -> Vec<&EditorAction> {
    let mut out = Vec::with_capacity(actions.len());
    for action in actions {
        match action {
            EditorAction::Atomic(inner)
            | EditorAction::TransientActions(inner)
            | EditorAction::MergeWithPrevUndo(inner) => out.extend(flatten(inner)),
            leaf => out.push(leaf),
        }
    }
    out
}

/// Whether the batch was entirely wrapped in `MergeWithPrevUndo`.
pub fn all_merge_with_prev_undo(actions: &[EditorAction]) -> bool {
    !actions.is_empty() && actions.iter().all(|a| matches!(a, EditorAction::MergeWithPrevUndo(_)))
}

/// Comma-separated names, for log lines and diagnostics.
pub fn simple_action_names(actions: &[EditorAction]) -> String {
    actions.iter().map(|a| a.name()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ve_core::path::path;

    #[test]
    fn flatten_unpacks_every_wrapper() {
        let actions = vec![
            EditorAction::MergeWithPrevUndo(vec![EditorAction::Atomic(vec![
                EditorAction::ClearSelection,
                EditorAction::TransientActions(vec![EditorAction::SetHighlightedViews(vec![])]),
            ])]),
            EditorAction::Undo,
        ];
        let names: Vec<&str> = flatten(&actions).iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["CLEAR_SELECTION", "SET_HIGHLIGHTED_VIEWS", "UNDO"]);
    }

    #[test]
    fn transience() {
        assert!(EditorAction::SetHoveredViews(vec![path("sb/a")]).is_transient());
        assert!(EditorAction::ClearInteractionSession { apply_changes: false }.is_transient());
        assert!(!EditorAction::ClearInteractionSession { apply_changes: true }.is_transient());
        assert!(
            !EditorAction::SelectComponents {
                targets: vec![],
                add_to_selection: false
            }
            .is_transient()
        );
        assert!(EditorAction::Atomic(vec![EditorAction::SendPreviewModel]).is_transient());
        assert!(!EditorAction::Atomic(vec![EditorAction::SendPreviewModel, EditorAction::Undo]).is_transient());
    }

    #[test]
    fn code_editor_saves_force_only_when_clean() {
        let clean = EditorAction::UpdateFromCodeEditor {
            path: "/app.js".into(),
            saved_content: "x".into(),
            unsaved_content: None,
        };
        let dirty = EditorAction::UpdateFromCodeEditor {
            path: "/app.js".into(),
            saved_content: "x".into(),
            unsaved_content: Some("y".into()),
        };
        assert!(clean.forces_save());
        assert!(!dirty.forces_save());
        assert!(EditorAction::SetProjectName("p".into()).forces_save());
    }

    #[test]
    fn merge_detection_needs_every_action_wrapped() {
        let merged = vec![EditorAction::MergeWithPrevUndo(vec![EditorAction::ClearSelection])];
        assert!(all_merge_with_prev_undo(&merged));
        let mixed = vec![merged[0].clone(), EditorAction::ClearSelection];
        assert!(!all_merge_with_prev_undo(&mixed));
        assert!(!all_merge_with_prev_undo(&[]));
    }
}
