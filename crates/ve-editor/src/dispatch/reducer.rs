//! Per-action reducers.
//!
//! Each leaf action maps to exactly one arm below. Composite actions are
//! unpacked in place, so an `Atomic` batch runs its children in order
//! against the same working value.

use crate::action::EditorAction;
use crate::collaborators::{LoginState, WorkerUpdate};
use crate::commands::{TransientOrNot, fold_and_apply_commands};
use crate::derived::derive_state;
use crate::dispatch::EditorStore;
use crate::editor_state::{CanvasState, EditorState, Notice, NoticeLevel};
use crate::error::EditorResult;
use crate::history::StateHistory;
use crate::interaction::InteractionSession;
use std::sync::Arc;
use ve_core::{ElementPath, ProjectFile};

pub const CANNOT_UNDO_OR_REDO_TOAST_ID: &str = "cannot-undo-or-redo";

/// A session removed by `ClearInteractionSession`.
#[derive(Debug, Clone)]
pub(super) struct EndedSession {
    pub session: InteractionSession,
    pub apply_changes: bool,
}

/// The parts of the store reducers may touch.
#[derive(Debug, Clone)]
pub(super) struct Working {
    pub editor: EditorState,
    pub history: StateHistory,
    pub login_state: LoginState,
    pub ended_session: Option<EndedSession>,
}

impl Working {
    pub fn from_store(store: &EditorStore) -> Self {
        Self {
            editor: store.unpatched_editor.clone(),
            history: store.history.clone(),
            login_state: store.login_state.clone(),
            ended_session: None,
        }
    }
}

pub(super) fn process_actions(working: Working, actions: &[EditorAction]) -> EditorResult<Working> {
    actions.iter().try_fold(working, process_action)
}

fn process_action(mut working: Working, action: &EditorAction) -> EditorResult<Working> {
    let editor = &mut working.editor;
    match action {
        EditorAction::Atomic(inner) | EditorAction::TransientActions(inner) | EditorAction::MergeWithPrevUndo(inner) => {
            return process_actions(working, inner);
        }

        // ─── History ─────────────────────────────────────────────────────
        EditorAction::Undo => {
            if !working.history.can_undo() {
                editor.add_toast(Notice::new(
                    CANNOT_UNDO_OR_REDO_TOAST_ID,
                    "Can't undo, reached the end of the undo history.",
                    NoticeLevel::Info,
                    false,
                ));
                return Ok(working);
            }
            working.history = working.history.undo();
            working.editor = restore_from_history(&working.editor, &working.history);
        }
        EditorAction::Redo => {
            if !working.history.can_redo() {
                editor.add_toast(Notice::new(
                    CANNOT_UNDO_OR_REDO_TOAST_ID,
                    "Can't redo, reached the end of the undo history.",
                    NoticeLevel::Info,
                    false,
                ));
                return Ok(working);
            }
            working.history = working.history.redo();
            working.editor = restore_from_history(&working.editor, &working.history);
        }
        EditorAction::TruncateHistory => working.history = working.history.truncate(),

        // ─── Project ─────────────────────────────────────────────────────
        EditorAction::Load {
            project_name,
            id,
            contents,
        } => {
            let loaded = EditorState {
                id: id.clone(),
                is_loaded: true,
                vscode_ready: editor.vscode_ready,
                ..EditorState::new(project_name, contents.clone())
            };
            log::info!("loaded project {project_name} ({} files)", contents.paths().count());
            working.history = StateHistory::init(loaded.clone(), Arc::new(derive_state(&loaded)));
            working.editor = loaded;
        }
        EditorAction::SetProjectName(name) => editor.project_name = name.clone(),
        EditorAction::SetProjectId(id) => editor.id = Some(id.clone()),
        EditorAction::SaveCurrentFile | EditorAction::FinishCheckpointTimer | EditorAction::SendPreviewModel => {}
        EditorAction::UpdateFromCodeEditor {
            path,
            saved_content,
            unsaved_content,
        } => {
            let code = unsaved_content.as_ref().unwrap_or(saved_content);
            update_code(editor, path, code);
        }
        EditorAction::UpdateFromWorker(updates) => {
            apply_worker_updates(editor, updates);
            editor.parse_or_print_in_flight = false;
        }
        EditorAction::ClearParseOrPrintInFlight => editor.parse_or_print_in_flight = false,
        EditorAction::UpdateFilePath { old_path, new_path } => {
            let contents = Arc::make_mut(&mut editor.project_contents);
            match contents.remove(old_path) {
                Some(file) => contents.insert(new_path, file),
                None => log::warn!("cannot rename {old_path}: no such file"),
            }
        }
        EditorAction::UpdateGithubSettings(settings) => editor.github_settings = Arc::new(settings.clone()),
        EditorAction::ApplyCommands(commands) => {
            working.editor = fold_and_apply_commands(editor, commands, TransientOrNot::Permanent)?.state;
        }

        // ─── Selection and navigator ─────────────────────────────────────
        EditorAction::SelectComponents {
            targets,
            add_to_selection,
        } => {
            if *add_to_selection {
                for target in targets {
                    if !editor.selected_views.contains(target) {
                        editor.selected_views.push(target.clone());
                    }
                }
            } else {
                editor.selected_views = targets.clone();
            }
        }
        EditorAction::ClearSelection => editor.selected_views.clear(),
        EditorAction::SetHighlightedViews(paths) => editor.highlighted_views = paths.clone(),
        EditorAction::SetHoveredViews(paths) => editor.hovered_views = paths.clone(),
        EditorAction::ToggleCollapse(path) => toggle(&mut editor.navigator_collapsed, path),
        EditorAction::ToggleHidden(path) => toggle(&mut editor.hidden_in_navigator, path),
        EditorAction::SwitchEditorMode(mode) => editor.mode = mode.clone(),

        // ─── Canvas ──────────────────────────────────────────────────────
        EditorAction::UpdateMetadata {
            dom,
            spy,
            all_element_props,
        } => {
            if let Some(dom) = dom {
                editor.dom_metadata = Arc::new(dom.clone());
            }
            if let Some(spy) = spy {
                editor.spy_metadata = Arc::new(spy.clone());
            }
            if let Some(props) = all_element_props {
                editor.current_all_element_props = Arc::new(props.clone());
            }
        }
        EditorAction::CreateInteractionSession(start) => {
            if editor.canvas.interaction_session.is_some() {
                log::warn!("interaction session created while another was active, replacing it");
            }
            editor.canvas.interaction_session = Some(InteractionSession::new(start.clone(), editor.metadata_snapshot()));
        }
        EditorAction::UpdateInteractionSession(update) => match editor.canvas.interaction_session.as_mut() {
            Some(session) => *session = session.updated(update.clone()),
            None => log::debug!("no interaction session to update"),
        },
        EditorAction::ClearInteractionSession { apply_changes } => {
            editor.canvas.cursor = None;
            if let Some(session) = editor.canvas.interaction_session.take() {
                working.ended_session = Some(EndedSession {
                    session,
                    apply_changes: *apply_changes,
                });
            }
        }
        EditorAction::SetUsersPreferredStrategy(id) => {
            if let Some(session) = editor.canvas.interaction_session.as_mut() {
                session.user_preferred_strategy = Some(id.clone());
            }
        }

        // ─── Shell ───────────────────────────────────────────────────────
        EditorAction::AddToast(notice) => editor.add_toast(notice.clone()),
        EditorAction::RemoveToast(id) => editor.remove_toast(id),
        EditorAction::SetLoginState(state) => working.login_state = state.clone(),
        EditorAction::SetVscodeReady(ready) => editor.vscode_ready = *ready,
    }
    Ok(working)
}

/// Document fields come from the history entry; measurements, toasts and
/// connection flags stay as they are now.
fn restore_from_history(current: &EditorState, history: &StateHistory) -> EditorState {
    let restored = &history.current.editor;
    EditorState {
        project_contents: Arc::clone(&restored.project_contents),
        github_settings: Arc::clone(&restored.github_settings),
        branch_origin_contents: restored.branch_origin_contents.clone(),
        selected_views: restored.selected_views.clone(),
        navigator_collapsed: restored.navigator_collapsed.clone(),
        hidden_in_navigator: restored.hidden_in_navigator.clone(),
        canvas: CanvasState {
            interaction_session: None,
            cursor: None,
            ..current.canvas.clone()
        },
        ..current.clone()
    }
}

fn update_code(editor: &mut EditorState, path: &str, code: &str) {
    let file = match editor.project_contents.get(path) {
        Some(existing) if existing.code == code => return,
        Some(existing) => ProjectFile {
            code: code.to_string(),
            needs_parsing: true,
            ..existing.clone()
        },
        None => ProjectFile {
            code: code.to_string(),
            parsed: None,
            needs_parsing: true,
            needs_printing: false,
        },
    };
    Arc::make_mut(&mut editor.project_contents).insert(path, file);
}

/// Parse results whose code still matches the file replace its tree. A
/// failed parse stops asking for a parse until the code changes again;
/// stale results are dropped.
fn apply_worker_updates(editor: &mut EditorState, updates: &[WorkerUpdate]) {
    let mut settled = Vec::new();
    for update in updates {
        match update {
            WorkerUpdate::Parsed { path, parsed, code } => match editor.project_contents.get(path) {
                Some(file) if file.code == *code => settled.push((
                    path,
                    ProjectFile {
                        parsed: Some(parsed.clone()),
                        needs_parsing: false,
                        ..file.clone()
                    },
                )),
                Some(_) => log::debug!("dropping stale parse result for {path}"),
                None => log::debug!("dropping parse result for removed file {path}"),
            },
            WorkerUpdate::Failed { path, message } => {
                log::warn!("parsing {path} failed: {message}");
                if let Some(file) = editor.project_contents.get(path).filter(|f| f.needs_parsing) {
                    settled.push((
                        path,
                        ProjectFile {
                            needs_parsing: false,
                            ..file.clone()
                        },
                    ));
                }
            }
        }
    }
    if settled.is_empty() {
        return;
    }
    let contents = Arc::make_mut(&mut editor.project_contents);
    for (path, file) in settled {
        contents.insert(path, file);
    }
}

fn toggle(paths: &mut Vec<ElementPath>, path: &ElementPath) {
    if let Some(index) = paths.iter().position(|p| p == path) {
        paths.remove(index);
    } else {
        paths.push(path.clone());
    }
}
