//! Dispatch: the single entry point that turns actions into editor state.
//!
//! A batch is split into groups ([`groups`]); each group runs through the
//! reducers, metadata reconstruction, the strategy engine, the duplicate
//! UID check and derived state. Once every group succeeded the batch is
//! closed out: parse requests, history, saving and change sync.
//!
//! Nothing is written back if any group fails, so an `Err` from
//! [`Dispatcher::dispatch`] leaves the store as it was.
//!
//! Pointer and keyboard input also arrive here ([`Dispatcher::pointer_down`],
//! [`Dispatcher::key_down`], ...): the dispatcher owns the drag threshold and
//! the keyboard idle timer, and turns raw input into session actions.

mod groups;
mod reducer;
mod strategies;

pub use reducer::CANNOT_UNDO_OR_REDO_TOAST_ID;
pub use strategies::StrategyState;

use crate::action::{EditorAction, all_merge_with_prev_undo, flatten, simple_action_names};
use crate::changes::{ProjectChanges, get_project_changes};
use crate::collaborators::{Collaborators, LoginState, ParseRequest, SaveType, WorkerUpdate};
use crate::config::{DuplicateUidPolicy, EditorConfig, Environment};
use crate::derived::{DerivedState, derive_state};
use crate::editor_state::{EditorState, Notice, NoticeLevel, PersistentModel};
use crate::error::{EditorError, EditorResult};
use crate::history::{AssetRename, StateHistory};
use crate::interaction::{
    ActiveControl, InteractionSession, InteractionSessionStart, InteractionUpdate, Key, KeyState,
    KeyboardSessionTimer, MetadataSnapshot, Modifiers, PendingDrag,
};
use crate::path_cache::ElementPathCache;
use crate::strategies::StrategyRegistry;
use reducer::Working;
use std::sync::Arc;
use std::time::Instant;
use ve_core::geometry::CanvasPoint;
use ve_core::metadata::reconstruct_metadata;
use ve_core::{CoreResult, ElementPath};

pub const RELOAD_EDITOR_TOAST_ID: &str = "reload-editor";

pub const IRRECOVERABLE_ERROR_MESSAGE: &str = "The editor has suffered from an irrecoverable error, please reload the editor.";

// ─── Store ───────────────────────────────────────────────────────────────

/// Everything the dispatcher owns between dispatches.
#[derive(Debug, Clone)]
pub struct EditorStore {
    /// Committed state. Never sees mid-interaction strategy output.
    pub unpatched_editor: EditorState,
    /// `unpatched_editor` with the current strategy's transient patches.
    pub patched_editor: EditorState,
    pub unpatched_derived: Arc<DerivedState>,
    pub patched_derived: Arc<DerivedState>,
    pub strategy_state: StrategyState,
    pub history: StateHistory,
    pub login_state: LoginState,
    pub save_count: u64,
    accumulated_changes: ProjectChanges,
    path_cache: ElementPathCache,
    pending_drag: Option<PendingDrag>,
    keyboard_timer: KeyboardSessionTimer,
}

impl EditorStore {
    pub fn new(editor: EditorState) -> Self {
        let derived = Arc::new(derive_state(&editor));
        Self {
            history: StateHistory::init(editor.clone(), Arc::clone(&derived)),
            patched_editor: editor.clone(),
            unpatched_editor: editor,
            patched_derived: Arc::clone(&derived),
            unpatched_derived: derived,
            strategy_state: StrategyState::default(),
            login_state: LoginState::default(),
            save_count: 0,
            accumulated_changes: ProjectChanges::default(),
            path_cache: ElementPathCache::new(),
            pending_drag: None,
            keyboard_timer: KeyboardSessionTimer::new(),
        }
    }

    /// Changes not yet sent because the code editor was not ready.
    pub fn accumulated_changes(&self) -> &ProjectChanges {
        &self.accumulated_changes
    }

    pub fn path_cache(&self) -> &ElementPathCache {
        &self.path_cache
    }

    pub fn pending_drag(&self) -> Option<&PendingDrag> {
        self.pending_drag.as_ref()
    }

    pub fn keyboard_timer(&self) -> &KeyboardSessionTimer {
        &self.keyboard_timer
    }
}

/// What a dispatch did, for callers that schedule follow-up work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// The unpatched editor is identical to before the dispatch.
    pub nothing_changed: bool,
    pub saved: bool,
    pub parse_requested: bool,
}

// ─── Dispatcher ──────────────────────────────────────────────────────────

pub struct Dispatcher {
    store: EditorStore,
    registry: StrategyRegistry,
    config: EditorConfig,
    collaborators: Collaborators,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("save_count", &self.store.save_count)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(editor: EditorState, config: EditorConfig, collaborators: Collaborators) -> Self {
        Self {
            store: EditorStore::new(editor),
            registry: StrategyRegistry::from_config(&config),
            config,
            collaborators,
        }
    }

    /// Replace the strategy set, e.g. to test a single strategy.
    pub fn with_registry(mut self, registry: StrategyRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn store(&self) -> &EditorStore {
        &self.store
    }

    /// The state to render: committed state plus any live strategy output.
    pub fn editor(&self) -> &EditorState {
        &self.store.patched_editor
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Parse `s` through the store's path cache.
    pub fn element_path(&mut self, s: &str) -> CoreResult<ElementPath> {
        self.store.path_cache.get_or_parse(s)
    }

    pub fn dispatch(&mut self, actions: Vec<EditorAction>) -> EditorResult<DispatchOutcome> {
        let mut working = self.store.clone();
        let mut nothing_changed = true;
        for group in groups::split_into_groups(&actions) {
            let started = Instant::now();
            let (next, stayed) = self.dispatch_group(working, nothing_changed, &group)?;
            log::debug!(
                "dispatched [{}] in {:?}",
                simple_action_names(&group),
                started.elapsed()
            );
            working = next;
            nothing_changed = stayed;
        }
        Ok(self.close_out(&actions, working, nothing_changed))
    }

    /// Feed a finished (or failed) parse back in. Failures are not retried;
    /// the next edit that needs parsing asks again.
    pub fn on_parse_finished(&mut self, result: Result<Vec<WorkerUpdate>, String>) -> EditorResult<DispatchOutcome> {
        match result {
            Ok(updates) => self.dispatch(vec![EditorAction::MergeWithPrevUndo(vec![
                EditorAction::UpdateFromWorker(updates),
            ])]),
            Err(message) => {
                log::error!("error during parse: {message}");
                self.dispatch(vec![EditorAction::ClearParseOrPrintInFlight])
            }
        }
    }

    /// Commit a keyboard session once its idle timeout has passed.
    pub fn tick(&mut self, now: Instant) -> EditorResult<Option<DispatchOutcome>> {
        if !self.store.keyboard_timer.is_expired(now) {
            return Ok(None);
        }
        log::debug!("keyboard interaction timed out");
        self.commit_keyboard_session()
    }

    /// Work deferred until the host is idle. Returns how many cached paths
    /// were dropped.
    pub fn run_idle_tasks(&mut self) -> usize {
        self.store.path_cache.run_pending_cull()
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// A press only arms a drag; the session starts once the pointer moves
    /// past the threshold. A running keyboard session is committed first.
    pub fn pointer_down(
        &mut self,
        point: CanvasPoint,
        modifiers: Modifiers,
        control: ActiveControl,
    ) -> EditorResult<Option<DispatchOutcome>> {
        let committed = self.commit_keyboard_session()?;
        self.store.pending_drag = Some(PendingDrag::new(point, modifiers, control));
        Ok(committed)
    }

    pub fn pointer_moved(
        &mut self,
        point: CanvasPoint,
        modifiers: Modifiers,
        now: Instant,
    ) -> EditorResult<Option<DispatchOutcome>> {
        let drag_start = self
            .store
            .unpatched_editor
            .session()
            .and_then(InteractionSession::drag_data)
            .map(|d| d.drag_start);
        if let Some(start) = drag_start {
            let update = InteractionUpdate::Drag {
                drag: point - start,
                modifiers,
                now,
            };
            return self
                .dispatch(vec![EditorAction::UpdateInteractionSession(update)])
                .map(Some);
        }

        let Some(pending) = self.store.pending_drag.clone() else {
            return Ok(None);
        };
        if !pending.exceeds_threshold(point, self.config.drag_threshold) {
            return Ok(None);
        }
        let start = InteractionSessionStart::drag(pending.start, pending.modifiers, pending.control, now);
        let update = InteractionUpdate::Drag {
            drag: point - pending.start,
            modifiers,
            now,
        };
        let outcome = self.dispatch(vec![
            EditorAction::CreateInteractionSession(start),
            EditorAction::UpdateInteractionSession(update),
        ])?;
        self.store.pending_drag = None;
        Ok(Some(outcome))
    }

    /// Ends a drag session with its changes. A click that never became a
    /// drag dispatches nothing.
    pub fn pointer_up(&mut self) -> EditorResult<Option<DispatchOutcome>> {
        self.store.pending_drag = None;
        if self.store.unpatched_editor.session().is_some_and(InteractionSession::is_drag) {
            return self
                .dispatch(vec![EditorAction::ClearInteractionSession { apply_changes: true }])
                .map(Some);
        }
        Ok(None)
    }

    /// Arrow keys start or extend a keyboard session and restart its idle
    /// timer. Escape cancels whatever session is running.
    pub fn key_down(&mut self, key_state: KeyState, now: Instant) -> EditorResult<Option<DispatchOutcome>> {
        if key_state.keys_pressed.contains(&Key::Escape) {
            return self.escape();
        }
        if !key_state.has_arrow() {
            return Ok(None);
        }
        let action = match self.store.unpatched_editor.session() {
            Some(session) if session.is_keyboard() => {
                EditorAction::UpdateInteractionSession(InteractionUpdate::Keyboard { key_state, now })
            }
            Some(_) => return Ok(None),
            None => EditorAction::CreateInteractionSession(InteractionSessionStart::keyboard(key_state, now)),
        };
        let outcome = self.dispatch(vec![action])?;
        self.store.keyboard_timer.reset(now, self.config.keyboard_timeout());
        Ok(Some(outcome))
    }

    pub fn escape(&mut self) -> EditorResult<Option<DispatchOutcome>> {
        self.store.pending_drag = None;
        self.store.keyboard_timer.cancel();
        if self.store.unpatched_editor.session().is_none() {
            return Ok(None);
        }
        self.dispatch(vec![EditorAction::ClearInteractionSession { apply_changes: false }])
            .map(Some)
    }

    fn commit_keyboard_session(&mut self) -> EditorResult<Option<DispatchOutcome>> {
        self.store.keyboard_timer.cancel();
        if self.store.unpatched_editor.session().is_some_and(InteractionSession::is_keyboard) {
            return self
                .dispatch(vec![EditorAction::ClearInteractionSession { apply_changes: true }])
                .map(Some);
        }
        Ok(None)
    }

    // ─── One group ───────────────────────────────────────────────────────

    fn dispatch_group(
        &self,
        mut store: EditorStore,
        stayed_before: bool,
        group: &[EditorAction],
    ) -> EditorResult<(EditorStore, bool)> {
        let Working {
            mut editor,
            history,
            login_state,
            ended_session,
        } = reducer::process_actions(Working::from_store(&store), group)?;

        let stayed = stayed_before && editor == store.unpatched_editor && login_state == store.login_state;

        if metadata_inputs_changed(&store.unpatched_editor, &editor) {
            refresh_metadata(&mut editor);
        }

        let outcome = strategies::handle_strategies(&self.registry, editor, ended_session)?;
        let mut unpatched = outcome.unpatched;
        let mut patched = outcome.patched;

        let duplicates = unpatched.project_contents.all_unique_uids().duplicates;
        if !duplicates.is_empty() {
            let names = simple_action_names(group);
            let formatted = serde_json::to_string(&duplicates).unwrap_or_else(|_| format!("{duplicates:?}"));
            match self.config.duplicate_uid_policy {
                DuplicateUidPolicy::Error => {
                    return Err(EditorError::DuplicateUids {
                        actions: names,
                        duplicates: formatted,
                    });
                }
                DuplicateUidPolicy::Toast => {
                    log::error!("Running {names} resulted in duplicate UIDs {formatted}.");
                    let toast = Notice::new(RELOAD_EDITOR_TOAST_ID, IRRECOVERABLE_ERROR_MESSAGE, NoticeLevel::Error, true);
                    unpatched.add_toast(toast.clone());
                    patched.add_toast(toast);
                }
            }
        }

        let any_undo_or_redo = flatten(group).iter().any(|a| a.is_undo_or_redo());
        let unpatched_derived = if any_undo_or_redo {
            Arc::clone(&history.current.derived)
        } else if stayed && unpatched == store.unpatched_editor {
            Arc::clone(&store.unpatched_derived)
        } else {
            Arc::new(derive_state(&unpatched))
        };
        let patched_derived = if outcome.strategy_state.accumulated_patches.is_empty() {
            Arc::clone(&unpatched_derived)
        } else {
            Arc::new(derive_state(&patched))
        };

        store.unpatched_editor = unpatched;
        store.patched_editor = patched;
        store.unpatched_derived = unpatched_derived;
        store.patched_derived = patched_derived;
        store.strategy_state = outcome.strategy_state;
        store.history = history;
        store.login_state = login_state;
        Ok((store, stayed))
    }

    // ─── Closing out ─────────────────────────────────────────────────────

    fn close_out(&mut self, actions: &[EditorAction], mut after: EditorStore, nothing_changed: bool) -> DispatchOutcome {
        let before = &self.store;
        let leaves = flatten(actions);

        let force_save = leaves.iter().any(|a| a.forces_save());
        let is_load = leaves.iter().any(|a| a.is_load());
        let all_transient = actions.iter().all(EditorAction::is_transient);
        let all_merge = all_merge_with_prev_undo(actions);
        let any_finish_checkpoint = leaves.iter().any(|a| matches!(a, EditorAction::FinishCheckpointTimer));
        let any_worker_updates = leaves.iter().any(|a| a.is_worker_update());
        let any_undo_or_redo = leaves.iter().any(|a| a.is_undo_or_redo());
        let any_send_preview = leaves.iter().any(|a| matches!(a, EditorAction::SendPreviewModel));
        let any_from_code_editor = leaves.iter().any(|a| a.is_from_code_editor());
        let only_worker_updates = !leaves.is_empty() && leaves.iter().all(|a| a.is_worker_update());

        let transient_or_no_change = (all_transient || nothing_changed) && !any_finish_checkpoint;

        // Parsing.
        let mut parse_requested = false;
        let wants_model_update = any_undo_or_redo || !transient_or_no_change || any_worker_updates;
        if wants_model_update && !after.unpatched_editor.parse_or_print_in_flight {
            parse_requested = request_parse(&mut self.collaborators, &after.unpatched_editor);
            after.unpatched_editor.parse_or_print_in_flight = parse_requested;
            after.patched_editor.parse_or_print_in_flight = parse_requested;
        }

        // Saving.
        let editor = &after.unpatched_editor;
        let can_save = editor.is_loaded && !is_load && self.config.environment == Environment::Browser;
        let changes_should_trigger_save = before.unpatched_editor.persisted_fields_differ(editor);
        let should_save_if_not_forced = changes_should_trigger_save
            && (!transient_or_no_change || any_undo_or_redo || (any_worker_updates && after.save_count > 0));
        let worth_saving = force_save || should_save_if_not_forced;
        let should_save = can_save && worth_saving;

        // History.
        let asset_renames: Vec<AssetRename> = leaves
            .iter()
            .filter_map(|a| match a {
                EditorAction::UpdateFilePath { old_path, new_path } => Some(AssetRename {
                    filename_changed_from: old_path.clone(),
                    filename_changed_to: new_path.clone(),
                }),
                _ => None,
            })
            .collect();
        after.history = if any_undo_or_redo || is_load {
            after.history
        } else if all_merge {
            after
                .history
                .replace_last(editor.clone(), Arc::clone(&after.unpatched_derived), asset_renames)
        } else if transient_or_no_change || !worth_saving {
            if before.unpatched_editor.selected_views == editor.selected_views {
                after.history
            } else {
                let selected = editor.selected_views.clone();
                after.history.replace_last_with_update(|e| e.selected_views = selected)
            }
        } else {
            after.history.add(
                editor.clone(),
                Arc::clone(&after.unpatched_derived),
                asset_renames,
                self.config.history_limit,
            )
        };

        // Login state.
        if before.login_state.is_logged_in() != after.login_state.is_logged_in() {
            if after.login_state.is_logged_in() {
                self.collaborators.persistence.login();
            } else {
                self.collaborators.persistence.logout();
            }
        }

        if should_save {
            let save_type = if force_save { SaveType::Force } else { SaveType::Throttle };
            log::debug!("saving {} ({save_type:?})", editor.project_name);
            self.collaborators
                .persistence
                .save(&editor.project_name, &PersistentModel::from_editor(editor), save_type);
            after.save_count += 1;
        }

        if any_from_code_editor && !leaves.iter().all(|a| a.is_from_code_editor()) {
            log::error!("code editor actions mixed with canvas actions: {}", simple_action_names(actions));
        }

        // Change sync.
        let editor = &after.unpatched_editor;
        if !is_load {
            let suppress_selection = any_from_code_editor || only_worker_updates;
            let changes = get_project_changes(&before.unpatched_editor, editor, suppress_selection);
            after.accumulated_changes = std::mem::take(&mut after.accumulated_changes).combine(changes);
            if editor.vscode_ready && !after.accumulated_changes.is_empty() {
                self.collaborators
                    .project_changes
                    .send_changes(&std::mem::take(&mut after.accumulated_changes));
            }
        }

        if any_send_preview || !Arc::ptr_eq(&before.unpatched_editor.project_contents, &editor.project_contents) {
            self.collaborators
                .preview
                .update_preview(editor.id.as_deref(), &editor.project_contents);
        }

        if any_worker_updates {
            after.path_cache.schedule_cull(Arc::clone(&editor.project_contents));
        }

        if !after.unpatched_editor.session().is_some_and(InteractionSession::is_keyboard) {
            after.keyboard_timer.cancel();
        }

        self.store = after;
        DispatchOutcome {
            nothing_changed,
            saved: should_save,
            parse_requested,
        }
    }
}

/// Ask the workers to parse every file whose code is ahead of its tree.
fn request_parse(collaborators: &mut Collaborators, editor: &EditorState) -> bool {
    let files: Vec<(String, String)> = editor
        .project_contents
        .files_needing_parse()
        .into_iter()
        .filter_map(|path| {
            let code = editor.project_contents.get(&path)?.code.clone();
            Some((path, code))
        })
        .collect();
    if files.is_empty() {
        return false;
    }
    log::debug!("requesting parse of {} files", files.len());
    collaborators.workers.request_parse(ParseRequest {
        files,
        existing_uids: editor.project_contents.all_unique_uids().all,
        steganography: false,
    });
    true
}

fn metadata_inputs_changed(before: &EditorState, after: &EditorState) -> bool {
    !Arc::ptr_eq(&before.dom_metadata, &after.dom_metadata)
        || !Arc::ptr_eq(&before.spy_metadata, &after.spy_metadata)
        || !Arc::ptr_eq(&before.current_all_element_props, &after.current_all_element_props)
}

/// Rebuild metadata from the raw measurements. While a session runs the
/// result goes to the session's `latest` slot so its starting snapshot
/// stays pinned.
fn refresh_metadata(editor: &mut EditorState) {
    let (metadata, tree) = reconstruct_metadata(
        &editor.dom_metadata,
        &editor.spy_metadata,
        &editor.current_all_element_props,
    );
    let snapshot = MetadataSnapshot {
        metadata: Arc::new(metadata),
        all_element_props: Arc::clone(&editor.current_all_element_props),
        element_path_tree: Arc::new(tree),
    };
    match editor.canvas.interaction_session.as_mut() {
        Some(session) => session.latest = Some(snapshot),
        None => {
            editor.jsx_metadata = snapshot.metadata;
            editor.all_element_props = snapshot.all_element_props;
            editor.element_path_tree = snapshot.element_path_tree;
        }
    }
}
