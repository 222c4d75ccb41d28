//! Running the strategy engine as part of a dispatch.
//!
//! ```text
//! session active      ─▶ pick + apply (mid) ─▶ transient fold onto a copy ─▶ patched
//! session committed   ─▶ pick + apply (end) ─▶ permanent fold            ─▶ unpatched = patched
//! session cancelled   ─▶ nothing applied                                 ─▶ unpatched = patched
//! ```

use super::reducer::EndedSession;
use crate::commands::{Command, EditorStatePatch, TransientOrNot, fold_and_apply_commands};
use crate::editor_state::{EditorMode, EditorState};
use crate::error::EditorResult;
use crate::strategies::{
    InteractionCanvasState, InteractionLifecycle, StrategyRegistry, StrategySummary, find_canvas_strategy,
};

/// What the strategy engine decided during the current session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyState {
    pub current_strategy: Option<String>,
    pub sorted_applicable_strategies: Vec<StrategySummary>,
    pub commands: Vec<Command>,
    /// Patches that turn the unpatched editor into the patched one.
    pub accumulated_patches: Vec<EditorStatePatch>,
}

pub(super) struct StrategyOutcome {
    pub unpatched: EditorState,
    pub patched: EditorState,
    pub strategy_state: StrategyState,
}

pub(super) fn handle_strategies(
    registry: &StrategyRegistry,
    editor: EditorState,
    ended: Option<EndedSession>,
) -> EditorResult<StrategyOutcome> {
    match ended {
        Some(EndedSession {
            session,
            apply_changes: true,
        }) => {
            let canvas = InteractionCanvasState::from_editor(&editor, Some(&session));
            let (picked, _) = find_canvas_strategy(registry, &canvas, &session);
            let mut unpatched = match picked {
                Some(strategy) => {
                    let commands = strategy
                        .apply(&session, InteractionLifecycle::EndInteraction)
                        .into_commands();
                    let folded = fold_and_apply_commands(&editor, &commands, TransientOrNot::Permanent)?;
                    log::debug!(
                        "committed {} with {} patches",
                        strategy.id,
                        folded.accumulated_patches.len()
                    );
                    folded.state
                }
                None => editor,
            };
            if matches!(unpatched.mode, EditorMode::Insert { .. }) {
                unpatched.mode = EditorMode::Select;
            }
            Ok(passthrough(unpatched))
        }
        Some(EndedSession {
            apply_changes: false, ..
        }) => {
            log::debug!("interaction session cancelled");
            Ok(passthrough(editor))
        }
        None => match editor.session() {
            Some(session) => {
                let canvas = InteractionCanvasState::from_editor(&editor, Some(session));
                let (picked, sorted) = find_canvas_strategy(registry, &canvas, session);
                let commands = picked
                    .as_ref()
                    .map(|s| s.apply(session, InteractionLifecycle::MidInteraction).into_commands())
                    .unwrap_or_default();
                let folded = fold_and_apply_commands(&editor, &commands, TransientOrNot::Transient)?;
                Ok(StrategyOutcome {
                    patched: folded.state,
                    strategy_state: StrategyState {
                        current_strategy: picked.map(|s| s.id),
                        sorted_applicable_strategies: sorted,
                        commands,
                        accumulated_patches: folded.accumulated_patches,
                    },
                    unpatched: editor,
                })
            }
            None => Ok(passthrough(editor)),
        },
    }
}

fn passthrough(editor: EditorState) -> StrategyOutcome {
    StrategyOutcome {
        patched: editor.clone(),
        unpatched: editor,
        strategy_state: StrategyState::default(),
    }
}
