//! Ancestor bubbling: offer the parent's strategies for an only child.
//!
//! When the single target is the only child of its parent and sits in
//! normal flow, editing it usually means editing the parent. The check
//! repeats upward; the highest level reached offers its strategies with a
//! fitness boost, and every level passed on the way adds its own target to
//! the rerender set.

use super::{CanvasStrategy, InteractionCanvasState, InteractionTarget, StrategyCandidate, direct_candidates};
use crate::commands::{Command, WhenToRun, append_elements_to_rerender, set_cursor, update_highlighted_views};
use crate::editor_state::CssCursor;
use crate::interaction::InteractionSession;
use std::sync::Arc;

/// Candidates for the ancestors of the single target, starting at `level`.
/// Recursion ends at the first target that is not a flow-laid-out only
/// child, or at the storyboard.
pub fn ancestor_candidates(
    strategies: &[Arc<dyn CanvasStrategy>],
    level: usize,
    fitness_boost: f64,
    canvas: &InteractionCanvasState,
    session: Option<&InteractionSession>,
) -> Vec<StrategyCandidate> {
    let InteractionTarget::Targets(targets) = &canvas.interaction_target else {
        return Vec::new();
    };
    let [target] = targets.as_slice() else {
        return Vec::new();
    };
    if target.is_empty() || target.is_storyboard_path() || target.is_storyboard_child() {
        return Vec::new();
    }

    let metadata = &canvas.starting.metadata;
    if metadata.siblings(target).len() > 1 {
        return Vec::new();
    }
    let in_flow = !(metadata.is_position_absolute(target)
        || metadata.is_position_relative(target)
        || metadata.is_flex_child(target));
    if !in_flow {
        return Vec::new();
    }

    let parent = target.parent();
    let adjusted = canvas.with_target(InteractionTarget::Targets(vec![parent.clone()]));

    let next_level = ancestor_candidates(strategies, level + 1, fitness_boost, &adjusted, session);
    if !next_level.is_empty() {
        log::trace!("bubbling past {target} to level {}", level + 1);
        return next_level
            .into_iter()
            .map(|mut candidate| {
                candidate.extra_commands.push(append_elements_to_rerender(vec![target.clone()]));
                candidate
            })
            .collect();
    }

    direct_candidates(strategies, &adjusted, session)
        .into_iter()
        .map(|mut candidate| {
            candidate.id = format!("{}_ANCESTOR_{level}", candidate.id);
            candidate.name = apply_level_suffix(&candidate.name, level);
            if candidate.fitness > 0.0 {
                candidate.fitness += fitness_boost;
            }
            let extra: [Command; 3] = [
                append_elements_to_rerender(vec![target.clone()]),
                update_highlighted_views(WhenToRun::MidInteraction, vec![parent.clone()]),
                set_cursor(WhenToRun::MidInteraction, CssCursor::MovingMagic),
            ];
            candidate.extra_commands.extend(extra);
            candidate
        })
        .collect()
}

/// `"Flex Resize (Up 1)"` → `"Flex Resize (Up 2)"`.
fn apply_level_suffix(name: &str, level: usize) -> String {
    let base = match name.find(" (Up") {
        Some(index) if index > 0 => &name[..index],
        _ => name,
    };
    format!("{base} (Up {level})")
}
