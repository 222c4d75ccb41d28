//! Nudge absolutely positioned elements with the arrow keys.
//!
//! Every recorded key state in the session counts once; shift makes the
//! step ten pixels instead of one.

use super::helpers::{parent_bounds, pin_adjustments};
use super::{CanvasStrategy, InteractionCanvasState, InteractionLifecycle, StrategyApplicationResult};
use crate::commands::set_elements_to_rerender;
use crate::editor_state::ElementsToRerender;
use crate::interaction::{InteractionData, InteractionSession, KeyState};
use kurbo::Vec2;
use ve_core::CanvasVector;

const SHIFT_STEP: f64 = 10.0;

pub struct KeyboardAbsoluteMoveStrategy;

fn accumulated_offset(key_states: &[KeyState]) -> CanvasVector {
    key_states.iter().fold(Vec2::ZERO, |total, state| {
        let step = if state.modifiers.shift { SHIFT_STEP } else { 1.0 };
        state
            .keys_pressed
            .iter()
            .filter_map(|k| k.arrow_direction())
            .fold(total, |t, dir| t + dir * step)
    })
}

impl CanvasStrategy for KeyboardAbsoluteMoveStrategy {
    fn id(&self) -> &'static str {
        "KEYBOARD_ABSOLUTE_MOVE"
    }

    fn name(&self) -> String {
        "Keyboard Absolute Move".to_string()
    }

    fn is_applicable(&self, canvas: &InteractionCanvasState, _session: Option<&InteractionSession>) -> bool {
        let targets = canvas.interaction_target.paths();
        !targets.is_empty() && targets.iter().all(|t| canvas.starting.metadata.is_position_absolute(t))
    }

    fn fitness(&self, canvas: &InteractionCanvasState, session: &InteractionSession) -> f64 {
        let InteractionData::Keyboard(keyboard) = &session.data else {
            return 0.0;
        };
        if self.is_applicable(canvas, Some(session)) && keyboard.key_states.iter().any(KeyState::has_arrow) {
            1.0
        } else {
            0.0
        }
    }

    fn apply(
        &self,
        canvas: &InteractionCanvasState,
        session: &InteractionSession,
        _lifecycle: InteractionLifecycle,
    ) -> StrategyApplicationResult {
        let InteractionData::Keyboard(keyboard) = &session.data else {
            return StrategyApplicationResult::Empty;
        };
        let offset = accumulated_offset(&keyboard.key_states);
        let targets = canvas.interaction_target.paths();

        let mut commands = Vec::new();
        for target in targets {
            let parent = parent_bounds(canvas, target);
            commands.extend(pin_adjustments(canvas, target, offset, offset, parent));
        }
        commands.push(set_elements_to_rerender(ElementsToRerender::Paths(targets.to_vec())));
        StrategyApplicationResult::Success(commands)
    }
}
