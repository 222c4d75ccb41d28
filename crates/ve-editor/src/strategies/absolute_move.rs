//! Drag an absolutely positioned element by its pins.

use super::helpers::{
    honours_props_position, is_bounding_area, is_drag_on, parent_bounds, pin_adjustments, single_target,
};
use super::{CanvasStrategy, InteractionCanvasState, InteractionLifecycle, StrategyApplicationResult};
use crate::commands::{WhenToRun, set_cursor, set_elements_to_rerender, update_highlighted_views};
use crate::editor_state::{CssCursor, ElementsToRerender};
use crate::interaction::InteractionSession;

pub struct AbsoluteMoveStrategy;

impl CanvasStrategy for AbsoluteMoveStrategy {
    fn id(&self) -> &'static str {
        "ABSOLUTE_MOVE"
    }

    fn name(&self) -> String {
        "Absolute Move".to_string()
    }

    fn is_applicable(&self, canvas: &InteractionCanvasState, _session: Option<&InteractionSession>) -> bool {
        single_target(canvas).is_some_and(|target| {
            canvas.starting.metadata.is_position_absolute(target) && honours_props_position(canvas, target)
        })
    }

    fn fitness(&self, canvas: &InteractionCanvasState, session: &InteractionSession) -> f64 {
        if self.is_applicable(canvas, Some(session)) && is_drag_on(session, is_bounding_area) {
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
        let Some(target) = single_target(canvas) else {
            return StrategyApplicationResult::Empty;
        };
        if !is_drag_on(session, is_bounding_area) {
            return StrategyApplicationResult::Empty;
        }
        let feedback = [
            update_highlighted_views(WhenToRun::MidInteraction, vec![]),
            set_cursor(WhenToRun::MidInteraction, CssCursor::Move),
        ];
        let Some(drag) = session.drag_vector() else {
            return StrategyApplicationResult::Success(feedback.to_vec());
        };
        if canvas.starting.metadata.frame_in_canvas_coords(target).is_none() {
            return StrategyApplicationResult::Empty;
        }
        let parent = parent_bounds(canvas, target);
        let mut commands = pin_adjustments(canvas, target, drag, drag, parent);
        commands.extend(feedback);
        commands.push(set_elements_to_rerender(ElementsToRerender::Paths(vec![target.clone()])));
        StrategyApplicationResult::Success(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{TransientOrNot, fold_and_apply_commands};
    use crate::editor_state::EditorState;
    use crate::interaction::ActiveControl;
    use crate::strategies::fixtures::{absolute_pair, far_pinned_pair};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use ve_core::element::{AttributeValue, get_attribute_at_path};
    use ve_core::PropertyPath;
    use ve_core::path::path;

    #[test]
    fn moves_pins_by_drag() {
        let fixture = absolute_pair();
        let target = path("sb/scene:root/moving");
        let canvas = fixture.canvas(&[target.clone()]);
        let session = fixture.drag(ActiveControl::BoundingArea, Some((15.0, -5.0)));
        assert_eq!(AbsoluteMoveStrategy.fitness(&canvas, &session), 1.0);

        let commands = AbsoluteMoveStrategy
            .apply(&canvas, &session, InteractionLifecycle::EndInteraction)
            .into_commands();
        let editor = EditorState {
            project_contents: fixture.contents.clone(),
            ..EditorState::default()
        };
        let folded = fold_and_apply_commands(&editor, &commands, TransientOrNot::Permanent).unwrap();
        let moved = folded.state.project_contents.find_element(&target.to_static()).unwrap();
        let props = &moved.as_element().unwrap().props;
        assert_eq!(
            get_attribute_at_path(props, &PropertyPath::style("left")),
            Some(&AttributeValue::Value(json!(65)))
        );
        assert_eq!(
            get_attribute_at_path(props, &PropertyPath::style("top")),
            Some(&AttributeValue::Value(json!(45)))
        );
    }

    #[test]
    fn without_drag_only_feedback() {
        let fixture = absolute_pair();
        let canvas = fixture.canvas(&[path("sb/scene:root/moving")]);
        let session = fixture.drag(ActiveControl::BoundingArea, None);
        let result = AbsoluteMoveStrategy.apply(&canvas, &session, InteractionLifecycle::MidInteraction);
        assert_eq!(
            result.into_commands(),
            vec![
                update_highlighted_views(WhenToRun::MidInteraction, vec![]),
                set_cursor(WhenToRun::MidInteraction, CssCursor::Move),
            ]
        );
    }

    #[test]
    fn not_applicable_to_flow_elements() {
        let fixture = crate::strategies::fixtures::flex_row();
        let canvas = fixture.canvas(&[path("sb/scene:root/a")]);
        assert!(!AbsoluteMoveStrategy.is_applicable(&canvas, None));
    }

    #[test]
    fn far_pinned_elements_move_by_their_far_pins() {
        let fixture = far_pinned_pair();
        let target = path("sb/scene:root/moving");
        let canvas = fixture.canvas(&[target.clone()]);
        let session = fixture.drag(ActiveControl::BoundingArea, Some((15.0, -5.0)));
        let commands = AbsoluteMoveStrategy
            .apply(&canvas, &session, InteractionLifecycle::EndInteraction)
            .into_commands();
        let editor = EditorState {
            project_contents: fixture.contents.clone(),
            ..EditorState::default()
        };
        let folded = fold_and_apply_commands(&editor, &commands, TransientOrNot::Permanent).unwrap();
        let moved = folded.state.project_contents.find_element(&target.to_static()).unwrap();
        let props = &moved.as_element().unwrap().props;
        let style = |prop: &str| get_attribute_at_path(props, &PropertyPath::style(prop)).cloned();
        assert_eq!(style("right"), Some(AttributeValue::Value(json!(235))));
        assert_eq!(style("bottom"), Some(AttributeValue::Value(json!(255))));
        assert_eq!(style("left"), None);
        assert_eq!(style("top"), None);
    }
}
