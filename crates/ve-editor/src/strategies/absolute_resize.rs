//! Resize an absolutely positioned element from any handle.
//!
//! Dragging a handle moves that side; dragging it past the opposite side
//! flips the box, so the pins follow whichever edges actually moved.

use super::helpers::{
    honours_props_size, is_drag_on, is_resize_handle, parent_bounds, pin_adjustments, single_target,
};
use super::{CanvasStrategy, InteractionCanvasState, InteractionLifecycle, StrategyApplicationResult};
use crate::commands::{
    Command, WhenToRun, adjust_css_length_property, set_cursor, set_elements_to_rerender, update_highlighted_views,
};
use crate::editor_state::{ElementsToRerender, pick_cursor_from_edge_position};
use crate::interaction::InteractionSession;
use kurbo::Vec2;
use ve_core::PropertyPath;
use ve_core::geometry::resize_bounding_box;

pub struct AbsoluteResizeStrategy;

impl CanvasStrategy for AbsoluteResizeStrategy {
    fn id(&self) -> &'static str {
        "ABSOLUTE_RESIZE"
    }

    fn name(&self) -> String {
        "Absolute Resize".to_string()
    }

    fn is_applicable(&self, canvas: &InteractionCanvasState, _session: Option<&InteractionSession>) -> bool {
        single_target(canvas).is_some_and(|target| {
            canvas.starting.metadata.is_position_absolute(target) && honours_props_size(canvas, target)
        })
    }

    fn fitness(&self, canvas: &InteractionCanvasState, session: &InteractionSession) -> f64 {
        if self.is_applicable(canvas, Some(session)) && is_drag_on(session, is_resize_handle) {
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
        let (Some(target), Some(edge)) = (single_target(canvas), session.resize_edge()) else {
            return StrategyApplicationResult::Empty;
        };
        let feedback = [
            update_highlighted_views(WhenToRun::MidInteraction, vec![]),
            set_cursor(WhenToRun::MidInteraction, pick_cursor_from_edge_position(edge)),
        ];
        let Some(drag) = session.drag_vector() else {
            return StrategyApplicationResult::Success(feedback.to_vec());
        };
        let Some(original) = canvas.starting.metadata.frame_in_canvas_coords(target) else {
            return StrategyApplicationResult::Empty;
        };

        let resized = resize_bounding_box(&original, drag, edge);
        let parent = parent_bounds(canvas, target);
        let parent_width = parent.map(|p| p.width);
        let parent_height = parent.map(|p| p.height);
        let adjust = |prop: &str, delta: f64, parent_dim: Option<f64>| -> Command {
            adjust_css_length_property(
                WhenToRun::Always,
                target,
                PropertyPath::style(prop),
                delta,
                parent_dim,
                true,
            )
        };

        let mut commands = vec![
            adjust("width", resized.width - original.width, parent_width),
            adjust("height", resized.height - original.height, parent_height),
        ];
        let near = Vec2::new(resized.x - original.x, resized.y - original.y);
        let far = Vec2::new(
            (resized.x + resized.width) - (original.x + original.width),
            (resized.y + resized.height) - (original.y + original.height),
        );
        commands.extend(pin_adjustments(canvas, target, near, far, parent));
        commands.extend(feedback);
        commands.push(set_elements_to_rerender(ElementsToRerender::Paths(vec![target.clone()])));
        StrategyApplicationResult::Success(commands)
    }
}
