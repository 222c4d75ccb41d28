//! Resize a flex child by writing its width and height.

use super::helpers::{honours_props_size, is_drag_on, is_resize_handle, parent_bounds, single_target};
use super::{CanvasStrategy, InteractionCanvasState, InteractionLifecycle, StrategyApplicationResult};
use crate::commands::{
    WhenToRun, adjust_css_length_property, set_cursor, set_elements_to_rerender, update_highlighted_views,
};
use crate::editor_state::{ElementsToRerender, pick_cursor_from_edge_position};
use crate::interaction::InteractionSession;
use ve_core::PropertyPath;
use ve_core::geometry::resize_width_height;

pub struct FlexResizeBasicStrategy;

impl CanvasStrategy for FlexResizeBasicStrategy {
    fn id(&self) -> &'static str {
        "FLEX_RESIZE_BASIC"
    }

    fn name(&self) -> String {
        "Flex Resize (Basic)".to_string()
    }

    fn is_applicable(&self, canvas: &InteractionCanvasState, _session: Option<&InteractionSession>) -> bool {
        single_target(canvas).is_some_and(|target| {
            canvas.starting.metadata.is_flex_child(target) && honours_props_size(canvas, target)
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

        let resized = resize_width_height(&original, drag, edge);
        let parent = parent_bounds(canvas, target);
        let mut commands = vec![
            adjust_css_length_property(
                WhenToRun::Always,
                target,
                PropertyPath::style("width"),
                resized.width - original.width,
                parent.map(|p| p.width),
                true,
            ),
            adjust_css_length_property(
                WhenToRun::Always,
                target,
                PropertyPath::style("height"),
                resized.height - original.height,
                parent.map(|p| p.height),
                true,
            ),
        ];
        commands.extend(feedback);
        commands.push(set_elements_to_rerender(ElementsToRerender::Paths(vec![target.clone()])));
        StrategyApplicationResult::Success(commands)
    }
}
