//! Reorder a flex child among its siblings by dragging it along the axis.

use super::helpers::{is_bounding_area, is_drag_on, single_target};
use super::{CanvasStrategy, InteractionCanvasState, InteractionLifecycle, StrategyApplicationResult};
use crate::commands::{WhenToRun, rearrange_children, set_cursor, set_elements_to_rerender};
use crate::editor_state::{CssCursor, ElementsToRerender};
use crate::interaction::InteractionSession;
use ve_core::metadata::FlexDirection;
use ve_core::{CanvasPoint, ElementPath};

pub struct FlexReorderStrategy;

/// Document order of `parent`'s children as written in the source.
fn source_children(canvas: &InteractionCanvasState, parent: &ElementPath) -> Option<Vec<ElementPath>> {
    let element = canvas.project_contents.find_element(&parent.to_static())?;
    Some(
        element
            .navigable_children()
            .into_iter()
            .map(|child| parent.append(child.uid()))
            .collect(),
    )
}

/// Where `target` lands when dropped at `pointer`. Unmeasured siblings keep
/// their side of the target.
fn drop_index(
    canvas: &InteractionCanvasState,
    children: &[ElementPath],
    target: &ElementPath,
    direction: FlexDirection,
    pointer: CanvasPoint,
) -> usize {
    let metadata = &canvas.starting.metadata;
    let original = children.iter().position(|c| c == target).unwrap_or(0);
    children
        .iter()
        .enumerate()
        .filter(|(_, c)| *c != target)
        .filter(|(i, c)| match metadata.frame_in_canvas_coords(c) {
            Some(frame) => {
                let (center, at) = if direction.is_horizontal() {
                    (frame.center().x, pointer.x)
                } else {
                    (frame.center().y, pointer.y)
                };
                if direction.is_reverse() { center > at } else { center < at }
            }
            None => *i < original,
        })
        .count()
}

impl CanvasStrategy for FlexReorderStrategy {
    fn id(&self) -> &'static str {
        "FLEX_REORDER"
    }

    fn name(&self) -> String {
        "Flex Reorder".to_string()
    }

    fn is_applicable(&self, canvas: &InteractionCanvasState, _session: Option<&InteractionSession>) -> bool {
        single_target(canvas).is_some_and(|target| {
            let metadata = &canvas.starting.metadata;
            metadata.is_flex_child(target) && metadata.siblings(target).len() > 1
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
        let Some(pointer) = session.drag_data().and_then(|d| d.pointer()) else {
            return StrategyApplicationResult::Success(vec![set_cursor(WhenToRun::MidInteraction, CssCursor::Move)]);
        };
        let parent = target.parent();
        let Some(mut children) = source_children(canvas, &parent) else {
            return StrategyApplicationResult::Empty;
        };
        let Some(current) = children.iter().position(|c| c == target) else {
            log::debug!("{target} is not a source child of {parent}");
            return StrategyApplicationResult::Empty;
        };
        let direction = canvas
            .starting
            .metadata
            .flex_direction_of_parent(target)
            .unwrap_or_default();
        let next = drop_index(canvas, &children, target, direction, pointer);

        let mut commands = Vec::new();
        if next != current {
            let moved = children.remove(current);
            children.insert(next, moved);
            commands.push(rearrange_children(WhenToRun::Always, &parent, children));
        }
        commands.push(set_cursor(WhenToRun::MidInteraction, CssCursor::Move));
        commands.push(set_elements_to_rerender(ElementsToRerender::Paths(vec![parent])));
        StrategyApplicationResult::Success(commands)
    }
}
