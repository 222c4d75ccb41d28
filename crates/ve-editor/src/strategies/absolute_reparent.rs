//! Drag an absolutely positioned element into another container.
//!
//! Mid-drag it behaves like a move. On release the element is removed from
//! its old parent and re-added under the container found under the
//! pointer, with its pins rebased onto that container's frame.

use super::helpers::{
    honours_props_position, is_bounding_area, is_drag_on, parent_bounds, pin_adjustments, pins_of, single_target,
};
use super::{CanvasStrategy, InteractionCanvasState, InteractionLifecycle, StrategyApplicationResult};
use crate::commands::{
    WhenToRun, add_elements, delete_element, set_cursor, set_elements_to_rerender, update_highlighted_views,
    update_selected_views,
};
use crate::editor_state::{CssCursor, ElementsToRerender};
use crate::interaction::InteractionSession;
use ve_core::CssNumber;
use ve_core::element::{AttributeValue, ElementChild, set_attribute_at_path};
use ve_core::geometry::CanvasRect;
use ve_core::hit_test_parent;
use ve_core::insertion::InsertionPath;
use ve_core::{ElementPath, PropertyPath};

pub struct AbsoluteReparentStrategy;

/// The container under the pointer, if it differs from the current parent.
fn new_parent(canvas: &InteractionCanvasState, session: &InteractionSession, target: &ElementPath) -> Option<ElementPath> {
    let pointer = session.drag_data()?.pointer()?;
    let metadata = &canvas.starting.metadata;
    let hit = hit_test_parent(
        metadata,
        &canvas.starting.element_path_tree,
        pointer,
        std::slice::from_ref(target),
        |p| {
            metadata
                .find(p)
                .is_some_and(|m| m.special_size_measurements.provides_bounds_for_absolute_children)
        },
    )?;
    (hit != target.parent()).then_some(hit)
}

/// `element` with its pins rebased so it sits at `frame` inside `parent`.
/// Far pins (`right`/`bottom`) count inwards from the parent's far edge.
fn rebased(element: &ElementChild, frame: CanvasRect, parent: CanvasRect) -> Option<ElementChild> {
    let mut element = element.clone();
    let ElementChild::Element(jsx) = &mut element else {
        return None;
    };
    let (horizontal, vertical) = pins_of(&jsx.props);
    let pins = [
        (horizontal.near, "left", frame.x - parent.x),
        (horizontal.far, "right", (parent.x + parent.width) - (frame.x + frame.width)),
        (vertical.near, "top", frame.y - parent.y),
        (vertical.far, "bottom", (parent.y + parent.height) - (frame.y + frame.height)),
    ];
    for (_, prop, value) in pins.into_iter().filter(|(pinned, ..)| *pinned) {
        let value = AttributeValue::Value(CssNumber::unitless(value).to_json());
        set_attribute_at_path(&mut jsx.props, &PropertyPath::style(prop), value).ok()?;
    }
    Some(element)
}

impl CanvasStrategy for AbsoluteReparentStrategy {
    fn id(&self) -> &'static str {
        "ABSOLUTE_REPARENT"
    }

    fn name(&self) -> String {
        "Absolute Reparent".to_string()
    }

    fn is_applicable(&self, canvas: &InteractionCanvasState, _session: Option<&InteractionSession>) -> bool {
        single_target(canvas).is_some_and(|target| {
            canvas.starting.metadata.is_position_absolute(target) && honours_props_position(canvas, target)
        })
    }

    fn fitness(&self, canvas: &InteractionCanvasState, session: &InteractionSession) -> f64 {
        if !self.is_applicable(canvas, Some(session)) || !is_drag_on(session, is_bounding_area) {
            return 0.0;
        }
        match single_target(canvas) {
            Some(target) if new_parent(canvas, session, target).is_some() => 2.0,
            _ => 0.0,
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
        let (Some(drag), Some(parent)) = (session.drag_vector(), new_parent(canvas, session, target)) else {
            return StrategyApplicationResult::Empty;
        };
        let metadata = &canvas.starting.metadata;
        let (Some(frame), Some(parent_frame)) =
            (metadata.frame_in_canvas_coords(target), metadata.frame_in_canvas_coords(&parent))
        else {
            return StrategyApplicationResult::Empty;
        };
        let Some(moved) = canvas
            .project_contents
            .find_element(&target.to_static())
            .and_then(|element| rebased(element, frame.offset(drag), parent_frame))
        else {
            log::debug!("{target} cannot be rebased onto {parent}");
            return StrategyApplicationResult::Empty;
        };

        let old_parent = parent_bounds(canvas, target);
        let uid = moved.uid();
        let mut commands = pin_adjustments(canvas, target, drag, drag, old_parent);
        commands.extend([
            update_highlighted_views(WhenToRun::MidInteraction, vec![parent.clone()]),
            set_cursor(WhenToRun::MidInteraction, CssCursor::Reparent),
            set_elements_to_rerender(ElementsToRerender::All),
            delete_element(WhenToRun::OnComplete, target),
            add_elements(WhenToRun::OnComplete, InsertionPath::child(parent.clone()), vec![moved], None, None),
            update_selected_views(WhenToRun::OnComplete, vec![parent.append(uid)]),
        ]);
        StrategyApplicationResult::Success(commands)
    }
}
