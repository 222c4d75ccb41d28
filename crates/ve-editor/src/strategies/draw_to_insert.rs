//! Draw a new element onto the canvas in insert mode.
//!
//! The element is parented to the deepest container under the point where
//! the drag started and absolutely positioned at the drawn rectangle.

use super::{CanvasStrategy, InteractionCanvasState, InteractionLifecycle, InteractionTarget, StrategyApplicationResult};
use crate::commands::{
    WhenToRun, add_elements, set_cursor, set_elements_to_rerender, update_highlighted_views, update_selected_views,
};
use crate::editor_state::{CssCursor, ElementsToRerender, InsertionSubject};
use crate::interaction::InteractionSession;
use serde_json::json;
use ve_core::element::{AttributeValue, ElementChild, set_attribute_at_path};
use ve_core::geometry::CanvasRect;
use ve_core::insertion::InsertionPath;
use ve_core::{CanvasPoint, CssNumber, ElementPath, PropertyPath, hit_test_parent};

pub struct DrawToInsertStrategy;

fn single_subject(canvas: &InteractionCanvasState) -> Option<&InsertionSubject> {
    match &canvas.interaction_target {
        InteractionTarget::InsertionSubjects(subjects) if subjects.len() == 1 => subjects.first(),
        _ => None,
    }
}

/// Deepest element under `point` that can hold absolutely positioned children.
fn insertion_parent(canvas: &InteractionCanvasState, point: CanvasPoint) -> Option<ElementPath> {
    let metadata = &canvas.starting.metadata;
    hit_test_parent(metadata, &canvas.starting.element_path_tree, point, &[], |p| {
        let provides_bounds = metadata
            .find(p)
            .is_some_and(|m| m.special_size_measurements.provides_bounds_for_absolute_children);
        provides_bounds
            && canvas
                .project_contents
                .find_element(&p.to_static())
                .is_some_and(|e| e.as_element().is_some())
    })
}

fn positioned(element: &ElementChild, frame: CanvasRect, parent: CanvasRect) -> Option<ElementChild> {
    let mut element = element.clone();
    let ElementChild::Element(jsx) = &mut element else {
        return None;
    };
    let style = [
        ("position", json!("absolute")),
        ("left", CssNumber::unitless(frame.x - parent.x).to_json()),
        ("top", CssNumber::unitless(frame.y - parent.y).to_json()),
        ("width", CssNumber::unitless(frame.width).to_json()),
        ("height", CssNumber::unitless(frame.height).to_json()),
    ];
    for (prop, value) in style {
        set_attribute_at_path(&mut jsx.props, &PropertyPath::style(prop), AttributeValue::Value(value)).ok()?;
    }
    Some(element)
}

impl CanvasStrategy for DrawToInsertStrategy {
    fn id(&self) -> &'static str {
        "DRAW_TO_INSERT"
    }

    fn name(&self) -> String {
        "Draw to Insert".to_string()
    }

    fn is_applicable(&self, canvas: &InteractionCanvasState, _session: Option<&InteractionSession>) -> bool {
        single_subject(canvas).is_some()
    }

    fn fitness(&self, canvas: &InteractionCanvasState, session: &InteractionSession) -> f64 {
        if self.is_applicable(canvas, Some(session)) && session.is_drag() {
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
        let (Some(subject), Some(data)) = (single_subject(canvas), session.drag_data()) else {
            return StrategyApplicationResult::Empty;
        };
        let Some(parent) = insertion_parent(canvas, data.drag_start) else {
            log::debug!("nothing to insert into at {:?}", data.drag_start);
            return StrategyApplicationResult::Empty;
        };
        let feedback = [
            update_highlighted_views(WhenToRun::MidInteraction, vec![parent.clone()]),
            set_cursor(WhenToRun::MidInteraction, CssCursor::Crosshair),
        ];
        let Some(drag) = data.drag else {
            return StrategyApplicationResult::Success(feedback.to_vec());
        };
        let Some(parent_frame) = canvas.starting.metadata.frame_in_canvas_coords(&parent) else {
            return StrategyApplicationResult::Empty;
        };
        let frame = CanvasRect::from_points(data.drag_start, data.drag_start + drag);
        let Some(element) = positioned(&subject.element, frame, parent_frame) else {
            return StrategyApplicationResult::Empty;
        };

        let mut commands = vec![
            add_elements(
                WhenToRun::Always,
                InsertionPath::child(parent.clone()),
                vec![element],
                None,
                Some(subject.imports_to_add.clone()),
            ),
            update_selected_views(WhenToRun::OnComplete, vec![parent.append(subject.uid)]),
        ];
        commands.extend(feedback);
        commands.push(set_elements_to_rerender(ElementsToRerender::All));
        StrategyApplicationResult::Success(commands)
    }
}
