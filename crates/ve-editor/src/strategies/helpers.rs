//! Shared checks for the built-in strategies.

use super::{InteractionCanvasState, InteractionTarget};
use crate::commands::{Command, WhenToRun, adjust_css_length_property};
use crate::interaction::{ActiveControl, InteractionSession};
use ve_core::element::{Attribute, Component, get_attribute_at_path};
use ve_core::geometry::{CanvasRect, CanvasVector};
use ve_core::project::ProjectContents;
use ve_core::{ElementPath, PropertyPath};

/// The only selected path, if exactly one is selected.
pub(super) fn single_target(canvas: &InteractionCanvasState) -> Option<&ElementPath> {
    match &canvas.interaction_target {
        InteractionTarget::Targets(paths) if paths.len() == 1 => paths.first(),
        _ => None,
    }
}

pub(super) fn is_drag_on(session: &InteractionSession, control: fn(&ActiveControl) -> bool) -> bool {
    session.is_drag() && control(&session.active_control())
}

pub(super) fn is_bounding_area(control: &ActiveControl) -> bool {
    matches!(control, ActiveControl::BoundingArea)
}

pub(super) fn is_resize_handle(control: &ActiveControl) -> bool {
    matches!(control, ActiveControl::ResizeHandle { .. })
}

/// Intrinsic elements (lowercase names) always pass. Components pass when
/// found in the project and `check` holds; external components never do.
fn component_capability(contents: &ProjectContents, path: &ElementPath, check: fn(&Component) -> bool) -> bool {
    let Some(element) = contents.find_element(&path.to_static()).and_then(|e| e.as_element()) else {
        return false;
    };
    if element.name.starts_with(|c: char| c.is_ascii_lowercase()) {
        return true;
    }
    contents.find_component(&element.name).is_some_and(check)
}

pub(super) fn honours_props_size(canvas: &InteractionCanvasState, path: &ElementPath) -> bool {
    component_capability(&canvas.project_contents, path, Component::honours_props_size)
}

pub(super) fn honours_props_position(canvas: &InteractionCanvasState, path: &ElementPath) -> bool {
    component_capability(&canvas.project_contents, path, Component::honours_props_position)
}

pub(super) fn parent_bounds(canvas: &InteractionCanvasState, path: &ElementPath) -> Option<CanvasRect> {
    canvas
        .starting
        .metadata
        .find(path)
        .and_then(|m| m.special_size_measurements.immediate_parent_bounds)
}

// ─── Pins ────────────────────────────────────────────────────────────────

/// The style props an absolutely positioned element is pinned by on one
/// axis. With neither side set the near side is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct AxisPins {
    pub near: bool,
    pub far: bool,
}

impl AxisPins {
    fn read(props: &[Attribute], near: &str, far: &str) -> Self {
        let has = |prop: &str| get_attribute_at_path(props, &PropertyPath::style(prop)).is_some();
        let (near, far) = (has(near), has(far));
        Self { near: near || !far, far }
    }
}

/// Horizontal (`left`/`right`) and vertical (`top`/`bottom`) pins.
pub(super) fn pins_of(props: &[Attribute]) -> (AxisPins, AxisPins) {
    (AxisPins::read(props, "left", "right"), AxisPins::read(props, "top", "bottom"))
}

/// Pins of the element at `path` in the project, near sides when unknown.
fn element_pins(canvas: &InteractionCanvasState, path: &ElementPath) -> (AxisPins, AxisPins) {
    canvas
        .project_contents
        .find_element(&path.to_static())
        .and_then(|e| e.as_element())
        .map(|e| pins_of(&e.props))
        .unwrap_or((AxisPins { near: true, far: false }, AxisPins { near: true, far: false }))
}

/// Adjustments moving the pins of `target` after its near edges moved by
/// `near` and its far edges by `far`. Far pins count inwards from the
/// parent's far edge, so they move against the delta. Zero deltas and
/// unset far pins produce nothing; a missing near pin is created.
pub(super) fn pin_adjustments(
    canvas: &InteractionCanvasState,
    target: &ElementPath,
    near: CanvasVector,
    far: CanvasVector,
    parent: Option<CanvasRect>,
) -> Vec<Command> {
    let (horizontal, vertical) = element_pins(canvas, target);
    let axes = [
        (horizontal, "left", "right", near.x, far.x, parent.map(|p| p.width)),
        (vertical, "top", "bottom", near.y, far.y, parent.map(|p| p.height)),
    ];
    let mut commands = Vec::new();
    for (pins, near_prop, far_prop, near_delta, far_delta, parent_dim) in axes {
        if pins.near && near_delta != 0.0 {
            commands.push(adjust_css_length_property(
                WhenToRun::Always,
                target,
                PropertyPath::style(near_prop),
                near_delta,
                parent_dim,
                true,
            ));
        }
        if pins.far && far_delta != 0.0 {
            commands.push(adjust_css_length_property(
                WhenToRun::Always,
                target,
                PropertyPath::style(far_prop),
                -far_delta,
                parent_dim,
                false,
            ));
        }
    }
    commands
}
