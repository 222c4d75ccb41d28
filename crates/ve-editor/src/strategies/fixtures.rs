//! Canvas fixtures shared by the strategy tests.

use super::{InteractionCanvasState, InteractionTarget};
use crate::interaction::{
    ActiveControl, InteractionSession, InteractionSessionStart, InteractionUpdate, KeyState, MetadataSnapshot,
    Modifiers,
};
use kurbo::{Point, Vec2};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use ve_core::element::{Attributes, ElementChild, style_props};
use ve_core::geometry::CanvasRect;
use ve_core::metadata::{
    CssPosition, ElementInstanceMetadata, ElementInstanceMetadataMap, FlexDirection, LayoutSystem,
    SpecialSizeMeasurements,
};
use ve_core::path::path;
use ve_core::project::{ProjectContents, ProjectFile};
use ve_core::{Component, ElementPath, ElementPathTree};

pub(crate) struct Fixture {
    pub contents: Arc<ProjectContents>,
    pub metadata: ElementInstanceMetadataMap,
    pub drag_start: Point,
}

impl Fixture {
    pub fn snapshot(&self) -> MetadataSnapshot {
        MetadataSnapshot {
            metadata: Arc::new(self.metadata.clone()),
            all_element_props: Arc::default(),
            element_path_tree: Arc::new(ElementPathTree::from_paths(self.metadata.paths())),
        }
    }

    pub fn canvas(&self, targets: &[ElementPath]) -> InteractionCanvasState {
        InteractionCanvasState {
            interaction_target: InteractionTarget::Targets(targets.to_vec()),
            project_contents: Arc::clone(&self.contents),
            starting: self.snapshot(),
            scale: 1.0,
        }
    }

    /// Canvas with `p`'s frame unmeasured and no targets.
    pub fn without_frame(&self, p: &str) -> InteractionCanvasState {
        let stripped: ElementInstanceMetadataMap = self
            .metadata
            .iter()
            .cloned()
            .map(|mut m| {
                if m.element_path == path(p) {
                    m.global_frame = None;
                }
                m
            })
            .collect();
        let mut canvas = self.canvas(&[]);
        canvas.starting.metadata = Arc::new(stripped);
        canvas
    }

    pub fn drag(&self, control: ActiveControl, drag: Option<(f64, f64)>) -> InteractionSession {
        let now = Instant::now();
        let session = InteractionSession::new(
            InteractionSessionStart::drag(self.drag_start, Modifiers::NONE, control, now),
            self.snapshot(),
        );
        match drag {
            Some((x, y)) => session.updated(InteractionUpdate::Drag {
                drag: Vec2::new(x, y),
                modifiers: Modifiers::NONE,
                now,
            }),
            None => session,
        }
    }

    pub fn keyboard(&self, key_states: &[KeyState]) -> InteractionSession {
        let now = Instant::now();
        let mut states = key_states.iter().cloned();
        let first = states.next().unwrap_or_else(|| KeyState::new(&[], Modifiers::NONE));
        let mut session = InteractionSession::new(InteractionSessionStart::keyboard(first, now), self.snapshot());
        for key_state in states {
            session = session.updated(InteractionUpdate::Keyboard { key_state, now });
        }
        session
    }
}

fn measured(p: &str, frame: CanvasRect, ssm: SpecialSizeMeasurements) -> ElementInstanceMetadata {
    ElementInstanceMetadata::new(path(p))
        .with_frame(frame)
        .with_measurements(ssm)
}

fn storyboard() -> Component {
    Component {
        name: "Storyboard".into(),
        param: None,
        root: ElementChild::element(
            "sb",
            "Storyboard",
            vec![],
            vec![ElementChild::element("scene", "Scene", vec![], vec![])],
        ),
    }
}

fn scene_metadata() -> ElementInstanceMetadata {
    measured(
        "sb/scene",
        CanvasRect::new(0.0, 0.0, 400.0, 400.0),
        SpecialSizeMeasurements {
            provides_bounds_for_absolute_children: true,
            ..Default::default()
        },
    )
}

fn project(app: Component) -> Arc<ProjectContents> {
    Arc::new(
        ProjectContents::new()
            .with_file("/storyboard.js", ProjectFile::parsed(vec![storyboard()]))
            .with_file("/app.js", ProjectFile::parsed(vec![app])),
    )
}

/// A flex row (400×100) holding `a` (180 wide) and `b` (100 wide).
pub(crate) fn flex_row() -> Fixture {
    let app = Component {
        name: "App".into(),
        param: None,
        root: ElementChild::element(
            "root",
            "div",
            style_props(&[("display", json!("flex"))]),
            vec![
                ElementChild::element("a", "div", style_props(&[("width", json!(180))]), vec![]),
                ElementChild::element("b", "div", style_props(&[("width", json!(100))]), vec![]),
            ],
        ),
    };
    let row = CanvasRect::new(0.0, 0.0, 400.0, 100.0);
    let flex_child = SpecialSizeMeasurements {
        parent_layout_system: LayoutSystem::Flex,
        parent_flex_direction: Some(FlexDirection::Row),
        immediate_parent_bounds: Some(row),
        ..Default::default()
    };
    let metadata = [
        scene_metadata(),
        measured(
            "sb/scene:root",
            row,
            SpecialSizeMeasurements {
                layout_system_for_children: LayoutSystem::Flex,
                display: "flex".into(),
                ..Default::default()
            },
        ),
        measured("sb/scene:root/a", CanvasRect::new(0.0, 0.0, 180.0, 100.0), flex_child.clone()),
        measured("sb/scene:root/b", CanvasRect::new(180.0, 0.0, 100.0, 100.0), flex_child),
    ]
    .into_iter()
    .collect();
    Fixture {
        contents: project(app),
        metadata,
        drag_start: Point::new(90.0, 50.0),
    }
}

fn absolute(pins: [(&str, i64); 2], size: i64) -> Attributes {
    style_props(&[
        ("position", json!("absolute")),
        (pins[0].0, json!(pins[0].1)),
        (pins[1].0, json!(pins[1].1)),
        ("width", json!(size)),
        ("height", json!(size)),
    ])
}

/// Two absolutely positioned children: `moving` (100×100 at 50,50) and a
/// container `other` (200×200 at 200,0).
pub(crate) fn absolute_pair() -> Fixture {
    pair_with(absolute([("left", 50), ("top", 50)], 100))
}

/// [`absolute_pair`] with `moving` pinned by `right` and `bottom` instead.
pub(crate) fn far_pinned_pair() -> Fixture {
    pair_with(absolute([("right", 250), ("bottom", 250)], 100))
}

fn pair_with(moving: Attributes) -> Fixture {
    let app = Component {
        name: "App".into(),
        param: None,
        root: ElementChild::element(
            "root",
            "div",
            vec![],
            vec![
                ElementChild::element("moving", "div", moving, vec![]),
                ElementChild::element("other", "div", absolute([("left", 200), ("top", 0)], 200), vec![]),
            ],
        ),
    };
    let root_frame = CanvasRect::new(0.0, 0.0, 400.0, 400.0);
    let absolute_child = SpecialSizeMeasurements {
        position: CssPosition::Absolute,
        immediate_parent_bounds: Some(root_frame),
        provides_bounds_for_absolute_children: true,
        ..Default::default()
    };
    let metadata = [
        scene_metadata(),
        measured(
            "sb/scene:root",
            root_frame,
            SpecialSizeMeasurements {
                provides_bounds_for_absolute_children: true,
                ..Default::default()
            },
        ),
        measured("sb/scene:root/moving", CanvasRect::new(50.0, 50.0, 100.0, 100.0), absolute_child.clone()),
        measured("sb/scene:root/other", CanvasRect::new(200.0, 0.0, 200.0, 200.0), absolute_child),
    ]
    .into_iter()
    .collect();
    Fixture {
        contents: project(app),
        metadata,
        drag_start: Point::new(100.0, 100.0),
    }
}

/// `outer > middle > inner`, each an only child. `outer` is absolutely
/// positioned in the scene; the other two are in normal flow.
pub(crate) fn nested_only_children() -> Fixture {
    let app = Component {
        name: "App".into(),
        param: None,
        root: ElementChild::element(
            "outer",
            "div",
            style_props(&[
                ("position", json!("absolute")),
                ("left", json!(10)),
                ("top", json!(10)),
                ("width", json!(300)),
                ("height", json!(200)),
            ]),
            vec![ElementChild::element(
                "middle",
                "div",
                vec![],
                vec![ElementChild::element("inner", "div", vec![], vec![])],
            )],
        ),
    };
    let outer = CanvasRect::new(10.0, 10.0, 300.0, 200.0);
    let flow = |bounds: CanvasRect| SpecialSizeMeasurements {
        immediate_parent_bounds: Some(bounds),
        ..Default::default()
    };
    let metadata = [
        scene_metadata(),
        measured(
            "sb/scene:outer",
            outer,
            SpecialSizeMeasurements {
                position: CssPosition::Absolute,
                immediate_parent_bounds: Some(CanvasRect::new(0.0, 0.0, 400.0, 400.0)),
                provides_bounds_for_absolute_children: true,
                ..Default::default()
            },
        ),
        measured("sb/scene:outer/middle", CanvasRect::new(10.0, 10.0, 300.0, 50.0), flow(outer)),
        measured(
            "sb/scene:outer/middle/inner",
            CanvasRect::new(10.0, 10.0, 300.0, 20.0),
            flow(CanvasRect::new(10.0, 10.0, 300.0, 50.0)),
        ),
    ]
    .into_iter()
    .collect();
    Fixture {
        contents: project(app),
        metadata,
        drag_start: Point::new(310.0, 110.0),
    }
}
