//! Shared fixtures and recording collaborators for the ve-editor
//! integration tests.

#![allow(dead_code)]

use serde_json::json;
use std::sync::{Arc, Mutex};
use ve_core::element::{ElementChild, style_props};
use ve_core::metadata::{
    CssPosition, ElementInstanceMetadata, ElementInstanceMetadataMap, FlexDirection, LayoutSystem,
    SpecialSizeMeasurements,
};
use ve_core::path::path;
use ve_core::{CanvasRect, Component, ProjectContents, ProjectFile};
use ve_editor::{
    Collaborators, Dispatcher, EditorAction, EditorConfig, EditorState, ParseRequest, ParserWorkers, Persistence,
    PersistentModel, PreviewSink, ProjectChanges, ProjectChangesSink, SaveType,
};

// ─── Recording collaborators ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Calls {
    pub saves: Vec<(String, SaveType)>,
    pub logins: Vec<bool>,
    pub parse_requests: Vec<ParseRequest>,
    pub previews: usize,
    pub changes: Vec<ProjectChanges>,
}

#[derive(Debug, Clone, Default)]
pub struct Recorder(pub Arc<Mutex<Calls>>);

impl Recorder {
    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            persistence: Box::new(self.clone()),
            workers: Box::new(self.clone()),
            preview: Box::new(self.clone()),
            project_changes: Box::new(self.clone()),
        }
    }

    pub fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
        self.0.lock().unwrap()
    }
}

impl Persistence for Recorder {
    fn save(&mut self, project_name: &str, _model: &PersistentModel, save_type: SaveType) {
        self.calls().saves.push((project_name.to_string(), save_type));
    }

    fn login(&mut self) {
        self.calls().logins.push(true);
    }

    fn logout(&mut self) {
        self.calls().logins.push(false);
    }
}

impl ParserWorkers for Recorder {
    fn request_parse(&mut self, request: ParseRequest) {
        self.calls().parse_requests.push(request);
    }
}

impl PreviewSink for Recorder {
    fn update_preview(&mut self, _id: Option<&str>, _contents: &Arc<ProjectContents>) {
        self.calls().previews += 1;
    }
}

impl ProjectChangesSink for Recorder {
    fn send_changes(&mut self, changes: &ProjectChanges) {
        self.calls().changes.push(changes.clone());
    }
}

// ─── Projects ────────────────────────────────────────────────────────────

pub struct Scene {
    pub contents: ProjectContents,
    pub metadata: ElementInstanceMetadataMap,
}

fn measured(p: &str, frame: CanvasRect, ssm: SpecialSizeMeasurements) -> ElementInstanceMetadata {
    ElementInstanceMetadata::new(path(p)).with_frame(frame).with_measurements(ssm)
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

fn scene_frame() -> ElementInstanceMetadata {
    measured(
        "sb/scene",
        CanvasRect::new(0.0, 0.0, 400.0, 400.0),
        SpecialSizeMeasurements {
            provides_bounds_for_absolute_children: true,
            ..Default::default()
        },
    )
}

fn contents(app: Component) -> ProjectContents {
    ProjectContents::new()
        .with_file("/storyboard.js", ProjectFile::parsed(vec![storyboard()]))
        .with_file("/app.js", ProjectFile::parsed(vec![app]))
}

/// A 400×100 flex row holding `a` (180 wide) and `b` (100 wide).
pub fn flex_row() -> Scene {
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
        scene_frame(),
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
    Scene {
        contents: contents(app),
        metadata,
    }
}

/// One absolutely positioned 100×100 box at (50, 50).
pub fn absolute_box() -> Scene {
    let app = Component {
        name: "App".into(),
        param: None,
        root: ElementChild::element(
            "root",
            "div",
            vec![],
            vec![ElementChild::element(
                "box",
                "div",
                style_props(&[
                    ("position", json!("absolute")),
                    ("left", json!(50)),
                    ("top", json!(50)),
                    ("width", json!(100)),
                    ("height", json!(100)),
                ]),
                vec![],
            )],
        ),
    };
    let root_frame = CanvasRect::new(0.0, 0.0, 400.0, 400.0);
    let metadata = [
        scene_frame(),
        measured(
            "sb/scene:root",
            root_frame,
            SpecialSizeMeasurements {
                provides_bounds_for_absolute_children: true,
                ..Default::default()
            },
        ),
        measured(
            "sb/scene:root/box",
            CanvasRect::new(50.0, 50.0, 100.0, 100.0),
            SpecialSizeMeasurements {
                position: CssPosition::Absolute,
                immediate_parent_bounds: Some(root_frame),
                ..Default::default()
            },
        ),
    ]
    .into_iter()
    .collect();
    Scene {
        contents: contents(app),
        metadata,
    }
}

/// `outer > middle > inner`: `outer` is absolute, the rest are flow-laid-out
/// only children.
pub fn nested_only_children() -> Scene {
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
    let middle = CanvasRect::new(10.0, 10.0, 300.0, 50.0);
    let metadata = [
        scene_frame(),
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
        measured(
            "sb/scene:outer/middle",
            middle,
            SpecialSizeMeasurements {
                immediate_parent_bounds: Some(outer),
                ..Default::default()
            },
        ),
        measured(
            "sb/scene:outer/middle/inner",
            CanvasRect::new(10.0, 10.0, 300.0, 20.0),
            SpecialSizeMeasurements {
                immediate_parent_bounds: Some(middle),
                ..Default::default()
            },
        ),
    ]
    .into_iter()
    .collect();
    Scene {
        contents: contents(app),
        metadata,
    }
}

// ─── Dispatchers ─────────────────────────────────────────────────────────

/// Route `log` output through the test harness; `RUST_LOG=debug` shows
/// per-group dispatch timings.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A loaded editor over `scene`, measured, with `selected` selected.
pub fn loaded(scene: Scene, selected: &[&str], config: EditorConfig, recorder: &Recorder) -> Dispatcher {
    init_logging();
    let editor = EditorState {
        is_loaded: true,
        ..EditorState::new("test", scene.contents)
    };
    let mut dispatcher = Dispatcher::new(editor, config, recorder.collaborators());
    dispatcher
        .dispatch(vec![
            EditorAction::UpdateMetadata {
                dom: Some(scene.metadata),
                spy: None,
                all_element_props: None,
            },
            EditorAction::SelectComponents {
                targets: selected.iter().map(|p| path(p)).collect(),
                add_to_selection: false,
            },
        ])
        .unwrap();
    dispatcher
}

/// The literal value of `style.<prop>` on the element at `p`.
pub fn style_value(editor: &EditorState, p: &str, prop: &str) -> Option<serde_json::Value> {
    use ve_core::element::{AttributeValue, get_attribute_at_path};
    let element = editor.project_contents.find_element(&path(p).to_static())?.as_element()?;
    match get_attribute_at_path(&element.props, &ve_core::PropertyPath::style(prop))? {
        AttributeValue::Value(v) => Some(v.clone()),
        _ => None,
    }
}
