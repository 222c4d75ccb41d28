//! Editor state: the durable document plus the canvas-side state around it.
//!
//! Large, rarely-changing parts sit behind `Arc` so snapshots (history
//! entries, patched projections) share them, and so "did this change" checks
//! can start with a pointer comparison.

use crate::error::EditorResult;
use crate::interaction::{InteractionSession, MetadataSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use ve_core::element::ElementChild;
use ve_core::geometry::EdgePosition;
use ve_core::metadata::{AllElementProps, DomMetadata, ElementInstanceMetadataMap, SpyMetadata};
use ve_core::project::{Imports, ProjectContents};
use ve_core::tree::ElementPathTree;
use ve_core::{ElementPath, Uid};

// ─── Canvas feedback ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CssCursor {
    Move,
    MovingMagic,
    ResizeEW,
    ResizeNS,
    ResizeNWSE,
    ResizeNESW,
    Crosshair,
    Reparent,
}

impl CssCursor {
    pub fn as_css(&self) -> &'static str {
        match self {
            Self::Move | Self::MovingMagic | Self::Reparent => "move",
            Self::ResizeEW => "ew-resize",
            Self::ResizeNS => "ns-resize",
            Self::ResizeNWSE => "nwse-resize",
            Self::ResizeNESW => "nesw-resize",
            Self::Crosshair => "crosshair",
        }
    }
}

impl fmt::Display for CssCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Resize cursor for a handle at `edge`.
pub fn pick_cursor_from_edge_position(edge: EdgePosition) -> CssCursor {
    if edge.is_corner() {
        if edge.x == edge.y {
            CssCursor::ResizeNWSE
        } else {
            CssCursor::ResizeNESW
        }
    } else if edge.is_horizontal_edge() {
        CssCursor::ResizeNS
    } else {
        CssCursor::ResizeEW
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
    Success,
}

/// A toast shown to the user. A newer notice replaces one with the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: String,
    pub message: String,
    pub level: NoticeLevel,
    /// Persistent notices stay until dismissed.
    pub persistent: bool,
}

impl Notice {
    pub fn new(id: &str, message: impl Into<String>, level: NoticeLevel, persistent: bool) -> Self {
        Self {
            id: id.to_string(),
            message: message.into(),
            level,
            persistent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum ElementsToRerender {
    #[default]
    All,
    Paths(Vec<ElementPath>),
}

impl ElementsToRerender {
    pub fn append(&self, paths: &[ElementPath]) -> Self {
        match self {
            Self::All => Self::All,
            Self::Paths(existing) => {
                let mut merged = existing.clone();
                for p in paths {
                    if !merged.contains(p) {
                        merged.push(p.clone());
                    }
                }
                Self::Paths(merged)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanvasState {
    pub interaction_session: Option<InteractionSession>,
    pub cursor: Option<CssCursor>,
    pub elements_to_rerender: ElementsToRerender,
    /// Paths of elements added during the current dispatch.
    pub reparented_to_paths: Vec<ElementPath>,
    pub scale: f64,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            interaction_session: None,
            cursor: None,
            elements_to_rerender: ElementsToRerender::All,
            reparented_to_paths: Vec::new(),
            scale: 1.0,
        }
    }
}

// ─── Modes ───────────────────────────────────────────────────────────────

/// An element waiting to be drawn onto the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertionSubject {
    pub uid: Uid,
    pub element: ElementChild,
    pub imports_to_add: Imports,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditorMode {
    #[default]
    Select,
    Insert {
        subjects: Vec<InsertionSubject>,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GithubSettings {
    pub target_repository: Option<String>,
    pub branch_name: Option<String>,
}

// ─── EditorState ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub id: Option<String>,
    pub project_name: String,
    pub is_loaded: bool,

    pub project_contents: Arc<ProjectContents>,
    pub github_settings: Arc<GithubSettings>,
    pub branch_origin_contents: Option<Arc<ProjectContents>>,

    pub selected_views: Vec<ElementPath>,
    pub highlighted_views: Vec<ElementPath>,
    pub hovered_views: Vec<ElementPath>,
    pub navigator_collapsed: Vec<ElementPath>,
    pub hidden_in_navigator: Vec<ElementPath>,
    pub mode: EditorMode,

    /// Raw measurements as reported by the metadata provider.
    pub dom_metadata: Arc<DomMetadata>,
    pub spy_metadata: Arc<SpyMetadata>,
    pub current_all_element_props: Arc<AllElementProps>,
    /// Reconstructed from the raw measurements.
    pub jsx_metadata: Arc<ElementInstanceMetadataMap>,
    pub element_path_tree: Arc<ElementPathTree>,
    pub all_element_props: Arc<AllElementProps>,

    pub canvas: CanvasState,
    pub toasts: Vec<Notice>,

    pub parse_or_print_in_flight: bool,
    pub vscode_ready: bool,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            id: None,
            project_name: String::new(),
            is_loaded: false,
            project_contents: Arc::default(),
            github_settings: Arc::default(),
            branch_origin_contents: None,
            selected_views: Vec::new(),
            highlighted_views: Vec::new(),
            hovered_views: Vec::new(),
            navigator_collapsed: Vec::new(),
            hidden_in_navigator: Vec::new(),
            mode: EditorMode::Select,
            dom_metadata: Arc::default(),
            spy_metadata: Arc::default(),
            current_all_element_props: Arc::default(),
            jsx_metadata: Arc::default(),
            element_path_tree: Arc::default(),
            all_element_props: Arc::default(),
            canvas: CanvasState::default(),
            toasts: Vec::new(),
            parse_or_print_in_flight: false,
            vscode_ready: false,
        }
    }
}

impl EditorState {
    pub fn new(project_name: &str, contents: ProjectContents) -> Self {
        Self {
            project_name: project_name.to_string(),
            project_contents: Arc::new(contents),
            ..Self::default()
        }
    }

    pub fn session(&self) -> Option<&InteractionSession> {
        self.canvas.interaction_session.as_ref()
    }

    /// The committed metadata, as a snapshot a new session can pin.
    pub fn metadata_snapshot(&self) -> MetadataSnapshot {
        MetadataSnapshot {
            metadata: Arc::clone(&self.jsx_metadata),
            all_element_props: Arc::clone(&self.all_element_props),
            element_path_tree: Arc::clone(&self.element_path_tree),
        }
    }

    pub fn add_toast(&mut self, notice: Notice) {
        self.toasts.retain(|t| t.id != notice.id);
        self.toasts.push(notice);
    }

    pub fn remove_toast(&mut self, id: &str) {
        self.toasts.retain(|t| t.id != id);
    }

    /// Whether any field that ends up in the save payload differs.
    pub fn persisted_fields_differ(&self, other: &EditorState) -> bool {
        let contents_differ = !Arc::ptr_eq(&self.project_contents, &other.project_contents)
            && self.project_contents != other.project_contents;
        let github_differ = !Arc::ptr_eq(&self.github_settings, &other.github_settings)
            && self.github_settings != other.github_settings;
        contents_differ || github_differ || self.branch_origin_contents != other.branch_origin_contents
    }
}

// ─── Persistence payload ─────────────────────────────────────────────────

/// What gets handed to the persistence layer on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistentModel {
    pub project_name: String,
    pub project_contents: ProjectContents,
    pub github_settings: GithubSettings,
    pub branch_origin_contents: Option<ProjectContents>,
    pub navigator_collapsed: Vec<ElementPath>,
    pub hidden_in_navigator: Vec<ElementPath>,
}

impl PersistentModel {
    pub fn from_editor(editor: &EditorState) -> Self {
        Self {
            project_name: editor.project_name.clone(),
            project_contents: (*editor.project_contents).clone(),
            github_settings: (*editor.github_settings).clone(),
            branch_origin_contents: editor.branch_origin_contents.as_deref().cloned(),
            navigator_collapsed: editor.navigator_collapsed.clone(),
            hidden_in_navigator: editor.hidden_in_navigator.clone(),
        }
    }

    pub fn to_msgpack(&self) -> EditorResult<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(bytes)
    }
}
