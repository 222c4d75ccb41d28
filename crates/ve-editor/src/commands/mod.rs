//! Commands: declarative, data-only edit intents.
//!
//! Strategies never touch editor state. They emit commands; the fold engine
//! runs each command against the working state, producing patches, and
//! decides which commands take part based on their `WhenToRun` qualifier
//! and the fold mode.

mod css;
mod elements;
pub mod patch;

pub use patch::{EditorStatePatch, apply_patches};

use crate::editor_state::{CssCursor, EditorState, ElementsToRerender, Notice};
use crate::error::EditorResult;
use serde::{Deserialize, Serialize};
use ve_core::css::CssNumber;
use ve_core::element::{ElementChild, IndexPosition, PropertyPath};
use ve_core::insertion::InsertionPath;
use ve_core::project::Imports;
use ve_core::ElementPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WhenToRun {
    Always,
    /// Visual feedback only; dropped when the gesture is committed.
    MidInteraction,
    /// Runs once, when the gesture is committed.
    OnComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransientOrNot {
    Transient,
    Permanent,
}

impl WhenToRun {
    pub fn runs_in(self, mode: TransientOrNot) -> bool {
        match (self, mode) {
            (Self::Always, _) => true,
            (Self::MidInteraction, TransientOrNot::Transient) => true,
            (Self::OnComplete, TransientOrNot::Permanent) => true,
            _ => false,
        }
    }
}

// ─── Command payloads ────────────────────────────────────────────────────

/// Add `delta` px to a CSS length. Percentages are rebased onto
/// `parent_dimension`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustCssLengthProperty {
    pub when: WhenToRun,
    pub target: ElementPath,
    pub property: PropertyPath,
    pub delta: f64,
    pub parent_dimension: Option<f64>,
    /// Write `delta` as the value when the property is missing.
    pub create_if_non_existent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetCssLengthProperty {
    pub when: WhenToRun,
    pub target: ElementPath,
    pub property: PropertyPath,
    pub value: CssNumber,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddElements {
    pub when: WhenToRun,
    pub parent: InsertionPath,
    pub elements: Vec<ElementChild>,
    pub index_position: Option<IndexPosition>,
    pub imports_to_add: Option<Imports>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteElement {
    pub when: WhenToRun,
    pub target: ElementPath,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RearrangeChildren {
    pub when: WhenToRun,
    pub target: ElementPath,
    pub rearranged: Vec<ElementPath>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RerenderMode {
    Set,
    Append,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    AdjustCssLengthProperty(AdjustCssLengthProperty),
    SetCssLengthProperty(SetCssLengthProperty),
    AddElements(AddElements),
    DeleteElement(DeleteElement),
    RearrangeChildren(RearrangeChildren),
    SetCursor {
        when: WhenToRun,
        cursor: Option<CssCursor>,
    },
    UpdateHighlightedViews {
        when: WhenToRun,
        paths: Vec<ElementPath>,
    },
    UpdateSelectedViews {
        when: WhenToRun,
        paths: Vec<ElementPath>,
    },
    SetElementsToRerender {
        when: WhenToRun,
        mode: RerenderMode,
        value: ElementsToRerender,
    },
    ShowToast {
        when: WhenToRun,
        notice: Notice,
    },
}

impl Command {
    pub fn when_to_run(&self) -> WhenToRun {
        match self {
            Self::AdjustCssLengthProperty(c) => c.when,
            Self::SetCssLengthProperty(c) => c.when,
            Self::AddElements(c) => c.when,
            Self::DeleteElement(c) => c.when,
            Self::RearrangeChildren(c) => c.when,
            Self::SetCursor { when, .. }
            | Self::UpdateHighlightedViews { when, .. }
            | Self::UpdateSelectedViews { when, .. }
            | Self::SetElementsToRerender { when, .. }
            | Self::ShowToast { when, .. } => *when,
        }
    }
}

// ─── Constructors ────────────────────────────────────────────────────────

pub fn adjust_css_length_property(
    when: WhenToRun,
    target: &ElementPath,
    property: PropertyPath,
    delta: f64,
    parent_dimension: Option<f64>,
    create_if_non_existent: bool,
) -> Command {
    Command::AdjustCssLengthProperty(AdjustCssLengthProperty {
        when,
        target: target.clone(),
        property,
        delta,
        parent_dimension,
        create_if_non_existent,
    })
}

pub fn set_css_length_property(
    when: WhenToRun,
    target: &ElementPath,
    property: PropertyPath,
    value: CssNumber,
) -> Command {
    Command::SetCssLengthProperty(SetCssLengthProperty {
        when,
        target: target.clone(),
        property,
        value,
    })
}

pub fn add_elements(
    when: WhenToRun,
    parent: InsertionPath,
    elements: Vec<ElementChild>,
    index_position: Option<IndexPosition>,
    imports_to_add: Option<Imports>,
) -> Command {
    Command::AddElements(AddElements {
        when,
        parent,
        elements,
        index_position,
        imports_to_add,
    })
}

pub fn delete_element(when: WhenToRun, target: &ElementPath) -> Command {
    Command::DeleteElement(DeleteElement {
        when,
        target: target.clone(),
    })
}

pub fn rearrange_children(when: WhenToRun, target: &ElementPath, rearranged: Vec<ElementPath>) -> Command {
    Command::RearrangeChildren(RearrangeChildren {
        when,
        target: target.clone(),
        rearranged,
    })
}

pub fn set_cursor(when: WhenToRun, cursor: CssCursor) -> Command {
    Command::SetCursor {
        when,
        cursor: Some(cursor),
    }
}

pub fn update_highlighted_views(when: WhenToRun, paths: Vec<ElementPath>) -> Command {
    Command::UpdateHighlightedViews { when, paths }
}

pub fn update_selected_views(when: WhenToRun, paths: Vec<ElementPath>) -> Command {
    Command::UpdateSelectedViews { when, paths }
}

pub fn set_elements_to_rerender(value: ElementsToRerender) -> Command {
    Command::SetElementsToRerender {
        when: WhenToRun::MidInteraction,
        mode: RerenderMode::Set,
        value,
    }
}

pub fn append_elements_to_rerender(paths: Vec<ElementPath>) -> Command {
    Command::SetElementsToRerender {
        when: WhenToRun::MidInteraction,
        mode: RerenderMode::Append,
        value: ElementsToRerender::Paths(paths),
    }
}

pub fn show_toast(when: WhenToRun, notice: Notice) -> Command {
    Command::ShowToast { when, notice }
}

// ─── Running ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult {
    pub patches: Vec<EditorStatePatch>,
    pub description: String,
}

impl CommandResult {
    fn new(patches: Vec<EditorStatePatch>, description: impl Into<String>) -> Self {
        Self {
            patches,
            description: description.into(),
        }
    }

    fn single(patch: EditorStatePatch, description: impl Into<String>) -> Self {
        Self::new(vec![patch], description)
    }
}

/// Compute the patches for one command against `editor`.
pub fn run_command(editor: &EditorState, command: &Command) -> EditorResult<CommandResult> {
    match command {
        Command::AdjustCssLengthProperty(c) => css::run_adjust(editor, c),
        Command::SetCssLengthProperty(c) => css::run_set(editor, c),
        Command::AddElements(c) => elements::run_add(editor, c),
        Command::DeleteElement(c) => elements::run_delete(editor, c),
        Command::RearrangeChildren(c) => elements::run_rearrange(editor, c),
        Command::SetCursor { cursor, .. } => Ok(CommandResult::single(
            EditorStatePatch::SetCursor(*cursor),
            match cursor {
                Some(c) => format!("Set Cursor: {c}"),
                None => "Clear Cursor".to_string(),
            },
        )),
        Command::UpdateHighlightedViews { paths, .. } => Ok(CommandResult::single(
            EditorStatePatch::SetHighlightedViews(paths.clone()),
            format!("Update Highlighted Views: {}", join_paths(paths)),
        )),
        Command::UpdateSelectedViews { paths, .. } => Ok(CommandResult::single(
            EditorStatePatch::SetSelectedViews(paths.clone()),
            format!("Update Selected Views: {}", join_paths(paths)),
        )),
        Command::SetElementsToRerender { mode, value, .. } => {
            let patch = match (mode, value) {
                (RerenderMode::Append, ElementsToRerender::Paths(paths)) => {
                    EditorStatePatch::AppendElementsToRerender(paths.clone())
                }
                (RerenderMode::Append, ElementsToRerender::All) | (RerenderMode::Set, _) => {
                    EditorStatePatch::SetElementsToRerender(value.clone())
                }
            };
            let description = match value {
                ElementsToRerender::All => "Rerender All Elements".to_string(),
                ElementsToRerender::Paths(paths) => format!("Rerender Elements: {}", join_paths(paths)),
            };
            Ok(CommandResult::single(patch, description))
        }
        Command::ShowToast { notice, .. } => Ok(CommandResult::single(
            EditorStatePatch::AddToast(notice.clone()),
            format!("Show Toast: {}", notice.message),
        )),
    }
}

fn join_paths(paths: &[ElementPath]) -> String {
    paths.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ")
}

// ─── Fold engine ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CommandDescription {
    pub description: String,
    pub transient: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoldResult {
    pub state: EditorState,
    pub accumulated_patches: Vec<EditorStatePatch>,
    pub descriptions: Vec<CommandDescription>,
}

/// Run the commands that take part in `mode` against `editor` in order,
/// each seeing the output of the previous one.
pub fn fold_and_apply_commands(
    editor: &EditorState,
    commands: &[Command],
    mode: TransientOrNot,
) -> EditorResult<FoldResult> {
    let mut state = editor.clone();
    let mut accumulated_patches = Vec::new();
    let mut descriptions = Vec::new();

    for command in commands {
        let when = command.when_to_run();
        if !when.runs_in(mode) {
            continue;
        }
        let result = run_command(&state, command)?;
        for patch in &result.patches {
            patch.apply(&mut state);
        }
        accumulated_patches.extend(result.patches);
        descriptions.push(CommandDescription {
            description: result.description,
            transient: when == WhenToRun::MidInteraction,
        });
    }

    log::trace!(
        "folded {} of {} commands ({mode:?}) into {} patches",
        descriptions.len(),
        commands.len(),
        accumulated_patches.len()
    );
    Ok(FoldResult {
        state,
        accumulated_patches,
        descriptions,
    })
}
