//! Structural commands: add, delete, rearrange.

use super::{AddElements, CommandResult, DeleteElement, EditorStatePatch, RearrangeChildren};
use crate::editor_state::EditorState;
use crate::error::EditorResult;
use ve_core::element::{insert_children, rearrange_children, remove_child};
use ve_core::project::{Imports, ProjectContents, merge_imports};
use ve_core::{Component, CoreError, CoreResult, StaticElementPath};

/// Edit a copy of the file that owns `target` and return it as a patch.
/// Only that file is cloned.
pub(super) fn edit_owning_file<R>(
    contents: &ProjectContents,
    target: &StaticElementPath,
    edit: impl FnOnce(&mut Vec<Component>, &mut Imports) -> CoreResult<R>,
) -> CoreResult<(EditorStatePatch, R)> {
    let not_found = || CoreError::ElementNotFound(target.to_string());
    let file_path = contents.file_for_element(target).ok_or_else(not_found)?;
    let file = contents.get(file_path).ok_or_else(not_found)?;
    let mut scratch = ProjectContents::new().with_file(file_path, file.clone());
    let result = scratch.modify_parsed(target, edit)?;
    let file = scratch.remove(file_path).ok_or_else(not_found)?;
    Ok((
        EditorStatePatch::UpdateFile {
            path: file_path.to_string(),
            file: Box::new(file),
        },
        result,
    ))
}

pub(super) fn run_add(editor: &EditorState, command: &AddElements) -> EditorResult<CommandResult> {
    let description = format!("Add Elements to {}", command.parent);
    let parent = command.parent.intended_parent().to_static();
    if editor.project_contents.file_for_element(&parent).is_none() {
        log::warn!("add elements: parent {parent} not found");
        return Ok(CommandResult::new(Vec::new(), format!("{description} (parent not found)")));
    }
    let (patch, inserted) = edit_owning_file(&editor.project_contents, &parent, |components, imports| {
        let inserted = insert_children(
            components,
            &command.parent,
            command.elements.clone(),
            command.index_position,
        )?;
        if let Some(added) = &command.imports_to_add {
            *imports = merge_imports(imports, added);
        }
        Ok(inserted)
    })?;
    Ok(CommandResult::new(
        vec![patch, EditorStatePatch::AddReparentedToPaths(inserted)],
        description,
    ))
}

pub(super) fn run_delete(editor: &EditorState, command: &DeleteElement) -> EditorResult<CommandResult> {
    let description = format!("Delete Element {}", command.target);
    let target = command.target.to_static();
    if editor.project_contents.file_for_element(&target).is_none() {
        return Ok(CommandResult::new(Vec::new(), format!("{description} (not found)")));
    }
    let (patch, removed) = edit_owning_file(&editor.project_contents, &target, |components, _| {
        Ok(remove_child(components, &target))
    })?;
    Ok(if removed {
        CommandResult::single(patch, description)
    } else {
        CommandResult::new(Vec::new(), format!("{description} (not found)"))
    })
}

pub(super) fn run_rearrange(editor: &EditorState, command: &RearrangeChildren) -> EditorResult<CommandResult> {
    let description = format!("Rearrange Children of {}", command.target);
    let target = command.target.to_static();
    let rearranged: Vec<StaticElementPath> = command.rearranged.iter().map(|p| p.to_static()).collect();
    let (patch, ()) = edit_owning_file(&editor.project_contents, &target, |components, _| {
        rearrange_children(components, &target, &rearranged)
    })?;
    Ok(CommandResult::single(patch, description))
}
