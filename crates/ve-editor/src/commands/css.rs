//! CSS length commands.

use super::elements::edit_owning_file;
use super::{AdjustCssLengthProperty, CommandResult, SetCssLengthProperty};
use crate::editor_state::EditorState;
use crate::error::EditorResult;
use ve_core::CoreError;
use ve_core::css::CssNumber;
use ve_core::element::{AttributeValue, ElementChild, get_attribute_at_path, set_attribute_at_path, transform_at_path};

enum Adjusted {
    Written(CssNumber),
    NotAnElement,
    Missing,
    NotAdjustable(String),
}

pub(super) fn run_adjust(editor: &EditorState, command: &AdjustCssLengthProperty) -> EditorResult<CommandResult> {
    let description = format!(
        "Adjust Css Length Prop: {}/{} by {}",
        command.target, command.property, command.delta
    );
    if command.delta == 0.0 {
        return Ok(CommandResult::new(Vec::new(), format!("{description} (no change)")));
    }
    let target = command.target.to_static();
    if editor.project_contents.find_element(&target).is_none() {
        log::warn!("adjust css length: {} not found", command.target);
        return Ok(CommandResult::new(Vec::new(), format!("{description} (element not found)")));
    }

    let (patch, outcome) = edit_owning_file(&editor.project_contents, &target, |components, _| {
        transform_at_path(components, &target, |element| {
            let ElementChild::Element(element) = element else {
                return Ok(Adjusted::NotAnElement);
            };
            let next = match get_attribute_at_path(&element.props, &command.property) {
                None if command.create_if_non_existent => CssNumber::unitless(command.delta),
                None => return Ok(Adjusted::Missing),
                Some(AttributeValue::Value(value)) => {
                    match CssNumber::from_json(value)
                        .and_then(|n| n.adjust_by(command.delta, command.parent_dimension))
                    {
                        Some(next) => next,
                        None => return Ok(Adjusted::NotAdjustable(value.to_string())),
                    }
                }
                Some(_) => return Ok(Adjusted::NotAdjustable("an expression".to_string())),
            };
            match set_attribute_at_path(&mut element.props, &command.property, AttributeValue::Value(next.to_json())) {
                Ok(()) => Ok(Adjusted::Written(next)),
                Err(CoreError::AttributeNotSettable(at)) => Ok(Adjusted::NotAdjustable(format!("behind {at}"))),
                Err(e) => Err(e),
            }
        })
    })?;

    Ok(match outcome {
        Adjusted::Written(value) => CommandResult::single(patch, format!("{description} = {value}")),
        Adjusted::NotAnElement => CommandResult::new(Vec::new(), format!("{description} (not an element)")),
        Adjusted::Missing => CommandResult::new(Vec::new(), format!("{description} (property missing)")),
        Adjusted::NotAdjustable(value) => {
            log::debug!("{} is {value}, not adjusting", command.property);
            CommandResult::new(Vec::new(), format!("{description} (not adjustable: {value})"))
        }
    })
}

pub(super) fn run_set(editor: &EditorState, command: &SetCssLengthProperty) -> EditorResult<CommandResult> {
    let description = format!(
        "Set Css Length Prop: {}/{} = {}",
        command.target, command.property, command.value
    );
    let target = command.target.to_static();
    if editor.project_contents.find_element(&target).is_none() {
        log::warn!("set css length: {} not found", command.target);
        return Ok(CommandResult::new(Vec::new(), format!("{description} (element not found)")));
    }
    let (patch, written) = edit_owning_file(&editor.project_contents, &target, |components, _| {
        transform_at_path(components, &target, |element| match element {
            ElementChild::Element(element) => match set_attribute_at_path(
                &mut element.props,
                &command.property,
                AttributeValue::Value(command.value.to_json()),
            ) {
                Ok(()) => Ok(true),
                Err(CoreError::AttributeNotSettable(_)) => Ok(false),
                Err(e) => Err(e),
            },
            _ => Ok(false),
        })
    })?;
    Ok(if written {
        CommandResult::single(patch, description)
    } else {
        CommandResult::new(Vec::new(), format!("{description} (not settable)"))
    })
}

#[cfg(test)]
mod tests {
    use super::super::tests::editor;
    use super::super::{TransientOrNot, WhenToRun, adjust_css_length_property, fold_and_apply_commands, set_css_length_property};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use ve_core::css::CssNumber;
    use ve_core::element::{AttributeValue, get_attribute_at_path};
    use ve_core::path::path;
    use ve_core::PropertyPath;

    fn style_of(state: &crate::editor_state::EditorState, p: &str, prop: &str) -> Option<AttributeValue> {
        let element = state.project_contents.find_element(&path(p).to_static())?.as_element()?;
        get_attribute_at_path(&element.props, &PropertyPath::style(prop)).cloned()
    }

    #[test]
    fn adjusts_pixel_values() {
        let command = adjust_css_length_property(
            WhenToRun::Always,
            &path("sb/scene:root/a"),
            PropertyPath::style("width"),
            20.0,
            None,
            true,
        );
        let result = fold_and_apply_commands(&editor(), &[command], TransientOrNot::Permanent).unwrap();
        assert_eq!(style_of(&result.state, "sb/scene:root/a", "width"), Some(AttributeValue::Value(json!(200))));
        assert!(result.state.project_contents.get("/app.js").unwrap().needs_printing);
    }

    #[test]
    fn same_command_from_same_original_is_idempotent() {
        let start = editor();
        let command = adjust_css_length_property(
            WhenToRun::Always,
            &path("sb/scene:root/a"),
            PropertyPath::style("width"),
            -30.0,
            None,
            false,
        );
        let first = fold_and_apply_commands(&start, &[command.clone()], TransientOrNot::Transient).unwrap();
        let second = fold_and_apply_commands(&start, &[command], TransientOrNot::Transient).unwrap();
        assert_eq!(first.state, second.state);
        assert_eq!(style_of(&first.state, "sb/scene:root/a", "width"), Some(AttributeValue::Value(json!(150))));
    }

    #[test]
    fn percentages_rebase_onto_parent() {
        let command = adjust_css_length_property(
            WhenToRun::Always,
            &path("sb/scene:root/b"),
            PropertyPath::style("width"),
            40.0,
            Some(400.0),
            false,
        );
        let result = fold_and_apply_commands(&editor(), &[command], TransientOrNot::Permanent).unwrap();
        assert_eq!(style_of(&result.state, "sb/scene:root/b", "width"), Some(AttributeValue::Value(json!("60%"))));
    }

    #[test]
    fn missing_properties_follow_create_flag() {
        let target = path("sb/scene:root/a");
        let create = adjust_css_length_property(WhenToRun::Always, &target, PropertyPath::style("height"), 15.0, None, true);
        let skip = adjust_css_length_property(WhenToRun::Always, &target, PropertyPath::style("height"), 15.0, None, false);

        let created = fold_and_apply_commands(&editor(), &[create], TransientOrNot::Permanent).unwrap();
        assert_eq!(style_of(&created.state, "sb/scene:root/a", "height"), Some(AttributeValue::Value(json!(15))));

        let skipped = fold_and_apply_commands(&editor(), &[skip], TransientOrNot::Permanent).unwrap();
        assert!(skipped.accumulated_patches.is_empty());
    }

    #[test]
    fn zero_delta_and_unknown_targets_are_no_ops() {
        let zero = adjust_css_length_property(
            WhenToRun::Always,
            &path("sb/scene:root/a"),
            PropertyPath::style("height"),
            0.0,
            None,
            true,
        );
        let missing = adjust_css_length_property(
            WhenToRun::Always,
            &path("sb/scene:root/zzz"),
            PropertyPath::style("width"),
            5.0,
            None,
            true,
        );
        let result = fold_and_apply_commands(&editor(), &[zero, missing], TransientOrNot::Permanent).unwrap();
        assert!(result.accumulated_patches.is_empty());
        assert_eq!(result.descriptions.len(), 2);
    }

    #[test]
    fn set_overwrites_value() {
        let command = set_css_length_property(
            WhenToRun::Always,
            &path("sb/scene:root/a"),
            PropertyPath::style("left"),
            CssNumber::px(12.0),
        );
        let result = fold_and_apply_commands(&editor(), &[command], TransientOrNot::Permanent).unwrap();
        assert_eq!(style_of(&result.state, "sb/scene:root/a", "left"), Some(AttributeValue::Value(json!("12px"))));
    }
}
