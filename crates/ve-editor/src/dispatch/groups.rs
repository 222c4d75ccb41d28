//! Splitting a batch into groups that share one derived-state rebuild.

use crate::action::EditorAction;

/// Consecutive actions stay together, except that a group always ends
/// right after `ClearInteractionSession`, and each group found inside a
/// `TransientActions` wrapper becomes its own wrapped group.
pub(super) fn split_into_groups(actions: &[EditorAction]) -> Vec<Vec<EditorAction>> {
    let mut groups: Vec<Vec<EditorAction>> = vec![Vec::new()];
    let mut previous: Option<&EditorAction> = None;
    for action in actions {
        match action {
            EditorAction::TransientActions(inner) => {
                groups.extend(
                    split_into_groups(inner)
                        .into_iter()
                        .map(|group| vec![EditorAction::TransientActions(group)]),
                );
                groups.push(Vec::new());
            }
            _ if matches!(previous, Some(EditorAction::ClearInteractionSession { .. })) => {
                groups.push(vec![action.clone()]);
            }
            _ => {
                if let Some(last) = groups.last_mut() {
                    last.push(action.clone());
                }
            }
        }
        previous = Some(action);
    }
    groups.retain(|g| !g.is_empty());
    groups
}
