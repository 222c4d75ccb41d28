//! Derived state: projections of the document rebuilt after a dispatch.
//!
//! The navigator lists every measured element depth-first. Conditionals
//! also list one entry per clause, and a clause whose value renders
//! nothing measurable (text, an expression, `null`) gets a synthetic entry
//! so it can still be selected as an insertion target.

use crate::editor_state::EditorState;
use std::collections::HashSet;
use ve_core::element::ElementChild;
use ve_core::insertion::ConditionalCase;
use ve_core::{ElementPath, ElementPathTree, ProjectContents, Uid};

#[derive(Debug, Clone, PartialEq)]
pub enum NavigatorEntry {
    Regular {
        path: ElementPath,
    },
    ConditionalClause {
        path: ElementPath,
        clause: ConditionalCase,
    },
    /// A clause value with no measured element of its own.
    Synthetic {
        path: ElementPath,
        uid: Uid,
    },
}

impl NavigatorEntry {
    /// The element path this entry belongs to.
    pub fn path(&self) -> &ElementPath {
        match self {
            Self::Regular { path } | Self::ConditionalClause { path, .. } | Self::Synthetic { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DerivedState {
    pub navigator_targets: Vec<NavigatorEntry>,
    /// `navigator_targets` minus collapsed subtrees and hidden elements.
    pub visible_navigator_targets: Vec<NavigatorEntry>,
}

pub fn derive_state(editor: &EditorState) -> DerivedState {
    let mut navigator_targets = Vec::new();
    let mut visited = HashSet::new();
    let tree = &editor.element_path_tree;
    for top in tree.children(&ElementPath::empty()) {
        walk(&editor.project_contents, tree, top, &mut visited, &mut navigator_targets);
    }
    let visible_navigator_targets = navigator_targets
        .iter()
        .filter(|entry| is_visible(entry, &editor.navigator_collapsed, &editor.hidden_in_navigator))
        .cloned()
        .collect();
    DerivedState {
        navigator_targets,
        visible_navigator_targets,
    }
}

fn walk(
    contents: &ProjectContents,
    tree: &ElementPathTree,
    path: &ElementPath,
    visited: &mut HashSet<ElementPath>,
    out: &mut Vec<NavigatorEntry>,
) {
    if !visited.insert(path.clone()) {
        return;
    }
    out.push(NavigatorEntry::Regular { path: path.clone() });

    if let Some(ElementChild::Conditional(conditional)) = contents.find_element(&path.to_static()) {
        let clauses = [
            (ConditionalCase::TrueCase, &*conditional.when_true),
            (ConditionalCase::FalseCase, &*conditional.when_false),
        ];
        for (clause, value) in clauses {
            out.push(NavigatorEntry::ConditionalClause {
                path: path.clone(),
                clause,
            });
            let clause_path = path.append(value.uid());
            if tree.contains(&clause_path) {
                walk(contents, tree, &clause_path, visited, out);
            } else {
                out.push(NavigatorEntry::Synthetic {
                    path: clause_path,
                    uid: value.uid(),
                });
            }
        }
    }

    for child in tree.children(path) {
        walk(contents, tree, child, visited, out);
    }
}

fn is_visible(entry: &NavigatorEntry, collapsed: &[ElementPath], hidden: &[ElementPath]) -> bool {
    let path = entry.path();
    let under_collapsed = collapsed.iter().any(|c| match entry {
        NavigatorEntry::Regular { .. } => path.is_descendant_of(c),
        // Clause rows belong to the conditional itself, so collapsing it hides them.
        _ => path.is_descendant_of_or_equal(c),
    });
    let hidden = hidden.iter().any(|h| path.is_descendant_of_or_equal(h));
    !under_collapsed && !hidden
}
