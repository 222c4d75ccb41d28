//! Undo history as an immutable value.
//!
//! `previous` holds older entries and `next` holds undone ones, both as
//! persistent stacks with the entry nearest `current` on top. Every
//! operation returns a new history that shares its untouched entries with
//! the old one, so undo, redo and cloning a history never copy the stacks.

use crate::derived::DerivedState;
use crate::editor_state::EditorState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A file moved by the batch that produced a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRename {
    pub filename_changed_from: String,
    pub filename_changed_to: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryItem {
    pub editor: EditorState,
    pub derived: Arc<DerivedState>,
    pub asset_renames: Vec<AssetRename>,
}

impl HistoryItem {
    /// Sessions never enter history.
    fn new(mut editor: EditorState, derived: Arc<DerivedState>, asset_renames: Vec<AssetRename>) -> Arc<Self> {
        editor.canvas.interaction_session = None;
        Arc::new(Self {
            editor,
            derived,
            asset_renames,
        })
    }
}

// ─── Entry stack ─────────────────────────────────────────────────────────

#[derive(Debug)]
struct Node {
    item: Arc<HistoryItem>,
    below: Option<Arc<Node>>,
}

/// Singly linked stack of entries; `push` and `pop` share everything
/// below the top.
#[derive(Debug, Clone, Default)]
pub struct EntryStack {
    top: Option<Arc<Node>>,
    len: usize,
}

impl EntryStack {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Entries from the one nearest `current` outwards.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<HistoryItem>> {
        std::iter::successors(self.top.as_deref(), |node| node.below.as_deref()).map(|node| &node.item)
    }

    fn push(&self, item: Arc<HistoryItem>) -> Self {
        Self {
            top: Some(Arc::new(Node {
                item,
                below: self.top.clone(),
            })),
            len: self.len + 1,
        }
    }

    fn pop(&self) -> Option<(Arc<HistoryItem>, Self)> {
        let node = self.top.as_ref()?;
        let rest = Self {
            top: node.below.clone(),
            len: self.len - 1,
        };
        Some((Arc::clone(&node.item), rest))
    }

    /// The `keep` entries nearest the top. Only the kept nodes are rebuilt.
    fn truncated(&self, keep: usize) -> Self {
        if self.len <= keep {
            return self.clone();
        }
        let kept: Vec<_> = self.iter().take(keep).cloned().collect();
        kept.into_iter().rev().fold(Self::default(), |stack, item| stack.push(item))
    }
}

impl PartialEq for EntryStack {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().zip(other.iter()).all(|(a, b)| Arc::ptr_eq(a, b) || a == b)
    }
}

// Unlink iteratively so dropping a long unshared stack does not recurse.
impl Drop for EntryStack {
    fn drop(&mut self) {
        let mut next = self.top.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.below.take(),
                Err(_) => break,
            }
        }
    }
}

// ─── History ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct StateHistory {
    pub previous: EntryStack,
    pub current: Arc<HistoryItem>,
    pub next: EntryStack,
}

impl StateHistory {
    pub fn init(editor: EditorState, derived: Arc<DerivedState>) -> Self {
        Self {
            previous: EntryStack::default(),
            current: HistoryItem::new(editor, derived, Vec::new()),
            next: EntryStack::default(),
        }
    }

    /// Total number of entries, current included.
    pub fn len(&self) -> usize {
        self.previous.len() + 1 + self.next.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.previous.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.next.is_empty()
    }

    /// Push a new current entry. Redo entries are discarded; with a `limit`
    /// the oldest entries are dropped so at most `limit` undo steps remain.
    pub fn add(
        &self,
        editor: EditorState,
        derived: Arc<DerivedState>,
        asset_renames: Vec<AssetRename>,
        limit: Option<usize>,
    ) -> Self {
        let mut previous = self.previous.push(Arc::clone(&self.current));
        if let Some(limit) = limit.filter(|limit| previous.len() > *limit) {
            log::trace!("history limit {limit} reached, dropping {} entries", previous.len() - limit);
            previous = previous.truncated(limit);
        }
        Self {
            previous,
            current: HistoryItem::new(editor, derived, asset_renames),
            next: EntryStack::default(),
        }
    }

    /// Swap the current entry, keeping its asset renames alongside the new ones.
    pub fn replace_last(&self, editor: EditorState, derived: Arc<DerivedState>, asset_renames: Vec<AssetRename>) -> Self {
        let mut renames = self.current.asset_renames.clone();
        renames.extend(asset_renames);
        Self {
            previous: self.previous.clone(),
            current: HistoryItem::new(editor, derived, renames),
            next: self.next.clone(),
        }
    }

    /// Rewrite the current entry's editor in place, e.g. to record a new
    /// selection without growing history.
    pub fn replace_last_with_update(&self, update: impl FnOnce(&mut EditorState)) -> Self {
        let mut editor = self.current.editor.clone();
        update(&mut editor);
        Self {
            previous: self.previous.clone(),
            current: HistoryItem::new(
                editor,
                Arc::clone(&self.current.derived),
                self.current.asset_renames.clone(),
            ),
            next: self.next.clone(),
        }
    }

    /// Step back. At the start of history this returns an unchanged copy.
    pub fn undo(&self) -> Self {
        let Some((current, previous)) = self.previous.pop() else {
            return self.clone();
        };
        Self {
            previous,
            current,
            next: self.next.push(Arc::clone(&self.current)),
        }
    }

    /// Step forward. At the end of history this returns an unchanged copy.
    pub fn redo(&self) -> Self {
        let Some((current, next)) = self.next.pop() else {
            return self.clone();
        };
        Self {
            previous: self.previous.push(Arc::clone(&self.current)),
            current,
            next,
        }
    }

    /// Forget everything but the current entry.
    pub fn truncate(&self) -> Self {
        Self {
            previous: EntryStack::default(),
            current: Arc::clone(&self.current),
            next: EntryStack::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn named(name: &str) -> EditorState {
        EditorState {
            project_name: name.to_string(),
            ..EditorState::default()
        }
    }

    /// Oldest first, as the entries read on a timeline.
    fn names(history: &StateHistory) -> (Vec<String>, String, Vec<String>) {
        let n = |stack: &EntryStack| stack.iter().map(|i| i.editor.project_name.clone()).collect::<Vec<_>>();
        let mut previous = n(&history.previous);
        previous.reverse();
        (previous, history.current.editor.project_name.clone(), n(&history.next))
    }

    fn derived() -> Arc<DerivedState> {
        Arc::new(DerivedState::default())
    }

    #[test]
    fn undo_redo_move_between_entries() {
        let h = StateHistory::init(named("a"), derived())
            .add(named("b"), derived(), vec![], None)
            .add(named("c"), derived(), vec![], None);
        assert_eq!(h.len(), 3);

        let undone = h.undo().undo();
        assert_eq!(names(&undone), (vec![], "a".into(), vec!["b".into(), "c".into()]));
        assert!(!undone.can_undo());
        assert_eq!(undone.undo(), undone);

        let redone = undone.redo();
        assert_eq!(names(&redone), (vec!["a".into()], "b".into(), vec!["c".into()]));

        let branched = redone.add(named("d"), derived(), vec![], None);
        assert!(!branched.can_redo());
        assert_eq!(names(&branched), (vec!["a".into(), "b".into()], "d".into(), vec![]));
    }

    #[test]
    fn limit_drops_oldest() {
        let mut h = StateHistory::init(named("0"), derived());
        for i in 1..=5 {
            h = h.add(named(&i.to_string()), derived(), vec![], Some(2));
        }
        assert_eq!(names(&h), (vec!["3".into(), "4".into()], "5".into(), vec![]));
    }

    #[test]
    fn replace_last_keeps_length_and_merges_renames() {
        let rename = |from: &str, to: &str| AssetRename {
            filename_changed_from: from.into(),
            filename_changed_to: to.into(),
        };
        let h = StateHistory::init(named("a"), derived()).add(named("b"), derived(), vec![rename("x", "y")], None);
        let replaced = h.replace_last(named("b2"), derived(), vec![rename("y", "z")]);
        assert_eq!(replaced.len(), h.len());
        assert_eq!(replaced.current.editor.project_name, "b2");
        assert_eq!(replaced.current.asset_renames, vec![rename("x", "y"), rename("y", "z")]);
    }

    #[test]
    fn update_patches_current_only() {
        let h = StateHistory::init(named("a"), derived()).add(named("b"), derived(), vec![], None);
        let updated = h.replace_last_with_update(|e| e.selected_views = vec![ve_core::path::path("sb/scene")]);
        assert_eq!(updated.len(), 2);
        assert_eq!(updated.current.editor.selected_views, vec![ve_core::path::path("sb/scene")]);
        assert_eq!(updated.previous, h.previous);
    }

    #[test]
    fn truncate_keeps_current() {
        let h = StateHistory::init(named("a"), derived())
            .add(named("b"), derived(), vec![], None)
            .undo();
        let t = h.truncate();
        assert_eq!(t.len(), 1);
        assert_eq!(t.current.editor.project_name, "a");
    }

    #[test]
    fn undo_and_redo_share_the_untouched_entries() {
        let h = StateHistory::init(named("a"), derived())
            .add(named("b"), derived(), vec![], None)
            .add(named("c"), derived(), vec![], None);
        let undone = h.undo();
        assert!(Arc::ptr_eq(&undone.current, h.previous.iter().next().unwrap()));
        assert!(Arc::ptr_eq(undone.next.iter().next().unwrap(), &h.current));
        assert!(undone
            .previous
            .iter()
            .zip(h.previous.iter().skip(1))
            .all(|(a, b)| Arc::ptr_eq(a, b)));

        let redone = undone.redo();
        assert!(Arc::ptr_eq(&redone.current, &h.current));
        assert_eq!(redone, h);
    }

    #[test]
    fn long_unshared_histories_drop_without_recursing() {
        let mut h = StateHistory::init(named("0"), derived());
        for _ in 0..100_000 {
            h = h.add(EditorState::default(), derived(), vec![], None);
        }
        assert_eq!(h.previous.len(), 100_000);
        drop(h);
    }
}
