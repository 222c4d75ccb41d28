//! Hit testing: point → element lookup against measured frames.
//!
//! Walks the path tree front-to-back (last child first, since later siblings
//! paint on top) and returns the deepest match.

use crate::geometry::CanvasPoint;
use crate::metadata::ElementInstanceMetadataMap;
use crate::path::ElementPath;
use crate::tree::ElementPathTree;

/// The deepest element under `point` that `accepts_children` allows as a
/// parent. Paths in `excluded`, and everything under them, are skipped.
pub fn hit_test_parent(
    metadata: &ElementInstanceMetadataMap,
    tree: &ElementPathTree,
    point: CanvasPoint,
    excluded: &[ElementPath],
    accepts_children: impl Fn(&ElementPath) -> bool,
) -> Option<ElementPath> {
    hit_test_node(
        metadata,
        tree,
        &ElementPath::empty(),
        point,
        excluded,
        &accepts_children,
    )
}

fn hit_test_node(
    metadata: &ElementInstanceMetadataMap,
    tree: &ElementPathTree,
    path: &ElementPath,
    point: CanvasPoint,
    excluded: &[ElementPath],
    accepts_children: &dyn Fn(&ElementPath) -> bool,
) -> Option<ElementPath> {
    if excluded.iter().any(|e| path.is_descendant_of_or_equal(e) && !e.is_empty()) {
        return None;
    }

    // Topmost first
    for child in tree.children(path).into_iter().rev() {
        if let Some(hit) = hit_test_node(metadata, tree, child, point, excluded, accepts_children) {
            return Some(hit);
        }
    }

    if path.is_empty() {
        return None;
    }
    let inside = metadata
        .frame_in_canvas_coords(path)
        .is_some_and(|frame| frame.contains(point));
    (inside && accepts_children(path)).then(|| path.clone())
}
