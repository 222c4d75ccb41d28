//! Layout metadata: measured frames and layout facts per element instance.
//!
//! Produced outside the editor after every render, in two halves: the DOM
//! walk (frames, computed layout) and the render spy (element names, props).
//! [`reconstruct_metadata`] merges them into one map plus a path tree.

use crate::geometry::{CanvasRect, MaybeInfiniteRect};
use crate::path::ElementPath;
use crate::tree::ElementPathTree;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CssPosition {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LayoutSystem {
    #[default]
    Flow,
    Flex,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlexDirection {
    #[default]
    Row,
    RowReverse,
    Column,
    ColumnReverse,
}

impl FlexDirection {
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    pub fn is_reverse(&self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialSizeMeasurements {
    pub position: CssPosition,
    pub parent_layout_system: LayoutSystem,
    pub parent_flex_direction: Option<FlexDirection>,
    pub layout_system_for_children: LayoutSystem,
    pub provides_bounds_for_absolute_children: bool,
    pub immediate_parent_bounds: Option<CanvasRect>,
    pub display: String,
}

impl Default for SpecialSizeMeasurements {
    fn default() -> Self {
        Self {
            position: CssPosition::Static,
            parent_layout_system: LayoutSystem::Flow,
            parent_flex_direction: None,
            layout_system_for_children: LayoutSystem::Flow,
            provides_bounds_for_absolute_children: false,
            immediate_parent_bounds: None,
            display: "block".to_string(),
        }
    }
}

/// Props of one rendered element, keyed by prop name.
pub type ElementProps = BTreeMap<String, serde_json::Value>;

/// Props of every rendered element.
pub type AllElementProps = HashMap<ElementPath, ElementProps>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementInstanceMetadata {
    pub element_path: ElementPath,
    pub element_name: Option<String>,
    pub global_frame: Option<MaybeInfiniteRect>,
    pub local_frame: Option<MaybeInfiniteRect>,
    pub special_size_measurements: SpecialSizeMeasurements,
    pub props: ElementProps,
}

impl ElementInstanceMetadata {
    pub fn new(element_path: ElementPath) -> Self {
        Self {
            element_path,
            element_name: None,
            global_frame: None,
            local_frame: None,
            special_size_measurements: SpecialSizeMeasurements::default(),
            props: ElementProps::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.element_name = Some(name.to_string());
        self
    }

    pub fn with_frame(mut self, frame: CanvasRect) -> Self {
        self.global_frame = Some(MaybeInfiniteRect::Finite(frame));
        self
    }

    pub fn with_measurements(mut self, measurements: SpecialSizeMeasurements) -> Self {
        self.special_size_measurements = measurements;
        self
    }

    pub fn finite_global_frame(&self) -> Option<CanvasRect> {
        self.global_frame.and_then(|f| f.finite())
    }
}

/// Metadata keyed by path, iterated in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementInstanceMetadataMap {
    entries: Vec<ElementInstanceMetadata>,
    index: HashMap<ElementPath, usize>,
}

/// The DOM walker's half of the measurements.
pub type DomMetadata = ElementInstanceMetadataMap;
/// The render spy's half of the measurements.
pub type SpyMetadata = ElementInstanceMetadataMap;

impl ElementInstanceMetadataMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced entry keeps its position.
    pub fn insert(&mut self, metadata: ElementInstanceMetadata) {
        match self.index.get(&metadata.element_path) {
            Some(&i) => self.entries[i] = metadata,
            None => {
                self.index
                    .insert(metadata.element_path.clone(), self.entries.len());
                self.entries.push(metadata);
            }
        }
    }

    pub fn find(&self, path: &ElementPath) -> Option<&ElementInstanceMetadata> {
        self.index.get(path).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, path: &ElementPath) -> bool {
        self.index.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementInstanceMetadata> {
        self.entries.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &ElementPath> {
        self.entries.iter().map(|m| &m.element_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Global frame, when measured and finite.
    pub fn frame_in_canvas_coords(&self, path: &ElementPath) -> Option<CanvasRect> {
        self.find(path)?.finite_global_frame()
    }

    pub fn is_position_absolute(&self, path: &ElementPath) -> bool {
        self.find(path).is_some_and(|m| {
            m.special_size_measurements.position == CssPosition::Absolute
        })
    }

    pub fn is_position_relative(&self, path: &ElementPath) -> bool {
        self.find(path).is_some_and(|m| {
            m.special_size_measurements.position == CssPosition::Relative
        })
    }

    /// Laid out by a flex parent and taking part in that layout.
    pub fn is_flex_child(&self, path: &ElementPath) -> bool {
        self.find(path).is_some_and(|m| {
            let ssm = &m.special_size_measurements;
            ssm.parent_layout_system == LayoutSystem::Flex
                && !matches!(ssm.position, CssPosition::Absolute | CssPosition::Fixed)
        })
    }

    pub fn is_flex_container(&self, path: &ElementPath) -> bool {
        self.find(path).is_some_and(|m| {
            m.special_size_measurements.layout_system_for_children == LayoutSystem::Flex
        })
    }

    pub fn flex_direction_of_parent(&self, path: &ElementPath) -> Option<FlexDirection> {
        self.find(path)?.special_size_measurements.parent_flex_direction
    }

    /// Measured elements sharing `path`'s parent, `path` included, in
    /// document order.
    pub fn siblings(&self, path: &ElementPath) -> Vec<&ElementPath> {
        if path.is_empty() {
            return Vec::new();
        }
        let parent = path.parent();
        self.paths().filter(|p| p.parent() == parent).collect()
    }

    pub fn children(&self, path: &ElementPath) -> Vec<&ElementPath> {
        self.paths().filter(|p| path.is_parent_of(p)).collect()
    }
}

impl FromIterator<ElementInstanceMetadata> for ElementInstanceMetadataMap {
    fn from_iter<T: IntoIterator<Item = ElementInstanceMetadata>>(iter: T) -> Self {
        let mut map = Self::new();
        for m in iter {
            map.insert(m);
        }
        map
    }
}

/// Merge DOM measurements with render-spy data.
///
/// Spy entries set the document order and the element names; DOM entries
/// provide frames and layout facts. Elements that only the DOM walk saw are
/// appended. Props come from `all_props` when present.
pub fn reconstruct_metadata(
    dom: &DomMetadata,
    spy: &SpyMetadata,
    all_props: &AllElementProps,
) -> (ElementInstanceMetadataMap, ElementPathTree) {
    let mut merged = ElementInstanceMetadataMap::new();
    for spied in spy.iter() {
        let mut entry = match dom.find(&spied.element_path) {
            Some(measured) => ElementInstanceMetadata {
                element_name: spied.element_name.clone().or(measured.element_name.clone()),
                ..measured.clone()
            },
            None => spied.clone(),
        };
        if let Some(props) = all_props.get(&entry.element_path) {
            entry.props = props.clone();
        }
        merged.insert(entry);
    }
    for measured in dom.iter() {
        if !merged.contains(&measured.element_path) {
            let mut entry = measured.clone();
            if let Some(props) = all_props.get(&entry.element_path) {
                entry.props = props.clone();
            }
            merged.insert(entry);
        }
    }
    log::trace!(
        "reconstructed metadata: {} spy + {} dom -> {} entries",
        spy.len(),
        dom.len(),
        merged.len()
    );
    let tree = ElementPathTree::from_paths(merged.paths());
    (merged, tree)
}
