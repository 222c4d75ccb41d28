//! Element paths: immutable, hierarchical addresses of element instances.
//!
//! A path is a list of *parts*; each part is the chain of UIDs from a
//! component's root element down to an instance inside it. Crossing into a
//! component instance starts a new part. The string form joins UIDs with `/`
//! and parts with `:`, as in `storyboard/scene:app-root/card`.
//!
//! Paths built from measurements are *dynamic*: children generated by a
//! `map` carry `uid~~~N` UIDs. [`ElementPath::to_static`] projects them back
//! onto the UIDs written in source.

use crate::error::{CoreError, CoreResult};
use crate::id::Uid;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt;
use winnow::combinator::separated;
use winnow::prelude::*;
use winnow::token::take_while;

pub type PathPart = SmallVec<[Uid; 4]>;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ElementPath {
    parts: SmallVec<[PathPart; 2]>,
}

/// A path whose UIDs all name elements as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct StaticElementPath(ElementPath);

impl ElementPath {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from parts, dropping empty ones.
    pub fn new<P, I>(parts: P) -> Self
    where
        P: IntoIterator<Item = I>,
        I: IntoIterator<Item = Uid>,
    {
        let parts = parts
            .into_iter()
            .map(|part| part.into_iter().collect::<PathPart>())
            .filter(|part| !part.is_empty())
            .collect();
        Self { parts }
    }

    /// Parse the `a/b:c/d` string form. The empty string is the empty path.
    pub fn parse(input: &str) -> CoreResult<Self> {
        if input.is_empty() {
            return Ok(Self::empty());
        }
        let mut rest = input;
        let parts = parse_parts
            .parse_next(&mut rest)
            .map_err(|e| CoreError::InvalidElementPath {
                input: input.to_string(),
                reason: format!("{e:?}"),
            })?;
        if !rest.is_empty() {
            return Err(CoreError::InvalidElementPath {
                input: input.to_string(),
                reason: format!("unexpected trailing input `{rest}`"),
            });
        }
        Ok(Self::new(parts))
    }

    pub fn parts(&self) -> &[PathPart] {
        &self.parts
    }

    pub fn last_part(&self) -> Option<&PathPart> {
        self.parts.last()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Total number of UIDs across all parts.
    pub fn depth(&self) -> usize {
        self.parts.iter().map(|p| p.len()).sum()
    }

    pub fn to_uid(&self) -> Option<Uid> {
        self.parts.last().and_then(|p| p.last()).copied()
    }

    pub fn all_uids(&self) -> impl Iterator<Item = Uid> + '_ {
        self.parts.iter().flat_map(|p| p.iter().copied())
    }

    pub fn contains_uid(&self, uid: Uid) -> bool {
        self.all_uids().any(|u| u == uid)
    }

    /// The containing element. The root of a component instance has the
    /// instance itself (end of the previous part) as its parent.
    pub fn parent(&self) -> Self {
        let mut parts = self.parts.clone();
        if let Some(last) = parts.last_mut() {
            if last.len() > 1 {
                last.pop();
            } else {
                parts.pop();
            }
        }
        Self { parts }
    }

    /// Child within the same component (same part).
    pub fn append(&self, uid: Uid) -> Self {
        let mut parts = self.parts.clone();
        match parts.last_mut() {
            Some(last) => last.push(uid),
            None => parts.push(smallvec::smallvec![uid]),
        }
        Self { parts }
    }

    /// Step into a component instance: `uid` becomes a new part.
    pub fn append_new_part(&self, uid: Uid) -> Self {
        self.append_part(std::iter::once(uid))
    }

    pub fn append_part(&self, part: impl IntoIterator<Item = Uid>) -> Self {
        let part: PathPart = part.into_iter().collect();
        let mut parts = self.parts.clone();
        if !part.is_empty() {
            parts.push(part);
        }
        Self { parts }
    }

    /// The storyboard itself: a single part with a single UID.
    pub fn is_storyboard_path(&self) -> bool {
        self.parts.len() == 1 && self.parts[0].len() == 1
    }

    /// A direct child of the storyboard (a scene or a root-level element).
    pub fn is_storyboard_child(&self) -> bool {
        self.parts.len() == 1 && self.parts[0].len() == 2
    }

    pub fn is_root_element_of_instance(&self) -> bool {
        self.parts.len() > 1 && self.parts.last().is_some_and(|p| p.len() == 1)
    }

    /// Strict descendant test, respecting part boundaries.
    pub fn is_descendant_of(&self, ancestor: &ElementPath) -> bool {
        self != ancestor && self.is_descendant_of_or_equal(ancestor)
    }

    pub fn is_descendant_of_or_equal(&self, ancestor: &ElementPath) -> bool {
        let a = &ancestor.parts;
        let t = &self.parts;
        if a.is_empty() {
            return true;
        }
        if a.len() > t.len() {
            return false;
        }
        let last = a.len() - 1;
        if a[..last] != t[..last] {
            return false;
        }
        t[last].starts_with(&a[last])
    }

    pub fn is_parent_of(&self, child: &ElementPath) -> bool {
        !child.is_empty() && &child.parent() == self
    }

    /// Closest path that both `self` and `other` descend from (or equal).
    pub fn common_ancestor(&self, other: &ElementPath) -> ElementPath {
        let mut candidate = self.clone();
        while !candidate.is_empty() && !other.is_descendant_of_or_equal(&candidate) {
            candidate = candidate.parent();
        }
        candidate
    }

    /// Project a dynamic instance path onto the static (source) UIDs.
    pub fn to_static(&self) -> StaticElementPath {
        StaticElementPath(Self {
            parts: self
                .parts
                .iter()
                .map(|part| part.iter().map(|u| u.static_part()).collect())
                .collect(),
        })
    }

    /// Whether any UID in the path is a generated instance.
    pub fn is_dynamic(&self) -> bool {
        self.all_uids().any(|u| u.is_generated())
    }
}

impl StaticElementPath {
    pub fn as_path(&self) -> &ElementPath {
        &self.0
    }

    pub fn into_path(self) -> ElementPath {
        self.0
    }

    pub fn last_part(&self) -> Option<&PathPart> {
        self.0.last_part()
    }

    pub fn to_uid(&self) -> Option<Uid> {
        self.0.to_uid()
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            for (j, uid) in part.iter().enumerate() {
                if j > 0 {
                    f.write_str("/")?;
                }
                f.write_str(uid.as_str())?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementPath({self})")
    }
}

impl fmt::Display for StaticElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for ElementPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ElementPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ElementPath::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Parse a path from its string form, panicking on malformed input.
/// Only built for tests and under the `testing` feature; everything else
/// goes through [`ElementPath::parse`].
#[cfg(any(test, feature = "testing"))]
pub fn path(s: &str) -> ElementPath {
    match ElementPath::parse(s) {
        Ok(p) => p,
        Err(e) => panic!("{e}"),
    }
}

pub fn paths_equal_ignoring_order(a: &[ElementPath], b: &[ElementPath]) -> bool {
    a.len() == b.len() && a.iter().all(|p| b.contains(p))
}

// ─── Low-level parsers ──────────────────────────────────────────────────

fn parse_uid(input: &mut &str) -> ModalResult<Uid> {
    take_while(1.., |c: char| {
        c.is_alphanumeric() || c == '-' || c == '_' || c == '~' || c == '.' || c == '$'
    })
    .map(Uid::intern)
    .parse_next(input)
}

fn parse_part(input: &mut &str) -> ModalResult<Vec<Uid>> {
    separated(1.., parse_uid, '/').parse_next(input)
}

fn parse_parts(input: &mut &str) -> ModalResult<Vec<Vec<Uid>>> {
    separated(1.., parse_part, ':').parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_and_display_roundtrip() {
        let p = path("storyboard/scene:app-root/card");
        assert_eq!(p.parts().len(), 2);
        assert_eq!(p.to_string(), "storyboard/scene:app-root/card");
        assert_eq!(p.depth(), 4);
        assert_eq!(p.to_uid(), Some(Uid::intern("card")));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(ElementPath::parse("a//b").is_err());
        assert!(ElementPath::parse("a/b:").is_err());
        assert!(ElementPath::parse("a b").is_err());
        assert_eq!(ElementPath::parse("").unwrap(), ElementPath::empty());
    }

    #[test]
    #[should_panic(expected = "a//b")]
    fn fixture_helper_panics_on_garbage() {
        path("a//b");
    }

    #[test]
    fn garbage_paths_fail_to_deserialize() {
        assert!(serde_json::from_str::<ElementPath>("\"a b\"").is_err());
    }

    #[test]
    fn parent_crosses_part_boundary() {
        let p = path("sb/scene:root/child");
        assert_eq!(p.parent(), path("sb/scene:root"));
        assert_eq!(p.parent().parent(), path("sb/scene"));
        assert_eq!(path("sb").parent(), ElementPath::empty());
        assert_eq!(ElementPath::empty().parent(), ElementPath::empty());
    }

    #[test]
    fn descendant_queries() {
        let scene = path("sb/scene");
        let child = path("sb/scene:root/child");
        assert!(child.is_descendant_of(&scene));
        assert!(!scene.is_descendant_of(&child));
        assert!(!scene.is_descendant_of(&scene));
        assert!(scene.is_descendant_of_or_equal(&scene));
        // `sb/sc` is not an ancestor of `sb/scene`: UIDs compare whole.
        assert!(!path("sb/scene").is_descendant_of(&path("sb/sc")));
        assert!(path("sb/scene:root").is_parent_of(&child));
    }

    #[test]
    fn storyboard_classification() {
        assert!(path("sb").is_storyboard_path());
        assert!(path("sb/scene").is_storyboard_child());
        assert!(!path("sb/scene/inner").is_storyboard_child());
        assert!(path("sb/scene:root").is_root_element_of_instance());
    }

    #[test]
    fn static_projection_is_idempotent() {
        let dynamic = path("sb/scene:root/list/item~~~3/label");
        assert!(dynamic.is_dynamic());
        let projected = dynamic.to_static();
        assert_eq!(projected.as_path(), &path("sb/scene:root/list/item/label"));
        assert_eq!(projected.as_path().to_static(), projected);
        assert_eq!(projected.as_path().depth(), dynamic.depth());
    }

    #[test]
    fn common_ancestor_of_cousins() {
        let a = path("sb/scene:root/a/x");
        let b = path("sb/scene:root/b");
        assert_eq!(a.common_ancestor(&b), path("sb/scene:root"));
    }

    #[test]
    fn serde_uses_string_form() {
        let p = path("sb/scene:root");
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"sb/scene:root\"");
        let back: ElementPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
