use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for element UIDs: fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Separator between a static UID and the index of a generated instance
/// (children produced by a `map` expression).
pub const GENERATED_UID_SEPARATOR: &str = "~~~";

/// A lightweight, interned identifier for elements in the source tree.
/// Internally a `Spur` index: 4 bytes, Copy, Eq, Hash in O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uid(Spur);

impl Uid {
    /// Intern a new string as a Uid, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        Uid(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// UID of the `index`-th generated instance of this (static) UID.
    pub fn generated(&self, index: usize) -> Self {
        Self::intern(&format!("{}{GENERATED_UID_SEPARATOR}{index}", self.as_str()))
    }

    /// Whether this UID names a generated instance (`base~~~N`).
    pub fn is_generated(&self) -> bool {
        self.as_str().contains(GENERATED_UID_SEPARATOR)
    }

    /// Strip the generated-instance suffix, yielding the UID as written in source.
    pub fn static_part(&self) -> Self {
        match self.as_str().split_once(GENERATED_UID_SEPARATOR) {
            Some((base, _)) => Self::intern(base),
            None => *self,
        }
    }

    /// Generate a UID with a prefix that does not collide with any in `existing`.
    pub fn fresh(prefix: &str, existing: &std::collections::HashSet<Uid>) -> Self {
        let mut n = existing.len();
        loop {
            let candidate = Self::intern(&format!("{prefix}-{n}"));
            if !existing.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialOrd for Uid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Uid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Serialize for Uid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Uid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Uid::intern(&s))
    }
}
