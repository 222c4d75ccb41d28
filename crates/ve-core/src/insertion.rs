//! Where newly created elements attach.

use crate::id::Uid;
use crate::path::ElementPath;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionalCase {
    TrueCase,
    FalseCase,
}

/// What happens to the existing value of a conditional clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsertBehavior {
    /// The clause becomes the single inserted element.
    ReplaceWithSingleElement,
    /// The clause becomes a fragment holding the inserted elements.
    ReplaceWithElementsWrappedInFragment { fragment_uid: Uid },
    /// The clause becomes a fragment of the inserted elements followed by the
    /// previous clause value. The previous value must not be `null`.
    WrapInFragmentAndAppendElements { fragment_uid: Uid },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InsertionPath {
    Child {
        intended_parent: ElementPath,
    },
    ConditionalClause {
        intended_parent: ElementPath,
        clause: ConditionalCase,
        behavior: InsertBehavior,
    },
}

impl InsertionPath {
    pub fn child(parent: ElementPath) -> Self {
        Self::Child {
            intended_parent: parent,
        }
    }

    pub fn conditional_clause(
        parent: ElementPath,
        clause: ConditionalCase,
        behavior: InsertBehavior,
    ) -> Self {
        Self::ConditionalClause {
            intended_parent: parent,
            clause,
            behavior,
        }
    }

    pub fn intended_parent(&self) -> &ElementPath {
        match self {
            Self::Child { intended_parent } | Self::ConditionalClause { intended_parent, .. } => {
                intended_parent
            }
        }
    }

    /// Path an element with `uid` will have once inserted here.
    pub fn element_path_for(&self, uid: Uid) -> ElementPath {
        match self {
            Self::Child { intended_parent } => intended_parent.append(uid),
            Self::ConditionalClause {
                intended_parent,
                behavior,
                ..
            } => match behavior {
                InsertBehavior::ReplaceWithSingleElement => intended_parent.append(uid),
                InsertBehavior::ReplaceWithElementsWrappedInFragment { fragment_uid }
                | InsertBehavior::WrapInFragmentAndAppendElements { fragment_uid } => {
                    intended_parent.append(*fragment_uid).append(uid)
                }
            },
        }
    }
}

impl fmt::Display for InsertionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Child { intended_parent } => write!(f, "{intended_parent}"),
            Self::ConditionalClause {
                intended_parent,
                clause,
                ..
            } => {
                let case = match clause {
                    ConditionalCase::TrueCase => "true",
                    ConditionalCase::FalseCase => "false",
                };
                write!(f, "{intended_parent} ({case} case)")
            }
        }
    }
}
