pub mod css;
pub mod element;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod id;
pub mod insertion;
pub mod metadata;
pub mod path;
pub mod project;
pub mod tree;

pub use css::{CssNumber, LengthUnit};
pub use element::{Component, ElementChild, IndexPosition, PropertyPath};
pub use error::{CoreError, CoreResult};
pub use geometry::{CanvasPoint, CanvasRect, CanvasVector, EdgePosition, MaybeInfiniteRect};
pub use hit::hit_test_parent;
pub use id::Uid;
pub use insertion::{ConditionalCase, InsertBehavior, InsertionPath};
pub use metadata::{
    AllElementProps, DomMetadata, ElementInstanceMetadata, ElementInstanceMetadataMap,
    SpyMetadata, reconstruct_metadata,
};
pub use path::{ElementPath, StaticElementPath};
pub use project::{ProjectContents, ProjectFile};
pub use tree::ElementPathTree;
