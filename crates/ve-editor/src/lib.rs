pub mod action;
pub mod changes;
pub mod collaborators;
pub mod commands;
pub mod config;
pub mod derived;
pub mod dispatch;
pub mod editor_state;
pub mod error;
pub mod history;
pub mod interaction;
pub mod path_cache;
pub mod strategies;

pub use action::EditorAction;
pub use changes::ProjectChanges;
pub use collaborators::{
    Collaborators, Detached, LoginState, ParseRequest, ParserWorkers, Persistence, PreviewSink,
    ProjectChangesSink, SaveType, WorkerUpdate,
};
pub use commands::{Command, TransientOrNot, WhenToRun, fold_and_apply_commands};
pub use config::{DuplicateUidPolicy, EditorConfig, Environment};
pub use derived::{DerivedState, derive_state};
pub use dispatch::{DispatchOutcome, Dispatcher, EditorStore, StrategyState};
pub use editor_state::{CssCursor, EditorMode, EditorState, Notice, NoticeLevel, PersistentModel};
pub use error::{EditorError, EditorResult};
pub use history::StateHistory;
pub use interaction::{ActiveControl, InteractionSession, Key, KeyState, Modifiers};
pub use strategies::{CanvasStrategy, StrategyRegistry};
