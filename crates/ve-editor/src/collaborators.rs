//! Interfaces to the systems the editor drives but does not own.
//!
//! The dispatcher calls these synchronously while closing out a dispatch.
//! Asynchronous work (parsing) is only requested here; its result comes
//! back through [`Dispatcher::on_parse_finished`](crate::dispatch::Dispatcher::on_parse_finished).

use crate::changes::ProjectChanges;
use crate::editor_state::PersistentModel;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use ve_core::project::ParseSuccess;
use ve_core::{ProjectContents, Uid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveType {
    /// Save right away.
    Force,
    /// Save when the throttle allows.
    Throttle,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoginState {
    #[default]
    NotLoggedIn,
    LoggedIn {
        user_id: String,
    },
}

impl LoginState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, Self::LoggedIn { .. })
    }
}

pub trait Persistence: Send {
    fn save(&mut self, project_name: &str, model: &PersistentModel, save_type: SaveType);
    fn login(&mut self);
    fn logout(&mut self);
}

/// Files to parse, with the UIDs already in use so fresh ones do not collide.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseRequest {
    pub files: Vec<(String, String)>,
    pub existing_uids: HashSet<Uid>,
    pub steganography: bool,
}

/// One file's parse result, re-dispatched as part of `UpdateFromWorker`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkerUpdate {
    Parsed {
        path: String,
        parsed: ParseSuccess,
        /// Code the parse was produced from; stale results are dropped.
        code: String,
    },
    Failed {
        path: String,
        message: String,
    },
}

impl WorkerUpdate {
    pub fn path(&self) -> &str {
        match self {
            Self::Parsed { path, .. } | Self::Failed { path, .. } => path,
        }
    }
}

pub trait ParserWorkers: Send {
    fn request_parse(&mut self, request: ParseRequest);
}

pub trait PreviewSink: Send {
    fn update_preview(&mut self, id: Option<&str>, contents: &Arc<ProjectContents>);
}

/// Receives accumulated project changes once the code editor is ready.
pub trait ProjectChangesSink: Send {
    fn send_changes(&mut self, changes: &ProjectChanges);
}

/// Stand-in for every collaborator. Calls are logged and dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct Detached;

impl Persistence for Detached {
    fn save(&mut self, project_name: &str, _model: &PersistentModel, save_type: SaveType) {
        log::trace!("detached save of {project_name} ({save_type:?})");
    }

    fn login(&mut self) {}

    fn logout(&mut self) {}
}

impl ParserWorkers for Detached {
    fn request_parse(&mut self, request: ParseRequest) {
        log::trace!("detached parse request for {} files", request.files.len());
    }
}

impl PreviewSink for Detached {
    fn update_preview(&mut self, _id: Option<&str>, _contents: &Arc<ProjectContents>) {}
}

impl ProjectChangesSink for Detached {
    fn send_changes(&mut self, _changes: &ProjectChanges) {}
}

/// Everything the dispatcher talks to.
pub struct Collaborators {
    pub persistence: Box<dyn Persistence>,
    pub workers: Box<dyn ParserWorkers>,
    pub preview: Box<dyn PreviewSink>,
    pub project_changes: Box<dyn ProjectChangesSink>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            persistence: Box::new(Detached),
            workers: Box::new(Detached),
            preview: Box::new(Detached),
            project_changes: Box::new(Detached),
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
