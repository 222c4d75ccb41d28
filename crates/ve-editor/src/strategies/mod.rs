//! Canvas strategies: competing interpretations of one gesture.
//!
//! Every registered strategy is asked whether it applies to the current
//! targets and how well it fits the session. The fittest one (or the one
//! the user cycled to) is applied and yields the commands for this step.
//!
//! ```text
//! session ─▶ candidates (direct + ancestor) ─▶ rank by fitness ─▶ apply ─▶ commands
//! ```

mod absolute_move;
mod absolute_reparent;
mod absolute_resize;
pub mod ancestor;
mod draw_to_insert;
mod flex_reorder;
mod flex_resize_basic;
mod helpers;
mod keyboard_absolute_move;

pub use absolute_move::AbsoluteMoveStrategy;
pub use absolute_reparent::AbsoluteReparentStrategy;
pub use absolute_resize::AbsoluteResizeStrategy;
pub use draw_to_insert::DrawToInsertStrategy;
pub use flex_reorder::FlexReorderStrategy;
pub use flex_resize_basic::FlexResizeBasicStrategy;
pub use keyboard_absolute_move::KeyboardAbsoluteMoveStrategy;

use crate::commands::Command;
use crate::config::EditorConfig;
use crate::editor_state::{EditorMode, EditorState, InsertionSubject};
use crate::interaction::{InteractionSession, MetadataSnapshot};
use std::fmt;
use std::sync::Arc;
use ve_core::ElementPath;
use ve_core::project::ProjectContents;

// ─── Inputs ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionTarget {
    Targets(Vec<ElementPath>),
    InsertionSubjects(Vec<InsertionSubject>),
}

impl InteractionTarget {
    /// Element paths being edited; empty while inserting.
    pub fn paths(&self) -> &[ElementPath] {
        match self {
            Self::Targets(paths) => paths,
            Self::InsertionSubjects(_) => &[],
        }
    }
}

/// What strategies read: the targets, the source, and a frozen metadata
/// snapshot. Never mutated by a strategy.
#[derive(Debug, Clone)]
pub struct InteractionCanvasState {
    pub interaction_target: InteractionTarget,
    pub project_contents: Arc<ProjectContents>,
    pub starting: MetadataSnapshot,
    pub scale: f64,
}

impl InteractionCanvasState {
    /// Built from `editor`. Metadata comes from the session's pinned
    /// snapshot when there is one.
    pub fn from_editor(editor: &EditorState, session: Option<&InteractionSession>) -> Self {
        let interaction_target = match &editor.mode {
            EditorMode::Select => InteractionTarget::Targets(editor.selected_views.clone()),
            EditorMode::Insert { subjects } => InteractionTarget::InsertionSubjects(subjects.clone()),
        };
        Self {
            interaction_target,
            project_contents: Arc::clone(&editor.project_contents),
            starting: session.map_or_else(|| editor.metadata_snapshot(), |s| s.starting.clone()),
            scale: editor.canvas.scale,
        }
    }

    pub fn with_target(&self, target: InteractionTarget) -> Self {
        Self {
            interaction_target: target,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionLifecycle {
    MidInteraction,
    EndInteraction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StrategyApplicationResult {
    Success(Vec<Command>),
    /// Preconditions missing (e.g. no measured frame). Not an error.
    Empty,
}

impl StrategyApplicationResult {
    pub fn commands(&self) -> &[Command] {
        match self {
            Self::Success(commands) => commands,
            Self::Empty => &[],
        }
    }

    pub fn into_commands(self) -> Vec<Command> {
        match self {
            Self::Success(commands) => commands,
            Self::Empty => Vec::new(),
        }
    }
}

// ─── Strategy trait ──────────────────────────────────────────────────────

/// A stateless editing policy. All three operations are pure.
pub trait CanvasStrategy: Send + Sync {
    fn id(&self) -> &'static str;

    fn name(&self) -> String;

    fn is_applicable(&self, canvas: &InteractionCanvasState, session: Option<&InteractionSession>) -> bool;

    /// `0.0` takes the strategy out of the running.
    fn fitness(&self, canvas: &InteractionCanvasState, session: &InteractionSession) -> f64;

    fn apply(
        &self,
        canvas: &InteractionCanvasState,
        session: &InteractionSession,
        lifecycle: InteractionLifecycle,
    ) -> StrategyApplicationResult;
}

/// A strategy bound to the canvas state it should run against, with
/// commands to append when it produces anything.
#[derive(Clone)]
pub struct StrategyCandidate {
    pub id: String,
    pub name: String,
    pub fitness: f64,
    strategy: Arc<dyn CanvasStrategy>,
    canvas: InteractionCanvasState,
    extra_commands: Vec<Command>,
}

impl fmt::Debug for StrategyCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyCandidate")
            .field("id", &self.id)
            .field("fitness", &self.fitness)
            .field("targets", &self.canvas.interaction_target.paths())
            .finish()
    }
}

impl StrategyCandidate {
    fn direct(
        strategy: &Arc<dyn CanvasStrategy>,
        canvas: &InteractionCanvasState,
        session: Option<&InteractionSession>,
    ) -> Self {
        Self {
            id: strategy.id().to_string(),
            name: strategy.name(),
            fitness: session.map_or(0.0, |s| strategy.fitness(canvas, s)),
            strategy: Arc::clone(strategy),
            canvas: canvas.clone(),
            extra_commands: Vec::new(),
        }
    }

    /// The canvas state this candidate runs against.
    pub fn canvas(&self) -> &InteractionCanvasState {
        &self.canvas
    }

    pub fn apply(&self, session: &InteractionSession, lifecycle: InteractionLifecycle) -> StrategyApplicationResult {
        match self.strategy.apply(&self.canvas, session, lifecycle) {
            StrategyApplicationResult::Success(mut commands) if !commands.is_empty() => {
                commands.extend(self.extra_commands.iter().cloned());
                StrategyApplicationResult::Success(commands)
            }
            other => other,
        }
    }
}

/// Summary of a ranked candidate, kept on the strategy state.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategySummary {
    pub id: String,
    pub name: String,
    pub fitness: f64,
}

// ─── Registry ────────────────────────────────────────────────────────────

/// Registered strategies in a fixed order, optionally wrapped by ancestor
/// bubbling.
#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn CanvasStrategy>>,
    ancestor_boost: Option<f64>,
}

impl StrategyRegistry {
    pub fn new(strategies: Vec<Arc<dyn CanvasStrategy>>) -> Self {
        Self {
            strategies,
            ancestor_boost: None,
        }
    }

    pub fn with_ancestor_bubbling(mut self, fitness_boost: f64) -> Self {
        self.ancestor_boost = Some(fitness_boost);
        self
    }

    /// The built-in strategy set.
    pub fn default_strategies() -> Vec<Arc<dyn CanvasStrategy>> {
        vec![
            Arc::new(AbsoluteMoveStrategy),
            Arc::new(AbsoluteReparentStrategy),
            Arc::new(AbsoluteResizeStrategy),
            Arc::new(FlexResizeBasicStrategy),
            Arc::new(FlexReorderStrategy),
            Arc::new(KeyboardAbsoluteMoveStrategy),
            Arc::new(DrawToInsertStrategy),
        ]
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        let registry = Self::new(Self::default_strategies());
        if config.ancestor_bubbling {
            registry.with_ancestor_bubbling(config.ancestor_fitness_boost)
        } else {
            registry
        }
    }

    pub fn strategies(&self) -> &[Arc<dyn CanvasStrategy>] {
        &self.strategies
    }

    /// Every applicable candidate, direct ones first in registration order.
    pub fn candidates(
        &self,
        canvas: &InteractionCanvasState,
        session: Option<&InteractionSession>,
    ) -> Vec<StrategyCandidate> {
        let mut out = direct_candidates(&self.strategies, canvas, session);
        if let Some(boost) = self.ancestor_boost {
            out.extend(ancestor::ancestor_candidates(&self.strategies, 1, boost, canvas, session));
        }
        out
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.strategies.iter().map(|s| s.id()).collect();
        f.debug_struct("StrategyRegistry")
            .field("strategies", &ids)
            .field("ancestor_boost", &self.ancestor_boost)
            .finish()
    }
}

pub(crate) fn direct_candidates(
    strategies: &[Arc<dyn CanvasStrategy>],
    canvas: &InteractionCanvasState,
    session: Option<&InteractionSession>,
) -> Vec<StrategyCandidate> {
    strategies
        .iter()
        .filter(|s| s.is_applicable(canvas, session))
        .map(|s| StrategyCandidate::direct(s, canvas, session))
        .collect()
}

// ─── Selection ───────────────────────────────────────────────────────────

/// Candidates with positive fitness, fittest first. Ties keep registration
/// order.
pub fn sorted_applicable_strategies(
    registry: &StrategyRegistry,
    canvas: &InteractionCanvasState,
    session: Option<&InteractionSession>,
) -> Vec<StrategyCandidate> {
    let mut candidates: Vec<StrategyCandidate> = registry
        .candidates(canvas, session)
        .into_iter()
        .filter(|c| c.fitness > 0.0)
        .collect();
    candidates.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
    candidates
}

/// The user's preferred strategy while it is still in the list, otherwise
/// the fittest.
pub fn pick_strategy(sorted: &[StrategyCandidate], preferred: Option<&str>) -> Option<StrategyCandidate> {
    preferred
        .and_then(|id| sorted.iter().find(|c| c.id == id))
        .or_else(|| sorted.first())
        .cloned()
}

/// Rank and pick in one go.
pub fn find_canvas_strategy(
    registry: &StrategyRegistry,
    canvas: &InteractionCanvasState,
    session: &InteractionSession,
) -> (Option<StrategyCandidate>, Vec<StrategySummary>) {
    let sorted = sorted_applicable_strategies(registry, canvas, Some(session));
    log::trace!(
        "applicable strategies: {:?}",
        sorted.iter().map(|c| (&c.id, c.fitness)).collect::<Vec<_>>()
    );
    let summaries = sorted
        .iter()
        .map(|c| StrategySummary {
            id: c.id.clone(),
            name: c.name.clone(),
            fitness: c.fitness,
        })
        .collect();
    let picked = pick_strategy(&sorted, session.user_preferred_strategy.as_deref());
    if let Some(c) = &picked {
        log::debug!("picked strategy {} (fitness {})", c.id, c.fitness);
    }
    (picked, summaries)
}

#[cfg(test)]
pub(crate) mod fixtures;
