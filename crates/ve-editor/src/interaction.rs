//! Interaction sessions: one continuous pointer or keyboard gesture.
//!
//! A session is created once a gesture is unambiguous (a drag past the
//! threshold, or the first arrow key), updated with drag deltas or key
//! presses, and cleared on pointer-up, Escape, or the keyboard timeout.
//! The metadata snapshot taken at creation stays pinned for the whole
//! session; fresher measurements land in `latest` instead.
//!
//! ## Modifier behaviors
//!
//! | Modifier | Keyboard move | Drag |
//! |----------|---------------|------|
//! | **Shift** | 10px steps | no effect |

use kurbo::Vec2;
use std::sync::Arc;
use std::time::{Duration, Instant};
use ve_core::geometry::{CanvasPoint, CanvasVector, EdgePosition};
use ve_core::metadata::{AllElementProps, ElementInstanceMetadataMap};
use ve_core::tree::ElementPathTree;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
    pub cmd: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        alt: false,
        ctrl: false,
        cmd: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Escape,
    Character(char),
}

impl Key {
    /// Unit step for arrow keys, in canvas coordinates (y grows down).
    pub fn arrow_direction(&self) -> Option<CanvasVector> {
        match self {
            Self::ArrowLeft => Some(Vec2::new(-1.0, 0.0)),
            Self::ArrowRight => Some(Vec2::new(1.0, 0.0)),
            Self::ArrowUp => Some(Vec2::new(0.0, -1.0)),
            Self::ArrowDown => Some(Vec2::new(0.0, 1.0)),
            _ => None,
        }
    }
}

/// Keys held down at one moment, with the modifiers at that moment.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyState {
    pub keys_pressed: Vec<Key>,
    pub modifiers: Modifiers,
}

impl KeyState {
    pub fn new(keys: &[Key], modifiers: Modifiers) -> Self {
        Self {
            keys_pressed: keys.to_vec(),
            modifiers,
        }
    }

    pub fn has_arrow(&self) -> bool {
        self.keys_pressed.iter().any(|k| k.arrow_direction().is_some())
    }
}

/// The canvas control a session started on. Fixed for the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveControl {
    BoundingArea,
    ResizeHandle { edge: EdgePosition },
    KeyboardCatcher,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragInteractionData {
    pub drag_start: CanvasPoint,
    /// `None` until the pointer has moved since the session started.
    pub drag: Option<CanvasVector>,
    pub prev_drag: Option<CanvasVector>,
    pub modifiers: Modifiers,
}

impl DragInteractionData {
    /// Current pointer position, when a drag vector exists.
    pub fn pointer(&self) -> Option<CanvasPoint> {
        self.drag.map(|d| self.drag_start + d)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardInteractionData {
    pub key_states: Vec<KeyState>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionData {
    Drag(DragInteractionData),
    Keyboard(KeyboardInteractionData),
}

/// Metadata as it was measured at one point in time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetadataSnapshot {
    pub metadata: Arc<ElementInstanceMetadataMap>,
    pub all_element_props: Arc<AllElementProps>,
    pub element_path_tree: Arc<ElementPathTree>,
}

/// How a new session starts. The reducer pins the current metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionSessionStart {
    pub data: InteractionData,
    pub active_control: ActiveControl,
    pub now: Instant,
}

impl InteractionSessionStart {
    pub fn drag(start: CanvasPoint, modifiers: Modifiers, control: ActiveControl, now: Instant) -> Self {
        Self {
            data: InteractionData::Drag(DragInteractionData {
                drag_start: start,
                drag: None,
                prev_drag: None,
                modifiers,
            }),
            active_control: control,
            now,
        }
    }

    pub fn keyboard(key_state: KeyState, now: Instant) -> Self {
        Self {
            data: InteractionData::Keyboard(KeyboardInteractionData {
                key_states: vec![key_state],
            }),
            active_control: ActiveControl::KeyboardCatcher,
            now,
        }
    }
}

/// A step of an ongoing session.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionUpdate {
    Drag {
        drag: CanvasVector,
        modifiers: Modifiers,
        now: Instant,
    },
    Keyboard {
        key_state: KeyState,
        now: Instant,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractionSession {
    pub data: InteractionData,
    active_control: ActiveControl,
    pub starting: MetadataSnapshot,
    /// Measurements that arrived after the session started.
    pub latest: Option<MetadataSnapshot>,
    /// Strategy the user cycled to, if any.
    pub user_preferred_strategy: Option<String>,
    pub started_at: Instant,
    pub last_interaction_time: Instant,
}

impl InteractionSession {
    pub fn new(start: InteractionSessionStart, starting: MetadataSnapshot) -> Self {
        Self {
            data: start.data,
            active_control: start.active_control,
            starting,
            latest: None,
            user_preferred_strategy: None,
            started_at: start.now,
            last_interaction_time: start.now,
        }
    }

    pub fn active_control(&self) -> ActiveControl {
        self.active_control
    }

    pub fn is_drag(&self) -> bool {
        matches!(self.data, InteractionData::Drag(_))
    }

    pub fn is_keyboard(&self) -> bool {
        matches!(self.data, InteractionData::Keyboard(_))
    }

    pub fn drag_data(&self) -> Option<&DragInteractionData> {
        match &self.data {
            InteractionData::Drag(d) => Some(d),
            InteractionData::Keyboard(_) => None,
        }
    }

    pub fn drag_vector(&self) -> Option<CanvasVector> {
        self.drag_data().and_then(|d| d.drag)
    }

    pub fn resize_edge(&self) -> Option<EdgePosition> {
        match self.active_control {
            ActiveControl::ResizeHandle { edge } => Some(edge),
            _ => None,
        }
    }

    /// Apply an update. Mismatched updates (a drag step for a keyboard
    /// session or the reverse) are ignored.
    pub fn updated(&self, update: InteractionUpdate) -> Self {
        let mut next = self.clone();
        match (&mut next.data, update) {
            (InteractionData::Drag(d), InteractionUpdate::Drag { drag, modifiers, now }) => {
                d.prev_drag = d.drag;
                d.drag = Some(drag);
                d.modifiers = modifiers;
                next.last_interaction_time = now;
            }
            (InteractionData::Keyboard(k), InteractionUpdate::Keyboard { key_state, now }) => {
                k.key_states.push(key_state);
                next.last_interaction_time = now;
            }
            (_, update) => {
                log::debug!("ignoring {update:?} for mismatched interaction session");
            }
        }
        next
    }
}

// ─── Gesture disambiguation ──────────────────────────────────────────────

/// A pointer-down that has not yet become a drag.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDrag {
    pub start: CanvasPoint,
    pub modifiers: Modifiers,
    pub control: ActiveControl,
}

impl PendingDrag {
    pub fn new(start: CanvasPoint, modifiers: Modifiers, control: ActiveControl) -> Self {
        Self {
            start,
            modifiers,
            control,
        }
    }

    /// Whether the pointer has travelled strictly more than `threshold`.
    pub fn exceeds_threshold(&self, pointer: CanvasPoint, threshold: f64) -> bool {
        (pointer - self.start).hypot() > threshold
    }
}

/// Idle timer that ends keyboard sessions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyboardSessionTimer {
    deadline: Option<Instant>,
}

impl KeyboardSessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart the countdown from `now`.
    pub fn reset(&mut self, now: Instant, timeout: Duration) {
        self.deadline = Some(now + timeout);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }
}
