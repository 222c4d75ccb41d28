//! Integration tests: pointer and keyboard gestures through the dispatcher.
//!
//! Drives whole gestures (press, move, release, idle timeout) and checks
//! the split between the committed editor and the patched one the canvas
//! renders from.

mod common;

use common::{Recorder, absolute_box, flex_row, loaded, nested_only_children, style_value};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::{Duration, Instant};
use ve_core::{CanvasPoint, EdgePosition, PropertyPath};
use ve_core::path::path;
use ve_editor::commands::adjust_css_length_property;
use ve_editor::{ActiveControl, Command, CssCursor, EditorConfig, Key, KeyState, Modifiers, WhenToRun};

const A: &str = "sb/scene:root/a";

fn right_handle() -> ActiveControl {
    ActiveControl::ResizeHandle {
        edge: EdgePosition::RIGHT,
    }
}

fn adjustments(commands: &[Command]) -> Vec<(String, f64)> {
    commands
        .iter()
        .filter_map(|c| match c {
            Command::AdjustCssLengthProperty(a) => Some((a.property.to_string(), a.delta)),
            _ => None,
        })
        .collect()
}

// ─── Drag ────────────────────────────────────────────────────────────────

#[test]
fn flex_resize_drag_patches_then_commits() {
    let recorder = Recorder::default();
    let mut d = loaded(flex_row(), &[A], EditorConfig::for_tests(), &recorder);
    let history_before = d.store().history.len();
    let now = Instant::now();

    d.pointer_down(CanvasPoint::new(180.0, 50.0), Modifiers::NONE, right_handle())
        .unwrap();
    d.pointer_moved(CanvasPoint::new(200.0, 50.0), Modifiers::NONE, now)
        .unwrap();

    let strategy = &d.store().strategy_state;
    assert_eq!(strategy.current_strategy.as_deref(), Some("FLEX_RESIZE_BASIC"));
    assert_eq!(
        adjustments(&strategy.commands),
        vec![("style.width".to_string(), 20.0), ("style.height".to_string(), 0.0)]
    );
    assert!(!strategy
        .commands
        .iter()
        .any(|c| matches!(c, Command::AddElements(_) | Command::DeleteElement(_))));

    // Mid-gesture output lives only on the patched editor.
    assert_eq!(d.editor().canvas.cursor, Some(CssCursor::ResizeEW));
    assert_eq!(style_value(d.editor(), A, "width"), Some(json!(200)));
    assert_eq!(style_value(&d.store().unpatched_editor, A, "width"), Some(json!(180)));
    assert_eq!(d.store().unpatched_editor.canvas.cursor, None);
    assert_eq!(d.store().history.len(), history_before);

    d.pointer_up().unwrap();

    let committed = &d.store().unpatched_editor;
    assert!(committed.session().is_none());
    assert_eq!(committed.canvas.cursor, None);
    assert_eq!(style_value(committed, A, "width"), Some(json!(200)));
    assert_eq!(d.editor(), committed);
    assert_eq!(d.store().strategy_state.current_strategy, None);
    assert_eq!(d.store().history.len(), history_before + 1);
}

#[test]
fn small_moves_stay_below_the_drag_threshold() {
    let recorder = Recorder::default();
    let mut d = loaded(flex_row(), &[A], EditorConfig::for_tests(), &recorder);
    let now = Instant::now();

    d.pointer_down(CanvasPoint::new(180.0, 50.0), Modifiers::NONE, right_handle())
        .unwrap();
    let outcome = d
        .pointer_moved(CanvasPoint::new(181.0, 50.0), Modifiers::NONE, now)
        .unwrap();
    assert_eq!(outcome, None);
    assert!(d.editor().session().is_none());
    assert!(d.store().pending_drag().is_some());

    d.pointer_moved(CanvasPoint::new(185.0, 50.0), Modifiers::NONE, now)
        .unwrap();
    assert!(d.editor().session().is_some_and(|s| s.is_drag()));
    assert!(d.store().pending_drag().is_none());
}

#[test]
fn click_without_drag_dispatches_nothing() {
    let recorder = Recorder::default();
    let mut d = loaded(flex_row(), &[A], EditorConfig::for_tests(), &recorder);
    d.pointer_down(CanvasPoint::new(180.0, 50.0), Modifiers::NONE, right_handle())
        .unwrap();
    assert_eq!(d.pointer_up().unwrap(), None);
    assert!(d.store().pending_drag().is_none());
}

#[test]
fn escape_drops_the_gesture() {
    let recorder = Recorder::default();
    let mut d = loaded(flex_row(), &[A], EditorConfig::for_tests(), &recorder);
    let before = d.store().unpatched_editor.clone();

    d.pointer_down(CanvasPoint::new(180.0, 50.0), Modifiers::NONE, right_handle())
        .unwrap();
    d.pointer_moved(CanvasPoint::new(230.0, 50.0), Modifiers::NONE, Instant::now())
        .unwrap();
    d.escape().unwrap();

    assert!(d.editor().session().is_none());
    assert_eq!(style_value(d.editor(), A, "width"), Some(json!(180)));
    assert_eq!(d.store().unpatched_editor.project_contents, before.project_contents);
    assert_eq!(d.store().history.len(), 1);
}

#[test]
fn only_child_resize_bubbles_to_the_positioned_ancestor() {
    let recorder = Recorder::default();
    let inner = "sb/scene:outer/middle/inner";
    let mut d = loaded(nested_only_children(), &[inner], EditorConfig::for_tests(), &recorder);

    d.pointer_down(CanvasPoint::new(310.0, 110.0), Modifiers::NONE, right_handle())
        .unwrap();
    d.pointer_moved(CanvasPoint::new(330.0, 110.0), Modifiers::NONE, Instant::now())
        .unwrap();

    let strategy = &d.store().strategy_state;
    assert_eq!(strategy.current_strategy.as_deref(), Some("ABSOLUTE_RESIZE_ANCESTOR_2"));
    assert!(strategy
        .sorted_applicable_strategies
        .iter()
        .all(|s| s.id.ends_with("_ANCESTOR_2")));
    assert_eq!(d.editor().canvas.cursor, Some(CssCursor::MovingMagic));
    assert_eq!(d.editor().highlighted_views, vec![path("sb/scene:outer")]);

    d.pointer_up().unwrap();
    let committed = &d.store().unpatched_editor;
    assert_eq!(style_value(committed, "sb/scene:outer", "width"), Some(json!(320)));
    assert_eq!(style_value(committed, inner, "width"), None);
}

#[test]
fn same_inputs_give_the_same_state() {
    let now = Instant::now();
    let run = || {
        let recorder = Recorder::default();
        let mut d = loaded(flex_row(), &[A], EditorConfig::for_tests(), &recorder);
        d.pointer_down(CanvasPoint::new(180.0, 50.0), Modifiers::NONE, right_handle())
            .unwrap();
        d.pointer_moved(CanvasPoint::new(212.0, 50.0), Modifiers::NONE, now)
            .unwrap();
        d
    };
    let (first, second) = (run(), run());
    assert_eq!(first.editor(), second.editor());
    assert_eq!(first.store().strategy_state, second.store().strategy_state);
}

#[test]
fn preferred_strategy_is_kept_for_the_session() {
    let recorder = Recorder::default();
    let mut d = loaded(flex_row(), &[A], EditorConfig::for_tests(), &recorder);
    d.pointer_down(CanvasPoint::new(180.0, 50.0), Modifiers::NONE, right_handle())
        .unwrap();
    d.pointer_moved(CanvasPoint::new(200.0, 50.0), Modifiers::NONE, Instant::now())
        .unwrap();
    d.dispatch(vec![ve_editor::EditorAction::SetUsersPreferredStrategy(
        "FLEX_RESIZE_BASIC".into(),
    )])
    .unwrap();
    assert_eq!(
        d.editor().session().and_then(|s| s.user_preferred_strategy.clone()),
        Some("FLEX_RESIZE_BASIC".to_string())
    );
}

#[test]
fn resizing_past_the_opposite_edge_moves_the_pin() {
    let recorder = Recorder::default();
    let b = "sb/scene:root/box";
    let mut d = loaded(absolute_box(), &[b], EditorConfig::for_tests(), &recorder);

    d.pointer_down(CanvasPoint::new(150.0, 100.0), Modifiers::NONE, right_handle())
        .unwrap();
    d.pointer_moved(CanvasPoint::new(0.0, 100.0), Modifiers::NONE, Instant::now())
        .unwrap();
    assert_eq!(
        d.store().strategy_state.current_strategy.as_deref(),
        Some("ABSOLUTE_RESIZE")
    );
    d.pointer_up().unwrap();

    // Right edge dragged from 150 to 0: the box spans 0..50.
    let committed = &d.store().unpatched_editor;
    assert_eq!(style_value(committed, b, "left"), Some(json!(0)));
    assert_eq!(style_value(committed, b, "width"), Some(json!(50)));
    assert_eq!(style_value(committed, b, "top"), Some(json!(50)));
    assert_eq!(style_value(committed, b, "height"), Some(json!(100)));
}

// ─── Keyboard ────────────────────────────────────────────────────────────

#[test]
fn arrow_keys_commit_after_idle_timeout() {
    let recorder = Recorder::default();
    let config = EditorConfig::for_tests();
    let timeout = config.keyboard_timeout();
    let mut d = loaded(absolute_box(), &["sb/scene:root/box"], config, &recorder);
    let t0 = Instant::now();

    d.key_down(KeyState::new(&[Key::ArrowRight], Modifiers::NONE), t0)
        .unwrap();
    d.key_down(KeyState::new(&[Key::ArrowDown], Modifiers::SHIFT), t0 + Duration::from_millis(100))
        .unwrap();

    assert_eq!(
        d.store().strategy_state.current_strategy.as_deref(),
        Some("KEYBOARD_ABSOLUTE_MOVE")
    );
    assert_eq!(style_value(d.editor(), "sb/scene:root/box", "left"), Some(json!(51)));
    assert_eq!(style_value(d.editor(), "sb/scene:root/box", "top"), Some(json!(60)));
    assert!(d.store().keyboard_timer().is_armed());

    // The timer restarted at the second key press.
    assert_eq!(d.tick(t0 + timeout).unwrap(), None);
    assert!(d.editor().session().is_some());

    let committed = d
        .tick(t0 + Duration::from_millis(100) + timeout + Duration::from_millis(1))
        .unwrap();
    assert!(committed.is_some());
    assert!(d.editor().session().is_none());
    assert!(!d.store().keyboard_timer().is_armed());
    let editor = &d.store().unpatched_editor;
    assert_eq!(style_value(editor, "sb/scene:root/box", "left"), Some(json!(51)));
    assert_eq!(style_value(editor, "sb/scene:root/box", "top"), Some(json!(60)));
}

#[test]
fn pointer_down_commits_a_running_keyboard_session() {
    let recorder = Recorder::default();
    let mut d = loaded(absolute_box(), &["sb/scene:root/box"], EditorConfig::for_tests(), &recorder);
    d.key_down(KeyState::new(&[Key::ArrowLeft], Modifiers::NONE), Instant::now())
        .unwrap();

    let committed = d
        .pointer_down(CanvasPoint::new(100.0, 100.0), Modifiers::NONE, ActiveControl::BoundingArea)
        .unwrap();
    assert!(committed.is_some());
    assert!(d.editor().session().is_none());
    assert_eq!(
        style_value(&d.store().unpatched_editor, "sb/scene:root/box", "left"),
        Some(json!(49))
    );
}

#[test]
fn non_arrow_keys_are_ignored() {
    let recorder = Recorder::default();
    let mut d = loaded(absolute_box(), &["sb/scene:root/box"], EditorConfig::for_tests(), &recorder);
    let outcome = d
        .key_down(KeyState::new(&[Key::Character('x')], Modifiers::NONE), Instant::now())
        .unwrap();
    assert_eq!(outcome, None);
    assert!(d.editor().session().is_none());
}

// ─── Commands outside a gesture ──────────────────────────────────────────

#[test]
fn applied_commands_skip_mid_interaction_feedback() {
    let recorder = Recorder::default();
    let mut d = loaded(flex_row(), &[A], EditorConfig::for_tests(), &recorder);
    d.dispatch(vec![ve_editor::EditorAction::ApplyCommands(vec![
        adjust_css_length_property(WhenToRun::Always, &path(A), PropertyPath::style("width"), -30.0, None, false),
        ve_editor::commands::set_cursor(WhenToRun::MidInteraction, CssCursor::ResizeEW),
    ])])
    .unwrap();
    assert_eq!(style_value(d.editor(), A, "width"), Some(json!(150)));
    assert_eq!(d.editor().canvas.cursor, None);
}
