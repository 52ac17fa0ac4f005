//! Property-based invariant tests for the pointer tracker.
//!
//! Verifies, for arbitrary interleavings of several pointers:
//!
//! 1. The produced stream is well-formed: `Start (Move)* End`, repeated.
//! 2. Every accepted event of the captured pointer yields exactly one output.
//! 3. Events of other pointers never produce output mid-gesture.
//! 4. Capture is always released after `End`.
//! 5. `lose` is idempotent and only ends active gestures.
//! 6. JSON Lines record/replay reproduces any script exactly.

use proptest::prelude::*;
use rowdrag_core::event::{InputEvent, PointerInput, PointerKind, PointerPhase};
use rowdrag_core::pointer_tracker::{PointerTracker, TrackerEvent};
use rowdrag_core::script::PointerScript;

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_kind() -> impl Strategy<Value = PointerKind> {
    prop_oneof![
        Just(PointerKind::Mouse),
        Just(PointerKind::Touch),
        Just(PointerKind::Pen),
    ]
}

fn arb_phase() -> impl Strategy<Value = PointerPhase> {
    prop_oneof![
        3 => Just(PointerPhase::Move),
        2 => Just(PointerPhase::Down),
        1 => Just(PointerPhase::Up),
        1 => Just(PointerPhase::Cancel),
        1 => Just(PointerPhase::CaptureLost),
    ]
}

fn arb_input() -> impl Strategy<Value = PointerInput> {
    (arb_kind(), 0u32..3, arb_phase(), -50.0f32..500.0, any::<bool>())
        .prop_map(|(kind, id, phase, y, primary)| {
            let p = PointerInput::new(kind, phase, 10.0, y).with_id(id);
            if primary { p } else { p.secondary() }
        })
}

/// Route like a list does: downs go to `start`, everything else to `handle`.
fn feed(tracker: &mut PointerTracker, input: &PointerInput) -> Option<TrackerEvent> {
    if input.phase == PointerPhase::Down && !tracker.is_tracking() {
        tracker.start(input)
    } else {
        tracker.handle(input)
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1-4. Stream shape and capture
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn stream_is_well_formed(inputs in prop::collection::vec(arb_input(), 0..200)) {
        let mut tracker = PointerTracker::new();
        let mut active = false;
        for input in &inputs {
            let captured = tracker.captured();
            let out = feed(&mut tracker, input);
            match out {
                Some(TrackerEvent::Start(_)) => {
                    prop_assert!(!active, "Start while a gesture is active");
                    active = true;
                }
                Some(TrackerEvent::Move(_)) => {
                    prop_assert!(active, "Move outside a gesture");
                    prop_assert_eq!(Some(input.key()), captured);
                }
                Some(TrackerEvent::End { .. }) => {
                    prop_assert!(active, "End outside a gesture");
                    prop_assert_eq!(Some(input.key()), captured);
                    prop_assert!(!tracker.is_tracking(), "capture kept after End");
                    active = false;
                }
                None => {
                    if let Some(key) = captured {
                        prop_assert!(input.key() != key, "captured pointer event dropped");
                    }
                }
            }
            prop_assert_eq!(active, tracker.is_tracking());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. lose is idempotent
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn lose_is_idempotent(inputs in prop::collection::vec(arb_input(), 0..50)) {
        let mut tracker = PointerTracker::new();
        for input in &inputs {
            feed(&mut tracker, input);
        }
        let was_tracking = tracker.is_tracking();
        let first = tracker.lose();
        prop_assert_eq!(first.is_some(), was_tracking);
        prop_assert!(tracker.lose().is_none());
        prop_assert!(!tracker.is_tracking());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Record/replay
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn json_lines_roundtrip(
        touch in any::<bool>(),
        start in 0u16..400,
        targets in prop::collection::vec((0u16..400, prop_oneof![Just(1u32), Just(2), Just(4)]), 0..6),
    ) {
        let mut script = if touch { PointerScript::touch(1) } else { PointerScript::mouse() };
        script = script.press(12.0, f32::from(start));
        for (y, steps) in targets {
            script = script.drag_to(f32::from(y), steps);
        }
        script = script.release();

        let encoded = script.to_json_lines().unwrap();
        let replayed = PointerScript::from_json_lines(&encoded).unwrap();
        prop_assert_eq!(replayed.events(), script.events());

        let flat: Vec<_> = replayed.events().iter().flat_map(InputEvent::pointer_inputs).collect();
        prop_assert_eq!(flat.first().map(|p| p.phase), Some(PointerPhase::Down));
        prop_assert_eq!(flat.last().map(|p| p.phase), Some(PointerPhase::Up));
    }
}
