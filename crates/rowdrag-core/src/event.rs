#![forbid(unsafe_code)]

//! Canonical raw input types.
//!
//! The host (DOM, winit, a test script) delivers pointer and touch events in
//! list coordinates. This module gives them one deterministic,
//! JSON-friendly shape so the tracker never has to care where they came from.
//!
//! # Design Notes
//!
//! - Touch events carry the *changed* touches only, mirroring the DOM
//!   `changedTouches` list.
//! - Touch input is flattened into [`PointerInput`] (one per changed touch) by
//!   [`InputEvent::pointer_inputs`], so a single code path tracks both.
//! - `buttons` is encoded as a compact `u8` bitset in JSON.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Pointer buttons held during an event.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PointerButtons: u8 {
        const PRIMARY   = 0b0_0001;
        const SECONDARY = 0b0_0010;
        const MIDDLE    = 0b0_0100;
        const BACK      = 0b0_1000;
        const FORWARD   = 0b1_0000;
    }
}

mod buttons_bits {
    use super::PointerButtons;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        buttons: &PointerButtons,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(buttons.bits())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<PointerButtons, D::Error> {
        u8::deserialize(deserializer).map(PointerButtons::from_bits_truncate)
    }
}

/// Device class that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
    /// The platform revoked pointer capture (element removed, focus stolen).
    CaptureLost,
}

/// Identity of one physical pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerKey {
    pub kind: PointerKind,
    pub id: u32,
}

/// One raw pointer event in list coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub id: u32,
    pub kind: PointerKind,
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub timestamp_ms: u64,
    #[serde(default, with = "buttons_bits")]
    pub buttons: PointerButtons,
    /// Whether this is the primary pointer of its kind (first finger, the mouse).
    #[serde(default = "default_primary")]
    pub is_primary: bool,
}

fn default_primary() -> bool {
    true
}

impl PointerInput {
    /// Create a primary pointer event.
    ///
    /// `Down` and `Move` hold the primary button; other phases hold nothing.
    #[must_use]
    pub fn new(kind: PointerKind, phase: PointerPhase, x: f32, y: f32) -> Self {
        let buttons = match phase {
            PointerPhase::Down | PointerPhase::Move => PointerButtons::PRIMARY,
            _ => PointerButtons::empty(),
        };
        Self {
            id: 0,
            kind,
            phase,
            x,
            y,
            timestamp_ms: 0,
            buttons,
            is_primary: true,
        }
    }

    /// Create a mouse event.
    #[must_use]
    pub fn mouse(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self::new(PointerKind::Mouse, phase, x, y)
    }

    /// Create a touch pointer event for finger `id`.
    #[must_use]
    pub fn touch(id: u32, phase: PointerPhase, x: f32, y: f32) -> Self {
        Self::new(PointerKind::Touch, phase, x, y).with_id(id)
    }

    /// Set the pointer id.
    #[must_use]
    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    /// Set the timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    /// Set the held buttons.
    #[must_use]
    pub fn with_buttons(mut self, buttons: PointerButtons) -> Self {
        self.buttons = buttons;
        self
    }

    /// Mark this pointer as non-primary (a second finger, a second pen).
    #[must_use]
    pub fn secondary(mut self) -> Self {
        self.is_primary = false;
        self
    }

    /// Physical identity of the pointer.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> PointerKey {
        PointerKey {
            kind: self.kind,
            id: self.id,
        }
    }

    /// Whether this event may originate a gesture.
    ///
    /// Only primary pointers start gestures, and a mouse only with the
    /// primary button held.
    #[must_use]
    pub fn can_start_gesture(&self) -> bool {
        if self.phase != PointerPhase::Down || !self.is_primary {
            return false;
        }
        match self.kind {
            PointerKind::Mouse => self.buttons.contains(PointerButtons::PRIMARY),
            PointerKind::Touch | PointerKind::Pen => true,
        }
    }
}

/// Phase for touch events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    #[must_use]
    pub const fn new(id: u32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

/// A raw touch event with its changed touches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchInput {
    pub phase: TouchPhase,
    pub touches: Vec<TouchPoint>,
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl TouchInput {
    /// Flatten into one pointer event per changed touch.
    pub fn to_pointer_inputs(&self) -> impl Iterator<Item = PointerInput> + '_ {
        let phase = match self.phase {
            TouchPhase::Start => PointerPhase::Down,
            TouchPhase::Move => PointerPhase::Move,
            TouchPhase::End => PointerPhase::Up,
            TouchPhase::Cancel => PointerPhase::Cancel,
        };
        self.touches.iter().map(move |t| {
            PointerInput::touch(t.id, phase, t.x, t.y).with_timestamp(self.timestamp_ms)
        })
    }
}

/// Normalized, deterministic input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Pointer(PointerInput),
    Touch(TouchInput),
}

impl InputEvent {
    /// Flatten into pointer events, in delivery order.
    #[must_use]
    pub fn pointer_inputs(&self) -> Vec<PointerInput> {
        match self {
            Self::Pointer(p) => vec![*p],
            Self::Touch(t) => t.to_pointer_inputs().collect(),
        }
    }

    /// Encode this event as a stable JSON string.
    ///
    /// # Errors
    ///
    /// Errors can occur only if serialization fails (for example, a
    /// non-finite coordinate).
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a previously encoded event JSON string.
    ///
    /// # Errors
    ///
    /// Errors occur if the JSON does not match the expected schema.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl From<PointerInput> for InputEvent {
    fn from(value: PointerInput) -> Self {
        Self::Pointer(value)
    }
}

impl From<TouchInput> for InputEvent {
    fn from(value: TouchInput) -> Self {
        Self::Touch(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_down_holds_primary_button() {
        let down = PointerInput::mouse(PointerPhase::Down, 1.0, 2.0);
        assert!(down.buttons.contains(PointerButtons::PRIMARY));
        assert!(down.can_start_gesture());

        let up = PointerInput::mouse(PointerPhase::Up, 1.0, 2.0);
        assert!(up.buttons.is_empty());
        assert!(!up.can_start_gesture());
    }

    #[test]
    fn right_click_cannot_start_gesture() {
        let down = PointerInput::mouse(PointerPhase::Down, 0.0, 0.0)
            .with_buttons(PointerButtons::SECONDARY);
        assert!(!down.can_start_gesture());
    }

    #[test]
    fn secondary_touch_cannot_start_gesture() {
        let down = PointerInput::touch(2, PointerPhase::Down, 0.0, 0.0).secondary();
        assert!(!down.can_start_gesture());
        assert!(PointerInput::touch(1, PointerPhase::Down, 0.0, 0.0).can_start_gesture());
    }

    #[test]
    fn touch_flattens_per_changed_touch() {
        let touch = TouchInput {
            phase: TouchPhase::Move,
            touches: vec![TouchPoint::new(7, 1.0, 2.0), TouchPoint::new(9, 3.0, 4.0)],
            timestamp_ms: 40,
        };
        let flat = InputEvent::Touch(touch).pointer_inputs();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].key(), PointerKey { kind: PointerKind::Touch, id: 7 });
        assert_eq!(flat[0].phase, PointerPhase::Move);
        assert_eq!(flat[1].y, 4.0);
        assert!(flat.iter().all(|p| p.timestamp_ms == 40));
    }

    #[test]
    fn touch_end_and_cancel_map_to_terminal_phases() {
        let end = TouchInput {
            phase: TouchPhase::End,
            touches: vec![TouchPoint::new(1, 0.0, 0.0)],
            timestamp_ms: 0,
        };
        let cancel = TouchInput {
            phase: TouchPhase::Cancel,
            ..end.clone()
        };
        assert_eq!(end.to_pointer_inputs().next().map(|p| p.phase), Some(PointerPhase::Up));
        assert_eq!(
            cancel.to_pointer_inputs().next().map(|p| p.phase),
            Some(PointerPhase::Cancel)
        );
    }

    #[test]
    fn pointer_event_json_is_stable() {
        let event = InputEvent::Pointer(
            PointerInput::mouse(PointerPhase::Down, 12.0, 30.5).with_timestamp(5),
        );
        let json = event.to_json_string().unwrap();
        assert!(json.contains(r#""type":"pointer""#), "{json}");
        assert!(json.contains(r#""phase":"down""#), "{json}");
        assert!(json.contains(r#""buttons":1"#), "{json}");
        assert_eq!(InputEvent::from_json_str(&json).unwrap(), event);
    }

    #[test]
    fn json_defaults_fill_optional_fields() {
        let json = r#"{"type":"pointer","id":3,"kind":"pen","phase":"move","x":1.0,"y":2.0}"#;
        let event = InputEvent::from_json_str(json).unwrap();
        let InputEvent::Pointer(p) = event else {
            panic!("expected pointer event");
        };
        assert_eq!(p.kind, PointerKind::Pen);
        assert_eq!(p.timestamp_ms, 0);
        assert!(p.buttons.is_empty());
        assert!(p.is_primary);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(InputEvent::from_json_str(r#"{"type":"wheel"}"#).is_err());
    }
}
