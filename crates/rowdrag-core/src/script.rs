#![forbid(unsafe_code)]

//! Scripted pointer input for simulation and record/replay.
//!
//! A [`PointerScript`] is a deterministic sequence of [`InputEvent`]s built
//! with a small cursor-style API, or decoded from JSON Lines (one event per
//! line) recorded from a host.
//!
//! ```
//! use rowdrag_core::script::PointerScript;
//!
//! let script = PointerScript::mouse().press(8.0, 10.0).drag_to(70.0, 4).release();
//! assert_eq!(script.len(), 6);
//! ```

use std::fmt;

use crate::event::{InputEvent, PointerInput, PointerKind, PointerPhase, TouchInput, TouchPhase, TouchPoint};

/// Default spacing between scripted events (one 60 Hz frame).
pub const DEFAULT_STEP_MS: u64 = 16;

/// Error decoding a recorded script.
#[derive(Debug)]
pub enum ScriptError {
    /// A line was not a valid encoded [`InputEvent`].
    Json {
        /// 1-based line number.
        line: usize,
        source: serde_json::Error,
    },
    /// An event could not be encoded.
    Encode(serde_json::Error),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json { line, source } => write!(f, "invalid input event on line {line}: {source}"),
            Self::Encode(err) => write!(f, "cannot encode input event: {err}"),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
        }
    }
}

/// Builder for a deterministic input sequence driven by a single pointer.
#[derive(Debug, Clone)]
pub struct PointerScript {
    kind: PointerKind,
    id: u32,
    step_ms: u64,
    clock_ms: u64,
    cursor: (f32, f32),
    events: Vec<InputEvent>,
}

impl PointerScript {
    /// A script driven by the mouse.
    #[must_use]
    pub fn mouse() -> Self {
        Self::with_pointer(PointerKind::Mouse, 0)
    }

    /// A script driven by finger `id`, emitted as touch events.
    #[must_use]
    pub fn touch(id: u32) -> Self {
        Self::with_pointer(PointerKind::Touch, id)
    }

    /// A script driven by pen `id`.
    #[must_use]
    pub fn pen(id: u32) -> Self {
        Self::with_pointer(PointerKind::Pen, id)
    }

    fn with_pointer(kind: PointerKind, id: u32) -> Self {
        Self {
            kind,
            id,
            step_ms: DEFAULT_STEP_MS,
            clock_ms: 0,
            cursor: (0.0, 0.0),
            events: Vec::new(),
        }
    }

    /// Set the time between consecutive events.
    #[must_use]
    pub fn with_step(mut self, step_ms: u64) -> Self {
        self.step_ms = step_ms;
        self
    }

    /// Press at `(x, y)`.
    #[must_use]
    pub fn press(self, x: f32, y: f32) -> Self {
        self.emit(PointerPhase::Down, x, y)
    }

    /// Move to `(x, y)` in one event.
    #[must_use]
    pub fn move_to(self, x: f32, y: f32) -> Self {
        self.emit(PointerPhase::Move, x, y)
    }

    /// Move vertically by `dy` in one event.
    #[must_use]
    pub fn move_by(self, dy: f32) -> Self {
        let (x, y) = self.cursor;
        self.emit(PointerPhase::Move, x, y + dy)
    }

    /// Move vertically to `y` in `steps` evenly spaced events.
    #[must_use]
    pub fn drag_to(mut self, y: f32, steps: u32) -> Self {
        let steps = steps.max(1);
        let (x, start_y) = self.cursor;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            self = self.emit(PointerPhase::Move, x, start_y + (y - start_y) * t);
        }
        self
    }

    /// Lift the pointer at the current position.
    #[must_use]
    pub fn release(self) -> Self {
        let (x, y) = self.cursor;
        self.emit(PointerPhase::Up, x, y)
    }

    /// Cancel the interaction at the current position.
    #[must_use]
    pub fn cancel(self) -> Self {
        let (x, y) = self.cursor;
        self.emit(PointerPhase::Cancel, x, y)
    }

    /// Simulate the platform revoking pointer capture.
    #[must_use]
    pub fn lose_capture(self) -> Self {
        let (x, y) = self.cursor;
        self.emit(PointerPhase::CaptureLost, x, y)
    }

    /// Append an arbitrary event (e.g. from another pointer).
    #[must_use]
    pub fn push(mut self, event: impl Into<InputEvent>) -> Self {
        self.events.push(event.into());
        self
    }

    fn emit(mut self, phase: PointerPhase, x: f32, y: f32) -> Self {
        self.cursor = (x, y);
        let ts = self.clock_ms;
        self.clock_ms = self.clock_ms.saturating_add(self.step_ms);
        let event = match (self.kind, touch_phase(phase)) {
            (PointerKind::Touch, Some(touch_phase)) => InputEvent::Touch(TouchInput {
                phase: touch_phase,
                touches: vec![TouchPoint::new(self.id, x, y)],
                timestamp_ms: ts,
            }),
            _ => InputEvent::Pointer(
                PointerInput::new(self.kind, phase, x, y)
                    .with_id(self.id)
                    .with_timestamp(ts),
            ),
        };
        self.events.push(event);
        self
    }

    /// Scripted events in order.
    #[must_use]
    pub fn events(&self) -> &[InputEvent] {
        &self.events
    }

    /// Consume the script into its events.
    #[must_use]
    pub fn into_events(self) -> Vec<InputEvent> {
        self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Encode as JSON Lines, one event per line.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Encode`] if an event cannot be serialized.
    pub fn to_json_lines(&self) -> Result<String, ScriptError> {
        let mut out = String::new();
        for event in &self.events {
            out.push_str(&event.to_json_string().map_err(ScriptError::Encode)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Decode a JSON Lines recording. Blank lines are skipped.
    ///
    /// The decoded script keeps the recorded timestamps; further builder
    /// calls continue from the last recorded position.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::Json`] naming the first malformed line.
    pub fn from_json_lines(s: &str) -> Result<Self, ScriptError> {
        let _span = crate::debug_span!("script_decode", bytes = s.len()).entered();
        let mut script = Self::mouse();
        for (idx, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let event = InputEvent::from_json_str(line).map_err(|source| ScriptError::Json {
                line: idx + 1,
                source,
            })?;
            if let Some(last) = event.pointer_inputs().last() {
                script.cursor = (last.x, last.y);
                script.clock_ms = last.timestamp_ms.saturating_add(script.step_ms);
            }
            script.events.push(event);
        }
        crate::debug!(events = script.events.len(), "script decoded");
        Ok(script)
    }
}

fn touch_phase(phase: PointerPhase) -> Option<TouchPhase> {
    match phase {
        PointerPhase::Down => Some(TouchPhase::Start),
        PointerPhase::Move => Some(TouchPhase::Move),
        PointerPhase::Up => Some(TouchPhase::End),
        PointerPhase::Cancel => Some(TouchPhase::Cancel),
        PointerPhase::CaptureLost => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_script_advances_clock() {
        let script = PointerScript::mouse().with_step(10).press(0.0, 5.0).move_by(3.0).release();
        let flat: Vec<_> = script.events().iter().flat_map(InputEvent::pointer_inputs).collect();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat.iter().map(|p| p.timestamp_ms).collect::<Vec<_>>(), vec![0, 10, 20]);
        assert_eq!(flat[1].y, 8.0);
        assert_eq!(flat[2].phase, PointerPhase::Up);
        assert_eq!(flat[2].y, 8.0);
    }

    #[test]
    fn drag_to_interpolates_evenly() {
        let script = PointerScript::mouse().press(0.0, 0.0).drag_to(40.0, 4);
        let ys: Vec<f32> = script
            .events()
            .iter()
            .flat_map(InputEvent::pointer_inputs)
            .map(|p| p.y)
            .collect();
        assert_eq!(ys, vec![0.0, 10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn drag_to_zero_steps_still_moves() {
        let script = PointerScript::mouse().press(0.0, 0.0).drag_to(40.0, 0);
        assert_eq!(script.len(), 2);
    }

    #[test]
    fn touch_script_emits_touch_events() {
        let script = PointerScript::touch(4).press(1.0, 2.0).release();
        assert!(matches!(
            &script.events()[0],
            InputEvent::Touch(TouchInput { phase: TouchPhase::Start, touches, .. }) if touches[0].id == 4
        ));
        assert!(matches!(
            &script.events()[1],
            InputEvent::Touch(TouchInput { phase: TouchPhase::End, .. })
        ));
    }

    #[test]
    fn touch_capture_loss_falls_back_to_pointer_event() {
        let script = PointerScript::touch(1).press(0.0, 0.0).lose_capture();
        assert!(matches!(
            &script.events()[1],
            InputEvent::Pointer(p) if p.phase == PointerPhase::CaptureLost && p.kind == PointerKind::Touch
        ));
    }

    #[test]
    fn json_lines_replay_matches_recording() {
        let script = PointerScript::touch(2).press(3.0, 10.0).drag_to(50.0, 2).cancel();
        let recorded = script.to_json_lines().unwrap();
        assert_eq!(recorded.lines().count(), 4);
        let replayed = PointerScript::from_json_lines(&recorded).unwrap();
        assert_eq!(replayed.events(), script.events());
    }

    #[test]
    fn recorded_clock_at_max_saturates() {
        let input = "{\"type\":\"pointer\",\"id\":0,\"kind\":\"mouse\",\"phase\":\"down\",\"x\":0.0,\"y\":0.0,\"timestamp_ms\":18446744073709551615}";
        let script = PointerScript::from_json_lines(input).unwrap().release();
        let last = script.events().iter().flat_map(InputEvent::pointer_inputs).last();
        assert_eq!(last.map(|p| p.timestamp_ms), Some(u64::MAX));
    }

    #[test]
    fn huge_step_saturates() {
        let script = PointerScript::mouse().with_step(u64::MAX).press(0.0, 0.0).move_by(1.0).release();
        let stamps: Vec<u64> = script
            .events()
            .iter()
            .flat_map(InputEvent::pointer_inputs)
            .map(|p| p.timestamp_ms)
            .collect();
        assert_eq!(stamps, vec![0, u64::MAX, u64::MAX]);
    }

    #[test]
    fn json_lines_error_names_line() {
        let input = "\n{\"type\":\"pointer\",\"id\":0,\"kind\":\"mouse\",\"phase\":\"down\",\"x\":0.0,\"y\":0.0}\nnot json\n";
        let err = PointerScript::from_json_lines(input).unwrap_err();
        assert!(matches!(err, ScriptError::Json { line: 3, .. }), "{err}");
        assert!(err.to_string().contains("line 3"));
    }
}
