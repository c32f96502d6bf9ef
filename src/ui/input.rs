/// Keyboard state tracker for two players on one keyboard.
///
/// Movement keys repeat while held (the session's per-actor cooldown
/// does the rate limiting); ability and meta keys are edge-triggered.
/// Terminals without key-release reporting only send Press/Repeat, so
/// "held" is approximated by expiring keys that go quiet for a moment.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, poll};

/// A key with no Press/Repeat event for this long counts as released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Last Press/Repeat timestamp per key.
    active: HashMap<KeyCode, Instant>,
    /// Keys that went from idle to held during the latest drain.
    fresh: Vec<KeyCode>,
    /// Ctrl+C observed during the latest drain.
    interrupted: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            active: HashMap::with_capacity(16),
            fresh: Vec::with_capacity(8),
            interrupted: false,
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain(&mut self) {
        self.fresh.clear();
        self.interrupted = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            let Ok(Event::Key(key)) = event::read() else { continue };
            if key.kind == KeyEventKind::Release {
                self.active.remove(&key.code);
                continue;
            }
            if key.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
            {
                self.interrupted = true;
            }
            let was_held = self.held(key.code);
            self.active.insert(key.code, Instant::now());
            if !was_held {
                self.fresh.push(key.code);
            }
        }

        let now = Instant::now();
        self.active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Continuous query: is this key currently down?
    pub fn held(&self, code: KeyCode) -> bool {
        self.active
            .get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.held(*c))
    }

    /// Edge query: did this key go down this frame?
    pub fn pressed(&self, code: KeyCode) -> bool {
        self.fresh.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.pressed(*c))
    }

    pub fn interrupted(&self) -> bool {
        self.interrupted
    }
}
