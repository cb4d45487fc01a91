use std::time::{Duration, Instant};

use serde::Serialize;

/// How long the servo is presumed to still be moving after a position
/// change before the panel stops showing the "vibrating" hint.
pub const VIBRATION_WINDOW: Duration = Duration::from_secs(5);

/// Time-bounded "servo is settling" flag.
///
/// Set on every acknowledged position change and cleared lazily: there is
/// no background timer, the window is re-checked whenever status is
/// observed. `expire` must be called with the observation instant before
/// reading `is_active` for status reporting.
#[derive(Debug, Default)]
pub struct VibrationWindow {
    started: Option<Instant>,
}

impl VibrationWindow {
    pub fn start(&mut self, now: Instant) {
        self.started = Some(now);
    }

    /// Clear the flag if more than the window has elapsed since it was set.
    pub fn expire(&mut self, now: Instant) {
        if let Some(started) = self.started {
            if now.saturating_duration_since(started) > VIBRATION_WINDOW {
                self.started = None;
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.started.is_some()
    }
}

/// Result of a connect attempt, serialized straight to the browser.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Result of a position change request.
#[derive(Debug, Clone, Serialize)]
pub struct PositionOutcome {
    pub success: bool,
    pub position: u8,
    pub is_vibrating: bool,
}

/// Current panel status as reported by `/status`.
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    pub connected: bool,
    pub position: u8,
    pub is_vibrating: bool,
}
