//! Per-switch gesture classification over sampled press levels.
//!
//! The classifier is fed one level per tick. A release after at least the
//! hold threshold is a hold. Shorter releases are clicks: without a
//! double-click window a click is a short press immediately, with one the
//! click waits until either a second click arrives inside the window
//! (double click) or the window lapses (short press, reported by
//! [`GestureClassifier::expire`]). A second press that starts inside the
//! window holds the pending click open until it is released; a hold then
//! drops the pending click.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Short,
    Hold,
    DoubleClick,
}

impl Gesture {
    pub fn as_str(self) -> &'static str {
        match self {
            Gesture::Short => "short",
            Gesture::Hold => "hold",
            Gesture::DoubleClick => "double",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierConfig {
    pub hold_threshold: Duration,
    /// `None` disables the double click overlay for the switch.
    pub double_click_window: Option<Duration>,
}

impl ClassifierConfig {
    pub fn from_millis(hold_ms: u64, double_click_ms: Option<u64>) -> Self {
        Self {
            hold_threshold: Duration::from_millis(hold_ms),
            double_click_window: double_click_ms.map(Duration::from_millis),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GestureClassifier {
    config: ClassifierConfig,
    pressed_at: Option<Instant>,
    pending_click: Option<Instant>,
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            pressed_at: None,
            pending_click: None,
        }
    }

    /// A first click is waiting for a possible second one.
    pub fn is_pending(&self) -> bool {
        self.pending_click.is_some()
    }

    /// Resolves a pending click into a short press once the window has lapsed.
    ///
    /// Deferred while a press that started inside the window is still down.
    pub fn expire(&mut self, now: Instant) -> Option<Gesture> {
        let window = self.config.double_click_window?;
        let clicked_at = self.pending_click?;
        if self
            .pressed_at
            .is_some_and(|started| started.saturating_duration_since(clicked_at) <= window)
        {
            return None;
        }
        if now.saturating_duration_since(clicked_at) > window {
            self.pending_click = None;
            Some(Gesture::Short)
        } else {
            None
        }
    }

    /// Feeds the press level sampled at `now`.
    pub fn sample(&mut self, pressed: bool, now: Instant) -> Option<Gesture> {
        match (self.pressed_at, pressed) {
            (None, true) => {
                self.pressed_at = Some(now);
                None
            }
            (Some(started), false) => {
                self.pressed_at = None;
                if now.saturating_duration_since(started) >= self.config.hold_threshold {
                    self.pending_click = None;
                    Some(Gesture::Hold)
                } else {
                    self.click(started, now)
                }
            }
            _ => None,
        }
    }

    /// `started` is when the releasing press began; a second press that began
    /// inside the window completes a double click.
    fn click(&mut self, started: Instant, now: Instant) -> Option<Gesture> {
        let Some(window) = self.config.double_click_window else {
            return Some(Gesture::Short);
        };
        match self.pending_click.take() {
            Some(first) if started.saturating_duration_since(first) <= window => {
                Some(Gesture::DoubleClick)
            }
            Some(_) => {
                // stale click that was never expired; it resolves now, this one waits
                self.pending_click = Some(now);
                Some(Gesture::Short)
            }
            None => {
                self.pending_click = Some(now);
                None
            }
        }
    }
}
