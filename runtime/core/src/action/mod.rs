//! Bound actions and the factory that builds them from compiled table entries.

mod fixed;
mod mode;
mod page;
mod power;
mod scene;
mod toggle;

use std::time::Instant;

use binding_format::{ActionBehavior, ActionEntry};

use crate::feedback::FeedbackTarget;
use crate::midi::ControlChange;
use crate::probe::ProbeProvider;
use crate::state::StateStore;

pub use fixed::FixedCc;
pub use mode::{ModeCycle, StyleToggle};
pub use page::{PageSlot, PageSwap};
pub use power::PowerSense;
pub use scene::SceneStep;
pub use toggle::ToggleCc;

/// What a renderer may read while drawing.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub state: &'a StateStore,
    /// The switch being drawn has a first click waiting for a second.
    pub click_pending: bool,
}

impl<'a> RenderContext<'a> {
    pub fn new(state: &'a StateStore) -> Self {
        Self {
            state,
            click_pending: false,
        }
    }
}

pub trait Action: Send {
    /// Applies the gesture to `state` and returns the message to emit, built
    /// from the already updated state.
    fn activate(&mut self, _state: &mut StateStore) -> Option<ControlChange> {
        None
    }

    /// Periodic hook for polling actions. Returns true when `state` changed.
    fn update(&mut self, _state: &mut StateStore, _now: Instant) -> bool {
        false
    }

    /// Pushes the current feedback for this action. Must not touch state.
    fn render(&self, _ctx: &RenderContext<'_>, _target: &mut dyn FeedbackTarget) {}
}

pub fn build_action(entry: &ActionEntry, probes: &mut dyn ProbeProvider) -> Box<dyn Action> {
    let channel = entry.channel;
    match &entry.behavior {
        ActionBehavior::ToggleCc {
            field,
            cc,
            text,
            color_on,
            color_off,
            brightness,
        } => Box::new(ToggleCc {
            channel,
            field: *field,
            cc: *cc,
            text: text.clone(),
            color_on: *color_on,
            color_off: *color_off,
            brightness: *brightness,
        }),
        ActionBehavior::PageSwap {
            field,
            send_swap,
            label_prefix,
            split_led,
            brightness,
        } => Box::new(PageSwap {
            channel,
            field: *field,
            send_swap: *send_swap,
            label_prefix: label_prefix.clone(),
            split_led: *split_led,
            brightness: *brightness,
        }),
        ActionBehavior::PageSlot {
            slot,
            opposite,
            page_source,
            brightness,
        } => Box::new(PageSlot {
            channel,
            slot: *slot,
            opposite: *opposite,
            page_source: *page_source,
            brightness: *brightness,
        }),
        ActionBehavior::ModeCycle { cc, named } => Box::new(ModeCycle {
            channel,
            cc: *cc,
            named: *named,
        }),
        ActionBehavior::StyleToggle => Box::new(StyleToggle),
        ActionBehavior::SceneStep {
            step,
            modulus,
            cc,
            color,
            brightness,
        } => Box::new(SceneStep {
            channel,
            step: *step,
            modulus: *modulus,
            cc: *cc,
            color: *color,
            brightness: *brightness,
        }),
        ActionBehavior::FixedCc {
            cc,
            value,
            text,
            color,
            brightness,
        } => Box::new(FixedCc {
            channel,
            cc: *cc,
            value: *value,
            text: text.clone(),
            color: *color,
            brightness: *brightness,
        }),
        ActionBehavior::PowerSense { poll_ms } => Box::new(PowerSense::open(*poll_ms, probes)),
    }
}
