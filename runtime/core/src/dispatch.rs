//! Per-tick driver tying classifiers, candidate selection, activation and refresh together.

use std::time::Instant;

use binding_format::{BindingTable, Predicate};
use tracing::{debug, trace};

use crate::action::{build_action, Action, RenderContext};
use crate::feedback::{FeedbackSurface, LabelOnly};
use crate::gesture::{ClassifierConfig, Gesture, GestureClassifier};
use crate::midi::OutputSink;
use crate::predicate::EnablePredicate;
use crate::probe::ProbeProvider;
use crate::state::StateStore;
use crate::status::render_status;

/// Index into the dispatcher's action arena.
pub type ActionId = usize;

struct ActionSlot {
    id: String,
    action: Box<dyn Action>,
    enabled_when: Predicate,
    use_leds: bool,
}

/// Candidate lists for one switch, in binding order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchBindings {
    pub short: Vec<ActionId>,
    pub hold: Vec<ActionId>,
    pub double: Vec<ActionId>,
}

impl SwitchBindings {
    pub fn candidates(&self, gesture: Gesture) -> &[ActionId] {
        match gesture {
            Gesture::Short => &self.short,
            Gesture::Hold => &self.hold,
            Gesture::DoubleClick => &self.double,
        }
    }

    /// Hold, double, then short, without repeats. Later renders win on a shared target.
    fn render_order(&self) -> Vec<ActionId> {
        let mut order: Vec<ActionId> = Vec::new();
        for id in self.hold.iter().chain(&self.double).chain(&self.short) {
            if !order.contains(id) {
                order.push(*id);
            }
        }
        order
    }
}

struct SwitchSlot {
    id: String,
    bindings: SwitchBindings,
    render_order: Vec<ActionId>,
    classifier: GestureClassifier,
}

pub struct Dispatcher {
    state: StateStore,
    actions: Vec<ActionSlot>,
    switches: Vec<SwitchSlot>,
    pollers: Vec<ActionId>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(StateStore::default())
    }
}

impl Dispatcher {
    pub fn new(state: StateStore) -> Self {
        Self {
            state,
            actions: Vec::new(),
            switches: Vec::new(),
            pollers: Vec::new(),
        }
    }

    /// Builds the arena and switch lists from a compiled table.
    pub fn from_table(table: &BindingTable, probes: &mut dyn ProbeProvider) -> Self {
        let mut dispatcher = Self::default();
        for entry in &table.actions {
            let action = build_action(entry, probes);
            dispatcher.add_action(
                entry.id.clone(),
                action,
                entry.enabled_when.clone(),
                entry.use_leds,
            );
        }
        for switch in &table.switches {
            dispatcher.add_switch(
                switch.id.clone(),
                ClassifierConfig::from_millis(switch.hold_ms, switch.double_click_ms),
                SwitchBindings {
                    short: switch.short.clone(),
                    hold: switch.hold.clone(),
                    double: switch.double.clone(),
                },
            );
        }
        for &poller in &table.pollers {
            dispatcher.add_poller(poller);
        }
        debug!(
            actions = dispatcher.actions.len(),
            switches = dispatcher.switches.len(),
            pollers = dispatcher.pollers.len(),
            "dispatcher assembled"
        );
        dispatcher
    }

    pub fn add_action(
        &mut self,
        id: impl Into<String>,
        action: Box<dyn Action>,
        enabled_when: Predicate,
        use_leds: bool,
    ) -> ActionId {
        self.actions.push(ActionSlot {
            id: id.into(),
            action,
            enabled_when,
            use_leds,
        });
        self.actions.len() - 1
    }

    /// Ids outside the arena are dropped from the bindings.
    pub fn add_switch(
        &mut self,
        id: impl Into<String>,
        config: ClassifierConfig,
        mut bindings: SwitchBindings,
    ) -> usize {
        let count = self.actions.len();
        for list in [&mut bindings.short, &mut bindings.hold, &mut bindings.double] {
            list.retain(|action| *action < count);
        }
        self.switches.push(SwitchSlot {
            id: id.into(),
            render_order: bindings.render_order(),
            bindings,
            classifier: GestureClassifier::new(config),
        });
        self.switches.len() - 1
    }

    pub fn add_poller(&mut self, action: ActionId) {
        if action < self.actions.len() && !self.pollers.contains(&action) {
            self.pollers.push(action);
        }
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    /// For seeding state before the first refresh.
    pub fn state_mut(&mut self) -> &mut StateStore {
        &mut self.state
    }

    pub fn switch_count(&self) -> usize {
        self.switches.len()
    }

    pub fn switch_id(&self, switch: usize) -> Option<&str> {
        self.switches.get(switch).map(|slot| slot.id.as_str())
    }

    pub fn action_id(&self, action: ActionId) -> Option<&str> {
        self.actions.get(action).map(|slot| slot.id.as_str())
    }

    pub fn is_click_pending(&self, switch: usize) -> bool {
        self.switches
            .get(switch)
            .is_some_and(|slot| slot.classifier.is_pending())
    }

    /// Runs one tick. `pressed[i]` is the sampled level of switch `i`; missing
    /// entries read as released. Returns true when a refresh was performed.
    pub fn tick(
        &mut self,
        now: Instant,
        pressed: &[bool],
        sink: &mut dyn OutputSink,
        surface: &mut dyn FeedbackSurface,
    ) -> bool {
        let mut dirty = false;

        for &poller in &self.pollers {
            if self.actions[poller].action.update(&mut self.state, now) {
                trace!(action = %self.actions[poller].id, "poller changed state");
                dirty = true;
            }
        }

        for switch in 0..self.switches.len() {
            let level = pressed.get(switch).copied().unwrap_or(false);
            let classifier = &mut self.switches[switch].classifier;
            let was_pending = classifier.is_pending();
            let expired = classifier.expire(now);
            let sampled = classifier.sample(level, now);
            // the pending marker is part of the rendered label
            if classifier.is_pending() != was_pending {
                dirty = true;
            }
            for gesture in [expired, sampled].into_iter().flatten() {
                if self.dispatch(switch, gesture, sink) {
                    dirty = true;
                }
            }
        }

        if dirty {
            self.refresh(surface);
        }
        dirty
    }

    /// First enabled candidate for `gesture` on `switch`, in binding order.
    pub fn resolve(&self, switch: usize, gesture: Gesture) -> Option<ActionId> {
        let slot = self.switches.get(switch)?;
        let mut enabled = slot
            .bindings
            .candidates(gesture)
            .iter()
            .copied()
            .filter(|&id| self.actions[id].enabled_when.is_enabled(&self.state));
        let chosen = enabled.next()?;
        let shadowed: Vec<&str> = enabled.map(|id| self.actions[id].id.as_str()).collect();
        if !shadowed.is_empty() {
            debug!(
                switch = %slot.id,
                gesture = gesture.as_str(),
                chosen = %self.actions[chosen].id,
                ?shadowed,
                "several candidates enabled; first in binding order wins"
            );
        }
        Some(chosen)
    }

    /// Activates the selected candidate and sends its message. Returns true when
    /// an action ran.
    pub fn dispatch(&mut self, switch: usize, gesture: Gesture, sink: &mut dyn OutputSink) -> bool {
        let Some(chosen) = self.resolve(switch, gesture) else {
            debug!(
                switch = self.switch_id(switch).unwrap_or("?"),
                gesture = gesture.as_str(),
                "no enabled candidate; gesture dropped"
            );
            return false;
        };
        let slot = &mut self.actions[chosen];
        debug!(
            switch = %self.switches[switch].id,
            gesture = gesture.as_str(),
            action = %slot.id,
            "activating"
        );
        if let Some(message) = slot.action.activate(&mut self.state) {
            trace!(frame = ?message.to_bytes(), "sending control change");
            sink.send_cc(message);
        }
        true
    }

    /// Renders every enabled bound action on every switch, then the status displays.
    pub fn refresh(&self, surface: &mut dyn FeedbackSurface) {
        for (index, switch) in self.switches.iter().enumerate() {
            let ctx = RenderContext {
                state: &self.state,
                click_pending: switch.classifier.is_pending(),
            };
            let target = surface.switch_target(index);
            for &id in &switch.render_order {
                let slot = &self.actions[id];
                if !slot.enabled_when.is_enabled(&self.state) {
                    continue;
                }
                if slot.use_leds {
                    slot.action.render(&ctx, &mut *target);
                } else {
                    slot.action.render(&ctx, &mut LabelOnly::new(&mut *target));
                }
            }
        }
        render_status(&self.state, surface);
    }
}
