use binding_format::Color;

use super::{Action, RenderContext};
use crate::feedback::{FeedbackTarget, SwitchColor};
use crate::midi::ControlChange;
use crate::state::StateStore;

/// Sends one fixed Control Change, e.g. tap tempo.
#[derive(Debug, Clone)]
pub struct FixedCc {
    pub channel: u8,
    pub cc: u8,
    pub value: u8,
    pub text: String,
    pub color: Color,
    pub brightness: f32,
}

impl Action for FixedCc {
    fn activate(&mut self, _state: &mut StateStore) -> Option<ControlChange> {
        Some(ControlChange::new(self.channel, self.cc, self.value))
    }

    fn render(&self, _ctx: &RenderContext<'_>, target: &mut dyn FeedbackTarget) {
        target.set_switch_color(SwitchColor::Single(self.color));
        target.set_brightness(self.brightness);
        target.set_text(&self.text);
        target.set_background_color(self.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tap_leaves_state_untouched() {
        let mut action = FixedCc {
            channel: 0,
            cc: 44,
            value: 127,
            text: "TAP".into(),
            color: Color::TURQUOISE,
            brightness: 0.3,
        };
        let mut state = StateStore::new();
        assert_eq!(
            action.activate(&mut state).map(ControlChange::to_bytes),
            Some([0xB0, 44, 127])
        );
        assert_eq!(state, StateStore::new());
    }
}
