use binding_format::{Color, FlagField};

use super::{Action, RenderContext};
use crate::feedback::{FeedbackTarget, SwitchColor};
use crate::midi::ControlChange;
use crate::state::StateStore;

/// Flips a boolean field and reports it as 127/0.
#[derive(Debug, Clone)]
pub struct ToggleCc {
    pub channel: u8,
    pub field: FlagField,
    pub cc: u8,
    pub text: String,
    pub color_on: Color,
    pub color_off: Color,
    pub brightness: f32,
}

impl Action for ToggleCc {
    fn activate(&mut self, state: &mut StateStore) -> Option<ControlChange> {
        let flag = state.flag_mut(self.field);
        *flag = !*flag;
        let value = if *flag { 127 } else { 0 };
        Some(ControlChange::new(self.channel, self.cc, value))
    }

    fn render(&self, ctx: &RenderContext<'_>, target: &mut dyn FeedbackTarget) {
        let on = ctx.state.flag(self.field);
        let color = if on { self.color_on } else { self.color_off };
        target.set_switch_color(SwitchColor::Single(color));
        target.set_brightness(self.brightness);
        target.set_text(&format!("{}{}", self.text, if on { '+' } else { '-' }));
        target.set_background_color(color);
    }
}
