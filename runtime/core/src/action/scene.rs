use binding_format::Color;

use super::{Action, RenderContext};
use crate::feedback::{FeedbackTarget, SwitchColor};
use crate::midi::ControlChange;
use crate::state::StateStore;

/// Steps the scene index and keeps the tracked QC page aligned with it.
///
/// Scenes in the lower half of the range live on page 1, the rest on page 2.
#[derive(Debug, Clone)]
pub struct SceneStep {
    pub channel: u8,
    pub step: i8,
    pub modulus: u8,
    pub cc: u8,
    pub color: Color,
    pub brightness: f32,
}

impl Action for SceneStep {
    fn activate(&mut self, state: &mut StateStore) -> Option<ControlChange> {
        let modulus = self.modulus.max(1);
        let next = (i16::from(state.scene_idx) + i16::from(self.step))
            .rem_euclid(i16::from(modulus));
        // rem_euclid keeps `next` in 0..modulus
        state.scene_idx = u8::try_from(next).unwrap_or(0);
        state.qc_page = if state.scene_idx < modulus / 2 { 1 } else { 2 };
        Some(ControlChange::new(self.channel, self.cc, state.scene_idx))
    }

    fn render(&self, ctx: &RenderContext<'_>, target: &mut dyn FeedbackTarget) {
        target.set_switch_color(SwitchColor::Single(self.color));
        target.set_brightness(self.brightness);
        target.set_text(&format!("SC{}", ctx.state.scene_idx));
        target.set_background_color(self.color);
    }
}
