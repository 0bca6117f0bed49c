use binding_format::Color;

use super::{Action, RenderContext};
use crate::feedback::{FeedbackTarget, SwitchColor};
use crate::midi::ControlChange;
use crate::state::{StateStore, MODE_COUNT};

const MODE_BRIGHTNESS: f32 = 0.28;
const MODE_COLORS_COOL: [Color; 3] = [Color::BLUE, Color::TURQUOISE, Color::LIGHT_BLUE];
const MODE_COLORS_WARM: [Color; 3] = [Color::ORANGE, Color::RED, Color::PURPLE];
const MODE_COLORS_PLAIN: [Color; 3] = [Color::YELLOW, Color::ORANGE, Color::WHITE];

/// Cycles preset / scene / stomp mode and reports the slot index.
#[derive(Debug, Clone)]
pub struct ModeCycle {
    pub channel: u8,
    pub cc: u8,
    /// Show mode names instead of `M<n>`.
    pub named: bool,
}

impl Action for ModeCycle {
    fn activate(&mut self, state: &mut StateStore) -> Option<ControlChange> {
        state.mode_slot = (state.mode_slot + 1) % MODE_COUNT;
        Some(ControlChange::new(self.channel, self.cc, state.mode_slot))
    }

    fn render(&self, ctx: &RenderContext<'_>, target: &mut dyn FeedbackTarget) {
        let idx = usize::from(ctx.state.mode_slot % MODE_COUNT);
        let (color, text) = if self.named {
            let palette = if ctx.state.gig_view {
                &MODE_COLORS_COOL
            } else {
                &MODE_COLORS_WARM
            };
            let text = if ctx.click_pending {
                "DBL?".to_string()
            } else {
                ctx.state.mode_name().to_string()
            };
            (palette[idx], text)
        } else {
            (MODE_COLORS_PLAIN[idx], format!("M{idx}"))
        };
        target.set_switch_color(SwitchColor::Single(color));
        target.set_brightness(MODE_BRIGHTNESS);
        target.set_text(&text);
        target.set_background_color(color);
    }
}

/// Flips the gig view style; sends nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleToggle;

impl Action for StyleToggle {
    fn activate(&mut self, state: &mut StateStore) -> Option<ControlChange> {
        state.gig_view_style = state.gig_view_style.flipped();
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::LabelState;
    use binding_format::ViewStyle;

    #[test]
    fn mode_wraps_after_three_slots() {
        let mut action = ModeCycle {
            channel: 0,
            cc: 47,
            named: true,
        };
        let mut state = StateStore::new();
        let values: Vec<_> = (0..4)
            .filter_map(|_| action.activate(&mut state))
            .map(|cc| cc.value)
            .collect();
        assert_eq!(values, vec![1, 2, 0, 1]);
        assert_eq!(state.mode_name(), "SCN");
    }

    #[test]
    fn named_mode_shows_pending_click() {
        let action = ModeCycle {
            channel: 0,
            cc: 47,
            named: true,
        };
        let mut state = StateStore::new();
        state.mode_slot = 2;
        let mut label = LabelState::default();
        action.render(&RenderContext::new(&state), &mut label);
        assert_eq!(label.text, "STP");
        assert_eq!(label.background, Color::PURPLE);

        let pending = RenderContext {
            state: &state,
            click_pending: true,
        };
        action.render(&pending, &mut label);
        assert_eq!(label.text, "DBL?");
    }

    #[test]
    fn plain_mode_uses_numbered_label() {
        let action = ModeCycle {
            channel: 0,
            cc: 47,
            named: false,
        };
        let mut state = StateStore::new();
        state.mode_slot = 1;
        let mut label = LabelState::default();
        action.render(&RenderContext::new(&state), &mut label);
        assert_eq!(label.text, "M1");
        assert_eq!(label.background, Color::ORANGE);
    }

    #[test]
    fn style_toggle_flips_without_message() {
        let mut state = StateStore::new();
        assert_eq!(StyleToggle.activate(&mut state), None);
        assert_eq!(state.gig_view_style, ViewStyle::ShortOpposite);
        StyleToggle.activate(&mut state);
        assert_eq!(state.gig_view_style, ViewStyle::ShortCurrent);
    }
}
