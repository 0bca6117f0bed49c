use binding_format::{Color, PageField, ViewStyle};

use super::{Action, RenderContext};
use crate::feedback::{FeedbackTarget, SwitchColor};
use crate::midi::ControlChange;
use crate::state::{opposite_page, StateStore};

const SWAP_CC: u8 = 64;

/// Controller numbers per page, indexed by slot A-D.
const SLOT_CCS: [[u8; 4]; 2] = [[35, 36, 37, 38], [39, 40, 41, 42]];
const SLOT_NAMES: [char; 4] = ['A', 'B', 'C', 'D'];

const PAGE_COLORS_COOL: [[Color; 4]; 2] = [
    [Color::BLUE, Color::TURQUOISE, Color::LIGHT_BLUE, Color::DARK_BLUE],
    [Color::LIGHT_BLUE, Color::TURQUOISE, Color::BLUE, Color::DARK_BLUE],
];
const PAGE_COLORS_WARM: [[Color; 4]; 2] = [
    [Color::PINK, Color::ORANGE, Color::DARK_YELLOW, Color::YELLOW],
    [Color::LIGHT_RED, Color::RED, Color::PURPLE, Color::ORANGE],
];

fn page_row(page: u8) -> usize {
    if page == 1 {
        0
    } else {
        1
    }
}

/// Flips a page field between 1 and 2.
#[derive(Debug, Clone)]
pub struct PageSwap {
    pub channel: u8,
    pub field: PageField,
    pub send_swap: bool,
    pub label_prefix: String,
    pub split_led: bool,
    pub brightness: f32,
}

impl Action for PageSwap {
    fn activate(&mut self, state: &mut StateStore) -> Option<ControlChange> {
        let page = state.page_mut(self.field);
        *page = opposite_page(*page);
        let value = if *page == 2 { 127 } else { 0 };
        self.send_swap
            .then(|| ControlChange::new(self.channel, SWAP_CC, value))
    }

    fn render(&self, ctx: &RenderContext<'_>, target: &mut dyn FeedbackTarget) {
        let page = ctx.state.page(self.field);
        let (left, right) = if ctx.state.gig_view {
            (Color::BLUE, Color::TURQUOISE)
        } else {
            (Color::ORANGE, Color::RED)
        };
        let color = if page == 1 { left } else { right };
        if self.split_led {
            let segments = if page == 1 {
                vec![left, left, Color::DARK_GRAY]
            } else {
                vec![Color::DARK_GRAY, right, right]
            };
            target.set_switch_color(SwitchColor::Segments(segments));
        } else {
            target.set_switch_color(SwitchColor::Single(color));
        }
        target.set_brightness(self.brightness);
        target.set_text(&format!("{}{page}", self.label_prefix));
        target.set_background_color(color);
    }
}

/// Selects footswitch A-D on the current or opposite page.
#[derive(Debug, Clone)]
pub struct PageSlot {
    pub channel: u8,
    pub slot: u8,
    pub opposite: bool,
    pub page_source: PageField,
    pub brightness: f32,
}

impl PageSlot {
    fn slot_index(&self) -> usize {
        usize::from(self.slot.min(3))
    }

    /// In gig view the `short_opposite` style inverts slots driven by the QC page.
    pub fn effective_opposite(&self, state: &StateStore) -> bool {
        let inverted = self.page_source == PageField::QcPage
            && state.gig_view
            && state.gig_view_style == ViewStyle::ShortOpposite;
        self.opposite != inverted
    }

    pub fn target_page(&self, state: &StateStore) -> u8 {
        let current = state.page(self.page_source);
        if self.effective_opposite(state) {
            opposite_page(current)
        } else {
            current
        }
    }
}

impl Action for PageSlot {
    fn activate(&mut self, state: &mut StateStore) -> Option<ControlChange> {
        let page = self.target_page(state);
        let cc = SLOT_CCS[page_row(page)][self.slot_index()];
        Some(ControlChange::new(self.channel, cc, 127))
    }

    fn render(&self, ctx: &RenderContext<'_>, target: &mut dyn FeedbackTarget) {
        let state = ctx.state;
        let page = self.target_page(state);
        let opposite = self.effective_opposite(state);
        let slot = SLOT_NAMES[self.slot_index()];
        let palette = if state.gig_view {
            &PAGE_COLORS_COOL
        } else {
            &PAGE_COLORS_WARM
        };
        let color = if opposite {
            Color::GRAY
        } else {
            palette[page_row(page)][self.slot_index()]
        };

        target.set_switch_color(SwitchColor::Single(color));
        target.set_brightness(self.brightness);
        let text = if state.gig_view {
            format!("{slot}{}", if opposite { 'O' } else { 'C' })
        } else {
            format!("{slot}{page}{}", if self.opposite { "*" } else { "" })
        };
        target.set_text(&text);
        target.set_background_color(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::LabelState;

    fn slot(slot: u8, opposite: bool, page_source: PageField) -> PageSlot {
        PageSlot {
            channel: 0,
            slot,
            opposite,
            page_source,
            brightness: 0.3,
        }
    }

    fn qc_swap() -> PageSwap {
        PageSwap {
            channel: 0,
            field: PageField::QcPage,
            send_swap: true,
            label_prefix: "QP".into(),
            split_led: true,
            brightness: 0.25,
        }
    }

    #[test]
    fn swap_flips_page_and_reports_new_page() {
        let mut action = qc_swap();
        let mut state = StateStore::new();
        assert_eq!(
            action.activate(&mut state).map(ControlChange::to_bytes),
            Some([0xB0, 64, 0])
        );
        assert_eq!(state.qc_page, 1);
        assert_eq!(
            action.activate(&mut state).map(ControlChange::to_bytes),
            Some([0xB0, 64, 127])
        );
        assert_eq!(state.qc_page, 2);
    }

    #[test]
    fn internal_swap_sends_nothing() {
        let mut action = PageSwap {
            field: PageField::MidiPage,
            send_swap: false,
            label_prefix: "MP".into(),
            split_led: false,
            ..qc_swap()
        };
        let mut state = StateStore::new();
        assert_eq!(action.activate(&mut state), None);
        assert_eq!(state.midi_page, 1);
        assert_eq!(state.qc_page, 2);

        let mut label = LabelState::default();
        action.render(&RenderContext::new(&state), &mut label);
        assert_eq!(label.text, "MP1");
        assert_eq!(label.switch_color, Some(SwitchColor::Single(Color::ORANGE)));
    }

    #[test]
    fn split_led_lights_the_active_side() {
        let action = qc_swap();
        let mut state = StateStore::new();
        state.gig_view = true;
        let mut label = LabelState::default();
        action.render(&RenderContext::new(&state), &mut label);
        assert_eq!(
            label.switch_color,
            Some(SwitchColor::Segments(vec![
                Color::DARK_GRAY,
                Color::TURQUOISE,
                Color::TURQUOISE
            ]))
        );
        assert_eq!(label.text, "QP2");
    }

    #[test]
    fn slot_targets_current_or_opposite_page() {
        let mut state = StateStore::new();
        state.midi_page = 1;
        let mut chain_a = slot(0, false, PageField::MidiPage);
        assert_eq!(
            chain_a.activate(&mut state).map(ControlChange::to_bytes),
            Some([0xB0, 35, 127])
        );

        let mut gig_d_opposite = slot(3, true, PageField::QcPage);
        // qc page 2, opposite is page 1
        assert_eq!(
            gig_d_opposite.activate(&mut state).map(ControlChange::to_bytes),
            Some([0xB0, 38, 127])
        );
        assert_eq!(state, {
            let mut expected = StateStore::new();
            expected.midi_page = 1;
            expected
        });
    }

    #[test]
    fn short_opposite_style_inverts_qc_slots_in_gig_view() {
        let mut state = StateStore::new();
        state.gig_view = true;
        state.gig_view_style = ViewStyle::ShortOpposite;
        let mut current = slot(1, false, PageField::QcPage);
        assert!(current.effective_opposite(&state));
        assert_eq!(
            current.activate(&mut state).map(ControlChange::to_bytes),
            Some([0xB0, 36, 127])
        );

        let midi_driven = slot(1, false, PageField::MidiPage);
        assert!(!midi_driven.effective_opposite(&state));
    }

    #[test]
    fn slot_labels_depend_on_view() {
        let mut state = StateStore::new();
        let action = slot(2, true, PageField::QcPage);
        let mut label = LabelState::default();

        action.render(&RenderContext::new(&state), &mut label);
        assert_eq!(label.text, "C1*");
        assert_eq!(label.background, Color::GRAY);

        state.gig_view = true;
        action.render(&RenderContext::new(&state), &mut label);
        assert_eq!(label.text, "CO");

        let current = slot(2, false, PageField::QcPage);
        current.render(&RenderContext::new(&state), &mut label);
        assert_eq!(label.text, "CC");
        assert_eq!(label.background, Color::BLUE);
    }
}
