//! Composite status and main display text derived from state.

use binding_format::{Color, ViewStyle};

use crate::feedback::FeedbackSurface;
use crate::state::StateStore;

/// `[PW: <power summary>]`, with ` T+` appended while the tuner is on.
pub fn status_line(state: &StateStore) -> String {
    let tuner = if state.tuner { " T+" } else { "" };
    format!("[PW: {}{tuner}]", state.power_summary)
}

pub fn status_color(state: &StateStore) -> Color {
    if state.tuner {
        Color::RED
    } else if state.gig_view {
        Color::DARK_BLUE
    } else {
        Color::DARK_YELLOW
    }
}

pub fn main_text(state: &StateStore) -> String {
    let mode = state.mode_name();
    if state.gig_view {
        let target = match state.gig_view_style {
            ViewStyle::ShortCurrent => "Current",
            ViewStyle::ShortOpposite => "Opposite",
        };
        format!("GV {target} QP{}\n{mode}", state.qc_page)
    } else {
        format!("CH\n{mode} MP{} QP{}", state.midi_page, state.qc_page)
    }
}

pub fn render_status(state: &StateStore, surface: &mut dyn FeedbackSurface) {
    let status = surface.status_target();
    status.set_text(&status_line(state));
    status.set_background_color(status_color(state));
    surface.main_target().set_text(&main_text(state));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_appends_tuner_marker() {
        let mut state = StateStore::new();
        state.power_summary = "BAT > 1.01V > 3.03V".into();
        assert_eq!(status_line(&state), "[PW: BAT > 1.01V > 3.03V]");
        assert_eq!(status_color(&state), Color::DARK_YELLOW);

        state.tuner = true;
        assert_eq!(status_line(&state), "[PW: BAT > 1.01V > 3.03V T+]");
        assert_eq!(status_color(&state), Color::RED);
    }

    #[test]
    fn main_text_per_view() {
        let mut state = StateStore::new();
        state.midi_page = 1;
        assert_eq!(main_text(&state), "CH\nPRE MP1 QP2");

        state.gig_view = true;
        state.mode_slot = 1;
        state.gig_view_style = ViewStyle::ShortOpposite;
        assert_eq!(main_text(&state), "GV Opposite QP2\nSCN");
        assert_eq!(status_color(&state), Color::DARK_BLUE);
    }
}
