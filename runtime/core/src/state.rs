//! Shared controller state read by enable predicates and renderers.

use binding_format::{FlagField, PageField, PowerSource, StateField, StateValue, ViewStyle};

pub const MODE_NAMES: [&str; 3] = ["PRE", "SCN", "STP"];
pub const MODE_COUNT: u8 = MODE_NAMES.len() as u8;

/// Typed state record. Every field named by [`StateField`] has a slot here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateStore {
    pub gig_view: bool,
    pub tuner: bool,
    pub midi_page: u8,
    pub qc_page: u8,
    pub mode_slot: u8,
    pub scene_idx: u8,
    pub gig_view_style: ViewStyle,
    pub power_source: PowerSource,
    pub power_summary: String,
}

impl Default for StateStore {
    fn default() -> Self {
        Self {
            gig_view: false,
            tuner: false,
            midi_page: 2,
            qc_page: 2,
            mode_slot: 0,
            scene_idx: 0,
            gig_view_style: ViewStyle::ShortCurrent,
            power_source: PowerSource::Unknown,
            power_summary: "?".into(),
        }
    }
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: StateField) -> StateValue {
        match field {
            StateField::GigView => StateValue::Flag(self.gig_view),
            StateField::Tuner => StateValue::Flag(self.tuner),
            StateField::MidiPage => StateValue::Number(i64::from(self.midi_page)),
            StateField::QcPage => StateValue::Number(i64::from(self.qc_page)),
            StateField::ModeSlot => StateValue::Number(i64::from(self.mode_slot)),
            StateField::SceneIdx => StateValue::Number(i64::from(self.scene_idx)),
            StateField::GigViewStyle => StateValue::Style(self.gig_view_style),
            StateField::PowerSource => StateValue::Power(self.power_source),
            StateField::PowerSummary => StateValue::Text(self.power_summary.clone()),
        }
    }

    pub fn flag(&self, field: FlagField) -> bool {
        match field {
            FlagField::GigView => self.gig_view,
            FlagField::Tuner => self.tuner,
        }
    }

    pub fn flag_mut(&mut self, field: FlagField) -> &mut bool {
        match field {
            FlagField::GigView => &mut self.gig_view,
            FlagField::Tuner => &mut self.tuner,
        }
    }

    pub fn page(&self, field: PageField) -> u8 {
        match field {
            PageField::MidiPage => self.midi_page,
            PageField::QcPage => self.qc_page,
        }
    }

    pub fn page_mut(&mut self, field: PageField) -> &mut u8 {
        match field {
            PageField::MidiPage => &mut self.midi_page,
            PageField::QcPage => &mut self.qc_page,
        }
    }

    pub fn mode_name(&self) -> &'static str {
        MODE_NAMES[usize::from(self.mode_slot % MODE_COUNT)]
    }
}

/// Pages are numbered 1 and 2; anything that is not 2 flips to 2.
pub fn opposite_page(page: u8) -> u8 {
    if page == 2 {
        1
    } else {
        2
    }
}
