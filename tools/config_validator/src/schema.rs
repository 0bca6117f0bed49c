use std::collections::BTreeMap;

use binding_format::{
    Color, FlagField, NamedColor, PageField, PowerSource, StateField, StateValue, ValueKind,
    ViewStyle,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    #[serde(default)]
    pub midi: Midi,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub probes: Option<Probes>,
    #[serde(default)]
    pub actions: BTreeMap<String, Action>,
    #[serde(default)]
    pub switches: Vec<Switch>,
    #[serde(default)]
    pub pollers: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Midi {
    /// Zero-based: 0 => MIDI channel 1.
    #[serde(default)]
    pub channel: u8,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub input: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Timing {
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,
    #[serde(default = "default_double_click_ms")]
    pub double_click_ms: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            hold_ms: default_hold_ms(),
            double_click_ms: default_double_click_ms(),
            tick_ms: default_tick_ms(),
        }
    }
}

fn default_hold_ms() -> u64 {
    600
}

fn default_double_click_ms() -> u64 {
    700
}

fn default_tick_ms() -> u64 {
    10
}

#[derive(Debug, Deserialize, Default)]
pub struct Probes {
    #[serde(default)]
    pub battery: Option<String>,
    #[serde(default)]
    pub dc: Option<String>,
    #[serde(default)]
    pub voltage: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Switch {
    pub id: String,
    #[serde(default)]
    pub note: Option<u8>,
    #[serde(default)]
    pub hold_ms: Option<u64>,
    #[serde(default)]
    pub double_click_ms: Option<u64>,
    #[serde(default)]
    pub short: Vec<String>,
    #[serde(default)]
    pub hold: Vec<String>,
    #[serde(default)]
    pub double: Vec<String>,
}

impl Switch {
    /// Gesture lists paired with their profile key.
    pub fn gesture_lists(&self) -> [(&'static str, &[String]); 3] {
        [
            ("short", self.short.as_slice()),
            ("hold", self.hold.as_slice()),
            ("double", self.double.as_slice()),
        ]
    }
}

#[derive(Debug, Deserialize)]
pub struct Action {
    #[serde(flatten)]
    pub kind: ActionKind,
    #[serde(default)]
    pub enabled_when: Option<PredicateDef>,
    #[serde(default)]
    pub channel: Option<u8>,
    #[serde(default = "default_true")]
    pub use_leds: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    ToggleCc {
        field: FlagField,
        cc: u8,
        #[serde(default)]
        text: String,
        #[serde(default = "default_color_on")]
        color_on: ColorDef,
        #[serde(default = "default_color_off")]
        color_off: ColorDef,
        #[serde(default = "default_brightness")]
        brightness: f32,
    },
    PageSwap {
        #[serde(default = "default_page_field")]
        field: PageField,
        #[serde(default = "default_true")]
        send_swap: bool,
        #[serde(default = "default_page_prefix")]
        label_prefix: String,
        #[serde(default)]
        split_led: bool,
        #[serde(default = "default_page_brightness")]
        brightness: f32,
    },
    PageSlot {
        slot: u8,
        #[serde(default)]
        opposite: bool,
        #[serde(default = "default_page_field")]
        page_source: PageField,
        #[serde(default = "default_brightness")]
        brightness: f32,
    },
    ModeCycle {
        #[serde(default = "default_mode_cc")]
        cc: u8,
        #[serde(default)]
        named: bool,
    },
    StyleToggle,
    SceneStep {
        step: i8,
        #[serde(default = "default_scene_modulus")]
        modulus: u8,
        #[serde(default = "default_scene_cc")]
        cc: u8,
        #[serde(default = "default_scene_color")]
        color: ColorDef,
        #[serde(default = "default_brightness")]
        brightness: f32,
    },
    FixedCc {
        cc: u8,
        #[serde(default = "default_fixed_value")]
        value: u8,
        #[serde(default)]
        text: String,
        #[serde(default = "default_fixed_color")]
        color: ColorDef,
        #[serde(default = "default_brightness")]
        brightness: f32,
    },
    PowerSense {
        #[serde(default = "default_poll_ms")]
        poll_ms: u64,
    },
}

impl ActionKind {
    pub fn is_poller(&self) -> bool {
        matches!(self, ActionKind::PowerSense { .. })
    }
}

fn default_true() -> bool {
    true
}

fn default_brightness() -> f32 {
    0.3
}

fn default_page_brightness() -> f32 {
    0.25
}

fn default_color_on() -> ColorDef {
    ColorDef::Named(NamedColor::Green)
}

fn default_color_off() -> ColorDef {
    ColorDef::Named(NamedColor::Red)
}

fn default_page_field() -> PageField {
    PageField::QcPage
}

fn default_page_prefix() -> String {
    "PG".into()
}

fn default_mode_cc() -> u8 {
    47
}

fn default_scene_modulus() -> u8 {
    8
}

fn default_scene_cc() -> u8 {
    43
}

fn default_scene_color() -> ColorDef {
    ColorDef::Named(NamedColor::LightGreen)
}

fn default_fixed_value() -> u8 {
    127
}

fn default_fixed_color() -> ColorDef {
    ColorDef::Named(NamedColor::Turquoise)
}

fn default_poll_ms() -> u64 {
    5000
}

/// Palette name or explicit `[r, g, b]` triple.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(untagged)]
pub enum ColorDef {
    Named(NamedColor),
    Rgb([u8; 3]),
}

impl ColorDef {
    pub fn resolve(self) -> Color {
        match self {
            ColorDef::Named(name) => name.color(),
            ColorDef::Rgb([r, g, b]) => Color::rgb(r, g, b),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PredicateDef {
    Equals { field: StateField, equals: ValueDef },
    Not { not: Box<PredicateDef> },
    All { all: Vec<PredicateDef> },
    Any { any: Vec<PredicateDef> },
}

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum ValueDef {
    Flag(bool),
    Number(i64),
    Word(String),
}

impl ValueDef {
    /// Interprets the raw YAML value against the kind of `field`.
    pub fn resolve(&self, field: StateField) -> Result<StateValue, String> {
        match (field.kind(), self) {
            (ValueKind::Flag, ValueDef::Flag(flag)) => Ok(StateValue::Flag(*flag)),
            (ValueKind::Number, ValueDef::Number(n)) => Ok(StateValue::Number(*n)),
            (ValueKind::Style, ValueDef::Word(word)) => ViewStyle::from_name(word)
                .map(StateValue::Style)
                .ok_or_else(|| format!("`{word}` is not a view style for `{field}`")),
            (ValueKind::Power, ValueDef::Word(word)) => PowerSource::from_name(word)
                .map(StateValue::Power)
                .ok_or_else(|| format!("`{word}` is not a power source for `{field}`")),
            (ValueKind::Text, ValueDef::Word(word)) => Ok(StateValue::Text(word.clone())),
            (kind, value) => Err(format!(
                "Field `{field}` holds {} values but the predicate compares against {value:?}",
                kind_name(kind)
            )),
        }
    }
}

fn kind_name(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Flag => "boolean",
        ValueKind::Number => "numeric",
        ValueKind::Style => "view style",
        ValueKind::Power => "power source",
        ValueKind::Text => "text",
    }
}
