//! Shared binding-table format describing the compiled profile produced by the builder.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current binding table format version.
pub const BINDINGS_VERSION: u32 = 1;

/// Header stored at the beginning of every compiled binding table.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct TableHeader {
    /// Binding table format version (`BINDINGS_VERSION`).
    pub version: u32,
    /// Hash of the source profile (xxh3).
    pub source_hash: u64,
    /// UNIX timestamp (seconds) when the table was generated.
    pub generated_at: u64,
}

/// Root structure serialized into the compiled table.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct BindingTable {
    pub header: TableHeader,
    pub midi: MidiSettings,
    pub timing: Timing,
    pub probes: ProbeSettings,
    /// Action arena. Switches and pollers refer to entries by index.
    pub actions: Vec<ActionEntry>,
    pub switches: Vec<SwitchEntry>,
    /// Actions that receive `update` every tick without a gesture binding.
    pub pollers: Vec<usize>,
}

impl BindingTable {
    pub fn action_index(&self, id: &str) -> Option<usize> {
        self.actions.iter().position(|entry| entry.id == id)
    }

    pub fn switch_index(&self, id: &str) -> Option<usize> {
        self.switches.iter().position(|entry| entry.id == id)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct MidiSettings {
    /// Zero-based output channel (0 => MIDI channel 1).
    pub channel: u8,
    /// Output port name fragments; every matching port receives each message.
    pub outputs: Vec<String>,
    /// Input port name fragment used for host-side switch emulation.
    pub input: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Timing {
    pub tick_ms: u64,
}

/// Probe locations for the power-sense poller. `None` means the probe is absent.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct ProbeSettings {
    pub battery: Option<String>,
    pub dc: Option<String>,
    pub voltage: Option<String>,
}

/// A compiled action ready for runtime construction.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ActionEntry {
    pub id: String,
    pub channel: u8,
    pub use_leds: bool,
    pub enabled_when: Predicate,
    pub behavior: ActionBehavior,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct SwitchEntry {
    pub id: String,
    /// Note number used by the host input emulation.
    pub note: Option<u8>,
    pub hold_ms: u64,
    /// Present when the switch has double-click candidates.
    pub double_click_ms: Option<u64>,
    pub short: Vec<usize>,
    pub hold: Vec<usize>,
    pub double: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub enum ActionBehavior {
    ToggleCc {
        field: FlagField,
        cc: u8,
        text: String,
        color_on: Color,
        color_off: Color,
        brightness: f32,
    },
    PageSwap {
        field: PageField,
        send_swap: bool,
        label_prefix: String,
        split_led: bool,
        brightness: f32,
    },
    PageSlot {
        slot: u8,
        opposite: bool,
        page_source: PageField,
        brightness: f32,
    },
    ModeCycle {
        cc: u8,
        named: bool,
    },
    StyleToggle,
    SceneStep {
        step: i8,
        modulus: u8,
        cc: u8,
        color: Color,
        brightness: f32,
    },
    FixedCc {
        cc: u8,
        value: u8,
        text: String,
        color: Color,
        brightness: f32,
    },
    PowerSense {
        poll_ms: u64,
    },
}

/// Named fields of the controller state record.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum StateField {
    GigView,
    Tuner,
    MidiPage,
    QcPage,
    ModeSlot,
    SceneIdx,
    GigViewStyle,
    PowerSource,
    PowerSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Flag,
    Number,
    Style,
    Power,
    Text,
}

impl StateField {
    pub const ALL: [StateField; 9] = [
        StateField::GigView,
        StateField::Tuner,
        StateField::MidiPage,
        StateField::QcPage,
        StateField::ModeSlot,
        StateField::SceneIdx,
        StateField::GigViewStyle,
        StateField::PowerSource,
        StateField::PowerSummary,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StateField::GigView => "gig_view",
            StateField::Tuner => "tuner",
            StateField::MidiPage => "midi_page",
            StateField::QcPage => "qc_page",
            StateField::ModeSlot => "mode_slot",
            StateField::SceneIdx => "scene_idx",
            StateField::GigViewStyle => "gig_view_style",
            StateField::PowerSource => "power_source",
            StateField::PowerSummary => "power_summary",
        }
    }

    pub fn kind(self) -> ValueKind {
        match self {
            StateField::GigView | StateField::Tuner => ValueKind::Flag,
            StateField::MidiPage
            | StateField::QcPage
            | StateField::ModeSlot
            | StateField::SceneIdx => ValueKind::Number,
            StateField::GigViewStyle => ValueKind::Style,
            StateField::PowerSource => ValueKind::Power,
            StateField::PowerSummary => ValueKind::Text,
        }
    }
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Boolean state fields an action may toggle.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum FlagField {
    GigView,
    Tuner,
}

/// Two-valued page fields (1 or 2).
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum PageField {
    #[serde(alias = "midi")]
    MidiPage,
    #[serde(alias = "qc")]
    QcPage,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewStyle {
    /// Short press targets the current remote page, hold the opposite one.
    #[default]
    ShortCurrent,
    ShortOpposite,
}

impl ViewStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewStyle::ShortCurrent => "short_current",
            ViewStyle::ShortOpposite => "short_opposite",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "short_current" => Some(ViewStyle::ShortCurrent),
            "short_opposite" => Some(ViewStyle::ShortOpposite),
            _ => None,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            ViewStyle::ShortCurrent => ViewStyle::ShortOpposite,
            ViewStyle::ShortOpposite => ViewStyle::ShortCurrent,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum PowerSource {
    #[default]
    Unknown,
    UsbOrDc,
    Battery,
    Dc,
}

impl PowerSource {
    pub fn as_str(self) -> &'static str {
        match self {
            PowerSource::Unknown => "unknown",
            PowerSource::UsbOrDc => "usb_or_dc",
            PowerSource::Battery => "battery",
            PowerSource::Dc => "dc",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "unknown" => Some(PowerSource::Unknown),
            "usb_or_dc" => Some(PowerSource::UsbOrDc),
            "battery" => Some(PowerSource::Battery),
            "dc" => Some(PowerSource::Dc),
            _ => None,
        }
    }

    /// Short label shown on the status line.
    pub fn label(self) -> &'static str {
        match self {
            PowerSource::Unknown => "?",
            PowerSource::UsbOrDc => "USB/DC",
            PowerSource::Battery => "BAT",
            PowerSource::Dc => "DC",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub enum StateValue {
    Flag(bool),
    Number(i64),
    Style(ViewStyle),
    Power(PowerSource),
    Text(String),
}

impl StateValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            StateValue::Flag(_) => ValueKind::Flag,
            StateValue::Number(_) => ValueKind::Number,
            StateValue::Style(_) => ValueKind::Style,
            StateValue::Power(_) => ValueKind::Power,
            StateValue::Text(_) => ValueKind::Text,
        }
    }
}

/// Enablement predicate evaluated against a state snapshot.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub enum Predicate {
    #[default]
    Always,
    Equals {
        field: StateField,
        value: StateValue,
    },
    Not(Box<Predicate>),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const DARK_YELLOW: Color = Color::rgb(120, 120, 0);
    pub const ORANGE: Color = Color::rgb(255, 130, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const LIGHT_RED: Color = Color::rgb(255, 100, 100);
    pub const PINK: Color = Color::rgb(255, 105, 180);
    pub const PURPLE: Color = Color::rgb(180, 0, 255);
    pub const DARK_PURPLE: Color = Color::rgb(70, 0, 100);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const DARK_BLUE: Color = Color::rgb(0, 0, 110);
    pub const LIGHT_BLUE: Color = Color::rgb(100, 160, 255);
    pub const TURQUOISE: Color = Color::rgb(64, 242, 208);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const DARK_GREEN: Color = Color::rgb(0, 100, 0);
    pub const LIGHT_GREEN: Color = Color::rgb(120, 255, 120);
    pub const GRAY: Color = Color::rgb(190, 190, 190);
    pub const DARK_GRAY: Color = Color::rgb(50, 50, 50);
}

/// Palette names accepted in profiles.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    White,
    Yellow,
    DarkYellow,
    Orange,
    Red,
    LightRed,
    Pink,
    Purple,
    DarkPurple,
    Blue,
    DarkBlue,
    LightBlue,
    Turquoise,
    Green,
    DarkGreen,
    LightGreen,
    Gray,
    DarkGray,
}

impl NamedColor {
    pub fn color(self) -> Color {
        match self {
            NamedColor::Black => Color::BLACK,
            NamedColor::White => Color::WHITE,
            NamedColor::Yellow => Color::YELLOW,
            NamedColor::DarkYellow => Color::DARK_YELLOW,
            NamedColor::Orange => Color::ORANGE,
            NamedColor::Red => Color::RED,
            NamedColor::LightRed => Color::LIGHT_RED,
            NamedColor::Pink => Color::PINK,
            NamedColor::Purple => Color::PURPLE,
            NamedColor::DarkPurple => Color::DARK_PURPLE,
            NamedColor::Blue => Color::BLUE,
            NamedColor::DarkBlue => Color::DARK_BLUE,
            NamedColor::LightBlue => Color::LIGHT_BLUE,
            NamedColor::Turquoise => Color::TURQUOISE,
            NamedColor::Green => Color::GREEN,
            NamedColor::DarkGreen => Color::DARK_GREEN,
            NamedColor::LightGreen => Color::LIGHT_GREEN,
            NamedColor::Gray => Color::GRAY,
            NamedColor::DarkGray => Color::DARK_GRAY,
        }
    }
}
