//! Feedback seams: per-switch label and LED targets plus the surface that owns them.

use binding_format::Color;

#[derive(Debug, Clone, PartialEq)]
pub enum SwitchColor {
    Single(Color),
    /// One color per LED segment of the switch ring.
    Segments(Vec<Color>),
}

/// Display and LED sink for one switch, or for a shared display.
pub trait FeedbackTarget {
    fn set_text(&mut self, text: &str);
    fn set_background_color(&mut self, color: Color);
    fn set_switch_color(&mut self, color: SwitchColor);
    fn set_brightness(&mut self, brightness: f32);
}

/// The set of targets a refresh pass writes into.
pub trait FeedbackSurface {
    fn switch_target(&mut self, switch: usize) -> &mut dyn FeedbackTarget;
    fn status_target(&mut self) -> &mut dyn FeedbackTarget;
    fn main_target(&mut self) -> &mut dyn FeedbackTarget;
}

/// Last written value of every feedback channel of a target.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelState {
    pub text: String,
    pub background: Color,
    pub switch_color: Option<SwitchColor>,
    pub brightness: Option<f32>,
}

impl FeedbackTarget for LabelState {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn set_background_color(&mut self, color: Color) {
        self.background = color;
    }

    fn set_switch_color(&mut self, color: SwitchColor) {
        self.switch_color = Some(color);
    }

    fn set_brightness(&mut self, brightness: f32) {
        self.brightness = Some(brightness);
    }
}

/// Forwards label writes and drops LED writes.
pub struct LabelOnly<'a> {
    inner: &'a mut dyn FeedbackTarget,
}

impl<'a> LabelOnly<'a> {
    pub fn new(inner: &'a mut dyn FeedbackTarget) -> Self {
        Self { inner }
    }
}

impl FeedbackTarget for LabelOnly<'_> {
    fn set_text(&mut self, text: &str) {
        self.inner.set_text(text);
    }

    fn set_background_color(&mut self, color: Color) {
        self.inner.set_background_color(color);
    }

    fn set_switch_color(&mut self, _color: SwitchColor) {}

    fn set_brightness(&mut self, _brightness: f32) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackCall {
    Text(String),
    Background(Color),
    SwitchColor(SwitchColor),
    Brightness(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Switch(usize),
    Status,
    Main,
}

/// Surface that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub calls: Vec<(Display, FeedbackCall)>,
    current: Option<Display>,
    recorder: Recorder,
}

#[derive(Debug, Default)]
struct Recorder {
    pending: Vec<FeedbackCall>,
}

impl FeedbackTarget for Recorder {
    fn set_text(&mut self, text: &str) {
        self.pending.push(FeedbackCall::Text(text.to_string()));
    }

    fn set_background_color(&mut self, color: Color) {
        self.pending.push(FeedbackCall::Background(color));
    }

    fn set_switch_color(&mut self, color: SwitchColor) {
        self.pending.push(FeedbackCall::SwitchColor(color));
    }

    fn set_brightness(&mut self, brightness: f32) {
        self.pending.push(FeedbackCall::Brightness(brightness));
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves buffered calls into `calls` and returns them.
    pub fn take(&mut self) -> Vec<(Display, FeedbackCall)> {
        self.flush();
        std::mem::take(&mut self.calls)
    }

    pub fn calls_for(&mut self, display: Display) -> Vec<FeedbackCall> {
        self.flush();
        self.calls
            .iter()
            .filter(|(d, _)| *d == display)
            .map(|(_, call)| call.clone())
            .collect()
    }

    fn select(&mut self, display: Display) -> &mut dyn FeedbackTarget {
        if self.current != Some(display) {
            self.flush();
            self.current = Some(display);
        }
        &mut self.recorder
    }

    fn flush(&mut self) {
        if let Some(display) = self.current {
            self.calls
                .extend(self.recorder.pending.drain(..).map(|call| (display, call)));
        }
    }
}

impl FeedbackSurface for RecordingSurface {
    fn switch_target(&mut self, switch: usize) -> &mut dyn FeedbackTarget {
        self.select(Display::Switch(switch))
    }

    fn status_target(&mut self) -> &mut dyn FeedbackTarget {
        self.select(Display::Status)
    }

    fn main_target(&mut self) -> &mut dyn FeedbackTarget {
        self.select(Display::Main)
    }
}
