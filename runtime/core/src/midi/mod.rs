//! MIDI message types and the output seam actions send through.

pub mod input;
pub mod output;

pub use input::{decode_switch_edge, spawn_midi_listener, MidiHandle, SwitchEdge};
pub use output::{open_outputs, MidirSink, RoutedSink};

const CONTROL_CHANGE: u8 = 0xB0;

/// A three byte Control Change frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlChange {
    pub channel: u8,
    pub controller: u8,
    pub value: u8,
}

impl ControlChange {
    /// Channel is masked to its low nibble, controller and value to 7 bits.
    pub fn new(channel: u8, controller: u8, value: u8) -> Self {
        Self {
            channel: channel & 0x0F,
            controller: controller & 0x7F,
            value: value & 0x7F,
        }
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [CONTROL_CHANGE | self.channel, self.controller, self.value]
    }
}

/// Fire-and-forget sink for Control Change messages.
pub trait OutputSink {
    fn send(&mut self, channel: u8, controller: u8, value: u8);

    fn send_cc(&mut self, message: ControlChange) {
        self.send(message.channel, message.controller, message.value);
    }
}

/// Keeps every frame it was handed.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub frames: Vec<[u8; 3]>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<[u8; 3]> {
        std::mem::take(&mut self.frames)
    }
}

impl OutputSink for RecordingSink {
    fn send(&mut self, channel: u8, controller: u8, value: u8) {
        self.frames
            .push(ControlChange::new(channel, controller, value).to_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_carry_channel_in_status_byte() {
        assert_eq!(ControlChange::new(0, 64, 0).to_bytes(), [0xB0, 64, 0]);
        assert_eq!(ControlChange::new(3, 45, 127).to_bytes(), [0xB3, 45, 127]);
        assert_eq!(ControlChange::new(0x13, 200, 255).to_bytes(), [0xB3, 72, 127]);
    }

    #[test]
    fn recording_sink_keeps_order() {
        let mut sink = RecordingSink::new();
        sink.send(0, 35, 127);
        sink.send_cc(ControlChange::new(0, 64, 0));
        assert_eq!(sink.take(), vec![[0xB0, 35, 127], [0xB0, 64, 0]]);
        assert!(sink.frames.is_empty());
    }
}
