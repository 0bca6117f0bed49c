use std::collections::HashMap;

use anyhow::anyhow;
use midir::{Ignore, MidiInput, MidiInputConnection};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// A level change on one switch, as reported by the input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchEdge {
    pub switch: usize,
    pub pressed: bool,
}

/// Keeps the input connection open until dropped.
pub struct MidiHandle {
    port_name: String,
    _connection: MidiInputConnection<()>,
}

impl MidiHandle {
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

/// Maps note on/off messages for bound notes onto switch edges.
///
/// Note on with velocity 0 counts as a release.
pub fn decode_switch_edge(message: &[u8], notes: &HashMap<u8, usize>) -> Option<SwitchEdge> {
    let [status, note, velocity, ..] = *message else {
        return None;
    };
    let pressed = match status & 0xF0 {
        0x90 => velocity > 0,
        0x80 => false,
        _ => return None,
    };
    notes
        .get(&note)
        .map(|&switch| SwitchEdge { switch, pressed })
}

/// Connects to the input port whose name contains `port_fragment`, ignoring case.
pub fn spawn_midi_listener<T: Into<String>>(
    client_name: T,
    port_fragment: &str,
    notes: HashMap<u8, usize>,
    sender: mpsc::Sender<SwitchEdge>,
) -> anyhow::Result<MidiHandle> {
    let client_name = client_name.into();
    let mut input = MidiInput::new(client_name.as_str())?;
    input.ignore(Ignore::All);

    let ports = input.ports();
    if ports.is_empty() {
        anyhow::bail!("No MIDI input ports available");
    }
    let needle = port_fragment.to_lowercase();
    let port = ports
        .iter()
        .find(|port| {
            input
                .port_name(port)
                .map(|name| name.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .cloned()
        .ok_or_else(|| anyhow!("No MIDI input port matches `{port_fragment}`"))?;
    let port_name = input.port_name(&port)?;

    let connection = input
        .connect(
            &port,
            client_name.as_str(),
            move |_, message, _| {
                if let Some(edge) = decode_switch_edge(message, &notes) {
                    if sender.try_send(edge).is_err() {
                        warn!(?edge, "switch edge dropped; runtime is not keeping up");
                    }
                }
            },
            (),
        )
        .map_err(|err| anyhow!("Failed to open MIDI input `{port_name}`: {err}"))?;
    info!(port = %port_name, "MIDI input connected");

    Ok(MidiHandle {
        port_name,
        _connection: connection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes() -> HashMap<u8, usize> {
        HashMap::from([(60, 0), (65, 5)])
    }

    #[test]
    fn note_on_and_off_become_edges() {
        let notes = notes();
        assert_eq!(
            decode_switch_edge(&[0x90, 60, 100], &notes),
            Some(SwitchEdge {
                switch: 0,
                pressed: true
            })
        );
        assert_eq!(
            decode_switch_edge(&[0x80, 65, 64], &notes),
            Some(SwitchEdge {
                switch: 5,
                pressed: false
            })
        );
        assert_eq!(
            decode_switch_edge(&[0x91, 65, 0], &notes),
            Some(SwitchEdge {
                switch: 5,
                pressed: false
            })
        );
    }

    #[test]
    fn unbound_and_foreign_messages_are_ignored() {
        let notes = notes();
        assert_eq!(decode_switch_edge(&[0x90, 61, 100], &notes), None);
        assert_eq!(decode_switch_edge(&[0xB0, 60, 127], &notes), None);
        assert_eq!(decode_switch_edge(&[0x90, 60], &notes), None);
    }
}
