use anyhow::anyhow;
use midir::{MidiOutput, MidiOutputConnection};
use tracing::{debug, info, warn};

use super::{ControlChange, OutputSink};

/// One connected midir output port.
pub struct MidirSink {
    port_name: String,
    connection: MidiOutputConnection,
}

impl MidirSink {
    /// Connects to the first output port whose name contains `fragment`.
    pub fn connect(client_name: &str, fragment: &str) -> anyhow::Result<Self> {
        let output = MidiOutput::new(client_name)?;
        let needle = fragment.to_lowercase();
        let port = output
            .ports()
            .into_iter()
            .find(|port| {
                output
                    .port_name(port)
                    .map(|name| name.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .ok_or_else(|| anyhow!("No MIDI output port matches `{fragment}`"))?;
        let port_name = output.port_name(&port)?;
        let connection = output
            .connect(&port, client_name)
            .map_err(|err| anyhow!("Failed to open MIDI output `{port_name}`: {err}"))?;
        Ok(Self {
            port_name,
            connection,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl OutputSink for MidirSink {
    fn send(&mut self, channel: u8, controller: u8, value: u8) {
        let frame = ControlChange::new(channel, controller, value).to_bytes();
        if let Err(err) = self.connection.send(&frame) {
            warn!(port = %self.port_name, ?frame, "MIDI send failed: {err}");
        }
    }
}

/// Fans every message out to all attached routes.
#[derive(Default)]
pub struct RoutedSink {
    routes: Vec<Box<dyn OutputSink>>,
}

impl RoutedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, route: Box<dyn OutputSink>) {
        self.routes.push(route);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl OutputSink for RoutedSink {
    fn send(&mut self, channel: u8, controller: u8, value: u8) {
        if self.routes.is_empty() {
            debug!(channel, controller, value, "control change with no routes");
            return;
        }
        for route in &mut self.routes {
            route.send(channel, controller, value);
        }
    }
}

/// Opens one route per configured port fragment. Missing ports are skipped.
pub fn open_outputs(client_name: &str, fragments: &[String]) -> RoutedSink {
    let mut sink = RoutedSink::new();
    for fragment in fragments {
        match MidirSink::connect(client_name, fragment) {
            Ok(route) => {
                info!(port = route.port_name(), "MIDI output connected");
                sink.push(Box::new(route));
            }
            Err(err) => warn!(fragment = %fragment, "MIDI output unavailable: {err}"),
        }
    }
    sink
}

/// Names of the output ports midir can currently see.
pub fn list_output_ports(client_name: &str) -> anyhow::Result<Vec<String>> {
    let output = MidiOutput::new(client_name)?;
    let names = output
        .ports()
        .iter()
        .filter_map(|port| output.port_name(port).ok())
        .collect();
    Ok(names)
}
