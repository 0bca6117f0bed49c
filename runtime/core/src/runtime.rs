use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::app::{AppState, AppStateError};
use crate::dispatch::Dispatcher;
use crate::midi::input::{spawn_midi_listener, MidiHandle, SwitchEdge};
use crate::midi::output::{open_outputs, RoutedSink};
use crate::midi::OutputSink;
use crate::panel::Panel;
use crate::probe::{FileProbes, ProbeProvider};

pub const CLIENT_NAME: &str = "footswitch";
const EDGE_QUEUE: usize = 64;
/// Pending levels kept per switch.
const LATCH_DEPTH: usize = 8;

#[derive(thiserror::Error, Debug)]
pub enum RuntimeManagerError {
    #[error("app state error: {0}")]
    App(#[from] AppStateError),
    #[error("midi error: {0}")]
    Midi(anyhow::Error),
}

/// Queues level changes so each switch moves at most one level per tick.
///
/// Repeats of the last queued level are ignored. A full queue drops the newest
/// press/release pair, so the final level always matches the last edge.
#[derive(Debug, Clone, Default)]
pub struct InputLatch {
    levels: Vec<bool>,
    queued: Vec<VecDeque<bool>>,
}

impl InputLatch {
    pub fn new(switches: usize) -> Self {
        Self {
            levels: vec![false; switches],
            queued: vec![VecDeque::new(); switches],
        }
    }

    pub fn push(&mut self, edge: SwitchEdge) {
        let (Some(queue), Some(&level)) =
            (self.queued.get_mut(edge.switch), self.levels.get(edge.switch))
        else {
            debug!(switch = edge.switch, "edge for unknown switch ignored");
            return;
        };
        if queue.back().copied().unwrap_or(level) == edge.pressed {
            return;
        }
        if queue.len() >= LATCH_DEPTH {
            queue.pop_back();
            debug!(switch = edge.switch, "latch full; press/release pair dropped");
        } else {
            queue.push_back(edge.pressed);
        }
    }

    /// Applies at most one queued level per switch and returns the levels to sample.
    pub fn advance(&mut self) -> &[bool] {
        for (level, queue) in self.levels.iter_mut().zip(&mut self.queued) {
            if let Some(next) = queue.pop_front() {
                *level = next;
            }
        }
        &self.levels
    }

    pub fn levels(&self) -> &[bool] {
        &self.levels
    }
}

/// Owns the dispatcher and drives it from one task; nothing here is shared.
pub struct RuntimeManager<S: OutputSink = RoutedSink> {
    pub app: AppState,
    pub dispatcher: Dispatcher,
    pub panel: Panel,
    sink: S,
    latch: InputLatch,
    edges_tx: mpsc::Sender<SwitchEdge>,
    edges_rx: mpsc::Receiver<SwitchEdge>,
    tick: Duration,
    midi_input: Option<MidiHandle>,
}

impl RuntimeManager<RoutedSink> {
    /// Loads the profile and opens MIDI ports and probes named in it.
    pub fn initialize(profile_path: PathBuf) -> Result<Self, RuntimeManagerError> {
        let app = AppState::initialize(profile_path)?;
        let table = app.table();
        let sink = open_outputs(CLIENT_NAME, &table.midi.outputs);
        if sink.is_empty() {
            warn!("no MIDI outputs connected; control changes will only be logged");
        }
        let mut probes = FileProbes::new(table.probes.clone());
        let notes: HashMap<u8, usize> = table
            .switches
            .iter()
            .enumerate()
            .filter_map(|(index, switch)| switch.note.map(|note| (note, index)))
            .collect();
        let input_port = table.midi.input.clone();

        let mut manager = Self::with_io(app, sink, &mut probes);
        manager.midi_input = open_input(input_port.as_deref(), notes, manager.edge_sender())?;
        Ok(manager)
    }
}

/// Connects the configured input port. Without one the runtime only ticks.
fn open_input(
    port: Option<&str>,
    notes: HashMap<u8, usize>,
    sender: mpsc::Sender<SwitchEdge>,
) -> Result<Option<MidiHandle>, RuntimeManagerError> {
    let Some(port) = port else {
        info!("no MIDI input configured; switch edges will not arrive");
        return Ok(None);
    };
    spawn_midi_listener(CLIENT_NAME, port, notes, sender)
        .map(Some)
        .map_err(RuntimeManagerError::Midi)
}

impl<S: OutputSink> RuntimeManager<S> {
    /// Builds the runtime around caller supplied output and probes and runs the startup refresh.
    pub fn with_io(app: AppState, sink: S, probes: &mut dyn ProbeProvider) -> Self {
        let table = app.table();
        let dispatcher = Dispatcher::from_table(table, probes);
        let mut panel = Panel::new(table.switches.iter().map(|switch| switch.id.clone()));
        let tick = Duration::from_millis(table.timing.tick_ms.max(1));
        let (edges_tx, edges_rx) = mpsc::channel(EDGE_QUEUE);

        dispatcher.refresh(&mut panel);
        panel.log_changes();

        Self {
            latch: InputLatch::new(dispatcher.switch_count()),
            app,
            dispatcher,
            panel,
            sink,
            edges_tx,
            edges_rx,
            tick,
            midi_input: None,
        }
    }

    pub fn edge_sender(&self) -> mpsc::Sender<SwitchEdge> {
        self.edges_tx.clone()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick
    }

    /// Drains queued edges into the latch without waiting.
    pub fn drain_edges(&mut self) {
        while let Ok(edge) = self.edges_rx.try_recv() {
            self.latch.push(edge);
        }
    }

    /// One dispatcher tick at `now`. Returns true when feedback was refreshed.
    pub fn tick_once(&mut self, now: Instant) -> bool {
        let pressed = self.latch.advance();
        let refreshed = self
            .dispatcher
            .tick(now, pressed, &mut self.sink, &mut self.panel);
        if refreshed {
            self.panel.log_changes();
        }
        refreshed
    }

    /// Runs the tick loop until `shutdown` resolves.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);
        info!(
            tick_ms = self.tick.as_millis() as u64,
            input = ?self.midi_input.as_ref().map(MidiHandle::port_name),
            "runtime started"
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                Some(edge) = self.edges_rx.recv() => self.latch.push(edge),
                _ = interval.tick() => {
                    self.drain_edges();
                    self.tick_once(Instant::now());
                }
            }
        }
        info!("runtime stopped");
    }

    pub fn shutdown(self) {
        drop(self.midi_input);
    }
}
