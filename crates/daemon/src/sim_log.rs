// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable simulation log.
//!
//! Every processed request advances a simulated clock by one second; the
//! events of that request are written under the same `[HH:MM:SS]` stamp.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;
use yard_core::{format_cycle, Event, ResourceKind};

/// Receives every event the coordinator emits, in order
pub trait EventSink: Send {
    fn emit(&mut self, event: &Event);

    fn flush(&mut self) {}
}

/// Discards events
#[derive(Debug, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&mut self, _event: &Event) {}
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: &Event) {
        self.push(event.clone());
    }
}

/// Forwards events to a subscriber; a dropped subscriber is ignored
impl EventSink for mpsc::UnboundedSender<Event> {
    fn emit(&mut self, event: &Event) {
        let _ = self.send(event.clone());
    }
}

/// Sends every event to each inner sink
#[derive(Default)]
pub struct Fanout {
    sinks: Vec<Box<dyn EventSink>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl EventSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for Fanout {
    fn emit(&mut self, event: &Event) {
        for sink in &mut self.sinks {
            sink.emit(event);
        }
    }

    fn flush(&mut self) {
        for sink in &mut self.sinks {
            sink.flush();
        }
    }
}

/// Format simulated seconds as `HH:MM:SS`
pub fn format_sim_time(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    )
}

/// Render one event as a log line body (no timestamp)
pub fn describe(event: &Event) -> String {
    match event {
        Event::RequestReceived {
            client,
            resource,
            command,
        } => format!("TRAIN {}: Sent {} request for {}.", client, command, resource),
        Event::Granted {
            client, resource, ..
        } => format!("SERVER: GRANTED {} to {}.", resource, client),
        Event::Waiting {
            client,
            resource,
            kind,
            ..
        } => {
            let state = match kind {
                ResourceKind::Mutex => "locked",
                ResourceKind::Semaphore => "full",
            };
            format!(
                "SERVER: {} is {}. {} added to wait queue.",
                resource, state, client
            )
        }
        Event::Released { client, resource } => {
            format!("TRAIN {}: Released {}.", client, resource)
        }
        Event::Denied {
            client,
            resource,
            reason,
        } => format!("SERVER: DENIED {} to {} ({}).", resource, client, reason),
        Event::DeadlockDetected { cycle } => {
            format!("SERVER: Deadlock detected! Cycle: {}.", format_cycle(cycle))
        }
        Event::Preempted { victim, resource } => format!(
            "SERVER: Preempting {} from {}. {} released {} forcibly.",
            resource, victim, victim, resource
        ),
        Event::ClientCompleted { client } => format!("TRAIN {}: Completed its route.", client),
        Event::RunComplete { .. } => {
            "SIMULATION COMPLETE. All trains reached destinations.".to_string()
        }
    }
}

/// Writes `[HH:MM:SS] ...` lines to any writer
pub struct SimulationLog<W: Write> {
    writer: W,
    clock: u64,
    failed: bool,
}

impl SimulationLog<BufWriter<File>> {
    /// Create (truncating) a log file
    pub fn create(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> SimulationLog<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            clock: 0,
            failed: false,
        }
    }

    /// Current simulated time in seconds
    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, event: &Event) {
        if self.failed {
            return;
        }
        let line = format!("[{}] {}", format_sim_time(self.clock), describe(event));
        if let Err(e) = writeln!(self.writer, "{}", line) {
            // Disabled after the first failure
            warn!(error = %e, "simulation log write failed, disabling it");
            self.failed = true;
        }
    }
}

impl<W: Write + Send> EventSink for SimulationLog<W> {
    fn emit(&mut self, event: &Event) {
        if matches!(event, Event::RequestReceived { .. }) {
            self.clock += 1;
        }
        self.write_line(event);
    }

    fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            warn!(error = %e, "failed to flush simulation log");
        }
    }
}

/// Run `log` on the blocking pool, fed through the returned sender.
///
/// File writes never happen on the coordinator task. The writer drains until
/// every sender is dropped, flushes, and hands the log back.
pub fn spawn_writer<W>(
    mut log: SimulationLog<W>,
) -> (mpsc::UnboundedSender<Event>, JoinHandle<SimulationLog<W>>)
where
    W: Write + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let handle = tokio::task::spawn_blocking(move || {
        while let Some(event) = rx.blocking_recv() {
            log.emit(&event);
        }
        log.flush();
        log
    });
    (tx, handle)
}
