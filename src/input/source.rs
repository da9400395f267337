//! Channel-backed input source.
//!
//! A reader thread turns text into [`InputEvent`]s and pushes them through a
//! bounded crossbeam channel, so the monitor loop can wait on events and
//! periodic housekeeping at the same time. When the text ends the thread
//! sends [`InputEvent::EndOfSession`] and drops its sender, which the
//! receiving side observes as a disconnect.

use crate::input::types::InputEvent;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use thiserror::Error;

/// How text is turned into events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMode {
    /// One event per character, as a keyboard would deliver them
    #[default]
    Keys,
    /// One bulk commit per line
    Commit,
}

/// Configuration for a text source.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub mode: KeyMode,
    /// Channel capacity; the reader blocks when the monitor falls behind
    pub capacity: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode: KeyMode::Keys,
            capacity: 10_000,
        }
    }
}

/// Errors that can occur when starting a source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source has already been started")]
    AlreadyStarted,
    #[error("could not spawn reader thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Reads text on a background thread and emits input events.
pub struct TextSource {
    config: SourceConfig,
    sender: Option<Sender<InputEvent>>,
    receiver: Receiver<InputEvent>,
    running: Arc<AtomicBool>,
}

impl TextSource {
    /// Create a new source. Nothing is read until [`TextSource::start`].
    pub fn new(config: SourceConfig) -> Self {
        let (sender, receiver) = bounded(config.capacity.max(1));
        Self {
            config,
            sender: Some(sender),
            receiver,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start reading from `reader` on a background thread.
    ///
    /// A source reads exactly one stream; starting it twice fails.
    pub fn start<R>(&mut self, reader: R) -> Result<(), SourceError>
    where
        R: BufRead + Send + 'static,
    {
        let sender = self.sender.take().ok_or(SourceError::AlreadyStarted)?;
        let running = self.running.clone();
        let mode = self.config.mode;

        running.store(true, Ordering::SeqCst);
        let spawned = thread::Builder::new()
            .name("guardian-input".into())
            .spawn(move || read_events(reader, mode, &sender, &running));

        if let Err(e) = spawned {
            self.running.store(false, Ordering::SeqCst);
            return Err(SourceError::Spawn(e));
        }
        Ok(())
    }

    /// Stop reading. Text not yet read is discarded.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Check if the reader thread is still producing events.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for input events.
    pub fn receiver(&self) -> &Receiver<InputEvent> {
        &self.receiver
    }

    /// Try to receive an event without blocking.
    pub fn try_recv(&self) -> Option<InputEvent> {
        self.receiver.try_recv().ok()
    }
}

fn read_events<R: BufRead>(
    reader: R,
    mode: KeyMode,
    sender: &Sender<InputEvent>,
    running: &AtomicBool,
) {
    for line in reader.lines() {
        if !running.load(Ordering::SeqCst) {
            return;
        }

        let mut line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Input read failed, ending session");
                break;
            }
        };
        line.push('\n');

        let events = match mode {
            KeyMode::Keys => InputEvent::from_keys(&line),
            KeyMode::Commit => vec![InputEvent::Commit(line)],
        };
        for event in events {
            if sender.send(event).is_err() {
                running.store(false, Ordering::SeqCst);
                return;
            }
        }
    }

    let _ = sender.send(InputEvent::EndOfSession);
    running.store(false, Ordering::SeqCst);
}
