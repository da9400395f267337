//! Per-session monitor.
//!
//! Wires the pipeline together:
//!
//! ```text
//! InputEvent ──▶ Tokenizer ──▶ word ──▶ Matcher ──▶ delta ──▶ SessionState
//!                                                                 │ crossing
//!                                        ┌────────────────────────┤
//!                                        ▼                        ▼
//!                                   AlertSink              BlockingSurface
//!                                                                 │ dismissed
//!                         ResetSignal ◀───────────────────────────┘
//! ```
//!
//! All processing is synchronous and driven by [`Monitor::handle`]. A pending
//! reset is consumed before each event is applied, so a reset that lands in
//! the middle of a word clears the score without touching the buffer.

use crate::alert::{AlertSignal, AlertSink, BlockingSurface, LogAlertSink, NoopSurface};
use crate::config::Config;
use crate::core::{matcher, Lexicon, Phase, SessionState, Tokenizer};
use crate::input::InputEvent;
use crate::signal::{AtomicResetFlag, ResetSignal, SharedResetSignal};
use crate::transparency::{create_shared_log, SharedTransparencyLog};
use std::sync::Arc;

/// Owns the tokenizer, lexicon snapshot, configuration and running score of
/// one monitoring session.
pub struct Monitor {
    config: Config,
    lexicon: Lexicon,
    tokenizer: Tokenizer,
    session: SessionState,
    reset: SharedResetSignal,
    alert_sink: Box<dyn AlertSink>,
    surface: Box<dyn BlockingSurface>,
    log: SharedTransparencyLog,
}

impl Monitor {
    /// Create a monitor with an in-process reset flag, a logging alert sink
    /// and no blocking surface.
    pub fn new(config: Config, lexicon: Lexicon) -> Self {
        let session = SessionState::new(config.threshold);
        Self {
            config,
            lexicon,
            tokenizer: Tokenizer::new(),
            session,
            reset: Arc::new(AtomicResetFlag::new()),
            alert_sink: Box::new(LogAlertSink),
            surface: Box::new(NoopSurface),
            log: create_shared_log(),
        }
    }

    pub fn with_alert_sink(mut self, sink: impl AlertSink + 'static) -> Self {
        self.alert_sink = Box::new(sink);
        self
    }

    pub fn with_surface(mut self, surface: impl BlockingSurface + 'static) -> Self {
        self.surface = Box::new(surface);
        self
    }

    pub fn with_reset_signal(mut self, reset: SharedResetSignal) -> Self {
        self.reset = reset;
        self
    }

    pub fn with_transparency_log(mut self, log: SharedTransparencyLog) -> Self {
        self.log = log;
        self
    }

    /// Apply one input event, returning the alerts it caused.
    pub fn handle(&mut self, event: &InputEvent) -> Vec<AlertSignal> {
        self.poll_reset();
        self.log.record_event();

        self.tokenizer
            .feed(event)
            .into_iter()
            .filter_map(|word| self.process_word(&word))
            .collect()
    }

    /// Apply a sequence of events in order.
    pub fn handle_all<'a, I>(&mut self, events: I) -> Vec<AlertSignal>
    where
        I: IntoIterator<Item = &'a InputEvent>,
    {
        events
            .into_iter()
            .flat_map(|event| self.handle(event))
            .collect()
    }

    /// Score a completed word and drive the state machine.
    pub fn process_word(&mut self, word: &str) -> Option<AlertSignal> {
        let delta = matcher::score(word, &self.lexicon);
        self.log.record_word(delta > 0);
        tracing::trace!(word, delta, "Word scored");

        if delta > 0 {
            tracing::debug!(
                delta,
                score = self.session.running_score().saturating_add(delta),
                threshold = self.session.threshold(),
                "Score updated"
            );
        }

        let alert = self.session.on_word_scored(delta)?;
        self.fire(&alert);
        Some(alert)
    }

    /// Consume a pending external reset, if any.
    pub fn poll_reset(&mut self) -> bool {
        if self.reset.consume_reset_if_pending() {
            self.session.on_external_reset();
            self.log.record_reset();
            true
        } else {
            false
        }
    }

    /// Replace threshold, alert destination and unlock secret.
    ///
    /// The running score and phase are left as they are.
    pub fn reload_config(&mut self, config: Config) {
        self.session.on_config_reload(config.threshold);
        self.config = config;
    }

    /// Replace the lexicon snapshot used for subsequent words.
    pub fn reload_lexicon(&mut self, lexicon: Lexicon) {
        tracing::info!(categories = lexicon.len(), "Lexicon reloaded");
        self.lexicon = lexicon;
    }

    /// Begin a new input session on the same monitor.
    ///
    /// Any pending reset is applied and the in-progress word is discarded.
    /// The running score carries over, as it belongs to the monitor rather
    /// than to a single text field.
    pub fn start_session(&mut self) {
        self.poll_reset();
        self.tokenizer.clear();
        self.session.renew_id();
    }

    pub fn score(&self) -> u32 {
        self.session.running_score()
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    /// The in-progress word.
    pub fn buffer(&self) -> &str {
        self.tokenizer.buffer()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Handle for collaborators that need to raise a reset.
    pub fn reset_signal(&self) -> SharedResetSignal {
        self.reset.clone()
    }

    pub fn transparency(&self) -> &SharedTransparencyLog {
        &self.log
    }

    fn fire(&mut self, alert: &AlertSignal) {
        self.log.record_alert();

        match self.config.alert_destination.as_deref() {
            Some(destination) => {
                if let Err(e) = self.alert_sink.dispatch(destination, alert) {
                    tracing::warn!(error = %e, "Alert dispatch failed");
                    self.log.record_dispatch_failure();
                }
            }
            None => tracing::warn!("No alert destination configured, skipping dispatch"),
        }

        self.surface.present(self.config.unlock_gate(), alert);
        self.session.on_alert_fired();
    }
}
