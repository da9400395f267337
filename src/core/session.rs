//! Running-score state machine.
//!
//! ```text
//!            delta > 0             score >= threshold
//!   Idle ───────────────▶ Accumulating ───────────────▶ Alerted
//!    ▲                         │                            │
//!    │       external reset    │      alert fired           │
//!    └─────────────────────────┴────────────────────────────┘
//! ```
//!
//! The score only grows between resets. A crossing emits exactly one
//! [`AlertSignal`]; the caller hands it to the alert channel and then calls
//! [`SessionState::on_alert_fired`], which resets unconditionally.

use crate::alert::AlertSignal;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Phase of a monitoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Score is zero, no alert pending
    Idle,
    /// Score is positive and below the threshold
    Accumulating,
    /// Threshold crossed, alert signaled but not yet fired
    Alerted,
}

/// Running score and phase for one typing session.
#[derive(Debug, Clone)]
pub struct SessionState {
    session_id: Uuid,
    running_score: u32,
    phase: Phase,
    threshold: u32,
}

impl SessionState {
    /// Create an idle session with the given threshold.
    pub fn new(threshold: u32) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            running_score: 0,
            phase: Phase::Idle,
            threshold,
        }
    }

    /// Apply a word's score delta.
    ///
    /// Returns an alert when this delta makes the score reach the threshold
    /// for the first time since the last reset.
    pub fn on_word_scored(&mut self, delta: u32) -> Option<AlertSignal> {
        if delta == 0 {
            return None;
        }

        self.running_score = self.running_score.saturating_add(delta);

        if self.phase == Phase::Alerted {
            return None;
        }

        if self.running_score >= self.threshold {
            self.phase = Phase::Alerted;
            tracing::info!(
                score = self.running_score,
                threshold = self.threshold,
                "Threshold crossed"
            );
            Some(AlertSignal {
                score: self.running_score,
                timestamp: Utc::now(),
                session_id: self.session_id,
            })
        } else {
            self.phase = Phase::Accumulating;
            None
        }
    }

    /// The alert has been handed to the alert channel; start over.
    pub fn on_alert_fired(&mut self) {
        self.reset();
    }

    /// Out-of-band reset from the dismissal flow. Idempotent.
    pub fn on_external_reset(&mut self) {
        tracing::info!(score = self.running_score, "External reset applied");
        self.reset();
    }

    /// Replace the threshold without re-evaluating the current score.
    pub fn on_config_reload(&mut self, threshold: u32) {
        if threshold != self.threshold {
            tracing::info!(old = self.threshold, new = threshold, "Threshold reloaded");
        }
        self.threshold = threshold;
    }

    /// Start a new session id, keeping the score and phase.
    pub fn renew_id(&mut self) {
        self.session_id = Uuid::new_v4();
    }

    pub fn running_score(&self) -> u32 {
        self.running_score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    fn reset(&mut self) {
        self.running_score = 0;
        self.phase = Phase::Idle;
    }
}
