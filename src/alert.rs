//! Alert output and the blocking surface.
//!
//! When the running score crosses the threshold the monitor hands an
//! [`AlertSignal`] to an [`AlertSink`] (which notifies a third party) and asks
//! a [`BlockingSurface`] to show an unlock gate. Both are fire-and-forget:
//! the monitor never learns whether delivery succeeded beyond an immediate
//! error, and never waits.

use chrono::{DateTime, Utc};
use crossbeam_channel::{Sender, TrySendError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::signal::{FileResetFlag, ResetSignal, SignalError};

/// Message shown on the blocking surface.
pub const BLOCKING_MESSAGE: &str = "Unsafe typing detected. Guardian notified.";

/// Emitted once per threshold crossing.
///
/// Only the fact of crossing and the score are reported; matched categories
/// and words never leave the monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSignal {
    /// Running score at the moment of crossing
    pub score: u32,
    /// When the crossing happened
    pub timestamp: DateTime<Utc>,
    /// Session in which the crossing happened
    pub session_id: Uuid,
}

impl AlertSignal {
    /// Human-readable notification text.
    pub fn message(&self) -> String {
        format!("Alert: unsafe typing detected. Score: {}", self.score)
    }
}

/// Reasons an alert could not be handed off.
#[derive(Debug, Error)]
pub enum AlertDispatchError {
    #[error("alert channel is closed")]
    ChannelClosed,
    #[error("alert channel is full")]
    ChannelFull,
    #[error("alert rejected by dispatcher: {0}")]
    Rejected(String),
}

/// Delivers alerts to a third party (SMS, push, ...).
pub trait AlertSink: Send {
    fn dispatch(&self, destination: &str, alert: &AlertSignal) -> Result<(), AlertDispatchError>;
}

/// An alert addressed to a destination, as carried over a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDelivery {
    pub destination: String,
    pub alert: AlertSignal,
}

/// Hands alerts to another thread through a crossbeam channel.
#[derive(Debug, Clone)]
pub struct ChannelAlertSink {
    sender: Sender<AlertDelivery>,
}

impl ChannelAlertSink {
    pub fn new(sender: Sender<AlertDelivery>) -> Self {
        Self { sender }
    }
}

impl AlertSink for ChannelAlertSink {
    fn dispatch(&self, destination: &str, alert: &AlertSignal) -> Result<(), AlertDispatchError> {
        check_destination(destination)?;
        let delivery = AlertDelivery {
            destination: destination.to_string(),
            alert: alert.clone(),
        };
        self.sender.try_send(delivery).map_err(|e| match e {
            TrySendError::Full(_) => AlertDispatchError::ChannelFull,
            TrySendError::Disconnected(_) => AlertDispatchError::ChannelClosed,
        })
    }
}

/// Records alerts in the log only. Used when no dispatcher is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn dispatch(&self, destination: &str, alert: &AlertSignal) -> Result<(), AlertDispatchError> {
        check_destination(destination)?;
        tracing::warn!(
            %destination,
            score = alert.score,
            session = %alert.session_id,
            "{}",
            alert.message()
        );
        Ok(())
    }
}

fn check_destination(destination: &str) -> Result<(), AlertDispatchError> {
    if destination.trim().is_empty() {
        return Err(AlertDispatchError::Rejected(
            "destination is blank".to_string(),
        ));
    }
    Ok(())
}

/// Gate that must be passed to dismiss the blocking surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockGate {
    secret: Option<String>,
}

impl UnlockGate {
    /// An empty secret means the gate dismisses on any input.
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }

    /// Whether any input dismisses the gate.
    pub fn auto_dismisses(&self) -> bool {
        self.secret.is_none()
    }

    /// Check an entered secret.
    pub fn try_unlock(&self, input: &str) -> bool {
        match &self.secret {
            None => true,
            Some(secret) => secret == input,
        }
    }

    /// Check an entered secret and, on success, raise the reset signal.
    pub fn dismiss(&self, input: &str, reset: &dyn ResetSignal) -> bool {
        if self.try_unlock(input) {
            reset.signal_reset();
            true
        } else {
            tracing::debug!("Unlock attempt rejected");
            false
        }
    }

    /// Check an entered secret and, on success, write the durable reset flag.
    ///
    /// Returns `Ok(false)` for a wrong secret. Unlike [`UnlockGate::dismiss`],
    /// a failed write is returned to the caller instead of logged. Success is
    /// decided by the write alone: the monitor may consume the flag at any
    /// moment afterwards.
    pub fn try_dismiss(&self, input: &str, flag: &FileResetFlag) -> Result<bool, SignalError> {
        if !self.try_unlock(input) {
            tracing::debug!("Unlock attempt rejected");
            return Ok(false);
        }
        flag.try_signal()?;
        Ok(true)
    }
}

/// The user-facing surface that blocks input until dismissed.
pub trait BlockingSurface: Send {
    fn present(&self, gate: UnlockGate, alert: &AlertSignal);
}

/// A request to show the unlock gate, as carried over a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateRequest {
    pub gate: UnlockGate,
    pub alert: AlertSignal,
}

/// Forwards gate requests to the thread that owns the user interface.
#[derive(Debug, Clone)]
pub struct ChannelSurface {
    sender: Sender<GateRequest>,
}

impl ChannelSurface {
    pub fn new(sender: Sender<GateRequest>) -> Self {
        Self { sender }
    }
}

impl BlockingSurface for ChannelSurface {
    fn present(&self, gate: UnlockGate, alert: &AlertSignal) {
        let request = GateRequest {
            gate,
            alert: alert.clone(),
        };
        if let Err(e) = self.sender.try_send(request) {
            tracing::warn!(error = %e, "Blocking surface request dropped");
        }
    }
}

/// Surface for hosts that have no user interface attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSurface;

impl BlockingSurface for NoopSurface {
    fn present(&self, _gate: UnlockGate, _alert: &AlertSignal) {}
}
