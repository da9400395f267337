//! Privacy-preserving transparency log.
//!
//! This module counts what the monitor did without storing any word, term or
//! score history, so users and guardians can audit its activity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Activity counters for the current session.
#[derive(Debug)]
pub struct TransparencyLog {
    /// Number of input events processed
    events_processed: AtomicU64,
    /// Number of completed words scored
    words_completed: AtomicU64,
    /// Number of words with a non-zero score
    words_flagged: AtomicU64,
    /// Number of threshold crossings
    alerts_raised: AtomicU64,
    /// Number of alerts the dispatcher refused
    dispatch_failures: AtomicU64,
    /// Number of external resets applied
    resets_consumed: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl TransparencyLog {
    /// Create a new transparency log.
    pub fn new() -> Self {
        Self {
            events_processed: AtomicU64::new(0),
            words_completed: AtomicU64::new(0),
            words_flagged: AtomicU64::new(0),
            alerts_raised: AtomicU64::new(0),
            dispatch_failures: AtomicU64::new(0),
            resets_consumed: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create a transparency log that resumes from and saves to `path`.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut log = Self::new();
        log.persist_path = Some(path);

        if let Err(e) = log.load() {
            tracing::warn!(error = %e, "Could not load previous transparency stats");
        }

        log
    }

    pub fn record_event(&self) {
        self.events_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a scored word; `flagged` when it matched any category.
    pub fn record_word(&self, flagged: bool) {
        self.words_completed.fetch_add(1, Ordering::Relaxed);
        if flagged {
            self.words_flagged.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_alert(&self) {
        self.alerts_raised.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dispatch_failure(&self) {
        self.dispatch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reset(&self) {
        self.resets_consumed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> TransparencyStats {
        TransparencyStats {
            events_processed: self.events_processed.load(Ordering::Relaxed),
            words_completed: self.words_completed.load(Ordering::Relaxed),
            words_flagged: self.words_flagged.load(Ordering::Relaxed),
            alerts_raised: self.alerts_raised.load(Ordering::Relaxed),
            dispatch_failures: self.dispatch_failures.load(Ordering::Relaxed),
            resets_consumed: self.resets_consumed.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics:\n\
             - Input events processed: {}\n\
             - Words scored: {}\n\
             - Words flagged: {}\n\
             - Alerts raised: {}\n\
             - Alert dispatch failures: {}\n\
             - Resets applied: {}\n\
             - Session duration: {} seconds\n\
             \n\
             Privacy Guarantee:\n\
             - Words are scored in memory and never stored\n\
             - Alerts carry only the score and time\n\
             - Only activity counts are retained",
            stats.events_processed,
            stats.words_completed,
            stats.words_flagged,
            stats.alerts_raised,
            stats.dispatch_failures,
            stats.resets_consumed,
            stats.session_duration_secs
        )
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedStats {
                events_processed: stats.events_processed,
                words_completed: stats.words_completed,
                words_flagged: stats.words_flagged,
                alerts_raised: stats.alerts_raised,
                dispatch_failures: stats.dispatch_failures,
                resets_consumed: stats.resets_consumed,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }

    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.events_processed
                    .store(persisted.events_processed, Ordering::Relaxed);
                self.words_completed
                    .store(persisted.words_completed, Ordering::Relaxed);
                self.words_flagged
                    .store(persisted.words_flagged, Ordering::Relaxed);
                self.alerts_raised
                    .store(persisted.alerts_raised, Ordering::Relaxed);
                self.dispatch_failures
                    .store(persisted.dispatch_failures, Ordering::Relaxed);
                self.resets_consumed
                    .store(persisted.resets_consumed, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        for counter in [
            &self.events_processed,
            &self.words_completed,
            &self.words_flagged,
            &self.alerts_raised,
            &self.dispatch_failures,
            &self.resets_consumed,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for TransparencyLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of transparency statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransparencyStats {
    pub events_processed: u64,
    pub words_completed: u64,
    pub words_flagged: u64,
    pub alerts_raised: u64,
    pub dispatch_failures: u64,
    pub resets_consumed: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    events_processed: u64,
    words_completed: u64,
    words_flagged: u64,
    alerts_raised: u64,
    dispatch_failures: u64,
    resets_consumed: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared transparency log.
pub type SharedTransparencyLog = Arc<TransparencyLog>;

/// Create a new shared transparency log.
pub fn create_shared_log() -> SharedTransparencyLog {
    Arc::new(TransparencyLog::new())
}

/// Create a new shared transparency log with persistence.
pub fn create_shared_log_with_persistence(path: PathBuf) -> SharedTransparencyLog {
    Arc::new(TransparencyLog::with_persistence(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparency_log_counting() {
        let log = TransparencyLog::new();

        log.record_event();
        log.record_event();
        log.record_word(false);
        log.record_word(true);
        log.record_alert();

        let stats = log.stats();
        assert_eq!(stats.events_processed, 2);
        assert_eq!(stats.words_completed, 2);
        assert_eq!(stats.words_flagged, 1);
        assert_eq!(stats.alerts_raised, 1);
        assert_eq!(stats.resets_consumed, 0);
    }

    #[test]
    fn test_transparency_log_reset() {
        let log = TransparencyLog::new();

        log.record_word(true);
        log.record_dispatch_failure();
        log.record_reset();
        log.reset();

        let stats = log.stats();
        assert_eq!(stats.words_completed, 0);
        assert_eq!(stats.words_flagged, 0);
        assert_eq!(stats.dispatch_failures, 0);
        assert_eq!(stats.resets_consumed, 0);
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transparency.json");

        let log = TransparencyLog::with_persistence(path.clone());
        log.record_event();
        log.record_word(true);
        log.record_alert();
        log.save().unwrap();

        let restored = TransparencyLog::with_persistence(path);
        let stats = restored.stats();
        assert_eq!(stats.events_processed, 1);
        assert_eq!(stats.words_flagged, 1);
        assert_eq!(stats.alerts_raised, 1);
    }

    #[test]
    fn test_summary_format() {
        let log = TransparencyLog::new();
        let summary = log.summary();

        assert!(summary.contains("Words scored"));
        assert!(summary.contains("Alerts raised"));
        assert!(summary.contains("Privacy Guarantee"));
        assert!(summary.contains("never stored"));
    }
}
