//! Guardian Keyboard - on-device lexical risk monitor.
//!
//! This library watches a stream of keystroke and text events, splits it into
//! words, scores each word against a weighted lexicon of negative terms and
//! raises an alert when the running score reaches a configured threshold.
//!
//! # Privacy Guarantees
//!
//! - **No text storage**: Words live only in the in-progress buffer
//! - **Minimal alerts**: Alerts carry the score and time, never words or categories
//! - **Local processing**: Matching happens entirely on the device
//! - **Transparency**: All activity is counted and auditable
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Guardian Keyboard                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │    Input    │──▶│  Tokenizer  │──▶│   Matcher   │       │
//! │  │  (events)   │   │   (words)   │   │  (lexicon)  │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │                                             │              │
//! │         ┌───────────────────────────────────┘              │
//! │         ▼                                                  │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │   Session   │──▶│ Alert sink  │   │Transparency │       │
//! │  │(score/phase)│──▶│ + Unlock    │   │    Log      │       │
//! │  └─────────────┘   │   gate      │   └─────────────┘       │
//! │         ▲          └─────────────┘                         │
//! │         └────────── reset signal ◀── dismissal             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use guardian_keyboard::{Config, InputEvent, Lexicon, Monitor, Phase};
//!
//! let lexicon = Lexicon::load(r#"{"self_harm": {"terms": ["hurt"], "weight": 5}}"#);
//! let config = Config { threshold: 5, ..Config::default() };
//! let mut monitor = Monitor::new(config, lexicon);
//!
//! let alerts = monitor.handle(&InputEvent::Commit("I want to hurt ".into()));
//! assert_eq!(alerts.len(), 1);
//! assert_eq!(alerts[0].score, 5);
//! assert_eq!(monitor.phase(), Phase::Idle);
//! ```

pub mod alert;
pub mod config;
pub mod core;
pub mod input;
pub mod monitor;
pub mod signal;
pub mod transparency;

// Re-export key types at crate root for convenience
pub use alert::{
    AlertDelivery, AlertDispatchError, AlertSignal, AlertSink, BlockingSurface, ChannelAlertSink,
    ChannelSurface, GateRequest, LogAlertSink, NoopSurface, UnlockGate,
};
pub use config::{Config, ConfigError};
pub use self::core::{
    explain, score, Lexicon, LexiconEntry, LexiconParseError, Phase, ScoreBreakdown,
    SessionState, Tokenizer,
};
pub use input::{InputEvent, KeyMode, SourceConfig, TextSource};
pub use monitor::Monitor;
pub use signal::{AtomicResetFlag, FileResetFlag, ResetSignal, SharedResetSignal};
pub use transparency::{SharedTransparencyLog, TransparencyLog, TransparencyStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Privacy declaration that can be displayed to users.
pub const PRIVACY_DECLARATION: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║           GUARDIAN KEYBOARD - PRIVACY DECLARATION                ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  This monitor checks typed words against a list of risk terms.   ║
║                                                                  ║
║  ✓ WHAT WE CHECK:                                                ║
║    • Each completed word, in memory, as it is typed              ║
║    • Whether it matches a category in the local lexicon          ║
║    • A running score that resets after every alert               ║
║                                                                  ║
║  ✗ WHAT WE NEVER KEEP OR SEND:                                   ║
║    • The words you type (no messages, no passwords)              ║
║    • Which terms or categories matched                           ║
║    • What applications you use                                   ║
║    • Any screen content                                          ║
║                                                                  ║
║  An alert contains only the score and the time it was raised.    ║
║  All matching happens on this device.                            ║
║                                                                  ║
║  You can view activity counts anytime with:                      ║
║    guardian status                                               ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_privacy_declaration_contents() {
        assert!(PRIVACY_DECLARATION.contains("PRIVACY"));
        assert!(PRIVACY_DECLARATION.contains("NEVER KEEP"));
        assert!(PRIVACY_DECLARATION.contains("words you type"));
    }
}
