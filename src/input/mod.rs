//! Input collection for the Guardian keyboard monitor.
//!
//! This module defines the events the tokenizer consumes and a
//! channel-backed source that produces them from text.

pub mod source;
pub mod types;

// Re-export commonly used types
pub use source::{KeyMode, SourceConfig, SourceError, TextSource};
pub use types::InputEvent;
