//! Core functionality for the Guardian keyboard monitor.
//!
//! This module contains:
//! - The weighted lexicon and its permissive loader
//! - The streaming tokenizer that turns input events into words
//! - The matcher that scores a word against the lexicon
//! - The running-score state machine

pub mod lexicon;
pub mod matcher;
pub mod session;
pub mod tokenizer;

// Re-export commonly used types
pub use lexicon::{Lexicon, LexiconEntry, LexiconParseError, DEFAULT_LEXICON};
pub use matcher::{explain, score, CategoryMatch, ScoreBreakdown};
pub use session::{Phase, SessionState};
pub use tokenizer::{classify, CharClass, Tokenizer, Words, BOUNDARY_PUNCTUATION};
