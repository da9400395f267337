//! Input event types consumed by the tokenizer.
//!
//! Events carry the characters the user typed so they can be scored, but they
//! are never stored beyond the in-progress word.

use serde::{Deserialize, Serialize};

/// ASCII backspace.
const BACKSPACE: char = '\u{8}';
/// ASCII delete, sent by many terminals for the backspace key.
const DELETE: char = '\u{7f}';

/// A discrete input event from the keyboard host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum InputEvent {
    /// A single typed character
    Char(char),
    /// Backspace: remove the last buffered character
    Delete,
    /// Bulk text committed through the input connection
    Commit(String),
    /// The input session ended; flush whatever is buffered
    EndOfSession,
}

impl InputEvent {
    /// Map raw text to per-key events.
    ///
    /// Backspace and DEL become [`InputEvent::Delete`]; every other character
    /// becomes [`InputEvent::Char`].
    pub fn from_keys(text: &str) -> Vec<InputEvent> {
        text.chars()
            .map(|c| match c {
                BACKSPACE | DELETE => InputEvent::Delete,
                c => InputEvent::Char(c),
            })
            .collect()
    }

    /// Whether this event terminates the input session.
    pub fn is_end_of_session(&self) -> bool {
        matches!(self, InputEvent::EndOfSession)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_keys_maps_deletes() {
        let events = InputEvent::from_keys("ab\u{8}c\u{7f}");
        assert_eq!(
            events,
            vec![
                InputEvent::Char('a'),
                InputEvent::Char('b'),
                InputEvent::Delete,
                InputEvent::Char('c'),
                InputEvent::Delete,
            ]
        );
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_string(&InputEvent::Commit("hi".into())).unwrap();
        assert_eq!(json, r#"{"type":"commit","value":"hi"}"#);

        let back: InputEvent = serde_json::from_str(r#"{"type":"end_of_session"}"#).unwrap();
        assert!(back.is_end_of_session());
    }
}
