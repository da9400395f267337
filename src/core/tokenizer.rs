//! Streaming word tokenizer.
//!
//! Characters are buffered until a boundary character arrives, at which point
//! the buffer is emitted as a completed word. The buffer is the only state and
//! is never retained once a word completes.

use crate::input::InputEvent;
use std::collections::VecDeque;

/// Punctuation that terminates a word in addition to whitespace.
pub const BOUNDARY_PUNCTUATION: [char; 8] = ['.', ',', '!', '?', ';', ':', '-', '_'];

/// How a single character affects the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// Letter, digit or apostrophe: extends the word
    Word,
    /// Whitespace or boundary punctuation: completes the word
    Boundary,
    /// Anything else: neither extends nor completes the word
    Ignored,
}

/// Classify a character for tokenization.
pub fn classify(c: char) -> CharClass {
    if c.is_alphanumeric() || c == '\'' {
        CharClass::Word
    } else if c.is_whitespace() || BOUNDARY_PUNCTUATION.contains(&c) {
        CharClass::Boundary
    } else {
        CharClass::Ignored
    }
}

/// Stateful tokenizer owned by one active session.
#[derive(Debug, Default)]
pub struct Tokenizer {
    buffer: String,
}

impl Tokenizer {
    /// Create a tokenizer with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one input event, returning any words it completed.
    pub fn feed(&mut self, event: &InputEvent) -> Vec<String> {
        match event {
            InputEvent::Char(c) => self.push_char(*c).into_iter().collect(),
            InputEvent::Delete => {
                self.delete();
                Vec::new()
            }
            InputEvent::Commit(text) => self.commit(text),
            InputEvent::EndOfSession => self.finish().into_iter().collect(),
        }
    }

    /// Apply a single character.
    pub fn push_char(&mut self, c: char) -> Option<String> {
        match classify(c) {
            CharClass::Word => {
                self.buffer.push(c);
                None
            }
            CharClass::Boundary => self.take_word(),
            CharClass::Ignored => None,
        }
    }

    /// Remove the last buffered character, if any.
    pub fn delete(&mut self) {
        self.buffer.pop();
    }

    /// Apply committed text character by character.
    pub fn commit(&mut self, text: &str) -> Vec<String> {
        text.chars().filter_map(|c| self.push_char(c)).collect()
    }

    /// Flush the buffer as a final word.
    pub fn finish(&mut self) -> Option<String> {
        self.take_word()
    }

    /// The in-progress word.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Discard the in-progress word without emitting it.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Lazily tokenize an event stream.
    ///
    /// The tokenizer keeps its buffer between calls, so it can be driven by
    /// a fresh stream afterwards.
    pub fn words<I>(&mut self, events: I) -> Words<'_, I::IntoIter>
    where
        I: IntoIterator<Item = InputEvent>,
    {
        Words {
            tokenizer: self,
            events: events.into_iter(),
            pending: VecDeque::new(),
        }
    }

    fn take_word(&mut self) -> Option<String> {
        let word = self.buffer.trim().to_string();
        self.buffer.clear();
        if word.is_empty() {
            None
        } else {
            Some(word)
        }
    }
}

/// Iterator of completed words produced by [`Tokenizer::words`].
pub struct Words<'a, I> {
    tokenizer: &'a mut Tokenizer,
    events: I,
    pending: VecDeque<String>,
}

impl<I> Iterator for Words<'_, I>
where
    I: Iterator<Item = InputEvent>,
{
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(word) = self.pending.pop_front() {
                return Some(word);
            }
            let event = self.events.next()?;
            self.pending.extend(self.tokenizer.feed(&event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(text: &str) -> Vec<String> {
        let mut tokenizer = Tokenizer::new();
        let mut events = InputEvent::from_keys(text);
        events.push(InputEvent::EndOfSession);
        tokenizer.words(events).collect()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify('a'), CharClass::Word);
        assert_eq!(classify('7'), CharClass::Word);
        assert_eq!(classify('\''), CharClass::Word);
        assert_eq!(classify('é'), CharClass::Word);
        assert_eq!(classify(' '), CharClass::Boundary);
        assert_eq!(classify('\n'), CharClass::Boundary);
        assert_eq!(classify('\t'), CharClass::Boundary);
        assert_eq!(classify('?'), CharClass::Boundary);
        assert_eq!(classify('_'), CharClass::Boundary);
        assert_eq!(classify('@'), CharClass::Ignored);
        assert_eq!(classify('"'), CharClass::Ignored);
    }

    #[test]
    fn test_boundaries_split_words() {
        assert_eq!(tokenize("I want to hurt"), vec!["I", "want", "to", "hurt"]);
        assert_eq!(tokenize("one,two.three-four"), vec!["one", "two", "three", "four"]);
    }

    #[test]
    fn test_consecutive_boundaries_emit_nothing() {
        assert_eq!(tokenize("  hi ...  there!! "), vec!["hi", "there"]);
        assert!(tokenize("   ,,, ").is_empty());
    }

    #[test]
    fn test_ignored_characters_are_dropped() {
        assert_eq!(tokenize("k@ill #x"), vec!["kill", "x"]);
    }

    #[test]
    fn test_apostrophes_kept() {
        assert_eq!(tokenize("don't"), vec!["don't"]);
    }

    #[test]
    fn test_delete_edits_buffer() {
        let mut tokenizer = Tokenizer::new();
        for event in InputEvent::from_keys("hurx\u{8}t") {
            assert!(tokenizer.feed(&event).is_empty());
        }
        assert_eq!(tokenizer.buffer(), "hurt");
        assert_eq!(tokenizer.feed(&InputEvent::Char(' ')), vec!["hurt"]);
        assert_eq!(tokenizer.buffer(), "");
    }

    #[test]
    fn test_delete_on_empty_buffer() {
        let mut tokenizer = Tokenizer::new();
        assert!(tokenizer.feed(&InputEvent::Delete).is_empty());
        assert_eq!(tokenizer.buffer(), "");
    }

    #[test]
    fn test_commit_continues_buffer() {
        let mut tokenizer = Tokenizer::new();
        tokenizer.push_char('h');
        let words = tokenizer.feed(&InputEvent::Commit("urt me now".into()));
        assert_eq!(words, vec!["hurt", "me"]);
        assert_eq!(tokenizer.buffer(), "now");
    }

    #[test]
    fn test_end_of_session_flushes() {
        let mut tokenizer = Tokenizer::new();
        tokenizer.commit("last");
        assert_eq!(tokenizer.feed(&InputEvent::EndOfSession), vec!["last"]);
        assert!(tokenizer.feed(&InputEvent::EndOfSession).is_empty());
    }

    #[test]
    fn test_tokenizer_reusable_after_stream() {
        let mut tokenizer = Tokenizer::new();
        let first: Vec<String> = tokenizer
            .words(vec![InputEvent::Commit("a b".into()), InputEvent::EndOfSession])
            .collect();
        let second: Vec<String> = tokenizer
            .words(vec![InputEvent::Commit("c".into()), InputEvent::EndOfSession])
            .collect();
        assert_eq!(first, vec!["a", "b"]);
        assert_eq!(second, vec!["c"]);
    }

    #[test]
    fn test_clear_discards_buffer() {
        let mut tokenizer = Tokenizer::new();
        tokenizer.commit("partial");
        tokenizer.clear();
        assert_eq!(tokenizer.finish(), None);
    }
}
