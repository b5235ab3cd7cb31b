//! Token cursor over a protocol line.
//!
//! Wire messages are space-separated tokens with no escaping. Some fields
//! are written with a leading tag (`WIDTH 10`), some bare, and the two
//! forms coexist across frontend versions; [`TokenCursor::tagged`] accepts
//! either. The final free-text argument of a message is the raw remainder
//! of the line, taken verbatim so embedded runs of spaces survive.

// ============================================================================
// Imports
// ============================================================================

use std::str::FromStr;

// ============================================================================
// TokenCursor
// ============================================================================

/// Forward-only cursor over the tokens of one protocol line.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    line: &'a str,
    /// Byte offset of the next unread token.
    pos: usize,
    /// Set once the final token has been consumed.
    done: bool,
}

impl<'a> TokenCursor<'a> {
    /// Wraps `line`, splitting on single spaces.
    ///
    /// Every separator byte delimits a field, so consecutive spaces yield
    /// empty tokens instead of being collapsed.
    #[must_use]
    pub fn new(line: &'a str) -> Self {
        Self {
            line,
            pos: 0,
            done: false,
        }
    }

    /// Returns the next token without consuming it.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<&'a str> {
        if self.done {
            return None;
        }
        let rest = &self.line[self.pos..];
        match rest.find(' ') {
            Some(sep) => Some(&rest[..sep]),
            None => Some(rest),
        }
    }

    /// Consumes and returns the next token.
    pub fn next(&mut self) -> Option<&'a str> {
        if self.done {
            return None;
        }
        let rest = &self.line[self.pos..];
        match rest.find(' ') {
            Some(sep) => {
                self.pos += sep + 1;
                Some(&rest[..sep])
            }
            None => {
                self.pos = self.line.len();
                self.done = true;
                Some(rest)
            }
        }
    }

    /// Consumes an optionally `tag`-labelled value.
    ///
    /// If the next token equals `tag` it is treated as the label and
    /// skipped; the token after it (or the next token itself, when the
    /// label is absent) is returned as the value.
    pub fn tagged(&mut self, tag: &str) -> Option<&'a str> {
        if self.peek() == Some(tag) {
            self.next();
        }
        self.next()
    }

    /// Consumes the next token and parses it.
    #[inline]
    pub fn parse_next<T: FromStr>(&mut self) -> Option<T> {
        self.next()?.parse().ok()
    }

    /// Consumes an optionally labelled value and parses it.
    #[inline]
    pub fn tagged_parse<T: FromStr>(&mut self, tag: &str) -> Option<T> {
        self.tagged(tag)?.parse().ok()
    }

    /// Consumes an optionally `tag`-labelled free-text payload.
    ///
    /// Skips the label when present, then takes everything left.
    #[must_use]
    pub fn tagged_rest(&mut self, tag: &str) -> String {
        if self.peek() == Some(tag) {
            self.next();
        }
        self.rest_joined()
    }

    /// Consumes the remainder of the line verbatim.
    ///
    /// The result is the raw text after the last consumed separator, not
    /// a re-join of tokens, so interior space runs come through exactly
    /// as sent. Returns an empty string when the cursor is exhausted.
    #[must_use]
    pub fn rest_joined(&mut self) -> String {
        if self.done {
            return String::new();
        }
        let rest = &self.line[self.pos..];
        self.pos = self.line.len();
        self.done = true;
        rest.to_owned()
    }

    /// Consumes all remaining tokens unjoined.
    #[must_use]
    pub fn rest_tokens(&mut self) -> Vec<String> {
        let mut rest = Vec::new();
        while let Some(token) = self.next() {
            rest.push(token.to_owned());
        }
        rest
    }

    /// Returns `true` when every token has been consumed.
    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.done
    }
}

// ============================================================================
// Tests
// ============================================================================
