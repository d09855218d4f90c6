// Heavily inspired by `rustc_lexer` and adapted to suit the project.
// See https://doc.rust-lang.org/beta/nightly-rustc/src/rustc_lexer/cursor.rs.html

use std::str::Chars;

pub(crate) const EOF_CHAR: char = '\0';

/// Peekable iterator over a char sequence.
pub struct Cursor<'a> {
    /// Bytes left in the input when the current token started
    len_remaining: usize,
    /// Byte offset of the current token from the start of the input
    token_start: usize,
    chars: Chars<'a>,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Cursor<'a> {
        Cursor {
            len_remaining: input.len(),
            token_start: 0,
            chars: input.chars(),
        }
    }

    /// Peek the next char without consuming it. Returns [`EOF_CHAR`] at the end.
    pub fn first(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    /// File is finished parsing
    pub fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    pub fn bump(&mut self) -> Option<char> {
        self.chars.next()
    }

    /// Consume chars while `predicate` holds.
    pub fn take_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while predicate(self.first()) && !self.is_eof() {
            self.bump();
        }
    }

    /// Length in bytes of the token consumed so far
    pub fn pos_in_token(&self) -> usize {
        self.len_remaining - self.chars.as_str().len()
    }

    /// Start of the token consumed so far
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// Mark the current point as the start of the next token
    pub fn reset_pos(&mut self) {
        self.token_start += self.pos_in_token();
        self.len_remaining = self.chars.as_str().len();
    }
}
