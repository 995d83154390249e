//! Position cursor over immutable expression source text
//!
//! [`Cursor`] tracks the read position three ways at once: as a character
//! index (what the grammar advances by), as a byte offset (what node spans
//! record, so that node text is an exact slice of the original source even
//! when it contains the multi-byte glyphs `×` and `÷`), and as a
//! line/column pair for diagnostics.

use super::ast::SourceLocation;

/// Character cursor with line/column and byte-offset bookkeeping.
pub struct Cursor {
    input: Vec<char>,
    position: usize,
    byte: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    /// Create a cursor at the start of the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            byte: 0,
            line: 1,
            column: 1,
        }
    }

    /// Peek at the current character without consuming.
    pub fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters without consuming.
    pub fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// The unconsumed remainder of the input, for the token classifier.
    pub fn rest(&self) -> &[char] {
        &self.input[self.position..]
    }

    /// Consume n characters.
    ///
    /// Advancing past the end of the input is a programming error in the
    /// grammar, not a user-input error, and panics.
    pub fn advance(&mut self, n: usize) {
        assert!(
            self.position + n <= self.input.len(),
            "cursor advanced {} past end of input",
            self.position + n - self.input.len()
        );

        for _ in 0..n {
            let ch = self.input[self.position];
            self.position += 1;
            self.byte += ch.len_utf8();

            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// Check if the cursor has reached the end of the input.
    pub fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Advance past any run of spaces, tabs, and newlines.
    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t') | Some('\r') | Some('\n')) {
            self.advance(1);
        }
    }

    /// Byte offset of the cursor into the original source string.
    pub fn byte_offset(&self) -> usize {
        self.byte
    }

    /// Current line/column position.
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}
