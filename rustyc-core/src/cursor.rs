//! Random-access cursor shared by the lexer (over bytes) and the parser
//! (over tokens).

/// A bounds-aware position inside a borrowed buffer.
///
/// Reads past either end return `None`; the cursor itself has no error
/// states.
#[derive(Debug, Clone)]
pub struct Cursor<'a, T> {
    buf: &'a [T],
    pos: usize,
}

impl<'a, T> Cursor<'a, T> {
    pub fn new(buf: &'a [T]) -> Self {
        Cursor { buf, pos: 0 }
    }

    pub fn peek(&self) -> Option<&'a T> {
        self.buf.get(self.pos)
    }

    pub fn peek_nth(&self, offset: usize) -> Option<&'a T> {
        self.buf.get(self.pos + offset)
    }

    /// The element `offset` positions before the current one (`1` is the
    /// element consumed last).
    pub fn peek_back(&self, offset: usize) -> Option<&'a T> {
        self.pos.checked_sub(offset).and_then(|idx| self.buf.get(idx))
    }

    pub fn skip(&mut self) {
        self.skip_n(1);
    }

    pub fn skip_n(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.buf.len());
    }

    pub fn is_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn reset_to(&mut self, pos: usize) {
        self.pos = pos.min(self.buf.len());
    }
}

impl<'a> Cursor<'a, u8> {
    /// Byte at the cursor, or `0` at end of input.
    pub fn peek_byte(&self) -> u8 {
        self.peek().copied().unwrap_or(0)
    }

    pub fn peek_byte_nth(&self, offset: usize) -> u8 {
        self.peek_nth(offset).copied().unwrap_or(0)
    }

    /// Advances while `pred` holds; returns how many bytes were skipped.
    pub fn skip_while(&mut self, mut pred: impl FnMut(u8) -> bool) -> usize {
        let start = self.pos;
        while let Some(&byte) = self.peek() {
            if !pred(byte) {
                break;
            }
            self.pos += 1;
        }
        self.pos - start
    }
}
