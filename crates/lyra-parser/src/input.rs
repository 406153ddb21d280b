use std::sync::Arc;

/// An immutable cursor into a source document.
///
/// Combinators never mutate an `Input`; every successful parse step returns a
/// new cursor advanced past the consumed text. The source itself is shared
/// behind an [`Arc`] so cloning a cursor is two pointer copies and three
/// integers.
#[derive(Clone, PartialEq, Eq)]
pub struct Input {
    source: Arc<str>,
    offset: usize,
    line: u32,
    column: u32,
}

impl Input {
    pub fn new(source: &str) -> Self {
        Self {
            source: Arc::from(source),
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Byte offset from the start of the source.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 1-based line number of the next character.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 1-based column number of the next character.
    pub fn column(&self) -> u32 {
        self.column
    }

    /// The unconsumed remainder of the source.
    pub fn rest(&self) -> &str {
        &self.source[self.offset..]
    }

    pub fn at_end(&self) -> bool {
        self.offset == self.source.len()
    }

    /// The next unconsumed character, if any.
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Returns a new cursor advanced by `bytes`, which must land on a
    /// character boundary. Line and column are updated by scanning the
    /// consumed slice.
    pub fn advance(&self, bytes: usize) -> Self {
        let consumed = &self.source[self.offset..self.offset + bytes];
        let mut line = self.line;
        let mut column = self.column;
        for c in consumed.chars() {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Self {
            source: Arc::clone(&self.source),
            offset: self.offset + bytes,
            line,
            column,
        }
    }
}

impl std::fmt::Debug for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Input({}:{} @{})",
            self.line, self.column, self.offset
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_lines_and_columns() {
        let input = Input::new("ab\ncd");
        assert_eq!((input.line(), input.column()), (1, 1));

        let after_ab = input.advance(2);
        assert_eq!((after_ab.line(), after_ab.column()), (1, 3));

        let after_newline = after_ab.advance(1);
        assert_eq!((after_newline.line(), after_newline.column()), (2, 1));

        let after_cd = after_newline.advance(2);
        assert_eq!((after_cd.line(), after_cd.column()), (2, 3));
        assert!(after_cd.at_end());
    }

    #[test]
    fn rest_and_peek() {
        let input = Input::new("hero");
        assert_eq!(input.rest(), "hero");
        assert_eq!(input.peek(), Some('h'));
        assert_eq!(input.advance(4).peek(), None);
    }
}
