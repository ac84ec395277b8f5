//! Source span tracking for error reporting

/// A span in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Start byte offset in the source
    pub start: usize,
    /// End byte offset in the source (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create an empty span at a position
    pub fn at(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Merge two spans into a single span covering both
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Extract the text for this span from the source
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start..self.end).unwrap_or("")
    }

    /// 1-based line and column of the span start
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let prefix = source.get(..self.start).unwrap_or(source);
        let line = prefix.matches('\n').count() + 1;
        let column = prefix
            .rfind('\n')
            .map_or(prefix.chars().count(), |nl| prefix[nl + 1..].chars().count())
            + 1;
        (line, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_counts_from_one() {
        let source = "a = 1\nbb = 2\n";
        assert_eq!(Span::at(0).line_col(source), (1, 1));
        assert_eq!(Span::at(6).line_col(source), (2, 1));
        assert_eq!(Span::at(9).line_col(source), (2, 4));
    }

    #[test]
    fn merge_and_slice() {
        let source = "alpha beta";
        let span = Span::new(0, 5).merge(Span::new(6, 10));
        assert_eq!(span.slice(source), "alpha beta");
    }
}
