use std::fmt::Debug;

pub type Span = std::ops::Range<usize>;

#[derive(Debug, Clone)]
pub struct Spanned<T: Debug> {
    pub inner: T,
    pub span: Span,
}

impl<T: Debug> Spanned<T> {
    pub fn new(inner: T, span: Span) -> Self {
        Spanned { inner, span }
    }
}

/// Maps a span over token indices back onto the source text the tokens were lexed from.
pub fn resolve_span_span<T: Debug>(tok_span: &Span, tokens: &[Spanned<T>]) -> Span {
    let Some(last) = tokens.last() else {
        return 0..0;
    };
    let start = tokens
        .get(tok_span.start)
        .map_or(last.span.end, |tok| tok.span.start);
    let end = match tok_span.end {
        0 => start,
        end => tokens.get(end - 1).map_or(last.span.end, |tok| tok.span.end),
    };
    start..end.max(start)
}

/// Byte offset to 1-based line number lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(src: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self { line_starts }
    }

    pub fn line_of(&self, offset: usize) -> usize {
        self.line_starts.partition_point(|start| *start <= offset)
    }
}
