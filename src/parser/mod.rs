pub mod ast;
pub mod error_printing;
pub mod lexer;
pub mod parser;
pub mod tokens;
pub mod types;

use crate::error::Error;
use crate::iloc::Operation;
use error_printing::print_errors;
use tokens::Token;
use types::{resolve_span_span, LineIndex};

/// Lexes a block and pairs every token with its 1-based source line.
pub fn token_stream(src: &str, file_path: &str) -> Result<Vec<(usize, Token)>, Error> {
    let tokens = lexer::lex(src).map_err(|errs| {
        let total = errs.len();
        print_errors(src, file_path, errs, |span| span.clone());
        Error::Lex(total)
    })?;

    let lines = LineIndex::new(src);
    Ok(tokens
        .into_iter()
        .map(|tok| (lines.line_of(tok.span.start), tok.inner))
        .collect())
}

/// Lexes and parses a whole ILOC block, printing a report for every diagnostic found along the
/// way.
pub fn parse_source(src: &str, file_path: &str) -> Result<Vec<Operation>, Error> {
    let spanned_tokens = match lexer::lex(src) {
        Ok(tokens) => tokens,
        Err(errs) => {
            let total = errs.len();
            print_errors(src, file_path, errs, |span| span.clone());
            return Err(Error::Lex(total));
        }
    };

    let tokens: Vec<_> = spanned_tokens.iter().map(|t| t.inner.clone()).collect();
    let (maybe_statements, errs) = parser::parse_tokens(tokens);

    let total = errs.len();
    let errored = print_errors(src, file_path, errs, |tok_span| {
        resolve_span_span(tok_span, &spanned_tokens)
    });
    if errored {
        return Err(Error::Parse(total));
    }

    let lines = LineIndex::new(src);
    let operations = maybe_statements
        .unwrap_or_default()
        .into_iter()
        .map(|statement| {
            let src_span = resolve_span_span(&statement.span, &spanned_tokens);
            statement.inner.into_operation(lines.line_of(src_span.start))
        })
        .collect();

    Ok(operations)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::iloc::Opcode;

    #[test]
    fn test_line_numbers_skip_comments() {
        let src = "// header\nloadI 5 => r1\n\n// note\nadd r1, r1 => r2\n";
        let ops = parse_source(src, "test.i").unwrap();

        assert_eq!(ops.len(), 2);
        assert_eq!((ops[0].line, ops[0].opcode), (2, Opcode::LoadI));
        assert_eq!((ops[1].line, ops[1].opcode), (5, Opcode::Add));
    }

    #[test]
    fn test_missing_trailing_newline() {
        let ops = parse_source("nop\noutput 4", "test.i").unwrap();

        assert_eq!(ops.len(), 2);
        assert_eq!(ops[1].opcode, Opcode::Output);
    }

    #[test]
    fn test_errors_counted_per_line() {
        let src = "loadI 5 => r1\nadd r1 => r2\nstore r1 r2\nnop\n";

        match parse_source(src, "test.i") {
            Err(Error::Parse(total)) => assert!(total >= 2),
            other => panic!("expected parse errors, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_word_is_lex_error() {
        assert!(matches!(
            parse_source("invalid r1 => r2\n", "test.i"),
            Err(Error::Lex(_))
        ));
    }

    #[test]
    fn test_token_stream_lines() {
        let stream = token_stream("nop\n// skip\noutput 7", "test.i").unwrap();
        let lines: Vec<_> = stream.iter().map(|(line, _)| *line).collect();

        // The comment line still ends in a newline token.
        assert_eq!(lines, vec![1, 1, 2, 3, 3, 3]);
        assert_eq!(stream[3].1, Token::Output);
        assert_eq!(stream.last().map(|(_, tok)| tok), Some(&Token::Newline));
    }
}
