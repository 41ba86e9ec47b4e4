use chumsky::prelude::*;
use num_bigint::BigUint;

use crate::iloc::{Opcode, SourceReg};
use crate::parser::{tokens::Token, types::Spanned};

fn text(
    literal: &'static str,
    token: Token,
    label: &'static str,
) -> impl Parser<char, Token, Error = Simple<char>> {
    just(literal).to(token).labelled(label)
}

fn symbols() -> impl Parser<char, Token, Error = Simple<char>> {
    text("=>", Token::Into, "into")
        .or(text(",", Token::Comma, "comma"))
        .or(text("\n", Token::Newline, "newline"))
}

fn constant() -> impl Parser<char, Token, Error = Simple<char>> {
    text::digits(10)
        .map(|s: String| {
            Token::Constant(
                BigUint::parse_bytes(s.as_bytes(), 10)
                    .expect("Lexer should've ensured only valid bytes"),
            )
        })
        .labelled("constant")
}

fn register_number(word: &str) -> Option<Result<SourceReg, String>> {
    let digits = word.strip_prefix('r')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse().map_err(|_| {
        format!(
            "Register number {} exceeds max register number (max: {})",
            digits,
            SourceReg::MAX
        )
    }))
}

fn word() -> impl Parser<char, Token, Error = Simple<char>> {
    text::ident()
        .try_map(|word: String, span| {
            if let Some(opcode) = Opcode::from_lexeme(&word) {
                return Ok(match opcode {
                    Opcode::Load | Opcode::Store => Token::MemOp(opcode),
                    Opcode::LoadI => Token::LoadI,
                    Opcode::Output => Token::Output,
                    Opcode::Nop => Token::Nop,
                    _ => Token::ArithOp(opcode),
                });
            }
            match register_number(&word) {
                Some(Ok(num)) => Ok(Token::Register(num)),
                Some(Err(msg)) => Err(Simple::custom(span, msg)),
                None => Err(Simple::custom(
                    span,
                    format!("Unknown word `{}`, expected an opcode or register", word),
                )),
            }
        })
        .labelled("word")
}

/// Spaces, tabs and `//` comments. Newlines are tokens of their own.
fn padding() -> impl Parser<char, (), Error = Simple<char>> + Clone {
    let whitespace = one_of(" \t\r").ignored();

    let comment = just("//")
        .then(filter(|c: &char| *c != '\n').repeated())
        .ignored()
        .labelled("comment");

    whitespace.or(comment).repeated().ignored()
}

pub fn lexer() -> impl Parser<char, Vec<Spanned<Token>>, Error = Simple<char>> {
    let token = symbols().or(constant()).or(word());

    token
        .map_with_span(Spanned::new)
        .padded_by(padding())
        .repeated()
        .then_ignore(padding())
        .then_ignore(end())
}

/// Lexes a block, guaranteeing the token stream ends in a newline so every line is terminated.
pub fn lex(source: &str) -> Result<Vec<Spanned<Token>>, Vec<Simple<char>>> {
    let mut tokens = lexer().parse(source)?;
    if !matches!(tokens.last(), Some(Spanned { inner: Token::Newline, .. })) {
        tokens.push(Spanned::new(Token::Newline, source.len()..source.len()));
    }
    Ok(tokens)
}
