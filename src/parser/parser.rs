use chumsky::prelude::*;
use num_bigint::BigUint;

use crate::iloc::SourceReg;
use crate::parser::{ast::Statement, tokens::Token, types::Spanned};

fn register() -> impl Parser<Token, SourceReg, Error = Simple<Token>> {
    select! { Token::Register(num) => num }.labelled("register")
}

fn constant() -> impl Parser<Token, BigUint, Error = Simple<Token>> {
    select! { Token::Constant(num) => num }.labelled("constant")
}

// load r1 => r2
fn memory_operation() -> impl Parser<Token, Statement, Error = Simple<Token>> {
    select! { Token::MemOp(opcode) => opcode }
        .then(register())
        .then_ignore(just(Token::Into))
        .then(register())
        .map(|((opcode, src), dest)| Statement::Memory { opcode, src, dest })
}

// loadI 12 => r2
fn load_immediate() -> impl Parser<Token, Statement, Error = Simple<Token>> {
    just(Token::LoadI)
        .ignore_then(constant())
        .then_ignore(just(Token::Into))
        .then(register())
        .map(|(constant, dest)| Statement::LoadI { constant, dest })
}

// add r1, r2 => r3
fn arithmetic_operation() -> impl Parser<Token, Statement, Error = Simple<Token>> {
    select! { Token::ArithOp(opcode) => opcode }
        .then(register())
        .then_ignore(just(Token::Comma))
        .then(register())
        .then_ignore(just(Token::Into))
        .then(register())
        .map(|(((opcode, lhs), rhs), dest)| Statement::Arith {
            opcode,
            lhs,
            rhs,
            dest,
        })
}

fn output() -> impl Parser<Token, Statement, Error = Simple<Token>> {
    just(Token::Output)
        .ignore_then(constant())
        .map(Statement::Output)
}

fn statement() -> impl Parser<Token, Statement, Error = Simple<Token>> {
    memory_operation()
        .or(load_immediate())
        .or(arithmetic_operation())
        .or(output())
        .or(just(Token::Nop).to(Statement::Nop))
}

pub fn parser() -> impl Parser<Token, Vec<Spanned<Statement>>, Error = Simple<Token>> {
    let blank_line = just(Token::Newline).to(None);

    // A malformed line is reported once and skipped so the following lines still get checked.
    let statement_line = statement()
        .map_with_span(Spanned::new)
        .map(Some)
        .then_ignore(just(Token::Newline))
        .recover_with(skip_until([Token::Newline], |_| None).consume_end());

    blank_line
        .or(statement_line)
        .repeated()
        .flatten()
        .then_ignore(end())
}

pub fn parse_tokens(tokens: Vec<Token>) -> (Option<Vec<Spanned<Statement>>>, Vec<Simple<Token>>) {
    parser().parse_recovery(tokens)
}
