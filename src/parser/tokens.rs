use crate::iloc::{Opcode, SourceReg};
use num_bigint::BigUint;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    // =========== Opcodes ============
    /// `load` / `store`
    MemOp(Opcode),
    LoadI,
    /// `add`, `sub`, `mult`, `lshift`, `rshift`
    ArithOp(Opcode),
    Output,
    Nop,
    // ============ Atoms =============
    Register(SourceReg),
    Constant(BigUint),
    // =========== Symbols ============
    Comma,
    Into,
    Newline,
}

impl Token {
    pub fn category(&self) -> &'static str {
        match self {
            Self::MemOp(_) => "MEMOP",
            Self::LoadI => "LOADI",
            Self::ArithOp(_) => "ARITHOP",
            Self::Output => "OUTPUT",
            Self::Nop => "NOP",
            Self::Register(_) => "REG",
            Self::Constant(_) => "CONSTANT",
            Self::Comma => "COMMA",
            Self::Into => "INTO",
            Self::Newline => "NEWLINE",
        }
    }

    pub fn lexeme(&self) -> String {
        match self {
            Self::MemOp(op) | Self::ArithOp(op) => op.lexeme().to_owned(),
            Self::LoadI => "loadI".to_owned(),
            Self::Output => "output".to_owned(),
            Self::Nop => "nop".to_owned(),
            Self::Register(num) => format!("r{}", num),
            Self::Constant(num) => num.to_string(),
            Self::Comma => ",".to_owned(),
            Self::Into => "=>".to_owned(),
            Self::Newline => "\\n".to_owned(),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "< {}, \"{}\" >", self.category(), self.lexeme())
    }
}
