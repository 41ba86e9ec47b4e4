use crate::iloc::{Opcode, Operation, SourceReg};
use num_bigint::BigUint;

/// One parsed ILOC line, before it is placed in the block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    Memory {
        opcode: Opcode,
        src: SourceReg,
        dest: SourceReg,
    },
    LoadI {
        constant: BigUint,
        dest: SourceReg,
    },
    Arith {
        opcode: Opcode,
        lhs: SourceReg,
        rhs: SourceReg,
        dest: SourceReg,
    },
    Output(BigUint),
    Nop,
}

impl Statement {
    pub fn into_operation(self, line: usize) -> Operation {
        match self {
            Self::Memory { opcode, src, dest } => Operation::memory(line, opcode, src, dest),
            Self::LoadI { constant, dest } => Operation::load_immediate(line, constant, dest),
            Self::Arith {
                opcode,
                lhs,
                rhs,
                dest,
            } => Operation::arithmetic(line, opcode, lhs, rhs, dest),
            Self::Output(constant) => Operation::output(line, constant),
            Self::Nop => Operation::new(line, Opcode::Nop),
        }
    }
}
