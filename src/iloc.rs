use num_bigint::BigUint;
use std::fmt;

pub type SourceReg = u32;
pub type VirtualReg = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Opcode {
    Load,
    LoadI,
    Store,
    Add,
    Sub,
    Mult,
    LShift,
    RShift,
    Output,
    Nop,
}

impl Opcode {
    pub const ALL: [Opcode; 10] = [
        Self::Load,
        Self::LoadI,
        Self::Store,
        Self::Add,
        Self::Sub,
        Self::Mult,
        Self::LShift,
        Self::RShift,
        Self::Output,
        Self::Nop,
    ];

    pub fn lexeme(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::LoadI => "loadI",
            Self::Store => "store",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mult => "mult",
            Self::LShift => "lshift",
            Self::RShift => "rshift",
            Self::Output => "output",
            Self::Nop => "nop",
        }
    }

    pub fn from_lexeme(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.lexeme() == word)
    }

    /// Operand slots holding registers this opcode writes.
    pub fn def_slots(&self) -> &'static [usize] {
        match self {
            Self::Load
            | Self::LoadI
            | Self::Add
            | Self::Sub
            | Self::Mult
            | Self::LShift
            | Self::RShift => &[2],
            Self::Store | Self::Output | Self::Nop => &[],
        }
    }

    /// Operand slots holding registers this opcode reads. `store` reads both its value and its
    /// address.
    pub fn use_slots(&self) -> &'static [usize] {
        match self {
            Self::Load => &[0],
            Self::Store => &[0, 2],
            Self::Add | Self::Sub | Self::Mult | Self::LShift | Self::RShift => &[0, 1],
            Self::LoadI | Self::Output | Self::Nop => &[],
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::Mult | Self::LShift | Self::RShift
        )
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Load | Self::Store)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lexeme())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Operand {
    pub sr: Option<SourceReg>,
    pub vr: Option<VirtualReg>,
    /// Index of the next operation in the block reading this value, `None` if nothing does.
    pub next_use: Option<usize>,
}

impl Operand {
    pub fn source(sr: SourceReg) -> Self {
        Self {
            sr: Some(sr),
            ..Default::default()
        }
    }
}

/// One ILOC operation as produced by the front end. The scheduling core only ever borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operation {
    pub line: usize,
    pub opcode: Opcode,
    /// Immediate of `loadI` and `output`.
    pub constant: Option<BigUint>,
    pub operands: [Operand; 3],
}

impl Operation {
    pub fn new(line: usize, opcode: Opcode) -> Self {
        Self {
            line,
            opcode,
            constant: None,
            operands: Default::default(),
        }
    }

    pub fn memory(line: usize, opcode: Opcode, first: SourceReg, third: SourceReg) -> Self {
        debug_assert!(opcode.is_memory(), "{} is not a memory opcode", opcode);
        let mut op = Self::new(line, opcode);
        op.operands[0] = Operand::source(first);
        op.operands[2] = Operand::source(third);
        op
    }

    pub fn load_immediate(line: usize, constant: BigUint, dest: SourceReg) -> Self {
        let mut op = Self::new(line, Opcode::LoadI);
        op.constant = Some(constant);
        op.operands[2] = Operand::source(dest);
        op
    }

    pub fn arithmetic(
        line: usize,
        opcode: Opcode,
        lhs: SourceReg,
        rhs: SourceReg,
        dest: SourceReg,
    ) -> Self {
        debug_assert!(opcode.is_arithmetic(), "{} is not arithmetic", opcode);
        let mut op = Self::new(line, opcode);
        op.operands = [
            Operand::source(lhs),
            Operand::source(rhs),
            Operand::source(dest),
        ];
        op
    }

    pub fn output(line: usize, constant: BigUint) -> Self {
        let mut op = Self::new(line, Opcode::Output);
        op.constant = Some(constant);
        op
    }

    pub fn defined_vrs(&self) -> impl Iterator<Item = VirtualReg> + '_ {
        self.opcode
            .def_slots()
            .iter()
            .filter_map(|slot| self.operands[*slot].vr)
    }

    pub fn used_vrs(&self) -> impl Iterator<Item = VirtualReg> + '_ {
        self.opcode
            .use_slots()
            .iter()
            .filter_map(|slot| self.operands[*slot].vr)
    }

    pub fn display(&self, names: RegisterNames) -> OperationDisplay<'_> {
        OperationDisplay { op: self, names }
    }

    pub fn ir_row(&self) -> IrRow<'_> {
        IrRow(self)
    }
}

/// Which register numbering an operation is printed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterNames {
    Source,
    Virtual,
}

pub struct OperationDisplay<'a> {
    op: &'a Operation,
    names: RegisterNames,
}

impl OperationDisplay<'_> {
    fn reg(&self, slot: usize) -> String {
        let operand = &self.op.operands[slot];
        let num = match self.names {
            RegisterNames::Source => operand.sr,
            RegisterNames::Virtual => operand.vr.or(operand.sr),
        };
        match num {
            Some(num) => format!("r{}", num),
            None => "r?".to_owned(),
        }
    }

    fn constant(&self) -> String {
        self.op
            .constant
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_default()
    }
}

impl fmt::Display for OperationDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opcode = self.op.opcode;
        match opcode {
            Opcode::Load | Opcode::Store => {
                write!(f, "{} {} => {}", opcode, self.reg(0), self.reg(2))
            }
            Opcode::LoadI => write!(f, "loadI {} => {}", self.constant(), self.reg(2)),
            Opcode::Output => write!(f, "output {}", self.constant()),
            Opcode::Nop => f.write_str("nop"),
            _ => write!(
                f,
                "{} {}, {} => {}",
                opcode,
                self.reg(0),
                self.reg(1),
                self.reg(2)
            ),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display(RegisterNames::Virtual).fmt(f)
    }
}

/// Parsed form of an operation, one `[SR n]` cell per operand slot.
pub struct IrRow<'a>(&'a Operation);

impl fmt::Display for IrRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.0;
        let cells: Vec<String> = (0..3)
            .map(|slot| {
                let value = match (slot, op.opcode) {
                    (0, Opcode::LoadI | Opcode::Output) => {
                        op.constant.as_ref().map(|c| c.to_string())
                    }
                    _ => op.operands[slot].sr.map(|sr| sr.to_string()),
                };
                match value {
                    Some(value) => format!("[SR {}]", value),
                    None => "[ ]".to_owned(),
                }
            })
            .collect();
        write!(f, "{}\t{}", op.opcode, cells.join(", "))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_display_virtual_names() {
        let mut add = Operation::arithmetic(3, Opcode::Add, 1, 2, 3);
        add.operands[0].vr = Some(4);
        add.operands[1].vr = Some(5);
        add.operands[2].vr = Some(6);

        assert_eq!(add.to_string(), "add r4, r5 => r6");
        assert_eq!(
            add.display(RegisterNames::Source).to_string(),
            "add r1, r2 => r3"
        );
    }

    #[test]
    fn test_display_immediates() {
        let load_i = Operation::load_immediate(1, BigUint::from(1024u32), 7);
        let output = Operation::output(2, BigUint::from(96u32));

        assert_eq!(load_i.to_string(), "loadI 1024 => r7");
        assert_eq!(output.to_string(), "output 96");
        assert_eq!(Operation::new(3, Opcode::Nop).to_string(), "nop");
    }

    #[test]
    fn test_ir_row() {
        let store = Operation::memory(1, Opcode::Store, 1, 2);
        let output = Operation::output(2, BigUint::from(12u32));

        assert_eq!(store.ir_row().to_string(), "store\t[SR 1], [ ], [SR 2]");
        assert_eq!(output.ir_row().to_string(), "output\t[SR 12], [ ], [ ]");
    }

    #[test]
    fn test_store_reads_address() {
        let mut store = Operation::memory(1, Opcode::Store, 1, 2);
        store.operands[0].vr = Some(0);
        store.operands[2].vr = Some(1);

        assert_eq!(store.used_vrs().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(store.defined_vrs().count(), 0);
    }
}
