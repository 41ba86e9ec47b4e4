//! The target machine: two issue slots per cycle and three latency classes.

use crate::iloc::{Opcode, Operation};
use std::fmt;

pub const ISSUE_WIDTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    F0,
    F1,
}

impl Slot {
    pub fn index(&self) -> usize {
        match self {
            Self::F0 => 0,
            Self::F1 => 1,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.index())
    }
}

/// Cycles from issue until the result can be consumed.
pub fn latency(opcode: Opcode) -> usize {
    match opcode {
        Opcode::Load | Opcode::Store => 5,
        Opcode::Mult => 3,
        _ => 1,
    }
}

/// Slots an opcode may issue on, in order of preference. `nop` never issues.
pub fn allowed_slots(opcode: Opcode) -> &'static [Slot] {
    match opcode {
        Opcode::Load | Opcode::Store => &[Slot::F0],
        Opcode::Mult => &[Slot::F1],
        Opcode::Nop => &[],
        _ => &[Slot::F1, Slot::F0],
    }
}

/// The operations issued together in one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle<'a> {
    slots: [Option<&'a Operation>; ISSUE_WIDTH],
}

impl<'a> Bundle<'a> {
    pub fn get(&self, slot: Slot) -> Option<&'a Operation> {
        self.slots[slot.index()]
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn issued(&self) -> impl Iterator<Item = &'a Operation> + '_ {
        self.slots.iter().flatten().copied()
    }

    fn has_output(&self) -> bool {
        self.issued().any(|op| op.opcode == Opcode::Output)
    }

    /// Puts `op` into its first free allowed slot. At most one `output` goes out per cycle.
    pub fn place(&mut self, op: &'a Operation) -> Option<Slot> {
        if op.opcode == Opcode::Output && self.has_output() {
            return None;
        }
        let slot = allowed_slots(op.opcode)
            .iter()
            .copied()
            .find(|slot| self.slots[slot.index()].is_none())?;
        self.slots[slot.index()] = Some(op);
        Some(slot)
    }
}

impl fmt::Display for Bundle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let texts: Vec<String> = self
            .slots
            .iter()
            .map(|op| match op {
                Some(op) => op.to_string(),
                None => "nop".to_owned(),
            })
            .collect();
        write!(f, "[ {} ]", texts.join(" ; "))
    }
}
