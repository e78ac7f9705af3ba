//! Instruction abstraction and opcode tables
//!
//! An [`Instruction`] is constructed once, registered into an
//! [`InstructionTable`] under its opcode and reused for every occurrence of
//! that opcode. Per-call results (cycles and flag directives) are returned
//! in a [`Step`] rather than stored on the instance, so tables stay
//! immutable once the CPU owns them.

use std::fmt;

use super::registers::{Flag, Registers};
use super::Bus;
use crate::error::Result;

/// Number of entries in an opcode table
pub const TABLE_SIZE: usize = 256;

/// Requested change for each status flag, committed after execution.
///
/// `None` leaves the flag untouched; `Some(value)` writes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagDirectives {
    pub zero: Option<bool>,
    pub subtract: Option<bool>,
    pub half_carry: Option<bool>,
    pub carry: Option<bool>,
}

impl FlagDirectives {
    /// No flag is touched
    pub const NONE: Self = Self {
        zero: None,
        subtract: None,
        half_carry: None,
        carry: None,
    };

    pub fn zero(mut self, value: bool) -> Self {
        self.zero = Some(value);
        self
    }

    pub fn subtract(mut self, value: bool) -> Self {
        self.subtract = Some(value);
        self
    }

    pub fn half_carry(mut self, value: bool) -> Self {
        self.half_carry = Some(value);
        self
    }

    pub fn carry(mut self, value: bool) -> Self {
        self.carry = Some(value);
        self
    }

    /// Write every directive that is set into F
    pub fn commit(&self, registers: &mut Registers) {
        let directives = [
            (Flag::Zero, self.zero),
            (Flag::Subtract, self.subtract),
            (Flag::HalfCarry, self.half_carry),
            (Flag::Carry, self.carry),
        ];
        for (flag, directive) in directives {
            if let Some(value) = directive {
                registers.set_flag(flag, value);
            }
        }
    }
}

/// Outcome of one execution: cycles consumed and flags to commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub cycles: u32,
    pub flags: FlagDirectives,
}

impl Step {
    /// A step costing `cycles` that leaves the flags alone
    pub fn new(cycles: u32) -> Self {
        Self {
            cycles,
            flags: FlagDirectives::NONE,
        }
    }

    pub fn with_flags(mut self, flags: FlagDirectives) -> Self {
        self.flags = flags;
        self
    }
}

/// One opcode's behaviour
pub trait Instruction {
    /// Mnemonic used in traces and diagnostics
    fn name(&self) -> &'static str;

    /// Opcode the instruction is registered under
    fn opcode(&self) -> u8;

    /// Base cycle cost. Conditional branches report their actual cost
    /// through [`Step::cycles`].
    fn cycles(&self) -> u32;

    /// Pre-execution hook.
    ///
    /// Returns `Some(nested)` when this entry stands for another instruction
    /// (the escape prefix), in which case the engine executes `nested`
    /// instead. The default does nothing.
    fn init<'a>(
        &'a self,
        _registers: &mut Registers,
        _bus: &dyn Bus,
    ) -> Result<Option<&'a dyn Instruction>> {
        Ok(None)
    }

    /// Apply the instruction's effect. PC already points past the opcode.
    fn execute(&self, registers: &mut Registers, bus: &mut dyn Bus) -> Result<Step>;
}

/// Opcode to instruction mapping
pub struct InstructionTable {
    entries: Vec<Option<Box<dyn Instruction>>>,
}

impl InstructionTable {
    /// Create a table with no registered opcodes
    pub fn new() -> Self {
        Self {
            entries: (0..TABLE_SIZE).map(|_| None).collect(),
        }
    }

    /// Register `instruction` under its own opcode
    pub fn register(&mut self, instruction: impl Instruction + 'static) {
        let opcode = instruction.opcode() as usize;
        if let Some(previous) = &self.entries[opcode] {
            log::warn!(
                "opcode 0x{:02X}: {} replaced by {}",
                opcode,
                previous.name(),
                instruction.name()
            );
        }
        self.entries[opcode] = Some(Box::new(instruction));
    }

    /// Look up the instruction registered for `opcode`
    pub fn get(&self, opcode: u8) -> Option<&dyn Instruction> {
        self.entries[opcode as usize].as_deref()
    }

    /// Number of registered opcodes
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered opcodes in ascending order
    pub fn opcodes(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_some())
            .map(|(opcode, _)| opcode as u8)
    }
}

impl Default for InstructionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InstructionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstructionTable")
            .field("registered", &self.len())
            .finish()
    }
}
