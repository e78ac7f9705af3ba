//! CB-prefixed opcode space
//!
//! Opcode 0xCB is an escape: the byte after it selects an instruction from a
//! second 256-entry table. Only one level of prefixing exists.

use super::instruction::{FlagDirectives, Instruction, InstructionTable, Step};
use super::registers::{Register, Registers};
use super::Bus;
use crate::bits::is_bit_set;
use crate::error::{EmulatorError, Result};

/// The escape opcode
pub const PREFIX_OPCODE: u8 = 0xCB;

/// Register operands in CB encoding order (index 6 is `(HL)`)
const OPERANDS: [Option<Register>; 8] = [
    Some(Register::B),
    Some(Register::C),
    Some(Register::D),
    Some(Register::E),
    Some(Register::H),
    Some(Register::L),
    None,
    Some(Register::A),
];

const BIT_NAMES: [[&str; 8]; 8] = {
    macro_rules! row {
        ($bit:literal) => {
            [
                concat!("BIT ", $bit, ",B"),
                concat!("BIT ", $bit, ",C"),
                concat!("BIT ", $bit, ",D"),
                concat!("BIT ", $bit, ",E"),
                concat!("BIT ", $bit, ",H"),
                concat!("BIT ", $bit, ",L"),
                concat!("BIT ", $bit, ",(HL)"),
                concat!("BIT ", $bit, ",A"),
            ]
        };
    }
    [row!(0), row!(1), row!(2), row!(3), row!(4), row!(5), row!(6), row!(7)]
};

impl InstructionTable {
    /// Build the CB table: `BIT b,r` over every bit and 8-bit register
    pub fn prefixed() -> Self {
        let mut table = Self::new();
        for bit in 0..8u8 {
            for (index, operand) in OPERANDS.iter().enumerate() {
                let Some(source) = *operand else { continue };
                table.register(BitTest {
                    opcode: 0x40 | (bit << 3) | index as u8,
                    name: BIT_NAMES[bit as usize][index],
                    bit,
                    source,
                });
            }
        }
        table
    }
}

/// 0xCB escape entry owning the secondary table
#[derive(Debug)]
pub struct Prefix {
    table: InstructionTable,
}

impl Prefix {
    pub fn new(table: InstructionTable) -> Self {
        Self { table }
    }

    /// The secondary table
    pub fn table(&self) -> &InstructionTable {
        &self.table
    }

    fn resolve(&self, registers: &mut Registers, bus: &dyn Bus) -> Result<&dyn Instruction> {
        let opcode = registers.fetch_byte(bus)?;
        self.table.get(opcode).ok_or(EmulatorError::UnknownOpcode {
            opcode,
            prefix: Some(PREFIX_OPCODE),
        })
    }
}

impl Instruction for Prefix {
    fn name(&self) -> &'static str {
        "PREFIX CB"
    }

    fn opcode(&self) -> u8 {
        PREFIX_OPCODE
    }

    fn cycles(&self) -> u32 {
        4
    }

    fn init<'a>(
        &'a self,
        registers: &mut Registers,
        bus: &dyn Bus,
    ) -> Result<Option<&'a dyn Instruction>> {
        self.resolve(registers, bus).map(Some)
    }

    /// Only reached when called without `init`; fetches the sub-opcode itself.
    fn execute(&self, registers: &mut Registers, bus: &mut dyn Bus) -> Result<Step> {
        let nested = self.resolve(registers, bus)?;
        nested.execute(registers, bus)
    }
}

/// BIT b,r: Z set when the bit is clear, N cleared, H set
#[derive(Debug, Clone, Copy)]
pub struct BitTest {
    pub opcode: u8,
    pub name: &'static str,
    pub bit: u8,
    pub source: Register,
}

impl Instruction for BitTest {
    fn name(&self) -> &'static str {
        self.name
    }

    fn opcode(&self) -> u8 {
        self.opcode
    }

    fn cycles(&self) -> u32 {
        8
    }

    fn execute(&self, registers: &mut Registers, _bus: &mut dyn Bus) -> Result<Step> {
        let set = is_bit_set(registers.get(self.source), self.bit);
        let flags = FlagDirectives::NONE
            .zero(!set)
            .subtract(false)
            .half_carry(true);
        Ok(Step::new(self.cycles()).with_flags(flags))
    }
}
