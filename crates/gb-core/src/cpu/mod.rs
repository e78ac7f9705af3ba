//! CPU module - Sharp LR35902 implementation
//!
//! Each [`Cpu::tick`] runs one instruction through the fixed sequence
//! fetch, resolve, init, execute and commit flags, and reports the cycles
//! the instruction consumed. Instructions are looked up in an injected
//! [`InstructionTable`]; see [`opcodes`] for the catalogue and how to add
//! to it.

pub mod instruction;
pub mod opcodes;
pub mod prefix;
pub mod registers;

pub use instruction::{FlagDirectives, Instruction, InstructionTable, Step};
pub use registers::{Flag, Register, Registers, WordRegister};

use crate::config::Config;
use crate::error::{EmulatorError, Result};

/// Memory access as seen by the CPU
pub trait Bus {
    /// Read `size` bytes starting at `address`
    fn read(&self, address: u16, size: usize) -> Result<&[u8]>;

    /// Write `value` byte by byte starting at `address`
    fn write(&mut self, address: u16, value: &[u8]) -> Result<()>;

    /// Read a single byte
    fn read_byte(&self, address: u16) -> Result<u8> {
        self.read(address, 1).map(|bytes| bytes[0])
    }
}

/// CPU emulator state
#[derive(Debug)]
pub struct Cpu {
    registers: Registers,
    instructions: InstructionTable,
}

impl Cpu {
    /// Create a CPU with the standard primary and CB tables built from `config`
    pub fn new(config: &Config) -> Self {
        Self::with_table(InstructionTable::primary(config))
    }

    /// Create a CPU dispatching through `instructions`
    pub fn with_table(instructions: InstructionTable) -> Self {
        Self {
            registers: Registers::new(),
            instructions,
        }
    }

    /// Get CPU registers
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Get mutable CPU registers
    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    /// Primary opcode table
    pub fn instructions(&self) -> &InstructionTable {
        &self.instructions
    }

    /// Execute one instruction and return the cycles it consumed.
    ///
    /// If the opcode (or the CB sub-opcode) is unknown, PC is put back where
    /// it was and nothing else has changed.
    pub fn tick(&mut self, bus: &mut dyn Bus) -> Result<u32> {
        let start = self.registers.pc();
        let instruction = match decode(&self.instructions, &mut self.registers, bus) {
            Ok(instruction) => instruction,
            Err(err) => {
                self.registers.set_pc(start);
                return Err(err);
            }
        };

        let step = instruction.execute(&mut self.registers, bus)?;
        step.flags.commit(&mut self.registers);

        log::trace!(
            "{:04X} {:<12} {} cycles={}",
            start,
            instruction.name(),
            self.registers,
            step.cycles
        );
        Ok(step.cycles)
    }
}

/// Fetch the opcode at PC and resolve it, following the CB prefix if needed
fn decode<'t>(
    table: &'t InstructionTable,
    registers: &mut Registers,
    bus: &dyn Bus,
) -> Result<&'t dyn Instruction> {
    let opcode = registers.fetch_byte(bus)?;
    let entry = table
        .get(opcode)
        .ok_or(EmulatorError::UnknownOpcode { opcode, prefix: None })?;
    Ok(entry.init(registers, bus)?.unwrap_or(entry))
}


#[cfg(test)]
mod tests {
    use super::test_bus::FlatBus;
    use super::*;

    fn cpu() -> Cpu {
        Cpu::new(&Config::default())
    }

    #[test]
    fn test_tick_reports_cycles_and_advances_pc() {
        let mut cpu = cpu();
        let mut bus = FlatBus::with_program(&[0x00, 0x01, 0x34, 0x12]);
        assert_eq!(cpu.tick(&mut bus).unwrap(), 4);
        assert_eq!(cpu.registers().pc(), 1);
        assert_eq!(cpu.tick(&mut bus).unwrap(), 12);
        assert_eq!(cpu.registers().pc(), 4);
        assert_eq!(cpu.registers().get_word(WordRegister::BC), 0x1234);
    }

    #[test]
    fn test_unknown_opcode_leaves_state_untouched() {
        let mut cpu = cpu();
        let mut bus = FlatBus::with_program(&[0xFF]);
        let before = *cpu.registers();
        let err = cpu.tick(&mut bus).unwrap_err();
        assert_eq!(err, EmulatorError::UnknownOpcode { opcode: 0xFF, prefix: None });
        assert_eq!(*cpu.registers(), before);
    }

    #[test]
    fn test_unknown_prefixed_opcode_restores_pc() {
        let mut cpu = cpu();
        let mut bus = FlatBus::with_program(&[0xCB, 0x00]);
        let err = cpu.tick(&mut bus).unwrap_err();
        assert_eq!(
            err,
            EmulatorError::UnknownOpcode { opcode: 0x00, prefix: Some(0xCB) }
        );
        assert_eq!(cpu.registers().pc(), 0);
    }

    #[test]
    fn test_prefixed_instruction_reports_nested_cycles() {
        let mut cpu = cpu();
        let mut bus = FlatBus::with_program(&[0xCB, 0x7C]);
        assert_eq!(cpu.tick(&mut bus).unwrap(), 8);
        assert_eq!(cpu.registers().pc(), 2);
        assert!(cpu.registers().flag(Flag::Zero));
    }

    #[test]
    fn test_flags_committed_after_execute() {
        let mut cpu = cpu();
        cpu.registers_mut().set(Register::A, 0x5Au8);
        cpu.registers_mut().set_flag(Flag::Carry, true);
        cpu.registers_mut().set_flag(Flag::Subtract, true);
        let mut bus = FlatBus::with_program(&[0xAF]);
        cpu.tick(&mut bus).unwrap();
        assert_eq!(cpu.registers().a(), 0);
        assert_eq!(cpu.registers().f(), 0b1000_0000);
    }

    #[test]
    fn test_custom_table_is_used() {
        let mut table = InstructionTable::new();
        table.register(opcodes::Nop);
        let mut cpu = Cpu::with_table(table);
        assert_eq!(cpu.instructions().opcodes().collect::<Vec<_>>(), vec![0x00]);
        let mut bus = FlatBus::with_program(&[0x00, 0x01]);
        assert_eq!(cpu.tick(&mut bus).unwrap(), 4);
        assert!(matches!(
            cpu.tick(&mut bus),
            Err(EmulatorError::UnknownOpcode { opcode: 0x01, .. })
        ));
    }
}
