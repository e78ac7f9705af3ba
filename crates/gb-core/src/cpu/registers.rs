//! LR35902 register file
//!
//! Eight 8-bit registers, pairable into AF/BC/DE/HL, plus the 16-bit
//! program counter and stack pointer. Pairs are not stored; they are
//! composed from and split into the underlying 8-bit registers.

use std::fmt;

use super::Bus;
use crate::bits::{assign_bit, is_bit_set};
use crate::error::Result;

/// 8-bit registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    A,
    B,
    C,
    D,
    E,
    F,
    H,
    L,
}

impl Register {
    /// Assembler name of the register
    pub fn name(self) -> &'static str {
        match self {
            Register::A => "A",
            Register::B => "B",
            Register::C => "C",
            Register::D => "D",
            Register::E => "E",
            Register::F => "F",
            Register::H => "H",
            Register::L => "L",
        }
    }
}

/// 16-bit views: the four register pairs plus SP and PC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordRegister {
    AF,
    BC,
    DE,
    HL,
    SP,
    PC,
}

impl WordRegister {
    /// Assembler name of the register
    pub fn name(self) -> &'static str {
        match self {
            WordRegister::AF => "AF",
            WordRegister::BC => "BC",
            WordRegister::DE => "DE",
            WordRegister::HL => "HL",
            WordRegister::SP => "SP",
            WordRegister::PC => "PC",
        }
    }
}

/// Status flags held in the upper nibble of F
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Zero,
    Subtract,
    HalfCarry,
    Carry,
}

impl Flag {
    /// Bit position of the flag inside F
    pub const fn bit(self) -> u8 {
        match self {
            Flag::Zero => 7,
            Flag::Subtract => 6,
            Flag::HalfCarry => 5,
            Flag::Carry => 4,
        }
    }
}

/// CPU register file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    a: u8,
    b: u8,
    c: u8,
    d: u8,
    e: u8,
    f: u8,
    h: u8,
    l: u8,
    pc: u16,
    sp: u16,
}

impl Registers {
    /// Create a register file with every register cleared
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an 8-bit register
    pub fn get(&self, register: Register) -> u8 {
        match register {
            Register::A => self.a,
            Register::B => self.b,
            Register::C => self.c,
            Register::D => self.d,
            Register::E => self.e,
            Register::F => self.f,
            Register::H => self.h,
            Register::L => self.l,
        }
    }

    /// Write an 8-bit register, keeping only the low 8 bits of `value`
    pub fn set(&mut self, register: Register, value: impl Into<u16>) {
        let value = (value.into() & 0xFF) as u8;
        let slot = match register {
            Register::A => &mut self.a,
            Register::B => &mut self.b,
            Register::C => &mut self.c,
            Register::D => &mut self.d,
            Register::E => &mut self.e,
            Register::F => &mut self.f,
            Register::H => &mut self.h,
            Register::L => &mut self.l,
        };
        *slot = value;
    }

    /// Read a 16-bit register or pair
    pub fn get_word(&self, register: WordRegister) -> u16 {
        let join = |high: u8, low: u8| ((high as u16) << 8) | low as u16;
        match register {
            WordRegister::AF => join(self.a, self.f),
            WordRegister::BC => join(self.b, self.c),
            WordRegister::DE => join(self.d, self.e),
            WordRegister::HL => join(self.h, self.l),
            WordRegister::SP => self.sp,
            WordRegister::PC => self.pc,
        }
    }

    /// Write a 16-bit register, splitting pairs into their high and low halves
    pub fn set_word(&mut self, register: WordRegister, value: u16) {
        let high = (value >> 8) as u8;
        let low = (value & 0xFF) as u8;
        match register {
            WordRegister::AF => (self.a, self.f) = (high, low),
            WordRegister::BC => (self.b, self.c) = (high, low),
            WordRegister::DE => (self.d, self.e) = (high, low),
            WordRegister::HL => (self.h, self.l) = (high, low),
            WordRegister::SP => self.sp = value,
            WordRegister::PC => self.pc = value,
        }
    }

    /// Accumulator
    pub fn a(&self) -> u8 {
        self.a
    }

    /// Flags register
    pub fn f(&self) -> u8 {
        self.f
    }

    /// Program counter
    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Stack pointer
    pub fn sp(&self) -> u16 {
        self.sp
    }

    pub fn set_sp(&mut self, value: u16) {
        self.sp = value;
    }

    /// Advance PC by `delta`, wrapping at 16 bits
    pub fn advance_pc(&mut self, delta: u16) {
        self.pc = self.pc.wrapping_add(delta);
    }

    /// Test one flag bit of F
    pub fn flag(&self, flag: Flag) -> bool {
        is_bit_set(self.f, flag.bit())
    }

    /// Set or clear one flag bit of F, leaving the other seven bits alone
    pub fn set_flag(&mut self, flag: Flag, value: bool) {
        self.f = assign_bit(self.f, flag.bit(), value);
    }

    /// Read the byte at PC through `bus` and advance PC by one
    pub fn fetch_byte(&mut self, bus: &dyn Bus) -> Result<u8> {
        let byte = bus.read_byte(self.pc)?;
        self.advance_pc(1);
        Ok(byte)
    }

    /// Read a little-endian word at PC (low byte first) and advance PC by two
    pub fn fetch_word(&mut self, bus: &dyn Bus) -> Result<u16> {
        let low = self.fetch_byte(bus)? as u16;
        let high = self.fetch_byte(bus)? as u16;
        Ok((high << 8) | low)
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |flag: Flag, on: char| if self.flag(flag) { on } else { '-' };
        write!(
            f,
            "A={:02X} B={:02X} C={:02X} D={:02X} E={:02X} HL={:04X} SP={:04X} PC={:04X} flags={}{}{}{}",
            self.a,
            self.b,
            self.c,
            self.d,
            self.e,
            self.get_word(WordRegister::HL),
            self.sp,
            self.pc,
            flag(Flag::Zero, 'Z'),
            flag(Flag::Subtract, 'N'),
            flag(Flag::HalfCarry, 'H'),
            flag(Flag::Carry, 'C'),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_masks_to_eight_bits() {
        let mut regs = Registers::new();
        regs.set(Register::B, 0x1FFu16);
        assert_eq!(regs.get(Register::B), 0xFF);
        regs.set(Register::L, 0x0100u16);
        assert_eq!(regs.get(Register::L), 0x00);
        regs.set(Register::A, 0x42u8);
        assert_eq!(regs.a(), 0x42);
    }

    #[test]
    fn test_pairs_compose_and_split() {
        let mut regs = Registers::new();
        regs.set_word(WordRegister::BC, 0x1234);
        assert_eq!(regs.get_word(WordRegister::BC), 0x1234);
        assert_eq!(regs.get(Register::B), 0x12);
        assert_eq!(regs.get(Register::C), 0x34);

        regs.set(Register::H, 0xABu8);
        regs.set(Register::L, 0xCDu8);
        assert_eq!(regs.get_word(WordRegister::HL), 0xABCD);
    }

    #[test]
    fn test_f_low_nibble_is_retained() {
        let mut regs = Registers::new();
        regs.set_word(WordRegister::AF, 0x01FF);
        assert_eq!(regs.f(), 0xFF);
        regs.set_flag(Flag::Zero, false);
        assert_eq!(regs.f(), 0x7F);
    }

    #[test]
    fn test_flags_are_independent() {
        let mut regs = Registers::new();
        regs.set_flag(Flag::Subtract, true);
        regs.set_flag(Flag::Carry, true);
        regs.set_flag(Flag::Zero, true);
        assert!(regs.flag(Flag::Zero));
        assert!(regs.flag(Flag::Subtract));
        assert!(!regs.flag(Flag::HalfCarry));
        assert!(regs.flag(Flag::Carry));

        regs.set_flag(Flag::Zero, false);
        assert!(!regs.flag(Flag::Zero));
        assert!(regs.flag(Flag::Subtract));
        assert!(!regs.flag(Flag::HalfCarry));
        assert!(regs.flag(Flag::Carry));
        assert_eq!(regs.f(), 0b0101_0000);
    }

    #[test]
    fn test_advance_pc_wraps() {
        let mut regs = Registers::new();
        regs.set_pc(0xFFFF);
        regs.advance_pc(2);
        assert_eq!(regs.pc(), 0x0001);
    }

    #[test]
    fn test_register_names() {
        assert_eq!(Register::A.name(), "A");
        assert_eq!(Register::L.name(), "L");
        assert_eq!(WordRegister::HL.name(), "HL");
        assert_eq!(WordRegister::PC.name(), "PC");
    }

    #[test]
    fn test_display() {
        let mut regs = Registers::new();
        regs.set_word(WordRegister::HL, 0x9FFF);
        regs.set_flag(Flag::Zero, true);
        regs.set_flag(Flag::Carry, true);
        assert_eq!(
            regs.to_string(),
            "A=00 B=00 C=00 D=00 E=00 HL=9FFF SP=0000 PC=0000 flags=Z--C"
        );
    }
}
