//! Primary opcode catalogue
//!
//! Every instruction shape is a small struct implementing [`Instruction`];
//! concrete opcodes are instances of those shapes registered in
//! [`InstructionTable::primary`]. Adding an opcode means registering another
//! instance (or a new shape); the dispatch loop never changes.
//!
//! Cycle counts are in clock cycles (4 per machine cycle).

use super::instruction::{FlagDirectives, Instruction, InstructionTable, Step};
use super::prefix::Prefix;
use super::registers::{Flag, Register, Registers, WordRegister};
use super::Bus;
use crate::config::{Config, HalfCarryRule};
use crate::error::Result;

/// Base address of the `LDH`/`LD (C)` high page
pub const HIGH_PAGE: u16 = 0xFF00;

impl InstructionTable {
    /// Build the primary table, including the CB escape entry
    pub fn primary(config: &Config) -> Self {
        use Register::*;
        use WordRegister::{BC, DE, HL, SP};

        let mut table = Self::new();
        table.register(Nop);

        for (opcode, name, target) in [
            (0x01, "LD BC,d16", BC),
            (0x11, "LD DE,d16", DE),
            (0x21, "LD HL,d16", HL),
            (0x31, "LD SP,d16", SP),
        ] {
            table.register(LoadWordImmediate { opcode, name, target });
        }

        for (opcode, name, pointer, post) in [
            (0x02, "LD (BC),A", BC, PointerStep::Keep),
            (0x12, "LD (DE),A", DE, PointerStep::Keep),
            (0x22, "LD (HL+),A", HL, PointerStep::Increment),
            (0x32, "LD (HL-),A", HL, PointerStep::Decrement),
            (0x77, "LD (HL),A", HL, PointerStep::Keep),
        ] {
            table.register(StoreAccumulator { opcode, name, pointer, post });
        }
        table.register(LoadAccumulator { opcode: 0x1A, name: "LD A,(DE)", pointer: DE });

        for (opcode, name, target) in [
            (0x06, "LD B,d8", B),
            (0x0E, "LD C,d8", C),
            (0x1E, "LD E,d8", E),
            (0x2E, "LD L,d8", L),
            (0x3E, "LD A,d8", A),
        ] {
            table.register(LoadByteImmediate { opcode, name, target });
        }

        table.register(LoadRegister { opcode: 0x4F, name: "LD C,A", target: C, source: A });
        table.register(LoadRegister { opcode: 0x7B, name: "LD A,E", target: A, source: E });

        let half_carry = config.inc_half_carry;
        for (opcode, name, target) in [
            (0x04, "INC B", B),
            (0x0C, "INC C", C),
            (0x14, "INC D", D),
            (0x1C, "INC E", E),
            (0x24, "INC H", H),
            (0x3C, "INC A", A),
        ] {
            table.register(Increment { opcode, name, target, half_carry });
        }

        for (opcode, name, target) in [(0x05, "DEC B", B), (0x0D, "DEC C", C), (0x3D, "DEC A", A)] {
            table.register(Decrement { opcode, name, target });
        }

        table.register(IncrementWord { opcode: 0x13, name: "INC DE", target: DE });
        table.register(IncrementWord { opcode: 0x23, name: "INC HL", target: HL });

        for (opcode, name, source) in [
            (0xA8, "XOR B", B),
            (0xA9, "XOR C", C),
            (0xAA, "XOR D", D),
            (0xAB, "XOR E", E),
            (0xAC, "XOR H", H),
            (0xAD, "XOR L", L),
            (0xAF, "XOR A", A),
        ] {
            table.register(Xor { opcode, name, source });
        }

        for (opcode, name, condition) in [
            (0x18, "JR r8", Condition::Always),
            (0x20, "JR NZ,r8", Condition::NotZero),
            (0x28, "JR Z,r8", Condition::Zero),
            (0x30, "JR NC,r8", Condition::NotCarry),
            (0x38, "JR C,r8", Condition::Carry),
        ] {
            table.register(JumpRelative { opcode, name, condition });
        }

        table.register(StoreHighImmediate);
        table.register(StoreHighC);

        table.register(Prefix::new(InstructionTable::prefixed()));
        table
    }
}

/// 0x00 NOP
#[derive(Debug, Clone, Copy)]
pub struct Nop;

impl Instruction for Nop {
    fn name(&self) -> &'static str {
        "NOP"
    }

    fn opcode(&self) -> u8 {
        0x00
    }

    fn cycles(&self) -> u32 {
        4
    }

    fn execute(&self, _registers: &mut Registers, _bus: &mut dyn Bus) -> Result<Step> {
        Ok(Step::new(self.cycles()))
    }
}

/// LD rr,d16: 16-bit little-endian immediate into a pair or SP
#[derive(Debug, Clone, Copy)]
pub struct LoadWordImmediate {
    pub opcode: u8,
    pub name: &'static str,
    pub target: WordRegister,
}

impl Instruction for LoadWordImmediate {
    fn name(&self) -> &'static str {
        self.name
    }

    fn opcode(&self) -> u8 {
        self.opcode
    }

    fn cycles(&self) -> u32 {
        12
    }

    fn execute(&self, registers: &mut Registers, bus: &mut dyn Bus) -> Result<Step> {
        let value = registers.fetch_word(bus)?;
        registers.set_word(self.target, value);
        Ok(Step::new(self.cycles()))
    }
}

/// What happens to the pointer register after an indirect store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerStep {
    Keep,
    Increment,
    Decrement,
}

/// LD (rr),A: store the accumulator at the address held in a pair
#[derive(Debug, Clone, Copy)]
pub struct StoreAccumulator {
    pub opcode: u8,
    pub name: &'static str,
    pub pointer: WordRegister,
    pub post: PointerStep,
}

impl Instruction for StoreAccumulator {
    fn name(&self) -> &'static str {
        self.name
    }

    fn opcode(&self) -> u8 {
        self.opcode
    }

    fn cycles(&self) -> u32 {
        8
    }

    fn execute(&self, registers: &mut Registers, bus: &mut dyn Bus) -> Result<Step> {
        let address = registers.get_word(self.pointer);
        bus.write(address, &[registers.a()])?;
        match self.post {
            PointerStep::Keep => {}
            PointerStep::Increment => registers.set_word(self.pointer, address.wrapping_add(1)),
            PointerStep::Decrement => registers.set_word(self.pointer, address.wrapping_sub(1)),
        }
        Ok(Step::new(self.cycles()))
    }
}

/// LD A,(rr): load the accumulator from the address held in a pair
#[derive(Debug, Clone, Copy)]
pub struct LoadAccumulator {
    pub opcode: u8,
    pub name: &'static str,
    pub pointer: WordRegister,
}

impl Instruction for LoadAccumulator {
    fn name(&self) -> &'static str {
        self.name
    }

    fn opcode(&self) -> u8 {
        self.opcode
    }

    fn cycles(&self) -> u32 {
        8
    }

    fn execute(&self, registers: &mut Registers, bus: &mut dyn Bus) -> Result<Step> {
        let value = bus.read_byte(registers.get_word(self.pointer))?;
        registers.set(Register::A, value);
        Ok(Step::new(self.cycles()))
    }
}

/// LD r,d8
#[derive(Debug, Clone, Copy)]
pub struct LoadByteImmediate {
    pub opcode: u8,
    pub name: &'static str,
    pub target: Register,
}

impl Instruction for LoadByteImmediate {
    fn name(&self) -> &'static str {
        self.name
    }

    fn opcode(&self) -> u8 {
        self.opcode
    }

    fn cycles(&self) -> u32 {
        8
    }

    fn execute(&self, registers: &mut Registers, bus: &mut dyn Bus) -> Result<Step> {
        let value = registers.fetch_byte(bus)?;
        registers.set(self.target, value);
        Ok(Step::new(self.cycles()))
    }
}

/// LD r,r'
#[derive(Debug, Clone, Copy)]
pub struct LoadRegister {
    pub opcode: u8,
    pub name: &'static str,
    pub target: Register,
    pub source: Register,
}

impl Instruction for LoadRegister {
    fn name(&self) -> &'static str {
        self.name
    }

    fn opcode(&self) -> u8 {
        self.opcode
    }

    fn cycles(&self) -> u32 {
        4
    }

    fn execute(&self, registers: &mut Registers, _bus: &mut dyn Bus) -> Result<Step> {
        let value = registers.get(self.source);
        registers.set(self.target, value);
        Ok(Step::new(self.cycles()))
    }
}

/// INC r: Z from the result, N cleared, H per the configured rule
#[derive(Debug, Clone, Copy)]
pub struct Increment {
    pub opcode: u8,
    pub name: &'static str,
    pub target: Register,
    pub half_carry: HalfCarryRule,
}

impl Instruction for Increment {
    fn name(&self) -> &'static str {
        self.name
    }

    fn opcode(&self) -> u8 {
        self.opcode
    }

    fn cycles(&self) -> u32 {
        4
    }

    fn execute(&self, registers: &mut Registers, _bus: &mut dyn Bus) -> Result<Step> {
        let before = registers.get(self.target);
        let result = before.wrapping_add(1);
        registers.set(self.target, result);
        let flags = FlagDirectives::NONE
            .zero(result == 0)
            .subtract(false)
            .half_carry(self.half_carry.increment(before));
        Ok(Step::new(self.cycles()).with_flags(flags))
    }
}

/// DEC r: Z from the result, N set, H on borrow from bit 4
#[derive(Debug, Clone, Copy)]
pub struct Decrement {
    pub opcode: u8,
    pub name: &'static str,
    pub target: Register,
}

impl Instruction for Decrement {
    fn name(&self) -> &'static str {
        self.name
    }

    fn opcode(&self) -> u8 {
        self.opcode
    }

    fn cycles(&self) -> u32 {
        4
    }

    fn execute(&self, registers: &mut Registers, _bus: &mut dyn Bus) -> Result<Step> {
        let before = registers.get(self.target);
        let result = before.wrapping_sub(1);
        registers.set(self.target, result);
        let flags = FlagDirectives::NONE
            .zero(result == 0)
            .subtract(true)
            .half_carry(before & 0x0F == 0);
        Ok(Step::new(self.cycles()).with_flags(flags))
    }
}

/// INC rr: 16-bit pointer increment, flags untouched
#[derive(Debug, Clone, Copy)]
pub struct IncrementWord {
    pub opcode: u8,
    pub name: &'static str,
    pub target: WordRegister,
}

impl Instruction for IncrementWord {
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
        let value = registers.get_word(self.target).wrapping_add(1);
        registers.set_word(self.target, value);
        Ok(Step::new(self.cycles()))
    }
}

/// XOR r: A ^= r; Z from the result, N/H/C cleared
#[derive(Debug, Clone, Copy)]
pub struct Xor {
    pub opcode: u8,
    pub name: &'static str,
    pub source: Register,
}

impl Instruction for Xor {
    fn name(&self) -> &'static str {
        self.name
    }

    fn opcode(&self) -> u8 {
        self.opcode
    }

    fn cycles(&self) -> u32 {
        4
    }

    fn execute(&self, registers: &mut Registers, _bus: &mut dyn Bus) -> Result<Step> {
        let result = registers.a() ^ registers.get(self.source);
        registers.set(Register::A, result);
        let flags = FlagDirectives::NONE
            .zero(result == 0)
            .subtract(false)
            .half_carry(false)
            .carry(false);
        Ok(Step::new(self.cycles()).with_flags(flags))
    }
}

/// Branch condition for relative jumps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Always,
    NotZero,
    Zero,
    NotCarry,
    Carry,
}

impl Condition {
    pub fn holds(self, registers: &Registers) -> bool {
        match self {
            Condition::Always => true,
            Condition::NotZero => !registers.flag(Flag::Zero),
            Condition::Zero => registers.flag(Flag::Zero),
            Condition::NotCarry => !registers.flag(Flag::Carry),
            Condition::Carry => registers.flag(Flag::Carry),
        }
    }
}

/// JR cc,r8: signed 8-bit displacement from the PC after the operand
#[derive(Debug, Clone, Copy)]
pub struct JumpRelative {
    pub opcode: u8,
    pub name: &'static str,
    pub condition: Condition,
}

impl JumpRelative {
    pub const TAKEN_CYCLES: u32 = 12;
    pub const NOT_TAKEN_CYCLES: u32 = 8;
}

impl Instruction for JumpRelative {
    fn name(&self) -> &'static str {
        self.name
    }

    fn opcode(&self) -> u8 {
        self.opcode
    }

    fn cycles(&self) -> u32 {
        Self::NOT_TAKEN_CYCLES
    }

    fn execute(&self, registers: &mut Registers, bus: &mut dyn Bus) -> Result<Step> {
        let offset = registers.fetch_byte(bus)? as i8;
        if !self.condition.holds(registers) {
            return Ok(Step::new(Self::NOT_TAKEN_CYCLES));
        }
        let target = registers.pc().wrapping_add_signed(offset as i16);
        registers.set_pc(target);
        Ok(Step::new(Self::TAKEN_CYCLES))
    }
}

/// 0xE0 LDH (a8),A: store A at 0xFF00 + immediate
#[derive(Debug, Clone, Copy)]
pub struct StoreHighImmediate;

impl Instruction for StoreHighImmediate {
    fn name(&self) -> &'static str {
        "LDH (a8),A"
    }

    fn opcode(&self) -> u8 {
        0xE0
    }

    fn cycles(&self) -> u32 {
        12
    }

    fn execute(&self, registers: &mut Registers, bus: &mut dyn Bus) -> Result<Step> {
        let address = HIGH_PAGE + registers.fetch_byte(bus)? as u16;
        bus.write(address, &[registers.a()])?;
        Ok(Step::new(self.cycles()))
    }
}

/// 0xE2 LD (C),A: store A at 0xFF00 + C
#[derive(Debug, Clone, Copy)]
pub struct StoreHighC;

impl Instruction for StoreHighC {
    fn name(&self) -> &'static str {
        "LD (C),A"
    }

    fn opcode(&self) -> u8 {
        0xE2
    }

    fn cycles(&self) -> u32 {
        8
    }

    fn execute(&self, registers: &mut Registers, bus: &mut dyn Bus) -> Result<Step> {
        let address = HIGH_PAGE + registers.get(Register::C) as u16;
        bus.write(address, &[registers.a()])?;
        Ok(Step::new(self.cycles()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_bus::FlatBus;
    use super::*;

    fn run(
        instruction: &dyn Instruction,
        registers: &mut Registers,
        bus: &mut FlatBus,
    ) -> Step {
        let step = instruction.execute(registers, bus).unwrap();
        step.flags.commit(registers);
        step
    }

    #[test]
    fn test_primary_table_contents() {
        let table = InstructionTable::primary(&Config::default());
        for opcode in [0x00, 0x01, 0x02, 0x0C, 0x0E, 0x11, 0x12, 0x1C, 0x1E, 0x20, 0x21, 0x2E,
            0x31, 0x32, 0x3E, 0x77, 0xAF, 0xCB, 0xE0, 0xE2]
        {
            let instruction = table.get(opcode).unwrap();
            assert_eq!(instruction.opcode(), opcode);
        }
        assert!(table.get(0xFF).is_none());
        assert!(table.get(0xCD).is_none());
    }

    #[test]
    fn test_load_word_immediate_is_little_endian() {
        let mut regs = Registers::new();
        let mut bus = FlatBus::with_program(&[0xFE, 0xFF]);
        let ld = LoadWordImmediate { opcode: 0x31, name: "LD SP,d16", target: WordRegister::SP };
        let step = run(&ld, &mut regs, &mut bus);
        assert_eq!(step.cycles, 12);
        assert_eq!(regs.sp(), 0xFFFE);
        assert_eq!(regs.pc(), 2);
    }

    #[test]
    fn test_store_accumulator_post_decrement() {
        let mut regs = Registers::new();
        regs.set(Register::A, 0x77u8);
        regs.set_word(WordRegister::HL, 0x9FFF);
        let mut bus = FlatBus::with_program(&[]);
        let st = StoreAccumulator {
            opcode: 0x32,
            name: "LD (HL-),A",
            pointer: WordRegister::HL,
            post: PointerStep::Decrement,
        };
        assert_eq!(run(&st, &mut regs, &mut bus).cycles, 8);
        assert_eq!(bus.memory[0x9FFF], 0x77);
        assert_eq!(regs.get_word(WordRegister::HL), 0x9FFE);
    }

    #[test]
    fn test_store_accumulator_post_increment_wraps() {
        let mut regs = Registers::new();
        regs.set_word(WordRegister::HL, 0xFFFF);
        let mut bus = FlatBus::with_program(&[]);
        let st = StoreAccumulator {
            opcode: 0x22,
            name: "LD (HL+),A",
            pointer: WordRegister::HL,
            post: PointerStep::Increment,
        };
        run(&st, &mut regs, &mut bus);
        assert_eq!(regs.get_word(WordRegister::HL), 0x0000);
    }

    #[test]
    fn test_increment_zero_result_rule() {
        let mut regs = Registers::new();
        regs.set(Register::C, 0xFFu8);
        regs.set_flag(Flag::Subtract, true);
        regs.set_flag(Flag::Carry, true);
        let mut bus = FlatBus::with_program(&[]);
        let inc = Increment {
            opcode: 0x0C,
            name: "INC C",
            target: Register::C,
            half_carry: HalfCarryRule::ZeroResult,
        };
        run(&inc, &mut regs, &mut bus);
        assert_eq!(regs.get(Register::C), 0x00);
        assert!(regs.flag(Flag::Zero));
        assert!(!regs.flag(Flag::Subtract));
        assert!(regs.flag(Flag::HalfCarry));
        assert!(regs.flag(Flag::Carry));

        regs.set(Register::C, 0x0Fu8);
        run(&inc, &mut regs, &mut bus);
        assert_eq!(regs.get(Register::C), 0x10);
        assert!(!regs.flag(Flag::Zero));
        assert!(!regs.flag(Flag::HalfCarry));
    }

    #[test]
    fn test_increment_nibble_carry_rule() {
        let mut regs = Registers::new();
        regs.set(Register::E, 0x0Fu8);
        let mut bus = FlatBus::with_program(&[]);
        let inc = Increment {
            opcode: 0x1C,
            name: "INC E",
            target: Register::E,
            half_carry: HalfCarryRule::NibbleCarry,
        };
        run(&inc, &mut regs, &mut bus);
        assert_eq!(regs.get(Register::E), 0x10);
        assert!(regs.flag(Flag::HalfCarry));
        assert!(!regs.flag(Flag::Zero));
    }

    #[test]
    fn test_decrement_flags() {
        let mut regs = Registers::new();
        regs.set(Register::B, 0x10u8);
        let mut bus = FlatBus::with_program(&[]);
        let dec = Decrement { opcode: 0x05, name: "DEC B", target: Register::B };
        run(&dec, &mut regs, &mut bus);
        assert_eq!(regs.get(Register::B), 0x0F);
        assert!(regs.flag(Flag::Subtract));
        assert!(regs.flag(Flag::HalfCarry));
        assert!(!regs.flag(Flag::Zero));

        regs.set(Register::B, 0x01u8);
        run(&dec, &mut regs, &mut bus);
        assert!(regs.flag(Flag::Zero));
        assert!(!regs.flag(Flag::HalfCarry));
    }

    #[test]
    fn test_xor_register() {
        let mut regs = Registers::new();
        regs.set(Register::A, 0b1100_1100u8);
        regs.set(Register::B, 0b1010_1010u8);
        regs.set_flag(Flag::Carry, true);
        let mut bus = FlatBus::with_program(&[]);
        let xor = Xor { opcode: 0xA8, name: "XOR B", source: Register::B };
        run(&xor, &mut regs, &mut bus);
        assert_eq!(regs.a(), 0b0110_0110);
        assert_eq!(regs.f(), 0);
    }

    #[test]
    fn test_jump_relative_backwards() {
        let mut regs = Registers::new();
        regs.set_pc(0x0010);
        let mut bus = FlatBus::with_program(&[]);
        bus.memory[0x0010] = 0xFB; // -5
        let jr = JumpRelative { opcode: 0x18, name: "JR r8", condition: Condition::Always };
        let step = run(&jr, &mut regs, &mut bus);
        assert_eq!(step.cycles, 12);
        assert_eq!(regs.pc(), 0x0011 - 5);
    }

    #[test]
    fn test_jump_relative_carry_conditions() {
        let mut regs = Registers::new();
        let mut bus = FlatBus::with_program(&[0x02, 0x02]);
        let jr_c = JumpRelative { opcode: 0x38, name: "JR C,r8", condition: Condition::Carry };
        assert_eq!(run(&jr_c, &mut regs, &mut bus).cycles, 8);
        assert_eq!(regs.pc(), 1);

        regs.set_flag(Flag::Carry, true);
        assert_eq!(run(&jr_c, &mut regs, &mut bus).cycles, 12);
        assert_eq!(regs.pc(), 4);
    }

    #[test]
    fn test_store_high_page() {
        let mut regs = Registers::new();
        regs.set(Register::A, 0x80u8);
        regs.set(Register::C, 0x11u8);
        let mut bus = FlatBus::with_program(&[0x26]);
        assert_eq!(run(&StoreHighImmediate, &mut regs, &mut bus).cycles, 12);
        assert_eq!(bus.memory[0xFF26], 0x80);
        assert_eq!(run(&StoreHighC, &mut regs, &mut bus).cycles, 8);
        assert_eq!(bus.memory[0xFF11], 0x80);
    }

    #[test]
    fn test_load_accumulator_and_register_copy() {
        let mut regs = Registers::new();
        regs.set_word(WordRegister::DE, 0x0104);
        let mut bus = FlatBus::with_program(&[]);
        bus.memory[0x0104] = 0xCE;
        let ld = LoadAccumulator { opcode: 0x1A, name: "LD A,(DE)", pointer: WordRegister::DE };
        assert_eq!(run(&ld, &mut regs, &mut bus).cycles, 8);
        assert_eq!(regs.a(), 0xCE);

        let copy = LoadRegister {
            opcode: 0x4F,
            name: "LD C,A",
            target: Register::C,
            source: Register::A,
        };
        assert_eq!(run(&copy, &mut regs, &mut bus).cycles, 4);
        assert_eq!(regs.get(Register::C), 0xCE);
    }

    #[test]
    fn test_increment_word_keeps_flags() {
        let mut regs = Registers::new();
        regs.set_word(WordRegister::DE, 0x00FF);
        regs.set_flag(Flag::Zero, true);
        let mut bus = FlatBus::with_program(&[]);
        let inc = IncrementWord { opcode: 0x13, name: "INC DE", target: WordRegister::DE };
        assert_eq!(run(&inc, &mut regs, &mut bus).cycles, 8);
        assert_eq!(regs.get_word(WordRegister::DE), 0x0100);
        assert!(regs.flag(Flag::Zero));
    }
}
