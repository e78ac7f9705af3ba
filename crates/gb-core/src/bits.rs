//! Bit helpers
//!
//! Small pure functions over single bits of an 8-bit value. `bit` is a
//! position in `0..8`; bit 0 is the least significant.

/// Return true if `bit` is set in `value`
pub fn is_bit_set(value: u8, bit: u8) -> bool {
    (value >> bit) & 0x01 != 0
}

/// Return `value` with `bit` set
pub fn set_bit(value: u8, bit: u8) -> u8 {
    value | (1 << bit)
}

/// Return `value` with `bit` cleared
pub fn clear_bit(value: u8, bit: u8) -> u8 {
    value & !(1 << bit)
}

/// Return `value` with `bit` set or cleared according to `on`
pub fn assign_bit(value: u8, bit: u8, on: bool) -> u8 {
    if on {
        set_bit(value, bit)
    } else {
        clear_bit(value, bit)
    }
}

/// Extract `width` bits of `value` starting at `shift`
pub fn bit_field(value: u8, shift: u8, width: u8) -> u8 {
    (value >> shift) & (((1u16 << width) - 1) as u8)
}
