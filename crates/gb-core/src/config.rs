//! Runtime configuration for the core

/// How 8-bit INC computes the half-carry flag.
///
/// The two rules disagree whenever the low nibble carries without the
/// value wrapping to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HalfCarryRule {
    /// H is set when the incremented value wrapped to zero
    #[default]
    ZeroResult,
    /// H is set when the low nibble carried into bit 4
    NibbleCarry,
}

impl HalfCarryRule {
    /// Half-carry for `before + 1`
    pub fn increment(self, before: u8) -> bool {
        match self {
            HalfCarryRule::ZeroResult => before.wrapping_add(1) == 0,
            HalfCarryRule::NibbleCarry => before & 0x0F == 0x0F,
        }
    }
}

/// Core configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// Half-carry rule used by the 8-bit increment instructions
    pub inc_half_carry: HalfCarryRule,
}
