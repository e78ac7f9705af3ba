//! APU (Audio Processing Unit) register decoder
//!
//! The DMG has four sound generators; this core decodes the registers that
//! drive tone channel 1 and the shared output stage:
//! $FF10 - NR10 channel 1 sweep
//! $FF11 - NR11 channel 1 length / duty
//! $FF12 - NR12 channel 1 envelope
//! $FF13 - NR13 channel 1 frequency low
//! $FF14 - NR14 channel 1 frequency high / control
//! $FF24 - NR50 output volume and Vin routing (Vin to terminal 1 is bit 7)
//! $FF25 - NR51 sound to terminal routing
//! $FF26 - NR52 master enable
//!
//! No samples are produced here. Decoded fields land in a [`SoundState`]
//! that the host copies out to its audio backend.

use crate::bits::{bit_field, is_bit_set};
use crate::error::{EmulatorError, Result};
use crate::io::IoHandler;

pub const NR10: u16 = 0xFF10;
pub const NR11: u16 = 0xFF11;
pub const NR12: u16 = 0xFF12;
pub const NR13: u16 = 0xFF13;
pub const NR14: u16 = 0xFF14;
pub const NR50: u16 = 0xFF24;
pub const NR51: u16 = 0xFF25;
pub const NR52: u16 = 0xFF26;

/// Number of sound generators
pub const CHANNEL_COUNT: usize = 4;

/// Waveform bit pattern for each duty setting (12.5%, 25%, 50%, 75%)
pub const WAVE_DUTY: [u8; 4] = [0b0000_0001, 0b1000_0001, 0b1000_0111, 0b0111_1110];

/// Enable and terminal routing for one sound generator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelRouting {
    pub enabled: bool,
    pub terminal1: bool,
    pub terminal2: bool,
}

/// NR50 output stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputControl {
    pub terminal1_volume: u8,
    pub terminal2_volume: u8,
    pub vin_terminal1: bool,
    pub vin_terminal2: bool,
}

/// NR10 frequency sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sweep {
    pub time: u8,
    pub decrease: bool,
    pub shift: u8,
}

/// NR12 volume envelope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Envelope {
    pub initial_volume: u8,
    pub increase: bool,
    pub sweep: u8,
}

/// Channel 1: square wave with sweep and envelope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToneChannel {
    pub sweep: Sweep,
    pub length: u8,
    pub duty: u8,
    pub envelope: Envelope,
    /// 11-bit frequency value assembled from NR13 and NR14
    pub frequency: u16,
    pub length_enabled: bool,
    pub triggered: bool,
}

impl ToneChannel {
    /// Bit pattern of the current duty setting
    pub fn duty_pattern(&self) -> u8 {
        WAVE_DUTY[(self.duty & 0x03) as usize]
    }
}

/// Snapshot of every decoded sound parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoundState {
    pub master_enabled: bool,
    /// Sounds 1 to 4, in order
    pub channels: [ChannelRouting; CHANNEL_COUNT],
    pub output: OutputControl,
    pub tone1: ToneChannel,
}

/// Audio register decoder, installed as the bus I/O hook
#[derive(Debug, Clone, Default)]
pub struct Apu {
    state: SoundState,
    master_latch: u8,
    writes: u64,
}

impl Apu {
    /// Create a new APU instance with every sound off
    pub fn new() -> Self {
        Self::default()
    }

    /// Current decoded state
    pub fn state(&self) -> &SoundState {
        &self.state
    }

    /// Number of register writes decoded so far
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// NR52 as the hardware reports it
    pub fn master_latch(&self) -> u8 {
        self.master_latch
    }

    /// Channel 1 waveform bit pattern
    pub fn duty_pattern(&self) -> u8 {
        self.state.tone1.duty_pattern()
    }

    fn decode(&mut self, address: u16, value: u8) -> Result<()> {
        let tone = &mut self.state.tone1;
        match address {
            NR10 => {
                tone.sweep = Sweep {
                    shift: bit_field(value, 0, 3),
                    decrease: is_bit_set(value, 3),
                    time: bit_field(value, 4, 3),
                };
            }
            NR11 => {
                tone.length = bit_field(value, 0, 6);
                tone.duty = bit_field(value, 6, 2);
            }
            NR12 => {
                tone.envelope = Envelope {
                    sweep: bit_field(value, 0, 3),
                    increase: is_bit_set(value, 3),
                    initial_volume: bit_field(value, 4, 4),
                };
            }
            NR13 => {
                tone.frequency = (tone.frequency & 0x0700) | value as u16;
            }
            NR14 => {
                let high = bit_field(value, 0, 3) as u16;
                tone.frequency = (high << 8) | (tone.frequency & 0x00FF);
                tone.length_enabled = is_bit_set(value, 6);
                tone.triggered = is_bit_set(value, 7);
            }
            NR50 => {
                self.state.output = OutputControl {
                    terminal1_volume: bit_field(value, 0, 3),
                    vin_terminal1: is_bit_set(value, 7),
                    terminal2_volume: bit_field(value, 4, 3),
                    vin_terminal2: is_bit_set(value, 3),
                };
            }
            NR51 => {
                for (index, channel) in self.state.channels.iter_mut().enumerate() {
                    channel.terminal1 = is_bit_set(value, index as u8);
                    channel.terminal2 = is_bit_set(value, index as u8 + 4);
                }
            }
            NR52 => {
                let on = is_bit_set(value, 7);
                self.state.master_enabled = on;
                for channel in self.state.channels.iter_mut() {
                    channel.enabled = on;
                }
                self.master_latch = if on { 0x8F } else { 0x00 };
            }
            _ => return Err(EmulatorError::UnknownRegister { address, value }),
        }
        Ok(())
    }
}

impl IoHandler for Apu {
    fn write_register(&mut self, address: u16, value: u8) -> Result<()> {
        self.decode(address, value)?;
        self.writes += 1;
        log::debug!("audio register 0x{:04X} <- 0x{:02X}", address, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(pairs: &[(u16, u8)]) -> Apu {
        let mut apu = Apu::new();
        for &(address, value) in pairs {
            apu.write_register(address, value).unwrap();
        }
        apu
    }

    #[test]
    fn test_nr51_routing() {
        let apu = written(&[(NR51, 0b0001_0001)]);
        let channels = apu.state().channels;
        assert!(channels[0].terminal1);
        assert!(channels[0].terminal2);
        for channel in &channels[1..] {
            assert!(!channel.terminal1);
            assert!(!channel.terminal2);
        }

        let apu = written(&[(NR51, 0b1000_0010)]);
        let channels = apu.state().channels;
        assert!(channels[1].terminal1 && !channels[1].terminal2);
        assert!(!channels[3].terminal1 && channels[3].terminal2);
    }

    #[test]
    fn test_nr52_master_switch() {
        let mut apu = written(&[(NR52, 0x80)]);
        assert!(apu.state().master_enabled);
        assert!(apu.state().channels.iter().all(|c| c.enabled));
        assert_eq!(apu.master_latch(), 0x8F);

        apu.write_register(NR52, 0x7F).unwrap();
        assert!(!apu.state().master_enabled);
        assert!(apu.state().channels.iter().all(|c| !c.enabled));
        assert_eq!(apu.master_latch(), 0x00);
    }

    #[test]
    fn test_nr50_output_control() {
        let apu = written(&[(NR50, 0b1010_1011)]);
        let output = apu.state().output;
        assert_eq!(output.terminal1_volume, 3);
        assert!(output.vin_terminal1);
        assert_eq!(output.terminal2_volume, 2);
        assert!(output.vin_terminal2);
    }

    #[test]
    fn test_nr50_vin_bits() {
        let output = written(&[(NR50, 0b1000_0000)]).state().output;
        assert!(output.vin_terminal1);
        assert!(!output.vin_terminal2);
        assert_eq!(output.terminal1_volume, 0);
        assert_eq!(output.terminal2_volume, 0);

        let output = written(&[(NR50, 0b0000_1000)]).state().output;
        assert!(!output.vin_terminal1);
        assert!(output.vin_terminal2);
    }

    #[test]
    fn test_channel1_registers() {
        let apu = written(&[
            (NR10, 0b0101_1010),
            (NR11, 0b1011_0101),
            (NR12, 0b1111_0011),
            (NR13, 0xC1),
            (NR14, 0b1100_0111),
        ]);
        let tone = apu.state().tone1;
        assert_eq!(tone.sweep, Sweep { time: 5, decrease: true, shift: 2 });
        assert_eq!(tone.length, 0x35);
        assert_eq!(tone.duty, 2);
        assert_eq!(
            tone.envelope,
            Envelope { initial_volume: 15, increase: false, sweep: 3 }
        );
        assert_eq!(tone.frequency, 0x7C1);
        assert!(tone.length_enabled);
        assert!(tone.triggered);
        assert_eq!(apu.duty_pattern(), 0b1000_0111);
    }

    #[test]
    fn test_frequency_halves_are_independent() {
        let mut apu = written(&[(NR14, 0x03), (NR13, 0x45)]);
        assert_eq!(apu.state().tone1.frequency, 0x345);
        apu.write_register(NR13, 0xFF).unwrap();
        assert_eq!(apu.state().tone1.frequency, 0x3FF);
    }

    #[test]
    fn test_unknown_register() {
        let mut apu = Apu::new();
        assert_eq!(
            apu.write_register(0xFF47, 0xFC),
            Err(EmulatorError::UnknownRegister { address: 0xFF47, value: 0xFC })
        );
        assert_eq!(apu.writes(), 0);
        assert_eq!(*apu.state(), SoundState::default());
    }

    #[test]
    fn test_write_counter() {
        let apu = written(&[(NR52, 0x80), (NR51, 0xF3), (NR50, 0x77)]);
        assert_eq!(apu.writes(), 3);
    }
}
