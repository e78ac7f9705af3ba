//! GB CLI - Command line runner for the Game Boy core

mod audio;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use gb_core::boot::{BootRom, DEFAULT_BOOT_PATH};
use gb_core::cartridge::Cartridge;
use gb_core::cpu::{Register, WordRegister};
use gb_core::{Config, HalfCarryRule, Motherboard};
use log::LevelFilter;

use crate::audio::AudioDevice;

/// Game Boy Emulator CLI
#[derive(Parser, Debug)]
#[command(name = "gb-cli")]
#[command(about = "Runs the Game Boy CPU core from the boot ROM", long_about = None)]
struct Args {
    /// Path to the DMG boot ROM image
    #[arg(short, long, default_value = DEFAULT_BOOT_PATH)]
    boot: PathBuf,

    /// Start directly in the cartridge without a boot image
    #[arg(long, conflicts_with = "boot")]
    no_boot: bool,

    /// Path to a cartridge ROM image
    #[arg(short, long)]
    cartridge: Option<PathBuf>,

    /// Stop after this many cycles
    #[arg(short, long)]
    max_cycles: Option<u64>,

    /// Half-carry rule for 8-bit INC
    #[arg(long, value_enum, default_value_t = HalfCarry::ZeroResult)]
    half_carry: HalfCarry,

    /// Dump CPU state after execution
    #[arg(short, long)]
    dump_cpu: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum HalfCarry {
    ZeroResult,
    NibbleCarry,
}

impl From<HalfCarry> for HalfCarryRule {
    fn from(value: HalfCarry) -> Self {
        match value {
            HalfCarry::ZeroResult => HalfCarryRule::ZeroResult,
            HalfCarry::NibbleCarry => HalfCarryRule::NibbleCarry,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut audio = match AudioDevice::open() {
        Ok(audio) => audio,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(&args, &audio);
    audio.close();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` takes precedence over the `-v` count
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(args: &Args, audio: &AudioDevice) -> Result<()> {
    let boot = if args.no_boot {
        None
    } else {
        let boot = BootRom::load(&args.boot)
            .with_context(|| format!("loading boot image {}", args.boot.display()))?;
        Some(boot)
    };

    let cartridge = match &args.cartridge {
        Some(path) => Cartridge::load(path)
            .with_context(|| format!("loading cartridge {}", path.display()))?,
        None => Cartridge::empty(),
    };
    if let Some(title) = cartridge.title() {
        log::info!("cartridge title: {title}");
    }

    let config = Config {
        inc_half_carry: args.half_carry.into(),
    };
    let mut system = Motherboard::new(boot, cartridge, &config);

    let outcome = drive(&mut system, args.max_cycles, audio);
    if args.dump_cpu {
        dump_cpu_state(&system);
    }
    outcome
}

/// Step until a fatal error or the cycle budget runs out, forwarding audio
/// state whenever the decoder saw a write
fn drive(system: &mut Motherboard, max_cycles: Option<u64>, audio: &AudioDevice) -> Result<()> {
    let mut published = system.apu().writes();
    loop {
        if let Some(limit) = max_cycles {
            if system.cycles() >= limit {
                log::info!("cycle budget of {limit} reached");
                return Ok(());
            }
        }

        let pc = system.cpu().registers().pc();
        system
            .step()
            .with_context(|| format!("emulation stopped at PC 0x{pc:04X}"))?;

        let writes = system.apu().writes();
        if writes != published {
            audio.publish(*system.apu().state());
            published = writes;
        }
    }
}

fn dump_cpu_state(system: &Motherboard) {
    let cpu = system.cpu();
    let regs = cpu.registers();

    println!("\nCPU State:");
    for register in [
        Register::A,
        Register::F,
        Register::B,
        Register::C,
        Register::D,
        Register::E,
        Register::H,
        Register::L,
    ] {
        println!("  {}:    ${:02X}", register.name(), regs.get(register));
    }
    for register in [WordRegister::SP, WordRegister::PC] {
        println!("  {}:   ${:04X}", register.name(), regs.get_word(register));
    }
    println!("  Opcodes: {}", cpu.instructions().len());
    println!("  Boot overlay: {}", system.bus().boot_enabled());
    println!("  Cartridge: {} bytes", system.bus().cartridge().len());
    println!("  Cycles: {}", system.cycles());
}
