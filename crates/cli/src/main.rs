//! rv32pipe command-line runner.
//!
//! Loads an ELF or flat binary into simulated RAM, clocks the core for a
//! bounded number of cycles, and reports the architectural register state
//! and pipeline statistics. Configuration comes from an optional JSON file
//! matching `rv32pipe_core::CoreConfig`; instruction-level tracing is
//! enabled with `RUST_LOG=rv32pipe_core=trace`.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use rv32pipe_core::config::CoreConfig;
use rv32pipe_core::isa::disasm::disasm;
use rv32pipe_core::sim::loader;
use rv32pipe_core::sim::memory::Ram;
use rv32pipe_core::Simulator;

#[derive(Parser, Debug)]
#[command(
    name = "rv32pipe",
    version,
    about = "Cycle-accurate RV32IM pipeline simulator",
    long_about = "Run an RV32IM binary on the six-stage pipeline model.\n\n\
                  Examples:\n  \
                  rv32pipe firmware.elf\n  \
                  rv32pipe --bin --base 0x80000000 program.bin --cycles 100000\n  \
                  rv32pipe firmware.elf --config soc.json"
)]
struct Cli {
    /// Program image (ELF unless --bin is given).
    image: PathBuf,

    /// Treat the image as a flat binary instead of an ELF.
    #[arg(long)]
    bin: bool,

    /// Load/reset address for flat binaries.
    #[arg(long, value_parser = parse_u32, default_value = "0x80000000")]
    base: u32,

    /// RAM base address.
    #[arg(long, value_parser = parse_u32, default_value = "0x80000000")]
    ram_base: u32,

    /// RAM size in bytes.
    #[arg(long, default_value_t = 16 * 1024 * 1024)]
    ram_size: usize,

    /// Memory latency in cycles to first acknowledge.
    #[arg(long, default_value_t = 1)]
    mem_latency: u32,

    /// Cycle budget for the run.
    #[arg(long, default_value_t = 1_000_000)]
    cycles: u64,

    /// JSON core configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dump the register file after the run.
    #[arg(long)]
    dump_regs: bool,

    /// Disassemble this many words from the entry point before running.
    #[arg(long, value_name = "WORDS", default_value_t = 0)]
    disasm: usize,
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.map_err(|e| format!("invalid address '{s}': {e}"))
}

fn run(cli: &Cli) -> Result<(), String> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            serde_json::from_str::<CoreConfig>(&text)
                .map_err(|e| format!("cannot parse {}: {e}", path.display()))?
        }
        None => CoreConfig::default(),
    };

    let image = fs::read(&cli.image)
        .map_err(|e| format!("cannot read {}: {e}", cli.image.display()))?;

    let mut ram = Ram::new(cli.ram_base, cli.ram_size);
    let entry = if cli.bin {
        loader::load_binary(&mut ram, &image, cli.base).map_err(|e| e.to_string())?;
        cli.base
    } else {
        loader::load_elf(&mut ram, &image).map_err(|e| e.to_string())?
    };

    if cli.config.is_none() {
        config.reset_address = entry;
    } else if config.reset_address != entry {
        tracing::warn!(
            configured = format_args!("{:#010x}", config.reset_address),
            entry = format_args!("{entry:#010x}"),
            "reset address differs from image entry point"
        );
    }

    let mut sim =
        Simulator::new(&config, ram, cli.mem_latency).map_err(|e| e.to_string())?;

    if cli.disasm > 0 {
        for i in 0..cli.disasm {
            let addr = entry.wrapping_add((i * 4) as u32);
            let word = sim.ram.read_word(addr >> 2);
            println!("{addr:#010x}: {word:08x}  {}", disasm(word));
        }
        println!();
    }

    sim.run(cli.cycles);

    let stats = sim.core.stats();
    println!("{}", stats.summary());
    if cli.dump_regs {
        println!();
        print!("{}", sim.core.gpr_dump());
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("rv32pipe: {message}");
            ExitCode::FAILURE
        }
    }
}
