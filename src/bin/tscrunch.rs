use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use tscrunch::{CrunchConfig, Cruncher, Error, SfxMode};

/// Boot variant argument for the CLI (maps to SfxMode)
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum SfxModeArg {
    /// Stock boot stub
    #[default]
    Standard,
    /// Blank the screen while decrunching
    BlankScreen,
    /// Decrunch from a stack-resident loop
    StackResident,
}

impl SfxModeArg {
    fn to_sfx_mode(self) -> SfxMode {
        match self {
            Self::Standard => SfxMode::Standard,
            Self::BlankScreen => SfxMode::BlankScreen,
            Self::StackResident => SfxMode::StackResident,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tscrunch")]
#[command(about = "TSCrunch - binary cruncher for the Commodore 64")]
#[command(version)]
struct Args {
    /// Input file
    input: PathBuf,

    /// Output file
    output: PathBuf,

    /// Input file is a PRG; its first two bytes are the load address
    #[arg(short, long)]
    prg: bool,

    /// Create a self-extracting PRG jumping to ADDR ($hex, 0xhex or
    /// decimal); forces --prg
    #[arg(short = 'x', long = "sfx", value_name = "ADDR")]
    jump_addr: Option<String>,

    /// Boot stub variant for self-extracting output
    #[arg(long, value_enum, default_value = "standard")]
    sfx_mode: SfxModeArg,

    /// Blank the screen while decrunching (shorthand for --sfx-mode
    /// blank-screen)
    #[arg(short, long)]
    blank: bool,

    /// Crunch for in-place decompression; forces --prg
    #[arg(short, long)]
    inplace: bool,

    /// Quiet mode - suppress progress and summary output
    #[arg(short, long)]
    quiet: bool,

    /// Show per-phase timings
    #[arg(short, long)]
    verbose: bool,

    /// Worker threads for the token search (0 = auto)
    #[arg(short = 't', long, default_value = "0")]
    threads: usize,
}

const EXIT_OK: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_USAGE: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

/// Option and address mistakes are usage errors; everything else is an
/// internal or I/O failure.
fn exit_code_for(e: &Error) -> u8 {
    match e {
        Error::InvalidJumpAddress(_)
        | Error::MissingJumpAddress
        | Error::SfxWithInPlace
        | Error::SfxModeWithoutSfx => EXIT_USAGE,
        _ => EXIT_ERROR,
    }
}

fn run() -> Result<u8, Error> {
    let t0 = Instant::now();
    let args = Args::parse();

    let sfx_mode =
        if args.blank { SfxMode::BlankScreen } else { args.sfx_mode.to_sfx_mode() };
    if args.blank && args.jump_addr.is_none() {
        return Err(Error::SfxModeWithoutSfx);
    }

    let config = CrunchConfig {
        prg: args.prg,
        sfx: args.jump_addr.is_some(),
        sfx_mode,
        inplace: args.inplace,
        jump_addr: args.jump_addr.clone(),
        quiet: args.quiet,
        verbose: args.verbose,
        num_threads: args.threads,
    };
    let prg_out = config.sfx || config.inplace;
    let mut cruncher = Cruncher::new(config)?;

    let input = BufReader::new(File::open(&args.input)?);
    let output = BufWriter::new(File::create(&args.output)?);
    let stats = cruncher.crunch(input, output)?;

    if !args.quiet {
        let prg_in = args.prg || args.inplace || args.jump_addr.is_some();
        eprintln!(
            "input file  {}, ${:04x} - ${:04x} : {} bytes",
            if prg_in { "PRG" } else { "RAW" },
            stats.decrunch_to,
            stats.decrunch_end,
            stats.input_bytes
        );
        eprintln!(
            "output file {}, ${:04x} - ${:04x} : {} bytes",
            if prg_out { "PRG" } else { "RAW" },
            stats.load_to,
            u32::from(stats.load_to) + stats.output_bytes as u32 - 1,
            stats.output_bytes
        );
        eprintln!(
            "crunched to {:.2}% of original size",
            stats.output_bytes as f64 * 100.0 / stats.input_bytes as f64
        );
        if args.verbose {
            let counts = stats.token_counts;
            eprintln!(
                "lz: {}, lzl: {}, lz2: {}, rle: {}, zero: {}, lit: {}, tot: {}",
                counts.lz,
                counts.long_lz,
                counts.lz2,
                counts.rle,
                counts.zero_run,
                counts.literal,
                counts.total()
            );
            eprintln!("elapsed: {:.2?}", t0.elapsed());
        }
    }

    Ok(EXIT_OK)
}
