//! The crunch pipeline.
//!
//! Leaves first: shape the input, pick the zero-run length, index prefixes,
//! enumerate candidate tokens (possibly across a worker pool), bridge the
//! gaps with literals, run the shortest-path search, then serialise the
//! winning path in the shape the configured mode asks for.

pub(crate) mod bridge;
pub(crate) mod edges;
pub(crate) mod enumerate;
pub(crate) mod parallel;
pub(crate) mod prefix;
pub(crate) mod zerorun;

use std::io::{Read, Write};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::graph;
use crate::output;
use crate::token::Token;
use crate::{CrunchConfig, CrunchStats, SfxMode};

/// A configured cruncher. Construction validates the option set; `crunch`
/// does the work.
pub struct Cruncher {
    config: CrunchConfig,
    jump: u16,
}

impl Cruncher {
    pub fn new(mut config: CrunchConfig) -> Result<Self> {
        if config.jump_addr.is_some() {
            config.sfx = true;
        }
        if config.sfx && config.inplace {
            return Err(Error::SfxWithInPlace);
        }
        if !config.sfx && config.sfx_mode != SfxMode::Standard {
            return Err(Error::SfxModeWithoutSfx);
        }
        if config.sfx || config.inplace {
            config.prg = true;
        }
        let jump = match (&config.jump_addr, config.sfx) {
            (Some(addr), _) => parse_jump_addr(addr)?,
            (None, true) => return Err(Error::MissingJumpAddress),
            (None, false) => 0,
        };
        Ok(Self { config, jump })
    }

    /// Read all of `input`, crunch it, and write the result to `output`.
    pub fn crunch<R: Read, W: Write>(&mut self, mut input: R, mut output: W) -> Result<CrunchStats> {
        let mut raw = Vec::new();
        input.read_to_end(&mut raw)?;
        let (out, stats) = self.crunch_bytes(&raw)?;
        output.write_all(&out)?;
        Ok(stats)
    }

    /// Crunch an in-memory buffer and return the output with its stats.
    pub fn crunch_bytes(&self, raw: &[u8]) -> Result<(Vec<u8>, CrunchStats)> {
        let mut stats = CrunchStats::default();

        // Input shaping: PRG header strip, in-place remainder reservation.
        let (addr, full) = if self.config.prg {
            if raw.len() < 2 {
                return Err(Error::InputTooShort(raw.len()));
            }
            ([raw[0], raw[1]], &raw[2..])
        } else {
            ([0, 0], raw)
        };
        let decrunch_to = u16::from_le_bytes(addr);
        let (src, reserved) = if self.config.inplace {
            match full.split_last() {
                Some((&last, rest)) => (rest, Some(last)),
                None => return Err(Error::EmptySource),
            }
        } else {
            (full, None)
        };

        let optimal_run = zerorun::find_optimal_run(src);
        let index = prefix::PrefixIndex::build(src);

        let timer = self.phase_start("Populating LZ layer");
        let mut edges = parallel::enumerate(src, optimal_run, &index, self.config.num_threads)?;
        self.phase_end(timer);

        let timer = self.phase_start("Closing gaps");
        bridge::close_gaps(&mut edges);
        self.phase_end(timer);

        let timer = self.phase_start("Computing shortest path");
        let path = graph::shortest_path(&edges)?;
        self.phase_end(timer);

        let mut tokens = Vec::with_capacity(path.len().saturating_sub(1));
        for pair in path.windows(2) {
            let token = edges
                .get(pair[0], pair[1])
                .ok_or_else(|| Error::Internal(format!("path edge {}..{} lost", pair[0], pair[1])))?;
            tokens.push(token);
        }
        count_tokens(&tokens, &mut stats);

        let decrunch_end = decrunch_to.wrapping_add(full.len() as u16).wrapping_sub(1);
        let out = if self.config.inplace {
            let (out, load_to) = output::inplace::assemble(
                src,
                &tokens,
                reserved.unwrap_or(0),
                optimal_run,
                addr,
                decrunch_end,
            );
            stats.load_to = load_to;
            out
        } else if self.config.sfx {
            let body = output::emit_stream(src, &tokens);
            stats.load_to = output::sfx::LOAD_ADDR;
            output::sfx::assemble(&body, self.config.sfx_mode, decrunch_to, self.jump, optimal_run)
        } else {
            output::assemble_raw(src, &tokens, optimal_run)
        };

        stats.input_bytes = full.len() as u64;
        stats.output_bytes = out.len() as u64;
        stats.zero_run_length = optimal_run;
        stats.decrunch_to = decrunch_to;
        stats.decrunch_end = decrunch_end;
        Ok((out, stats))
    }

    fn phase_start(&self, name: &str) -> Instant {
        if !self.config.quiet {
            eprint!("{name}");
        }
        Instant::now()
    }

    fn phase_end(&self, timer: Instant) {
        if !self.config.quiet {
            if self.config.verbose {
                eprintln!(" ... {:.2?}", timer.elapsed());
            } else {
                eprintln!();
            }
        }
    }
}

fn count_tokens(tokens: &[Token], stats: &mut CrunchStats) {
    for token in tokens {
        let counts = &mut stats.token_counts;
        match token {
            Token::Literal { .. } => counts.literal += 1,
            Token::Lz { .. } => counts.lz += 1,
            Token::LongLz { .. } => counts.long_lz += 1,
            Token::Lz2 { .. } => counts.lz2 += 1,
            Token::Rle { .. } => counts.rle += 1,
            Token::ZeroRun { .. } => counts.zero_run += 1,
        }
    }
}

/// Parse a jump address: `$` or `0x` prefix for hex, bare digits for
/// decimal. Zero is not a place a self-extractor can sensibly jump.
fn parse_jump_addr(addr: &str) -> Result<u16> {
    let (digits, radix) = if let Some(hex) = addr.strip_prefix('$') {
        (hex, 16)
    } else if let Some(hex) = addr.strip_prefix("0x").or_else(|| addr.strip_prefix("0X")) {
        (hex, 16)
    } else {
        (addr, 10)
    };
    match u16::from_str_radix(digits, radix) {
        Ok(0) | Err(_) => Err(Error::InvalidJumpAddress(addr.to_string())),
        Ok(jump) => Ok(jump),
    }
}
