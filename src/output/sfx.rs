//! Self-extracting output.
//!
//! The boot stub is an opaque, byte-verbatim 6502 program with a PRG header
//! baked in; this module only patches its handful of address slots and
//! prepends it to the crunched stream.

use crate::SfxMode;

/// Every self-extracting PRG loads at the BASIC start.
pub const LOAD_ADDR: u16 = 0x0801;

/// A boot stub image plus the offsets of its patch slots. Two-byte slots
/// are little-endian, named by their low byte.
struct BootStub {
    image: &'static [u8],
    transfer_end: usize,
    depack_from: usize,
    decrunch_to: usize,
    jump: usize,
    zero_run: usize,
}

// TODO: bundle the blank-screen and stack-resident stub images; the
// descriptor table already keys patch offsets per variant, so they drop in
// without code changes.
const STANDARD_STUB: BootStub = BootStub {
    image: &STANDARD_IMAGE,
    transfer_end: 0x1e,
    depack_from: 0x3c,
    decrunch_to: 0x40,
    jump: 0x77,
    zero_run: 0xc9,
};

fn stub(mode: SfxMode) -> &'static BootStub {
    match mode {
        SfxMode::Standard => &STANDARD_STUB,
        SfxMode::BlankScreen => &STANDARD_STUB,
        SfxMode::StackResident => &STANDARD_STUB,
    }
}

/// Wrap a crunched stream body (tokens plus terminator, no zero-run
/// header) into a runnable PRG.
pub fn assemble(
    body: &[u8],
    mode: SfxMode,
    decrunch_to: u16,
    jump: u16,
    optimal_run: usize,
) -> Vec<u8> {
    let stub = stub(mode);
    let mut out = Vec::with_capacity(stub.image.len() + body.len());
    out.extend_from_slice(stub.image);

    let file_len = stub.image.len() + body.len();
    let transfer_end = (file_len + 0x6ff) as u16;
    let depack_from = 0x10000usize.wrapping_sub(body.len()) as u16;

    out[stub.transfer_end..stub.transfer_end + 2].copy_from_slice(&transfer_end.to_le_bytes());
    out[stub.depack_from..stub.depack_from + 2].copy_from_slice(&depack_from.to_le_bytes());
    out[stub.decrunch_to..stub.decrunch_to + 2].copy_from_slice(&decrunch_to.to_le_bytes());
    out[stub.jump..stub.jump + 2].copy_from_slice(&jump.to_le_bytes());
    out[stub.zero_run] = (optimal_run - 1) as u8;

    out.extend_from_slice(body);
    out
}

/// Length of the boot stub for the given mode, for address arithmetic in
/// callers and tests.
pub fn stub_len(mode: SfxMode) -> usize {
    stub(mode).image.len()
}

/// The stock decruncher stub: a BASIC SYS line, a relocator, and the
/// zero-page decruncher it installs.
const STANDARD_IMAGE: [u8; 229] = [
    0x01, 0x08, 0x0B, 0x08, 0x0A, 0x00, 0x9E, 0x32, 0x30, 0x36, 0x31, 0x00,
    0x00, 0x00, 0x78, 0xA2, 0xC9, 0xBD, 0x1A, 0x08, 0x95, 0x00, 0xCA, 0xD0,
    0xF8, 0x4C, 0x02, 0x00, 0x34, 0xBD, 0x00, 0x10, 0x9D, 0x00, 0xFF, 0xE8,
    0xD0, 0xF7, 0xC6, 0x04, 0xC6, 0x07, 0xA5, 0x04, 0xC9, 0x07, 0xB0, 0xED,
    0xA0, 0x00, 0xB3, 0x21, 0x30, 0x21, 0xC9, 0x20, 0xB0, 0x3F, 0xA8, 0xB9,
    0xFF, 0xFF, 0x88, 0x99, 0xFF, 0xFF, 0xD0, 0xF7, 0x8A, 0xE8, 0x65, 0x25,
    0x85, 0x25, 0xB0, 0x77, 0x8A, 0x65, 0x21, 0x85, 0x21, 0x90, 0xDF, 0xE6,
    0x22, 0xB0, 0xDB, 0x4B, 0x7F, 0x90, 0x3A, 0xF0, 0x6B, 0xA2, 0x02, 0x85,
    0x53, 0xC8, 0xB1, 0x21, 0xA4, 0x53, 0x91, 0x25, 0x88, 0x91, 0x25, 0xD0,
    0xFB, 0xA9, 0x00, 0xB0, 0xD5, 0xA9, 0x37, 0x85, 0x01, 0x58, 0x4C, 0x5B,
    0x00, 0xF0, 0xF6, 0x09, 0x80, 0x65, 0x25, 0x85, 0x9B, 0xA5, 0x26, 0xE9,
    0x00, 0x85, 0x9C, 0xB1, 0x9B, 0x91, 0x25, 0xC8, 0xB1, 0x9B, 0x91, 0x25,
    0x98, 0xAA, 0x88, 0xF0, 0xB1, 0x4A, 0x85, 0xA0, 0xC8, 0xA5, 0x25, 0x90,
    0x33, 0xF1, 0x21, 0x85, 0x9B, 0xA5, 0x26, 0xE9, 0x00, 0x85, 0x9C, 0xA2,
    0x02, 0xA0, 0x00, 0xB1, 0x9B, 0x91, 0x25, 0xC8, 0xB1, 0x9B, 0x91, 0x25,
    0xC8, 0xB9, 0x9B, 0x00, 0x91, 0x25, 0xC0, 0x00, 0xD0, 0xF6, 0x98, 0xA0,
    0x00, 0xB0, 0x83, 0xE6, 0x26, 0x18, 0x90, 0x84, 0xA0, 0xFF, 0x84, 0x53,
    0xA2, 0x01, 0xD0, 0x96, 0x71, 0x21, 0x85, 0x9B, 0xC8, 0xB3, 0x21, 0x09,
    0x80, 0x65, 0x26, 0x85, 0x9C, 0xE0, 0x80, 0x26, 0xA0, 0xA2, 0x03, 0xD0,
    0xC4,
];
