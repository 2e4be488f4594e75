//! Shared test support: a reference decoder for the crunched wire format
//! and deterministic data generators.

/// A decoded view of one wire token, for bounds assertions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireToken {
    Literal { len: usize },
    Lz { len: usize, offset: usize },
    LongLz { len: usize, offset: usize },
    Lz2 { offset: usize },
    Rle { len: usize },
    ZeroRun,
}

/// Decode a token stream (no zero-run header) until the terminator.
/// Returns the decoded bytes, the parsed tokens, and how many input bytes
/// were consumed including the terminator.
pub fn decode_stream(src: &[u8], zero_run: usize) -> (Vec<u8>, Vec<WireToken>, usize) {
    let mut out = Vec::new();
    let mut tokens = Vec::new();
    let mut i = 0;
    while src[i] != 0x20 {
        let code = src[i];
        if code & 0x80 == 0 && code & 0x7f < 32 {
            let len = (code & 0x1f) as usize;
            out.extend_from_slice(&src[i + 1..i + 1 + len]);
            tokens.push(WireToken::Literal { len });
            i += len + 1;
        } else if code & 0x80 == 0 {
            let offset = (0x7f - code) as usize;
            copy_back(&mut out, offset, 2);
            tokens.push(WireToken::Lz2 { offset });
            i += 1;
        } else if code & 0x81 == 0x81 && code & 0x7e != 0 {
            let len = ((code & 0x7f) >> 1) as usize + 1;
            let byte = src[i + 1];
            out.extend(std::iter::repeat(byte).take(len));
            tokens.push(WireToken::Rle { len });
            i += 2;
        } else if code & 0x81 == 0x81 {
            out.extend(std::iter::repeat(0u8).take(zero_run));
            tokens.push(WireToken::ZeroRun);
            i += 1;
        } else if code & 0x02 != 0 {
            let len = ((code & 0x7f) >> 2) as usize + 1;
            let offset = src[i + 1] as usize;
            copy_back(&mut out, offset, len);
            tokens.push(WireToken::Lz { len, offset });
            i += 2;
        } else {
            let lookahead = src[i + 2];
            let len = 1
                + ((((code & 0x7f) >> 2) as usize) << 1)
                + usize::from(lookahead & 0x80 != 0);
            let offset = 32768 - (src[i + 1] as usize + 256 * (lookahead & 0x7f) as usize);
            copy_back(&mut out, offset, len);
            tokens.push(WireToken::LongLz { len, offset });
            i += 3;
        }
    }
    (out, tokens, i + 1)
}

/// Byte-by-byte backward copy, so overlapping references replicate the way
/// the real decruncher does.
fn copy_back(out: &mut Vec<u8>, offset: usize, len: usize) {
    let start = out.len() - offset;
    for k in 0..len {
        let byte = out[start + k];
        out.push(byte);
    }
}

/// Decode a raw-mode output: `[R-1] tokens 0x20`.
pub fn decrunch_raw(stream: &[u8]) -> Vec<u8> {
    let zero_run = stream[0] as usize + 1;
    let (out, _, consumed) = decode_stream(&stream[1..], zero_run);
    assert_eq!(consumed, stream.len() - 1, "trailing bytes after terminator");
    out
}

/// Parse a raw-mode output without decoding, for bounds checks.
pub fn parse_raw(stream: &[u8]) -> (usize, Vec<WireToken>) {
    let zero_run = stream[0] as usize + 1;
    let (_, tokens, _) = decode_stream(&stream[1..], zero_run);
    (zero_run, tokens)
}

// ---------------------------------------------------------------------------
// Test data generators
// ---------------------------------------------------------------------------

/// Deterministic pseudo-random bytes (xorshift).
pub fn random_data(size: usize, seed: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state = seed;
    for _ in 0..size {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        data.push((state & 0xff) as u8);
    }
    data
}

/// Highly repetitive data (long matches, long runs).
pub fn repetitive_data(size: usize) -> Vec<u8> {
    let pattern = b"AAAAAAAAAAAAAAAABCBCBCBCBCBCBCBC";
    pattern.iter().cycle().take(size).copied().collect()
}

/// Mixed text-like data with recurring phrases.
pub fn mixed_data(size: usize) -> Vec<u8> {
    let phrases: [&[u8]; 3] = [
        b"the quick brown fox jumps over the lazy dog. ",
        b"pack my box with five dozen liquor jugs. ",
        b"0123456789",
    ];
    let mut data = Vec::with_capacity(size);
    let mut k = 0;
    while data.len() < size {
        data.extend_from_slice(phrases[k % phrases.len()]);
        k += 1;
    }
    data.truncate(size);
    data
}

/// Sparse data: mostly zero runs with occasional payload, the shape the
/// zero-run token exists for.
pub fn sparse_data(size: usize, seed: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state = seed;
    while data.len() < size {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        if state % 3 == 0 {
            data.push(state as u8);
        } else {
            data.extend(std::iter::repeat(0u8).take(8 + (state % 5) as usize));
        }
    }
    data.truncate(size);
    data
}
