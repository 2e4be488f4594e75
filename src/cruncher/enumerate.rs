//! Per-position candidate token enumeration.
//!
//! For each source position this produces every token the wire format could
//! start there: the best LZ match and all shorter lengths at the same
//! offset, every RLE length of the local run, a two-byte back-reference if
//! one exists in its short window, and a zero-run probe. The shortest-path
//! search later picks among them, so over-producing candidates is the point:
//! a shorter token frequently composes better with its successors than the
//! greedy longest one.

use super::edges::{push_edge, EdgeList};
use super::prefix::{PrefixIndex, PREFIX_LEN};
use crate::token::{Token, LONGEST_LONG_LZ, LONGEST_LZ, LONGEST_RLE, LZ2_OFFSET, LZ_OFFSET, MIN_LZ, MIN_RLE};

/// Populate `row` with every candidate edge starting at position `i`.
///
/// Insertion order matters on colliding spans: the two-byte back-reference
/// replaces the length-2 RLE, and the zero-run replaces whatever covered its
/// span, each being the cheaper encoding.
pub fn crunch_at(
    src: &[u8],
    i: usize,
    optimal_run: usize,
    index: &PrefixIndex,
    row: &mut EdgeList,
) {
    // Length of the run of identical bytes at i, counted one past the RLE
    // cap so an over-long run is distinguishable from an exact one.
    let first = src[i];
    let mut run = 1;
    while run < LONGEST_RLE + 1 && i + run < src.len() && src[i + run] == first {
        run += 1;
    }

    // Searching for prefixes inside a long run of identical bytes explodes
    // the candidate lists; runs that long are RLE business anyway.
    if run < LONGEST_LONG_LZ - 1 {
        let minlz = (run + 1).max(MIN_LZ);
        if let Some((len, offset)) = best_match(src, i, minlz, index) {
            for size in (run.max(MIN_LZ - 1) + 1..=len).rev() {
                push_edge(row, i + size, Token::lz(size, offset));
            }
        }
    }

    if run > LONGEST_RLE {
        // Inside an over-long run only the full-length token is useful;
        // the next positions supply the shorter tails.
        push_edge(row, i + LONGEST_RLE, Token::Rle { len: LONGEST_RLE, byte: first });
    } else {
        for size in (MIN_RLE..=run).rev() {
            push_edge(row, i + size, Token::Rle { len: size, byte: first });
        }
    }

    if i + 2 <= src.len() {
        if let Some(offset) = find_lz2(src, i) {
            push_edge(row, i + 2, Token::Lz2 { offset });
        }
    }

    if i + optimal_run <= src.len() && src[i..i + optimal_run].iter().all(|&b| b == 0) {
        push_edge(row, i + optimal_run, Token::ZeroRun { len: optimal_run });
    }
}

/// Longest match for `src[i..]` at an earlier position, if one of at least
/// `minlz` bytes exists within the long-LZ window.
///
/// Candidates are visited nearest-first. A candidate displaces the current
/// best if it is longer and does not trade a one-byte offset encoding for a
/// two-byte one (short-offset matches cost one byte less, so a long-offset
/// match must either compete with another long-offset one, exceed the short
/// token's length range, or win by more than one byte).
fn best_match(src: &[u8], i: usize, minlz: usize, index: &PrefixIndex) -> Option<(usize, usize)> {
    if src.len() - i < minlz {
        return None;
    }
    let cap = (src.len() - i).min(LONGEST_LONG_LZ);
    let key = [src[i], src[i + 1], src[i + 2]];
    let positions = index.lookup(key);
    let window_start = i.saturating_sub(LZ_OFFSET);
    let before = positions.partition_point(|&p| p < i);

    let mut best_len = 0;
    let mut best_offset = 1;
    for &j in positions[..before].iter().rev() {
        if j < window_start {
            break;
        }
        // any candidate that can displace the best matches one byte past it
        if best_len > 0 && src[j + best_len] != src[i + best_len] {
            continue;
        }
        let mut l = 0;
        while l < cap && src[j + l] == src[i + l] {
            l += 1;
        }
        if l < minlz {
            continue;
        }
        let offset = i - j;
        if (l > best_len && (offset < 256 || best_offset >= 256 || l > LONGEST_LZ))
            || l > best_len + 1
        {
            best_len = l;
            best_offset = offset;
        }
        if best_len == cap {
            break;
        }
    }

    (best_len >= minlz).then_some((best_len, best_offset))
}

/// Offset of the last occurrence of `src[i..i + 2]` starting strictly
/// before `i`, within the two-byte token's window.
fn find_lz2(src: &[u8], i: usize) -> Option<usize> {
    let window_start = i.saturating_sub(LZ2_OFFSET);
    let (a, b) = (src[i], src[i + 1]);
    (window_start..i).rev().find(|&j| src[j] == a && src[j + 1] == b).map(|j| i - j)
}

// The key length and the minimum match length are one and the same; the
// search relies on it when it skips verifying the first three bytes.
const _: () = assert!(PREFIX_LEN == MIN_LZ);
