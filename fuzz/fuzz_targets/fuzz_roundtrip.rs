#![no_main]

use libfuzzer_sys::fuzz_target;
use tscrunch::{CrunchConfig, Cruncher};

fuzz_target!(|data: &[u8]| {
    // Keep the optimal parse tractable under the fuzzer's iteration budget
    if data.len() > 4096 {
        return;
    }

    let config = CrunchConfig { num_threads: 1, ..CrunchConfig::default() };
    let cruncher = Cruncher::new(config).expect("raw config is always valid");
    let (out, _) = cruncher.crunch_bytes(data).expect("raw crunch cannot fail");

    assert_eq!(decrunch(&out), data);
});

/// Minimal reference decoder for the raw output shape `[R-1] tokens 0x20`.
fn decrunch(stream: &[u8]) -> Vec<u8> {
    let zero_run = stream[0] as usize + 1;
    let src = &stream[1..];
    let mut out = Vec::new();
    let mut i = 0;
    while src[i] != 0x20 {
        let code = src[i];
        if code & 0x80 == 0 && code & 0x7f < 32 {
            let len = (code & 0x1f) as usize;
            out.extend_from_slice(&src[i + 1..i + 1 + len]);
            i += len + 1;
        } else if code & 0x80 == 0 {
            copy_back(&mut out, (0x7f - code) as usize, 2);
            i += 1;
        } else if code & 0x81 == 0x81 && code & 0x7e != 0 {
            let len = ((code & 0x7f) >> 1) as usize + 1;
            out.extend(std::iter::repeat(src[i + 1]).take(len));
            i += 2;
        } else if code & 0x81 == 0x81 {
            out.extend(std::iter::repeat(0u8).take(zero_run));
            i += 1;
        } else if code & 0x02 != 0 {
            let len = ((code & 0x7f) >> 2) as usize + 1;
            copy_back(&mut out, src[i + 1] as usize, len);
            i += 2;
        } else {
            let lookahead = src[i + 2];
            let len =
                1 + ((((code & 0x7f) >> 2) as usize) << 1) + usize::from(lookahead & 0x80 != 0);
            let offset = 32768 - (src[i + 1] as usize + 256 * (lookahead & 0x7f) as usize);
            copy_back(&mut out, offset, len);
            i += 3;
        }
    }
    out
}

fn copy_back(out: &mut Vec<u8>, offset: usize, len: usize) {
    let start = out.len() - offset;
    for k in 0..len {
        let byte = out[start + k];
        out.push(byte);
    }
}
