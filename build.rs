// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::env;
use std::fs;
use std::path::PathBuf;

/// Frequency assumed when `F_CPU` isn't set: the ATtiny13's factory
/// calibrated internal oscillator.
const DEFAULT_F_CPU: u32 = 9_600_000;

/// Frequencies with a microseconds-per-tick entry in `src/clock.rs`. Keep the
/// two lists in sync.
const MICROS_FREQUENCIES: &[u32] = &[
    20_000_000,
    16_000_000,
    12_000_000,
    9_600_000,
    8_000_000,
    4_800_000,
    1_200_000,
    1_000_000,
    600_000,
    128_000,
];

fn main() {
    println!("cargo:rerun-if-env-changed=F_CPU");
    println!("cargo:rerun-if-changed=build.rs");

    let f_cpu = match env::var("F_CPU") {
        Ok(text) => match parse_hz(&text) {
            Some(hz) => hz,
            None => panic!("F_CPU={:?} is not a frequency in Hz", text),
        },
        Err(env::VarError::NotPresent) => DEFAULT_F_CPU,
        Err(e) => panic!("can't read F_CPU: {}", e),
    };

    if f_cpu < 1000 {
        panic!("F_CPU={} is below 1 kHz; a millisecond must be at least one cycle", f_cpu);
    }

    if env::var_os("CARGO_FEATURE_MICROS").is_some()
        && !MICROS_FREQUENCIES.contains(&f_cpu)
    {
        panic!(
            "F_CPU={} has no microsecond conversion; use one of {:?} or \
             build without the `micros` feature",
            f_cpu, MICROS_FREQUENCIES,
        );
    }

    let out = PathBuf::from(env::var_os("OUT_DIR").unwrap()).join("f_cpu.rs");
    fs::write(
        out,
        format!(
            "/// CPU core clock in Hz, fixed when the crate is built (set with \
             the `F_CPU` environment variable).\n\
             pub const F_CPU: u32 = {};\n",
            f_cpu,
        ),
    )
    .unwrap();
}

/// Accepts plain decimal Hz, with optional `_` separators and a C-style `L`
/// or `UL` suffix, so values copied out of a makefile work unchanged.
fn parse_hz(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .trim_end_matches(|c: char| c == 'L' || c == 'U' || c == 'l' || c == 'u')
        .chars()
        .filter(|&c| c != '_')
        .collect();
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(hz) => Some(hz),
    }
}
