// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Microsecond counter built on Timer0.
//!
//! **Note:** this entire module is only available if the `micros` feature is
//! present; it is on by default.
//!
//! [`init`][crate::init] starts Timer0 free-running through its prescaler and
//! enables its overflow interrupt. The handler counts overflows; a reading is
//! then `(overflows << 8) + TCNT0` ticks, scaled by [`MICROS_PER_TICK`].
//!
//! This costs an interrupt every 2048 CPU cycles below 4.8 MHz and every
//! 16384 cycles at or above it, plus the code for the handler and the 32-bit
//! multiply. Leave the feature off if [`read_millis`][crate::read_millis] is
//! precise enough.
//!
//! # Precision
//!
//! [`MICROS_PER_TICK`] is an integer, but the real tick length is a whole
//! number of microseconds only for some clocks. At 9.6 MHz a tick is 6.67 µs
//! but counts as 7, so readings run about 5% fast; see
//! [`clock`][crate::clock] for the table. The error grows with elapsed time
//! but doesn't accumulate between calls.
//!
//! # Unsupported clocks
//!
//! Building with this feature at an `F_CPU` missing from the table is a
//! compile error.

use portable_atomic::{AtomicU32, Ordering};

use crate::clock::{self, F_CPU};
use crate::hal;

/// Width of `TCNT0` in bits.
const COUNT_BITS: u32 = 8;

/// Microseconds per Timer0 tick at this build's `F_CPU`.
pub const MICROS_PER_TICK: u32 = match clock::micros_per_tick(F_CPU) {
    Some(m) => m,
    None => panic!("F_CPU has no microsecond conversion; disable the `micros` feature"),
};

/// Timer0 overflows since `init`. Updated by ISR.
static OVERFLOWS: AtomicU32 = AtomicU32::new(0);

/// Returns the number of microseconds since [`init`][crate::init].
///
/// The live count is read *before* interrupts are masked, and the overflow
/// count after. If an overflow lands in between, the result is ahead by up to
/// one overflow's worth of ticks, but an overflow is never counted twice and
/// the result is never behind any reading taken before that overflow.
pub fn read_micros() -> u32 {
    let count = hal::timer0_count();
    let overflows = critical_section::with(|_| OVERFLOWS.load(Ordering::Acquire));
    ticks_to_micros(elapsed_ticks(overflows, count))
}

/// Returns the microseconds elapsed since `earlier`, a value previously
/// returned by [`read_micros`]. Correct across one wraparound.
pub fn micros_since(earlier: u32) -> u32 {
    read_micros().wrapping_sub(earlier)
}

/// Returns the number of Timer0 overflows handled since [`init`][crate::init].
pub fn overflow_count() -> u32 {
    OVERFLOWS.load(Ordering::Acquire)
}

/// Combines an overflow count with a `TCNT0` value into a count of ticks,
/// wrapping on overflow.
pub const fn elapsed_ticks(overflows: u32, count: u8) -> u32 {
    (overflows << COUNT_BITS).wrapping_add(count as u32)
}

/// Converts Timer0 ticks to microseconds, wrapping on overflow.
pub const fn ticks_to_micros(ticks: u32) -> u32 {
    ticks.wrapping_mul(MICROS_PER_TICK)
}

/// Timer0 overflow handler body. Does one thing, quickly.
pub(crate) fn on_overflow() {
    OVERFLOWS.fetch_add(1, Ordering::Release);
}

/// Zeroes the overflow count. Only called with Timer0's interrupt masked.
pub(crate) fn reset() {
    OVERFLOWS.store(0, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_combine_overflows_and_count() {
        assert_eq!(elapsed_ticks(0, 0), 0);
        assert_eq!(elapsed_ticks(0, 255), 255);
        assert_eq!(elapsed_ticks(1, 0), 256);
        assert_eq!(elapsed_ticks(3, 232), 1000);
    }

    #[test]
    fn ticks_wrap_at_32_bits() {
        // The top 8 bits of the overflow count fall off the end.
        assert_eq!(elapsed_ticks(0x0100_0000, 5), 5);
        assert_eq!(elapsed_ticks(u32::MAX, 255), u32::MAX);
    }

    #[test]
    fn conversion_uses_build_constant() {
        assert_eq!(Some(MICROS_PER_TICK), clock::micros_per_tick(F_CPU));
        assert_eq!(ticks_to_micros(1000), 1000 * MICROS_PER_TICK);
        assert_eq!(ticks_to_micros(u32::MAX), u32::MAX.wrapping_mul(MICROS_PER_TICK));
    }
}
