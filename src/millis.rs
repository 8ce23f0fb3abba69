// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Millisecond counter driven by the watchdog.
//!
//! The counter is a 32-bit count of milliseconds. It's advanced from an
//! interrupt: normally the watchdog timeout interrupt, which on the ATtiny13
//! runs from its own 128 kHz oscillator and so keeps the same pace whatever
//! the CPU clock is. The catch is resolution: the fastest watchdog timeout is
//! 16 ms, so the counter moves in steps of [`WATCHDOG_PERIOD_MS`]. If 16 ms
//! is good enough, prefer [`read_millis`] over
//! [`read_micros`][crate::micros::read_micros]; it costs no Timer0 interrupts
//! and works at any `F_CPU`.
//!
//! This module doesn't configure the watchdog. That belongs to whatever sets
//! up the clocks at startup. Either turn on the `watchdog` feature, which
//! installs a `WDT` handler that calls [`advance`], or call [`advance`] from
//! your own handler.
//!
//! # Wraparound
//!
//! The count wraps to zero after 2^32 ms, a bit under 50 days. Compare times
//! by subtracting them with wrapping arithmetic (see [`millis_since`]), never
//! with `<`.

use portable_atomic::{AtomicU32, Ordering};

/// Milliseconds added per watchdog timeout.
pub const WATCHDOG_PERIOD_MS: u32 = 16;

/// Milliseconds since startup. Updated by ISR.
///
/// The AVR can't load 32 bits in one instruction; `portable-atomic` does the
/// load with interrupts masked and puts `SREG` back afterwards, so readers
/// never see half an update.
static MILLIS: AtomicU32 = AtomicU32::new(0);

/// Returns the number of milliseconds since the program started.
///
/// Safe to call at any time, including while the counter is being advanced.
/// Reads before the advancing interrupt is running return 0.
pub fn read_millis() -> u32 {
    MILLIS.load(Ordering::Acquire)
}

/// Returns the milliseconds elapsed since `earlier`, a value previously
/// returned by [`read_millis`]. Correct across one wraparound.
pub fn millis_since(earlier: u32) -> u32 {
    read_millis().wrapping_sub(earlier)
}

/// Adds `ms` to the counter, wrapping at `u32::MAX`.
///
/// This is the hook for the routine that advances the counter, normally an
/// interrupt handler. Nothing else should call it.
pub fn advance(ms: u32) {
    MILLIS.fetch_add(ms, Ordering::Release);
}

#[cfg(not(target_arch = "avr"))]
pub(crate) fn reset() {
    MILLIS.store(0, Ordering::Release);
}
