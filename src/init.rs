// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::hal;

/// Starts timekeeping and turns on interrupts.
///
/// Call this once at startup, before anything that depends on interrupts and
/// before the first [`read_micros`][crate::read_micros].
///
/// With the `micros` feature, this starts Timer0 at the prescaler chosen for
/// `F_CPU` (see [`clock::PRESCALER`][crate::clock::PRESCALER]), enables its
/// overflow interrupt, and zeroes both `TCNT0` and the overflow count. Without
/// it, Timer0 is left alone. Either way it finishes by setting the global
/// interrupt enable.
///
/// Calling it a second time restarts the microsecond count from zero, so
/// readings jump backwards. That's on the caller; nothing here stops it.
///
/// # Safety
///
/// This enables interrupts, so it must not be called from inside a critical
/// section (or an interrupt handler), where that would break the exclusion
/// the surrounding code relies on.
pub unsafe fn init() {
    #[cfg(feature = "micros")]
    critical_section::with(|_| {
        hal::timer0_start(crate::clock::PRESCALER);
        hal::timer0_enable_overflow_interrupt();
        hal::timer0_set_count(0);
        crate::micros::reset();
    });

    // Safety: passed on to our caller.
    unsafe {
        hal::enable_interrupts();
    }
}
