// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Blocking delays.

use crate::hal;

/// Spins for `ms` milliseconds.
///
/// Each millisecond is a cycle-counted busy loop of
/// [`CYCLES_PER_MILLI`][crate::clock::CYCLES_PER_MILLI] cycles, so accuracy is
/// only as good as the CPU clock. It doesn't touch the timers, and works
/// before [`init`][crate::init].
///
/// Interrupts keep running while this spins, and the time spent in them is
/// added on top: treat `ms` as a lower bound. There's no way to cut a delay
/// short. Don't call this inside a critical section, or pending interrupts
/// will wait the whole time (and Timer0 overflows past the first will be
/// lost).
pub fn delay(ms: u16) {
    let mut remaining = ms;
    while remaining != 0 {
        remaining -= 1;
        hal::spin_millisecond();
    }
}
