// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Register-level access to Timer0, the global interrupt flag and the cycle
//! delay.
//!
//! On AVR this is the real ATtiny13A. Everywhere else it's [`sim`], a model
//! of the same registers that the host tests drive. Both provide the same
//! crate-internal functions:
//!
//! - `timer0_start(Prescaler)`: write the clock-select bits of `TCCR0B`.
//! - `timer0_enable_overflow_interrupt()`: write `TOIE0` to `TIMSK0`.
//! - `timer0_set_count(u8)` / `timer0_count() -> u8`: `TCNT0`.
//! - `enable_interrupts()`: set the I bit in `SREG`.
//! - `spin_millisecond()`: burn one millisecond of CPU cycles.

/// Timer0 overflow interrupt enable, bit 1 of `TIMSK0`.
#[cfg_attr(not(feature = "micros"), allow(dead_code))]
pub(crate) const TOIE0: u8 = 1 << 1;

cfg_if::cfg_if! {
    if #[cfg(target_arch = "avr")] {
        mod attiny13;
        pub(crate) use attiny13::*;
    } else {
        pub mod sim;
        pub(crate) use sim::{
            enable_interrupts,
            spin_millisecond,
        };
        #[cfg(feature = "micros")]
        pub(crate) use sim::{
            timer0_count,
            timer0_enable_overflow_interrupt,
            timer0_set_count,
            timer0_start,
        };
    }
}
