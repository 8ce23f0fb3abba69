// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Timekeeping for ATtiny13-class AVR microcontrollers.
//!
//! This crate provides the handful of time functions a small sketch-style
//! program wants, in as little flash as possible:
//!
//! - [`read_millis`]: milliseconds since startup, advanced by the watchdog
//!   interrupt in 16 ms steps. No CPU timer needed.
//! - [`read_micros`]: microseconds since [`init`], from Timer0 and an overflow
//!   interrupt. Only with the `micros` feature (on by default).
//! - [`delay`]: a busy-wait in whole milliseconds.
//! - [`init`]: sets up Timer0 (if needed) and turns interrupts on. Call it
//!   once at startup.
//!
//! ```ignore
//! #[avr_device::entry]
//! fn main() -> ! {
//!     // Safety: we're not in a critical section.
//!     unsafe { tinytime::init(); }
//!
//!     loop {
//!         let start = tinytime::read_micros();
//!         toggle_led();
//!         tinytime::delay(500);
//!         let took = tinytime::micros::micros_since(start);
//!         // ...
//!     }
//! }
//! ```
//!
//! # Configuration
//!
//! The CPU clock is fixed when the crate is built, from the `F_CPU`
//! environment variable in Hz (`F_CPU=1200000 cargo build ...`). It defaults
//! to 9.6 MHz. With the `micros` feature, only the frequencies listed in
//! [`clock`] are accepted; anything else fails the build. See the
//! [`clock`] module for what the frequency controls.
//!
//! # Concurrency
//!
//! There are exactly two pieces of shared state: the millisecond counter,
//! written by the watchdog interrupt, and the Timer0 overflow count, written
//! by the overflow interrupt. Both are read from mainline code inside short
//! critical sections, and both wrap silently at 32 bits. Use wrapping
//! subtraction (the `*_since` functions) to measure intervals.
//!
//! Nothing here ever holds a critical section across a delay.
//!
//! # Testing on a host
//!
//! When built for anything other than AVR, the registers are replaced with a
//! simulation, [`sim`], that the test suite drives cycle by cycle.

#![no_std]

#![warn(
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    missing_debug_implementations,
    missing_docs,
    semicolon_in_expressions_from_macros,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_op_in_unsafe_fn,
    unused_qualifications,
)]

#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(test)]
extern crate std;

mod hal;
mod init;

pub mod clock;
pub mod delay;
pub mod millis;
#[cfg(feature = "micros")]
pub mod micros;

#[cfg(not(target_arch = "avr"))]
pub use hal::sim;

pub use delay::delay;
pub use init::init;
pub use millis::read_millis;
#[cfg(feature = "micros")]
pub use micros::read_micros;
