// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A model of the ATtiny13 hardware this crate drives, for running it on a
//! host.
//!
//! **Note:** this module only exists when building for something other than
//! AVR. It's how the test suite exercises the real code paths without a
//! chip.
//!
//! Simulated time only moves when you call [`run_cycles`] (or when the code
//! under test calls [`delay`][crate::delay::delay], which spins through the
//! same function). As cycles pass:
//!
//! - Timer0 counts at `F_CPU / prescaler` once `TCCR0B` selects a clock. When
//!   `TCNT0` wraps, the `TOV0` flag is set, and if both `TOIE0` and the
//!   global interrupt enable are set, the overflow handler runs right there.
//!   Like the hardware, an overflow that can't be serviced stays pending, and
//!   a second one while it's pending is lost.
//!
//! - The watchdog, once [`enable_watchdog`] has been called, fires every
//!   [`WATCHDOG_PERIOD_MS`] of simulated time and advances the millisecond
//!   counter by the same amount, standing in for the clock subsystem's
//!   advancing routine.
//!
//! All state is global, like the registers it models. Tests that touch it
//! should hold a common lock and start with [`reset`].

use portable_atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};

use crate::clock::CYCLES_PER_MILLI;
use crate::millis::WATCHDOG_PERIOD_MS;

use super::TOIE0;

static TCCR0B: AtomicU8 = AtomicU8::new(0);
static TIMSK0: AtomicU8 = AtomicU8::new(0);
static TCNT0: AtomicU8 = AtomicU8::new(0);
/// Timer0 overflow flag.
static TOV0: AtomicBool = AtomicBool::new(false);
/// Watchdog interrupt flag.
static WDIF: AtomicBool = AtomicBool::new(false);
/// I bit of SREG.
static SREG_I: AtomicBool = AtomicBool::new(false);

static WATCHDOG_ON: AtomicBool = AtomicBool::new(false);

/// Total CPU cycles since reset.
static CYCLES: AtomicU64 = AtomicU64::new(0);
/// Cycles fed into the prescaler that haven't yet made a whole tick.
static PRESCALER_RESIDUE: AtomicU32 = AtomicU32::new(0);
/// Cycles since the last watchdog timeout.
static WATCHDOG_RESIDUE: AtomicU64 = AtomicU64::new(0);
/// Cycles to run right after the next `TCNT0` read.
static INJECTED: AtomicU32 = AtomicU32::new(0);

/// CPU cycles per watchdog timeout. The real watchdog runs from its own
/// 128 kHz oscillator; here it's pinned to the core clock.
const WATCHDOG_PERIOD_CYCLES: u64 = WATCHDOG_PERIOD_MS as u64 * CYCLES_PER_MILLI as u64;

/// Puts the model back in its power-on state: registers zeroed, interrupts
/// off, watchdog off, no cycles elapsed, and both counters at zero.
pub fn reset() {
    TCCR0B.store(0, Ordering::SeqCst);
    TIMSK0.store(0, Ordering::SeqCst);
    TCNT0.store(0, Ordering::SeqCst);
    TOV0.store(false, Ordering::SeqCst);
    WDIF.store(false, Ordering::SeqCst);
    SREG_I.store(false, Ordering::SeqCst);
    WATCHDOG_ON.store(false, Ordering::SeqCst);
    CYCLES.store(0, Ordering::SeqCst);
    PRESCALER_RESIDUE.store(0, Ordering::SeqCst);
    WATCHDOG_RESIDUE.store(0, Ordering::SeqCst);
    INJECTED.store(0, Ordering::SeqCst);

    crate::millis::reset();
    #[cfg(feature = "micros")]
    crate::micros::reset();
}

/// Lets `cycles` CPU cycles pass, running any interrupt handlers that come
/// due along the way.
pub fn run_cycles(cycles: u32) {
    CYCLES.fetch_add(u64::from(cycles), Ordering::SeqCst);
    run_timer0(cycles);
    run_watchdog(cycles);
}

/// Turns on the watchdog interrupt at its 16 ms timeout, the way the clock
/// subsystem would at startup.
pub fn enable_watchdog() {
    WATCHDOG_ON.store(true, Ordering::SeqCst);
}

/// Arranges for `cycles` CPU cycles to pass immediately after the next read
/// of `TCNT0`, as if an interrupt had arrived between that read and whatever
/// the reader does next.
pub fn interrupt_after_next_count_read(cycles: u32) {
    INJECTED.store(cycles, Ordering::SeqCst);
}

/// Current contents of `TCCR0B`.
pub fn tccr0b() -> u8 {
    TCCR0B.load(Ordering::SeqCst)
}

/// Current contents of `TIMSK0`.
pub fn timsk0() -> u8 {
    TIMSK0.load(Ordering::SeqCst)
}

/// Current contents of `TCNT0`.
pub fn tcnt0() -> u8 {
    TCNT0.load(Ordering::SeqCst)
}

/// Overwrites `TCNT0`, e.g. to put the counter just short of an overflow.
pub fn set_tcnt0(count: u8) {
    TCNT0.store(count, Ordering::SeqCst);
}

/// Checks the I bit of `SREG`.
pub fn interrupts_enabled() -> bool {
    SREG_I.load(Ordering::SeqCst)
}

/// CPU cycles elapsed since [`reset`].
pub fn cycles() -> u64 {
    CYCLES.load(Ordering::SeqCst)
}

/// Divisor selected by the `CS02:0` bits, or `None` if the timer is stopped
/// (or clocked from the `T0` pin, which nothing here drives).
fn timer0_divisor(tccr0b: u8) -> Option<u32> {
    match tccr0b & 0b111 {
        0b001 => Some(1),
        0b010 => Some(8),
        0b011 => Some(64),
        0b100 => Some(256),
        0b101 => Some(1024),
        _ => None,
    }
}

fn run_timer0(cycles: u32) {
    let Some(divisor) = timer0_divisor(TCCR0B.load(Ordering::SeqCst)) else {
        return;
    };
    let total = u64::from(PRESCALER_RESIDUE.load(Ordering::SeqCst)) + u64::from(cycles);
    PRESCALER_RESIDUE.store((total % u64::from(divisor)) as u32, Ordering::SeqCst);
    let mut ticks = total / u64::from(divisor);

    // Step one overflow at a time so each is presented to the handler in
    // turn.
    while ticks != 0 {
        let count = TCNT0.load(Ordering::SeqCst);
        let to_wrap = 256 - u64::from(count);
        if ticks < to_wrap {
            TCNT0.store(count + ticks as u8, Ordering::SeqCst);
            break;
        }
        ticks -= to_wrap;
        TCNT0.store(0, Ordering::SeqCst);
        TOV0.store(true, Ordering::SeqCst);
        service_interrupts();
    }
}

fn run_watchdog(cycles: u32) {
    if !WATCHDOG_ON.load(Ordering::SeqCst) {
        return;
    }
    let mut residue = WATCHDOG_RESIDUE.load(Ordering::SeqCst) + u64::from(cycles);
    while residue >= WATCHDOG_PERIOD_CYCLES {
        residue -= WATCHDOG_PERIOD_CYCLES;
        WDIF.store(true, Ordering::SeqCst);
        service_interrupts();
    }
    WATCHDOG_RESIDUE.store(residue, Ordering::SeqCst);
}

/// Runs the handler for each pending, enabled interrupt, if interrupts are on.
/// Flags are cleared as their handler is entered.
fn service_interrupts() {
    if !SREG_I.load(Ordering::SeqCst) {
        return;
    }
    if TIMSK0.load(Ordering::SeqCst) & TOIE0 != 0 && TOV0.swap(false, Ordering::SeqCst) {
        #[cfg(feature = "micros")]
        crate::micros::on_overflow();
    }
    if WATCHDOG_ON.load(Ordering::SeqCst) && WDIF.swap(false, Ordering::SeqCst) {
        crate::millis::advance(WATCHDOG_PERIOD_MS);
    }
}

#[cfg_attr(not(feature = "micros"), allow(dead_code))]
pub(crate) fn timer0_start(prescaler: crate::clock::Prescaler) {
    TCCR0B.store(prescaler.clock_select(), Ordering::SeqCst);
}

#[cfg_attr(not(feature = "micros"), allow(dead_code))]
pub(crate) fn timer0_enable_overflow_interrupt() {
    TIMSK0.store(TOIE0, Ordering::SeqCst);
}

#[cfg_attr(not(feature = "micros"), allow(dead_code))]
pub(crate) fn timer0_set_count(count: u8) {
    TCNT0.store(count, Ordering::SeqCst);
}

#[cfg_attr(not(feature = "micros"), allow(dead_code))]
pub(crate) fn timer0_count() -> u8 {
    let count = TCNT0.load(Ordering::SeqCst);
    let injected = INJECTED.swap(0, Ordering::SeqCst);
    if injected != 0 {
        run_cycles(injected);
    }
    count
}

/// Sets the I bit and services anything that was left pending.
///
/// # Safety
///
/// Must not be called inside a critical section. Nothing here can actually go
/// wrong on the host; the signature matches the AVR version.
pub(crate) unsafe fn enable_interrupts() {
    SREG_I.store(true, Ordering::SeqCst);
    service_interrupts();
}

pub(crate) fn spin_millisecond() {
    run_cycles(CYCLES_PER_MILLI);
}
