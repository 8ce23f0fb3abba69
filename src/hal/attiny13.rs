// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ATtiny13A registers and interrupt vectors.

use avr_device::attiny13a::{tc0, TC0};

use crate::clock::CYCLES_PER_MILLI;

/// Timer0's register block.
///
/// We never take the `Peripherals` singleton: Timer0 belongs to this crate by
/// contract, and the rest of the application is free to own everything else.
#[cfg_attr(not(feature = "micros"), allow(dead_code))]
fn tc0() -> &'static tc0::RegisterBlock {
    // Safety: the pointer is the fixed MMIO address of the block, valid for
    // the life of the program. Only this module touches these registers.
    unsafe { &*TC0::ptr() }
}

#[cfg(feature = "micros")]
pub(crate) fn timer0_start(prescaler: crate::clock::Prescaler) {
    tc0().tccr0b.write(|w| unsafe { w.bits(prescaler.clock_select()) });
}

#[cfg(feature = "micros")]
pub(crate) fn timer0_enable_overflow_interrupt() {
    tc0().timsk0.write(|w| unsafe { w.bits(super::TOIE0) });
}

#[cfg(feature = "micros")]
pub(crate) fn timer0_set_count(count: u8) {
    tc0().tcnt0.write(|w| unsafe { w.bits(count) });
}

#[cfg(feature = "micros")]
#[inline(always)]
pub(crate) fn timer0_count() -> u8 {
    tc0().tcnt0.read().bits()
}

/// Sets the global interrupt enable.
///
/// # Safety
///
/// Must not be called inside a critical section.
pub(crate) unsafe fn enable_interrupts() {
    // Safety: passed on to our caller.
    unsafe { avr_device::interrupt::enable() }
}

pub(crate) fn spin_millisecond() {
    avr_device::asm::delay_cycles(CYCLES_PER_MILLI);
}

/// Timer0 overflow. Fires every 256 ticks.
#[cfg(feature = "micros")]
#[avr_device::interrupt(attiny13a)]
fn TIM0_OVF() {
    crate::micros::on_overflow();
}

/// Watchdog timeout, used as the millisecond tick. Whoever configured the
/// watchdog is expected to have picked the 16 ms timeout.
#[cfg(feature = "watchdog")]
#[avr_device::interrupt(attiny13a)]
fn WDT() {
    crate::millis::advance(crate::millis::WATCHDOG_PERIOD_MS);
}
