// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The watchdog-driven millisecond counter.

use std::sync::{Mutex, MutexGuard};

use tinytime::clock::CYCLES_PER_MILLI;
use tinytime::millis::{self, WATCHDOG_PERIOD_MS};
use tinytime::{read_millis, sim};

static CHIP: Mutex<()> = Mutex::new(());

fn power_on() -> MutexGuard<'static, ()> {
    let guard = CHIP.lock().unwrap_or_else(|e| e.into_inner());
    sim::reset();
    guard
}

fn start() {
    // Safety: not in a critical section.
    unsafe { tinytime::init() }
}

fn run_millis(ms: u32) {
    for _ in 0..ms {
        sim::run_cycles(CYCLES_PER_MILLI);
    }
}

#[test]
fn zero_until_the_watchdog_runs() {
    let _chip = power_on();
    assert_eq!(read_millis(), 0);
    start();
    run_millis(100);
    assert_eq!(read_millis(), 0, "nobody turned the watchdog on");
}

#[test]
fn advances_in_watchdog_steps() {
    let _chip = power_on();
    start();
    sim::enable_watchdog();

    run_millis(WATCHDOG_PERIOD_MS - 1);
    assert_eq!(read_millis(), 0);
    run_millis(1);
    assert_eq!(read_millis(), 16);
    run_millis(160);
    assert_eq!(read_millis(), 176);
}

#[test]
fn timeout_waits_for_interrupts() {
    let _chip = power_on();
    sim::enable_watchdog();

    // Several timeouts with interrupts still off: the flag stays set, but
    // only one interrupt is owed.
    run_millis(100);
    assert_eq!(read_millis(), 0);

    start();
    assert_eq!(read_millis(), 16);
}

#[test]
fn never_goes_backwards() {
    let _chip = power_on();
    start();
    sim::enable_watchdog();

    let mut last = read_millis();
    for _ in 0..1000 {
        sim::run_cycles(3 * CYCLES_PER_MILLI + 17);
        let now = read_millis();
        assert!(now >= last);
        last = now;
    }
    assert!(last >= 3000 - 16);
}

#[test]
fn wraps_silently() {
    let _chip = power_on();
    millis::advance(u32::MAX - 5);
    let before = read_millis();

    millis::advance(10);

    assert_eq!(read_millis(), 4);
    assert!(read_millis() < before);
    assert_eq!(millis::millis_since(before), 10);
}

#[test]
fn interval_measurement() {
    let _chip = power_on();
    start();
    sim::enable_watchdog();
    run_millis(48);

    let mark = read_millis();
    run_millis(320);

    assert_eq!(millis::millis_since(mark), 320);
}

#[cfg(not(feature = "micros"))]
#[test]
fn init_without_micros_leaves_timer0_alone() {
    let _chip = power_on();
    start();

    assert_eq!(sim::tccr0b(), 0, "Timer0 was started");
    assert_eq!(sim::timsk0(), 0, "overflow interrupt enabled with no handler");
    assert_eq!(sim::tcnt0(), 0);
    assert!(sim::interrupts_enabled());

    // The timer stays stopped as time passes.
    run_millis(10);
    assert_eq!(sim::tcnt0(), 0);
}
