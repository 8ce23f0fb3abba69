// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CPU clock configuration, fixed at build time.
//!
//! Everything in this crate that depends on the core clock takes it from
//! [`F_CPU`], which `build.rs` generates from the `F_CPU` environment
//! variable (9.6 MHz if unset). There's no runtime way to change it: the
//! ATtiny13 runs from a fuse-selected oscillator, so the frequency is as
//! fixed as the firmware image.
//!
//! # Timer0 tick length
//!
//! Timer0 is clocked through a prescaler chosen from two bands:
//!
//! - At 4.8 MHz and above it divides by 64, so the 8-bit counter overflows
//!   every 16384 CPU cycles.
//! - Below that it divides by 8, overflowing every 2048 cycles.
//!
//! The bands keep the overflow interrupt between roughly 60 Hz (128 kHz
//! clock) and 1.2 kHz (20 MHz clock).
//!
//! A tick is then `prescaler / MHz` microseconds long, which is an integer
//! only for some clocks (16 MHz gives exactly 4 µs, 9.6 MHz gives 6.67 µs).
//! [`micros_per_tick`] rounds to an integer anyway. Microsecond readings thus
//! carry an error proportional to the time elapsed, but since every reading is
//! recomputed from raw ticks, the error never compounds from call to call.

use core::fmt;

include!(concat!(env!("OUT_DIR"), "/f_cpu.rs"));

/// CPU cycles in one millisecond at [`F_CPU`], rounded up so that spinning
/// this many cycles never takes less than a millisecond.
pub const CYCLES_PER_MILLI: u32 = F_CPU / 1000 + (F_CPU % 1000 != 0) as u32;

/// Frequencies at or above this use [`Prescaler::Div64`].
pub const DIV64_THRESHOLD_HZ: u32 = 4_800_000;

/// Timer0 prescaler, as selected by the `CS02:0` bits of `TCCR0B`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Prescaler {
    /// `clk/8`.
    Div8,
    /// `clk/64`.
    Div64,
}

impl Prescaler {
    /// Picks the prescaler band for a core clock of `hz`.
    pub const fn for_frequency(hz: u32) -> Self {
        if hz >= DIV64_THRESHOLD_HZ {
            Prescaler::Div64
        } else {
            Prescaler::Div8
        }
    }

    /// Number of CPU cycles per timer tick.
    pub const fn divisor(self) -> u32 {
        match self {
            Prescaler::Div8 => 8,
            Prescaler::Div64 => 64,
        }
    }

    /// Value of the clock-select field (`CS02:0`) in `TCCR0B`.
    pub const fn clock_select(self) -> u8 {
        match self {
            // CS01
            Prescaler::Div8 => 0b010,
            // CS01 | CS00
            Prescaler::Div64 => 0b011,
        }
    }
}

/// Prescaler used by Timer0 in this build.
pub const PRESCALER: Prescaler = Prescaler::for_frequency(F_CPU);

/// Returns the number of microseconds a Timer0 tick is taken to last at a
/// core clock of `hz`, or `None` if `hz` isn't one of the supported
/// frequencies.
///
/// The value is `prescaler / MHz` rounded to an integer.
pub const fn micros_per_tick(hz: u32) -> Option<u32> {
    match hz {
        20_000_000 => Some(3),
        16_000_000 => Some(4),
        12_000_000 => Some(5),
        9_600_000 => Some(7),
        8_000_000 => Some(8),
        4_800_000 => Some(13),
        1_200_000 => Some(7),
        1_000_000 => Some(8),
        600_000 => Some(13),
        128_000 => Some(62),
        _ => None,
    }
}

/// Timer0 timing for one core clock frequency.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Prescaler band for the frequency.
    pub prescaler: Prescaler,
    /// Rounded tick length in microseconds.
    pub micros_per_tick: u32,
}

impl Timing {
    /// Looks up the Timer0 timing for a core clock of `hz`.
    pub const fn for_frequency(hz: u32) -> Result<Self, UnsupportedFrequency> {
        match micros_per_tick(hz) {
            Some(micros_per_tick) => Ok(Timing {
                prescaler: Prescaler::for_frequency(hz),
                micros_per_tick,
            }),
            None => Err(UnsupportedFrequency(hz)),
        }
    }
}

/// Error produced when asking for microsecond timing at a core clock that has
/// no conversion constant.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnsupportedFrequency(pub u32);

impl fmt::Display for UnsupportedFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no microsecond conversion for a {} Hz clock", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_mhz_is_four_micros_per_tick() {
        let t = Timing::for_frequency(16_000_000).unwrap();
        assert_eq!(t.prescaler, Prescaler::Div64);
        assert_eq!(1000 * t.micros_per_tick, 4000);
    }

    #[test]
    fn prescaler_band_edges() {
        assert_eq!(Prescaler::for_frequency(4_800_000), Prescaler::Div64);
        assert_eq!(Prescaler::for_frequency(4_799_999), Prescaler::Div8);
        assert_eq!(Prescaler::for_frequency(1_200_000), Prescaler::Div8);
        assert_eq!(Prescaler::for_frequency(20_000_000), Prescaler::Div64);
    }

    #[test]
    fn clock_select_bits() {
        assert_eq!(Prescaler::Div8.clock_select(), 0b010);
        assert_eq!(Prescaler::Div64.clock_select(), 0b011);
    }

    #[test]
    fn multipliers_round_prescaler_over_mhz() {
        let supported = [
            20_000_000, 16_000_000, 12_000_000, 9_600_000, 8_000_000,
            4_800_000, 1_200_000, 1_000_000, 600_000, 128_000,
        ];
        for hz in supported {
            let t = Timing::for_frequency(hz).unwrap();
            // |m - prescaler * 1e6 / hz| <= 1/2, kept in integers. 128 kHz
            // sits exactly halfway between 62 and 63.
            let scaled = u64::from(t.micros_per_tick) * u64::from(hz);
            let exact = u64::from(t.prescaler.divisor()) * 1_000_000;
            assert!(2 * scaled.abs_diff(exact) <= u64::from(hz), "{} Hz", hz);
        }
    }

    #[test]
    fn unlisted_frequency_is_rejected() {
        assert_eq!(micros_per_tick(7_372_800), None);
        let e = Timing::for_frequency(7_372_800).unwrap_err();
        assert_eq!(e, UnsupportedFrequency(7_372_800));
    }

    #[test]
    fn unsupported_frequency_message() {
        use std::string::ToString;

        assert_eq!(
            UnsupportedFrequency(3_686_400).to_string(),
            "no microsecond conversion for a 3686400 Hz clock",
        );
    }

    #[test]
    fn build_frequency_has_a_millisecond() {
        assert!(CYCLES_PER_MILLI > 0);
        assert!(u64::from(CYCLES_PER_MILLI) * 1000 >= u64::from(F_CPU));
        assert!(u64::from(CYCLES_PER_MILLI - 1) * 1000 < u64::from(F_CPU));
    }
}
