//! Isolated unit-conversion module for the CLI and CSV boundary (spec §9:
//! "nothing in the core should call it"). All internal core computation
//! stays in SI; this module exists so schedule parsing and CSV writing can
//! speak Fahrenheit/gallons without leaking those units into `hpwh-sim`.
//!
//! Follows the same typed-constructor pattern as the teacher's
//! `tf_core::units` (thin wrappers over `uom` unit types rather than raw
//! scalar math), except for the Btu/h<->W conversion, where `uom`'s
//! configured feature set has no dedicated imperial thermal-power unit; that
//! one constant is applied directly, mirroring `tf_core::units::constants`'s
//! own raw-constant fallback for `g0`.

use uom::si::f64::{ThermodynamicTemperature, Volume};
use uom::si::thermodynamic_temperature::{degree_celsius, degree_fahrenheit};
use uom::si::volume::{gallon, liter};

/// Btu/h per watt, used by [`btu_per_hour_to_watts`] / [`watts_to_btu_per_hour`].
pub const BTU_PER_HOUR_PER_WATT: f64 = 3.412_142;

/// Convert a Fahrenheit temperature to Celsius.
#[inline]
pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    ThermodynamicTemperature::new::<degree_fahrenheit>(f).get::<degree_celsius>()
}

/// Convert a Celsius temperature to Fahrenheit.
#[inline]
pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    ThermodynamicTemperature::new::<degree_celsius>(c).get::<degree_fahrenheit>()
}

/// Convert US liquid gallons to liters.
#[inline]
pub fn gallons_to_liters(gal: f64) -> f64 {
    Volume::new::<gallon>(gal).get::<liter>()
}

/// Convert liters to US liquid gallons.
#[inline]
pub fn liters_to_gallons(l: f64) -> f64 {
    Volume::new::<liter>(l).get::<gallon>()
}

/// Convert watts to Btu/h.
#[inline]
pub fn watts_to_btu_per_hour(w: f64) -> f64 {
    w * BTU_PER_HOUR_PER_WATT
}

/// Convert Btu/h to watts.
#[inline]
pub fn btu_per_hour_to_watts(btu_h: f64) -> f64 {
    btu_h / BTU_PER_HOUR_PER_WATT
}

/// Convert kilowatt-hours to kilojoules.
#[inline]
pub fn kwh_to_kj(kwh: f64) -> f64 {
    kwh * 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fahrenheit_celsius_round_trip() {
        for f in [-40.0, 32.0, 98.6, 212.0] {
            let c = fahrenheit_to_celsius(f);
            let back = celsius_to_fahrenheit(c);
            assert!((back - f).abs() < 1e-9);
        }
    }

    #[test]
    fn freezing_and_boiling_points() {
        assert!((fahrenheit_to_celsius(32.0) - 0.0).abs() < 1e-9);
        assert!((fahrenheit_to_celsius(212.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn gallon_liter_round_trip() {
        let l = gallons_to_liters(50.0);
        assert!((l - 189.27).abs() < 0.1);
        let back = liters_to_gallons(l);
        assert!((back - 50.0).abs() < 1e-6);
    }

    #[test]
    fn watt_btu_round_trip() {
        let btu_h = watts_to_btu_per_hour(1000.0);
        assert!((btu_h - 3412.142).abs() < 1e-3);
        let back = btu_per_hour_to_watts(btu_h);
        assert!((back - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn kwh_to_kj_matches_definition() {
        assert!((kwh_to_kj(1.0) - 3600.0).abs() < 1e-9);
    }
}
