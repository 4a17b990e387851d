//! Constants shared by the simulations.

use std::f64::consts::PI;

/// The Omega constant, used as a tunable multiplier across the gallery.
pub const OMEGA: f64 = 117.038;

/// Coupling strength of the resonant ("flow") state.
pub const PHI: f64 = 1.618;

pub const ALPHA: f64 = 0.47;

/// Symbolic only; simulations work in natural units.
pub const K_BOLTZMANN: f64 = 1.38e-23;

/// Informational "agitation" temperature, Omega / 2π.
pub const TEMP_UNRUH: f64 = OMEGA / (2.0 * PI);

/// Period of an omega-resonant sequence, floor(sqrt(Omega)).
pub const OMEGA_PERIOD: usize = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omega_period_is_floor_of_sqrt() {
        assert_eq!(OMEGA.sqrt().floor() as usize, OMEGA_PERIOD);
    }

    #[test]
    fn unruh_temperature_matches_definition() {
        assert!((TEMP_UNRUH - 18.627).abs() < 1e-3);
    }
}
