//! Physical constants and electrostatics of the passivated silicon surface.

pub mod params;
pub mod potentials;

/// Vacuum permittivity in F/m.
pub const EPSILON_0: f64 = 8.854e-12;
/// Elementary charge in C.
pub const ELEMENTARY_CHARGE: f64 = 1.602e-19;
/// Boltzmann constant in eV/K.
pub const BOLTZMANN_EV_PER_K: f64 = 8.617e-5;
/// Tolerance (eV) absorbing floating-point noise in every stability comparison.
pub const POP_STABILITY_ERR: f64 = 1e-6;
/// Decimal places to which energies are rounded before they are compared.
pub const ENERGY_PRECISION: u32 = 6;
/// Gap between the (-/0) and (0/+) charge transition levels in eV.
pub const MU_PLUS_OFFSET: f64 = 0.59;

#[inline]
pub fn round_to_decimal_places(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_discards_noise_below_precision() {
        assert_eq!(round_to_decimal_places(-1.18401218674, ENERGY_PRECISION), -1.184012);
        assert_eq!(
            round_to_decimal_places(0.1 + 0.2, ENERGY_PRECISION),
            round_to_decimal_places(0.3, ENERGY_PRECISION)
        );
        assert_eq!(round_to_decimal_places(0.125, 2), 0.13);
    }
}
