use super::params::potential_prefactor;

const NM_TO_M: f64 = 1e-9;

/// Screened Coulomb potential (V) of a unit charge at `dist_nm` nanometres.
///
/// Coincident sites do not interact with themselves and yield zero.
#[inline]
pub fn screened_coulomb_potential(dist_nm: f64, epsilon_r: f64, lambda_tf: f64) -> f64 {
    if dist_nm < 1e-9 {
        return 0.0;
    }
    potential_prefactor(epsilon_r) / (dist_nm * NM_TO_M) * (-dist_nm / lambda_tf).exp()
}

/// Potential (V) induced at `dist_nm` by a point charge of `charge` elementary charges.
#[inline]
pub fn point_charge_potential(charge: f64, dist_nm: f64, epsilon_r: f64, lambda_tf: f64) -> f64 {
    charge * screened_coulomb_potential(dist_nm, epsilon_r, lambda_tf)
}

/// Smallest distance on a `10^-precision` nm grid whose unit potential does not exceed `potential`.
///
/// Returns `f64::INFINITY` for non-positive targets, which no finite distance reaches.
pub fn distance_for_potential(
    potential: f64,
    epsilon_r: f64,
    lambda_tf: f64,
    precision: u32,
) -> f64 {
    const MAX_DISTANCE_NM: f64 = 1000.0;
    if !(potential > 0.0) {
        return f64::INFINITY;
    }
    let step = 10f64.powi(-(precision as i32));
    let max_steps = (MAX_DISTANCE_NM / step).ceil() as u64;
    (1..=max_steps)
        .map(|k| k as f64 * step)
        .find(|&d| screened_coulomb_potential(d, epsilon_r, lambda_tf) <= potential)
        .unwrap_or(f64::INFINITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn potential_at_dimer_row_spacing_matches_hand_value() {
        let v = screened_coulomb_potential(0.768, 5.6, 5.0);
        assert!(f64_approx_equal(v, 0.28711524349209466));
    }

    #[test]
    fn potential_at_one_nanometre_matches_hand_value() {
        assert!(f64_approx_equal(
            screened_coulomb_potential(1.0, 5.6, 5.0),
            0.21050683746124102
        ));
        assert!(f64_approx_equal(
            screened_coulomb_potential(1.0, 2.0, 1.0),
            0.264843093804945
        ));
    }

    #[test]
    fn coincident_sites_have_zero_potential() {
        assert_eq!(screened_coulomb_potential(0.0, 5.6, 5.0), 0.0);
    }

    #[test]
    fn point_charge_scales_with_charge_sign() {
        let unit = screened_coulomb_potential(1.0, 5.6, 5.0);
        assert!(f64_approx_equal(
            point_charge_potential(-1.0, 1.0, 5.6, 5.0),
            -unit
        ));
    }

    #[test]
    fn distance_for_potential_respects_precision() {
        assert!((distance_for_potential(0.29, 5.6, 5.0, 2) - 0.77).abs() < 1e-9);
        assert!((distance_for_potential(0.29, 5.6, 5.0, 3) - 0.762).abs() < 1e-9);
    }

    #[test]
    fn distance_for_non_positive_potential_is_infinite() {
        assert!(distance_for_potential(0.0, 5.6, 5.0, 2).is_infinite());
    }
}
