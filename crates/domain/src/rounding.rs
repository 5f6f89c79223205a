//! Rounding shared by every derived realm field.

/// Round to the nearest integer, with halves going toward positive infinity.
///
/// `-2.5` rounds to `-2`, `2.5` rounds to `3`. This differs from
/// [`f64::round`], which rounds halves away from zero. Non-finite input
/// yields `0`; values beyond the `i64` range saturate.
pub fn round_half_up(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halves_round_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(0.5), 1);
        assert_eq!(round_half_up(-0.5), 0);
    }

    #[test]
    fn non_halves_round_to_nearest() {
        assert_eq!(round_half_up(2.4999), 2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(round_half_up(7.0), 7);
    }

    #[test]
    fn non_finite_is_zero() {
        assert_eq!(round_half_up(f64::NAN), 0);
        assert_eq!(round_half_up(f64::INFINITY), 0);
    }
}
