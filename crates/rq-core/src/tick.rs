//! Tick-grid price rounding.
//!
//! Pure helpers that snap a raw price onto the instrument's tick grid.
//! Both use the truncated remainder (`Decimal`'s `%`, sign follows the
//! dividend). `round_up` branches on the sign of the input and rounds
//! negative prices away from zero; `round_down` never branches. The
//! asymmetry is intentional and pinned by tests.
//!
//! Callers must guarantee `grid > 0`; the grid is validated once at
//! configuration load, not per call.

use rust_decimal::Decimal;

/// Round `price` up to the tick grid.
///
/// Returns the smallest grid multiple >= `price` for non-negative
/// prices. Negative prices round away from zero by magnitude.
#[inline]
pub fn round_up(price: Decimal, grid: Decimal) -> Decimal {
    debug_assert!(grid > Decimal::ZERO, "tick grid must be positive");
    let rem = price % grid;
    if rem.is_zero() {
        price
    } else if price >= Decimal::ZERO {
        price - rem + grid
    } else {
        price - rem - grid
    }
}

/// Round `price` down to the tick grid.
///
/// `price - price % grid`: truncates the remainder regardless of sign,
/// so negative prices move toward zero here (unlike `round_up`).
#[inline]
pub fn round_down(price: Decimal, grid: Decimal) -> Decimal {
    debug_assert!(grid > Decimal::ZERO, "tick grid must be positive");
    price - price % grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_up_on_grid_unchanged() {
        assert_eq!(round_up(dec!(1.10020), dec!(0.0001)), dec!(1.10020));
        assert_eq!(round_up(dec!(0), dec!(0.0001)), dec!(0));
    }

    #[test]
    fn test_round_up_off_grid() {
        assert_eq!(round_up(dec!(1.10021), dec!(0.0001)), dec!(1.1003));
        assert_eq!(round_up(dec!(1.10029), dec!(0.0001)), dec!(1.1003));
    }

    #[test]
    fn test_round_down_off_grid() {
        assert_eq!(round_down(dec!(1.10021), dec!(0.0001)), dec!(1.1002));
        assert_eq!(round_down(dec!(1.09970), dec!(0.0001)), dec!(1.0997));
    }

    #[test]
    fn test_round_down_bounds() {
        // round_down(p, g) <= p < round_down(p, g) + g
        for (p, g) in [
            (dec!(1.23456), dec!(0.0001)),
            (dec!(99.994), dec!(0.01)),
            (dec!(0.00007), dec!(0.0001)),
        ] {
            let down = round_down(p, g);
            assert!(down <= p);
            assert!(p < down + g);
        }
    }

    #[test]
    fn test_round_up_bounds_non_negative() {
        // round_up(p, g) >= p and round_up(p, g) - p < g for p >= 0
        for (p, g) in [
            (dec!(1.23456), dec!(0.0001)),
            (dec!(99.994), dec!(0.01)),
            (dec!(0.00007), dec!(0.0001)),
        ] {
            let up = round_up(p, g);
            assert!(up >= p);
            assert!(up - p < g);
        }
    }

    #[test]
    fn test_negative_price_asymmetry() {
        // round_up rounds negatives away from zero; round_down truncates
        // toward zero. A symmetric rewrite of either must fail here.
        assert_eq!(round_up(dec!(-1.25), dec!(0.5)), dec!(-1.5));
        assert_eq!(round_down(dec!(-1.25), dec!(0.5)), dec!(-1.0));

        // On-grid negatives pass through both.
        assert_eq!(round_up(dec!(-1.5), dec!(0.5)), dec!(-1.5));
        assert_eq!(round_down(dec!(-1.5), dec!(0.5)), dec!(-1.5));
    }

    #[test]
    fn test_two_pip_depth_scenario() {
        // top-of-ask 1.10000, spread 0.00010, depth 2 pips, grid 1 pip
        assert_eq!(round_up(dec!(1.10020), dec!(0.0001)), dec!(1.10020));
        assert_eq!(round_down(dec!(1.09970), dec!(0.0001)), dec!(1.09970));
    }
}
