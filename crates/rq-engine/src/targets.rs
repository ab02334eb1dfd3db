//! Quote target computation.
//!
//! Targets are derived fresh every cycle from the top-of-book: offset
//! outward by the configured depth, then snapped onto the tick grid
//! away from the touch so the quote never lands inside its own depth.

use rq_core::{round_down, round_up, Price, TopOfBook};
use rust_decimal::Decimal;

/// Target resting prices for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteTargets {
    pub bid: Price,
    pub ask: Price,
}

/// Compute the target quote prices for a cycle.
///
/// Ask is offset above the best ask and rounded up; bid is offset
/// below the best bid and rounded down. The caller has already
/// verified the book is quotable.
pub fn compute_targets(
    book: &TopOfBook,
    depth_pips: Decimal,
    pip: Decimal,
    tick_grid: Decimal,
) -> QuoteTargets {
    let offset = depth_pips * pip;
    QuoteTargets {
        bid: Price::new(round_down(book.bid.inner() - offset, tick_grid)),
        ask: Price::new(round_up(book.ask.inner() + offset, tick_grid)),
    }
}

impl QuoteTargets {
    /// Drift of a resting price from its fresh target, as an absolute
    /// price distance.
    pub fn drift(target: Price, resting: Price) -> Decimal {
        (target.inner() - resting.inner()).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_targets_straddle_the_book() {
        let book = TopOfBook::new(Price::new(dec!(1.09990)), Price::new(dec!(1.10000)));
        let targets = compute_targets(&book, dec!(2), dec!(0.0001), dec!(0.0001));

        assert_eq!(targets.ask, Price::new(dec!(1.10020)));
        assert_eq!(targets.bid, Price::new(dec!(1.09970)));
        assert!(targets.bid < book.bid);
        assert!(targets.ask > book.ask);
    }

    #[test]
    fn test_rounding_moves_away_from_touch() {
        // Coarse grid: the raw offsets land between ticks.
        let book = TopOfBook::new(Price::new(dec!(1.09993)), Price::new(dec!(1.10002)));
        let targets = compute_targets(&book, dec!(2), dec!(0.0001), dec!(0.0005));

        // Raw ask 1.10022 rounds up to 1.10050; raw bid 1.09973 rounds
        // down to 1.09950.
        assert_eq!(targets.ask, Price::new(dec!(1.10050)));
        assert_eq!(targets.bid, Price::new(dec!(1.09950)));
    }

    #[test]
    fn test_zero_depth_snaps_the_touch() {
        let book = TopOfBook::new(Price::new(dec!(1.09990)), Price::new(dec!(1.10000)));
        let targets = compute_targets(&book, dec!(0), dec!(0.0001), dec!(0.0001));

        // On-grid touch prices survive unchanged.
        assert_eq!(targets.bid, book.bid);
        assert_eq!(targets.ask, book.ask);
    }

    #[test]
    fn test_drift_is_absolute() {
        let d = QuoteTargets::drift(Price::new(dec!(1.10020)), Price::new(dec!(1.09990)));
        assert_eq!(d, dec!(0.00030));
        let d = QuoteTargets::drift(Price::new(dec!(1.09990)), Price::new(dec!(1.10020)));
        assert_eq!(d, dec!(0.00030));
    }
}
