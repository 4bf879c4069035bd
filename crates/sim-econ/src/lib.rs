#![deny(warnings)]

//! Economic core for the lemonade stand: demand curve and price optimizer.
//!
//! This module provides validated utilities for:
//! - Demand curve evaluation mapping (potential, unit cost, price) to a sale
//! - An exhaustive price-grid scan for the best achievable net profit
//! - Simple cost-plus pricing
//!
//! Both operations are pure and deterministic; weather and ingredient-cost
//! randomness are the caller's concern.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors produced by economic helpers.
#[derive(Debug, Error, PartialEq)]
pub enum EconError {
    /// Monetary values must be non-negative and finite; price must be > 0.
    #[error("invalid price or cost value")]
    InvalidPrice,
    /// Numeric conversion to floating point failed.
    #[error("non-finite numeric conversion")]
    NonFinite,
}

/// Compute a trivial price as cost plus a margin.
///
/// Example:
/// let cost = Decimal::new(100, 2); // 1.00
/// let margin = Decimal::new(50, 2); // 0.50
/// assert_eq!(cost_plus(cost, margin), Decimal::new(150, 2));
pub fn cost_plus(unit_cost: Decimal, margin: Decimal) -> Decimal {
    unit_cost * (Decimal::ONE + margin)
}

/// Non-linear price-response curve.
///
/// Quantity demanded is `floor(potential * unit_cost / price^exponent)`.
/// The exponent bends the relationship so demand falls off faster than
/// linearly as price rises above cost, giving a single-peaked net-profit
/// curve over price.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DemandCurve {
    /// Curve exponent. The default of 1.5 is a balance constant; changing it
    /// changes game difficulty, not correctness.
    pub exponent: f64,
}

impl Default for DemandCurve {
    fn default() -> Self {
        Self { exponent: 1.5 }
    }
}

impl DemandCurve {
    /// Quantity demanded at `price`, uncapped.
    ///
    /// Requires `unit_cost >= 0` and `price > 0`. Returns a non-negative
    /// integer quantity (floored, never rounded up), saturating at
    /// `u64::MAX`. The result is NOT capped at `potential`; capping against
    /// potential and stock on hand is the caller's responsibility.
    ///
    /// Example:
    /// let q = DemandCurve::default()
    ///     .quantity(99, Decimal::new(105, 2), Decimal::new(300, 2))
    ///     .unwrap();
    /// assert_eq!(q, 20);
    pub fn quantity(
        &self,
        potential: u64,
        unit_cost: Decimal,
        price: Decimal,
    ) -> Result<u64, EconError> {
        if unit_cost < Decimal::ZERO || price <= Decimal::ZERO {
            return Err(EconError::InvalidPrice);
        }
        let u = unit_cost.to_f64().ok_or(EconError::NonFinite)?;
        let p = price.to_f64().ok_or(EconError::NonFinite)?;
        let q = (potential as f64) * (u / p.powf(self.exponent));
        if !q.is_finite() || q < 0.0 {
            return Ok(0);
        }
        let qi = q.floor();
        if qi > (u64::MAX as f64) {
            return Ok(u64::MAX);
        }
        Ok(qi as u64)
    }

    /// Evaluate a full sale at `price`: uncapped quantity plus financials.
    pub fn evaluate(
        &self,
        potential: u64,
        unit_cost: Decimal,
        price: Decimal,
    ) -> Result<SaleOutcome, EconError> {
        let quantity = self.quantity(potential, unit_cost, price)?;
        Ok(SaleOutcome::settle(quantity, unit_cost, price))
    }
}

/// Financial outcome of selling a settled quantity at a given price.
///
/// Immutable once computed; gross and net always derive from the quantity
/// stored here, so callers that cap quantity must settle after capping.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SaleOutcome {
    /// Servings sold.
    pub quantity: u64,
    /// Price minus unit cost; negative when selling below cost.
    pub margin: Decimal,
    /// Quantity times price.
    pub gross: Decimal,
    /// Quantity times margin.
    pub net: Decimal,
}

impl SaleOutcome {
    /// Derive margin, gross and net for `quantity` servings.
    pub fn settle(quantity: u64, unit_cost: Decimal, price: Decimal) -> Self {
        let margin = price - unit_cost;
        let q = Decimal::from(quantity);
        Self {
            quantity,
            margin,
            gross: q * price,
            net: q * margin,
        }
    }
}

/// Ordered candidate prices scanned by the optimizer.
///
/// Stateless; the sequence is regenerated per call by exact decimal steps,
/// inclusive of both ends. Empty when the step is non-positive or the bounds
/// are inverted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceGrid {
    /// Lowest candidate price.
    pub start: Decimal,
    /// Highest candidate price, inclusive.
    pub end: Decimal,
    /// Spacing between candidates.
    pub step: Decimal,
}

impl Default for PriceGrid {
    fn default() -> Self {
        Self {
            start: Decimal::new(25, 2),
            end: Decimal::new(2500, 2),
            step: Decimal::new(25, 2),
        }
    }
}

impl PriceGrid {
    /// Candidate prices in ascending order.
    pub fn prices(&self) -> impl Iterator<Item = Decimal> + '_ {
        let step = self.step;
        let end = self.end;
        let seed = (self.start <= end && step > Decimal::ZERO).then_some(self.start);
        std::iter::successors(seed, move |p| {
            let next = *p + step;
            (next <= end).then_some(next)
        })
    }
}

/// Best grid point found by a scan.
///
/// The all-zero `Default` value is the sentinel meaning no valid profitable
/// price exists; it is a terminal outcome, not an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Price achieving the best net profit, or zero for the sentinel.
    pub price: Decimal,
    /// Servings sold at that price, capped by potential.
    pub quantity: u64,
    /// Quantity times price.
    pub gross: Decimal,
    /// Quantity times margin.
    pub net: Decimal,
}

impl OptimizationResult {
    /// False for the "no valid price" sentinel.
    pub fn is_sellable(&self) -> bool {
        self.quantity > 0
    }
}

/// Exhaustive scan of a price grid for the highest achievable net profit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceOptimizer {
    /// Demand curve applied at each candidate price.
    pub curve: DemandCurve,
    /// Grid of candidate prices.
    pub grid: PriceGrid,
}

impl PriceOptimizer {
    /// Best net profit achievable over the grid given demand alone.
    ///
    /// Quantity at each candidate is capped at `potential`; stock on hand is
    /// not consulted, so the scan answers "what was achievable given
    /// demand", not "given my inventory". A candidate qualifies only when it
    /// sells at least one serving at or above cost. Ties on net profit keep
    /// the first-seen, i.e. lowest, price.
    ///
    /// Example:
    /// let best = PriceOptimizer::default()
    ///     .find_best(99, Decimal::new(105, 2))
    ///     .unwrap();
    /// assert_eq!(best.price, Decimal::new(300, 2));
    pub fn find_best(
        &self,
        potential: u64,
        unit_cost: Decimal,
    ) -> Result<OptimizationResult, EconError> {
        let best = self
            .grid
            .prices()
            .try_fold(OptimizationResult::default(), |best, price| {
                let quantity = self
                    .curve
                    .quantity(potential, unit_cost, price)?
                    .min(potential);
                let outcome = SaleOutcome::settle(quantity, unit_cost, price);
                let valid = quantity > 0 && quantity <= potential && unit_cost <= price;
                // Strict comparison keeps the lowest price on ties.
                if valid && outcome.net > best.net {
                    Ok(OptimizationResult {
                        price,
                        quantity,
                        gross: outcome.gross,
                        net: outcome.net,
                    })
                } else {
                    Ok(best)
                }
            })?;
        debug!(
            potential,
            %unit_cost,
            price = %best.price,
            quantity = best.quantity,
            net = %best.net,
            "price scan complete"
        );
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn test_cost_plus() {
        let cost = dec(100); // 1.00
        let margin = dec(50); // 0.50
        assert_eq!(cost_plus(cost, margin), dec(150));
    }

    #[test]
    fn quantity_matches_hand_computed_values() {
        let curve = DemandCurve::default();
        // floor(99 * 1.05 / 3.00^1.5)
        assert_eq!(curve.quantity(99, dec(105), dec(300)).unwrap(), 20);
        // floor(99 * 1.05 / 1.75^1.5)
        assert_eq!(curve.quantity(99, dec(105), dec(175)).unwrap(), 44);
        // floor(1000 * 2.00 / 8.00^1.5)
        assert_eq!(curve.quantity(1000, dec(200), dec(800)).unwrap(), 88);
    }

    #[test]
    fn quantity_is_not_capped_at_potential() {
        // Pricing far below cost demands more than the market holds; capping
        // is the caller's job.
        let q = DemandCurve::default()
            .quantity(99, dec(105), dec(25))
            .unwrap();
        assert_eq!(q, 831);
    }

    #[test]
    fn zero_inputs_sell_nothing() {
        let curve = DemandCurve::default();
        assert_eq!(curve.quantity(0, dec(105), dec(300)).unwrap(), 0);
        assert_eq!(curve.quantity(99, Decimal::ZERO, dec(300)).unwrap(), 0);
    }

    #[test]
    fn quantity_rejects_bad_money() {
        let curve = DemandCurve::default();
        assert_eq!(
            curve.quantity(99, dec(105), Decimal::ZERO),
            Err(EconError::InvalidPrice)
        );
        assert_eq!(
            curve.quantity(99, dec(105), dec(-100)),
            Err(EconError::InvalidPrice)
        );
        assert_eq!(
            curve.quantity(99, dec(-105), dec(100)),
            Err(EconError::InvalidPrice)
        );
    }

    #[test]
    fn quantity_monotonic_decrease_with_price() {
        let curve = DemandCurve::default();
        let sample = [50, 100, 150, 200, 300, 500, 1000, 2500];
        let mut prev = u64::MAX;
        for cents in sample {
            let q = curve.quantity(99, dec(105), dec(cents)).unwrap();
            assert!(q <= prev, "demand rose from {prev} to {q} at {cents} cents");
            prev = q;
        }
    }

    #[test]
    fn settle_derives_financials_exactly() {
        let outcome = SaleOutcome::settle(20, dec(105), dec(300));
        assert_eq!(outcome.margin, dec(195));
        assert_eq!(outcome.gross, dec(6000));
        assert_eq!(outcome.net, dec(3900));
        assert_eq!(outcome.net, Decimal::from(20u64) * (dec(300) - dec(105)));

        // Selling below cost yields a negative margin and net.
        let loss = SaleOutcome::settle(10, dec(105), dec(100));
        assert_eq!(loss.margin, dec(-5));
        assert_eq!(loss.net, dec(-50));
    }

    #[test]
    fn default_grid_is_100_points_inclusive() {
        let grid = PriceGrid::default();
        let prices: Vec<Decimal> = grid.prices().collect();
        assert_eq!(prices.len(), 100);
        assert_eq!(prices[0], dec(25));
        assert_eq!(prices[99], dec(2500));
        assert!(prices.windows(2).all(|w| w[1] - w[0] == dec(25)));
    }

    #[test]
    fn degenerate_grids_are_empty() {
        let inverted = PriceGrid {
            start: dec(2500),
            end: dec(25),
            step: dec(25),
        };
        assert_eq!(inverted.prices().count(), 0);
        let stuck = PriceGrid {
            step: Decimal::ZERO,
            ..PriceGrid::default()
        };
        assert_eq!(stuck.prices().count(), 0);
    }

    #[test]
    fn find_best_golden_scenario() {
        let opt = PriceOptimizer::default();
        let best = opt.find_best(99, dec(105)).unwrap();
        assert_eq!(best.price, dec(300));
        assert_eq!(best.quantity, 20);
        assert_eq!(best.gross, dec(6000));
        assert_eq!(best.net, dec(3900));
        assert!(best.is_sellable());

        // The selected quantity is the curve's own answer at that price...
        assert_eq!(
            opt.curve.quantity(99, dec(105), best.price).unwrap(),
            best.quantity
        );
        // ...and no other valid grid point beats the selected net.
        for price in opt.grid.prices() {
            let quantity = opt.curve.quantity(99, dec(105), price).unwrap().min(99);
            let outcome = SaleOutcome::settle(quantity, dec(105), price);
            if quantity > 0 && dec(105) <= price {
                assert!(outcome.net <= best.net, "net {} beats best at {price}", outcome.net);
            }
        }
    }

    #[test]
    fn find_best_tie_keeps_lowest_price() {
        // potential 6 at unit cost 0.25 nets exactly 1.00 at both 0.50
        // (4 sold x 0.25) and 0.75 (2 sold x 0.50); the scan must keep 0.50.
        let best = PriceOptimizer::default().find_best(6, dec(25)).unwrap();
        assert_eq!(best.price, dec(50));
        assert_eq!(best.quantity, 4);
        assert_eq!(best.net, dec(100));
    }

    #[test]
    fn find_best_sentinel_when_no_demand() {
        let best = PriceOptimizer::default().find_best(0, dec(105)).unwrap();
        assert_eq!(best, OptimizationResult::default());
        assert!(!best.is_sellable());
    }

    #[test]
    fn find_best_sentinel_when_cost_exceeds_grid() {
        // 25.50 is above every candidate price, so no point sells at or
        // above cost.
        let best = PriceOptimizer::default().find_best(99, dec(2550)).unwrap();
        assert_eq!(best, OptimizationResult::default());
    }

    #[test]
    fn find_best_is_idempotent() {
        let opt = PriceOptimizer::default();
        let a = opt.find_best(99, dec(105)).unwrap();
        let b = opt.find_best(99, dec(105)).unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn quantity_monotonic(potential in 0u64..10_000,
                              unit_cents in 0i64..1_000,
                              price_cents in 25i64..2_400) {
            let curve = DemandCurve::default();
            let ql = curve.quantity(potential, dec(unit_cents), dec(price_cents)).unwrap();
            let qh = curve.quantity(potential, dec(unit_cents), dec(price_cents + 100)).unwrap();
            prop_assert!(ql >= qh);
        }

        #[test]
        fn best_result_respects_bounds(potential in 0u64..1_000, unit_cents in 0i64..3_000) {
            let opt = PriceOptimizer::default();
            let best = opt.find_best(potential, dec(unit_cents)).unwrap();
            prop_assert!(best.quantity <= potential);
            if best.is_sellable() {
                prop_assert!(best.price >= opt.grid.start);
                prop_assert!(best.price <= opt.grid.end);
                prop_assert!(best.price >= dec(unit_cents));
                prop_assert!(best.net > Decimal::ZERO);
                prop_assert_eq!(best.net, Decimal::from(best.quantity) * (best.price - dec(unit_cents)));
            } else {
                prop_assert_eq!(best, OptimizationResult::default());
            }
        }
    }
}
