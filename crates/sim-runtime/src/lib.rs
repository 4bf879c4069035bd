#![deny(warnings)]

//! Weekly turn driver for the lemonade stand.
//!
//! Advances a season one Saturday at a time: draws a weather forecast,
//! drifts grocery prices, asks an injected decision-maker for purchases and
//! a serving price, realizes the sale against demand and stock on hand, and
//! scores the week against the optimizer's counterfactual.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{
    validate_config, validate_market, Forecast, ForecastKind, Ingredient, IngredientKind,
    Inventory, Market, Scorecard, StandConfig, ValidationError, WeekRecord,
};
use sim_econ::{EconError, OptimizationResult, PriceOptimizer, SaleOutcome};
use thiserror::Error;
use tracing::info;

/// Largest weekly move, up or down, in a pack's grocery price.
const PACK_COST_DRIFT: f64 = 1.50;

/// Errors raised while advancing a season.
#[derive(Debug, Error, PartialEq)]
pub enum TurnError {
    /// The grocery bill exceeds cash on hand.
    #[error("not enough cash: need {needed}, have {available}")]
    InsufficientCash {
        /// Total bill for the requested purchases.
        needed: Decimal,
        /// Cash available before the purchase.
        available: Decimal,
    },
    /// The serving price must be greater than zero.
    #[error("the price must be greater than zero")]
    NonPositivePrice,
    /// Every week of the season has already been played.
    #[error("the season is over")]
    SeasonOver,
    /// Configuration or market failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// The economic core rejected its inputs.
    #[error(transparent)]
    Econ(#[from] EconError),
}

/// Draw next week's weather: uniform category, uniform temperature in
/// `[temp_min_f, temp_max_f)`.
pub fn draw_forecast<R: Rng>(rng: &mut R, config: &StandConfig) -> Forecast {
    let kind = ForecastKind::ALL[rng.gen_range(0..ForecastKind::ALL.len())];
    let temperature_f = rng.gen_range(config.temp_min_f..config.temp_max_f);
    Forecast {
        kind,
        temperature_f,
    }
}

/// Potential sales for the week: the cap scaled down by temperature and
/// turnout. Colder or more severe weather means fewer thirsty customers.
pub fn potential_sales(cap: u64, forecast: &Forecast) -> u64 {
    let scaled = (cap as f64)
        * (forecast.temperature_f as f64 / 100.0)
        * (forecast.kind.factor() as f64);
    if scaled <= 0.0 {
        0
    } else {
        scaled.floor() as u64
    }
}

fn drift_ingredient<R: Rng>(rng: &mut R, ingredient: &mut Ingredient) {
    let delta = Decimal::from_f64(rng.gen_range(-PACK_COST_DRIFT..=PACK_COST_DRIFT))
        .unwrap_or(Decimal::ZERO)
        .round_dp(2);
    ingredient.pack_cost = (ingredient.pack_cost + delta).max(ingredient.floor_cost);
}

/// How many whole packs of each ingredient to buy this week.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasePlan {
    /// Boxes of cups.
    pub cups_packs: u32,
    /// Bags of lemons.
    pub lemons_packs: u32,
    /// Bags of sugar.
    pub sugar_packs: u32,
}

impl PurchasePlan {
    /// Packs requested for one ingredient.
    pub fn packs(&self, kind: IngredientKind) -> u32 {
        match kind {
            IngredientKind::Cups => self.cups_packs,
            IngredientKind::Lemons => self.lemons_packs,
            IngredientKind::Sugar => self.sugar_packs,
        }
    }

    /// Total grocery bill at current market prices.
    pub fn bill(&self, market: &Market) -> Decimal {
        IngredientKind::ALL
            .into_iter()
            .map(|kind| Decimal::from(self.packs(kind)) * market.ingredient(kind).pack_cost)
            .sum()
    }
}

/// Everything the decision-maker sees before committing to a week.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeekContext {
    /// Week number, 1-based.
    pub week: u32,
    /// This week's weather.
    pub forecast: Forecast,
    /// Maximum servings demand allows this week.
    pub potential: u64,
    /// Cost to produce one serving at current grocery prices.
    pub unit_cost: Decimal,
    /// Grocery prices after this week's drift.
    pub market: Market,
    /// Stock and cash before any purchase.
    pub inventory: Inventory,
}

/// The decision-maker's answer: what to buy and what to charge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeekDecision {
    /// Packs to purchase before opening.
    pub plan: PurchasePlan,
    /// Price charged per serving; must be positive.
    pub price: Decimal,
}

/// Outcome of one simulated Saturday.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeekReport {
    /// Week number, 1-based.
    pub week: u32,
    /// The weather that came to pass.
    pub forecast: Forecast,
    /// Servings demand allowed.
    pub potential: u64,
    /// Cost per serving this week.
    pub unit_cost: Decimal,
    /// Price charged per serving.
    pub price: Decimal,
    /// The realized sale, capped by demand and stock.
    pub outcome: SaleOutcome,
    /// Best achievable result had price been chosen perfectly.
    pub best: OptimizationResult,
    /// Ingredients that ran out during the week.
    pub stockouts: Vec<IngredientKind>,
    /// Cash after the week's purchases and sales.
    pub cash: Decimal,
    /// Cash gained or lost since the season opened.
    pub gain_loss: Decimal,
}

/// Full-season results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeasonReport {
    /// Per-week reports, in order.
    pub weeks: Vec<WeekReport>,
    /// Compact sales summary rows.
    pub summary: Vec<WeekRecord>,
    /// Servings sold across the season.
    pub total_sold: u64,
    /// Actual versus best-achievable net profit.
    pub score: Scorecard,
    /// Cash at season close.
    pub final_cash: Decimal,
    /// Cash gained or lost over the season.
    pub gain_loss: Decimal,
}

/// A lemonade stand mid-season.
///
/// Owns the market, inventory, score and a seeded RNG; the pricing decision
/// itself is injected per week, which keeps the driver testable without any
/// terminal I/O.
pub struct Stand {
    config: StandConfig,
    market: Market,
    inventory: Inventory,
    optimizer: PriceOptimizer,
    rng: ChaCha8Rng,
    week: u32,
    summary: Vec<WeekRecord>,
    score: Scorecard,
}

impl Stand {
    /// Open a stand for the season. Validates configuration and market.
    pub fn new(config: StandConfig, market: Market) -> Result<Self, TurnError> {
        validate_config(&config)?;
        validate_market(&market)?;
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let inventory = Inventory::new(config.starting_cash);
        Ok(Self {
            config,
            market,
            inventory,
            optimizer: PriceOptimizer::default(),
            rng,
            week: 1,
            summary: Vec::new(),
            score: Scorecard::default(),
        })
    }

    /// Replace the default optimizer (custom curve exponent or price grid).
    pub fn with_optimizer(mut self, optimizer: PriceOptimizer) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// The next week to be played, 1-based.
    pub fn current_week(&self) -> u32 {
        self.week
    }

    /// True until every configured week has been played.
    pub fn is_open(&self) -> bool {
        self.week <= self.config.weeks
    }

    /// Stock and cash right now.
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Grocery prices right now.
    pub fn market(&self) -> &Market {
        &self.market
    }

    /// Actual versus best-achievable net profit so far.
    pub fn score(&self) -> &Scorecard {
        &self.score
    }

    /// Run one Saturday.
    ///
    /// Draws weather, drifts grocery prices, then hands the decision-maker a
    /// [`WeekContext`] to commit purchases and a price. The realized sale is
    /// `min(potential, curve quantity, stock of each ingredient)`; the
    /// counterfactual scan does not see stock and reports what demand alone
    /// allowed.
    pub fn run_week<F>(&mut self, decide: F) -> Result<WeekReport, TurnError>
    where
        F: FnOnce(&WeekContext) -> WeekDecision,
    {
        if !self.is_open() {
            return Err(TurnError::SeasonOver);
        }

        let forecast = draw_forecast(&mut self.rng, &self.config);
        let potential = potential_sales(self.config.weekly_sales_cap, &forecast);
        for kind in IngredientKind::ALL {
            drift_ingredient(&mut self.rng, self.market.ingredient_mut(kind));
        }
        let unit_cost = self.market.unit_cost();

        let ctx = WeekContext {
            week: self.week,
            forecast,
            potential,
            unit_cost,
            market: self.market.clone(),
            inventory: self.inventory.clone(),
        };
        let decision = decide(&ctx);
        if decision.price <= Decimal::ZERO {
            return Err(TurnError::NonPositivePrice);
        }
        self.restock(&decision.plan)?;

        let demanded = self
            .optimizer
            .curve
            .quantity(potential, unit_cost, decision.price)?;
        let sold = demanded
            .min(potential)
            .min(self.inventory.cups)
            .min(self.inventory.lemons)
            .min(self.inventory.sugar);
        let outcome = SaleOutcome::settle(sold, unit_cost, decision.price);

        self.inventory.cups -= sold;
        self.inventory.lemons -= sold;
        self.inventory.sugar -= sold;
        self.inventory.cash += outcome.gross;

        let best = self.optimizer.find_best(potential, unit_cost)?;
        self.score.earned += outcome.net;
        self.score.possible += best.net;

        self.summary.push(WeekRecord {
            week: self.week,
            quantity: sold,
            price: decision.price,
        });

        let stockouts: Vec<IngredientKind> = IngredientKind::ALL
            .into_iter()
            .filter(|&kind| self.inventory.stock(kind) == 0)
            .collect();

        info!(
            week = self.week,
            weather = forecast.kind.label(),
            temperature_f = forecast.temperature_f,
            potential,
            sold,
            price = %decision.price,
            net = %outcome.net,
            best_net = %best.net,
            "week settled"
        );

        let report = WeekReport {
            week: self.week,
            forecast,
            potential,
            unit_cost,
            price: decision.price,
            outcome,
            best,
            stockouts,
            cash: self.inventory.cash,
            gain_loss: self.inventory.gain_loss(),
        };
        self.week += 1;
        Ok(report)
    }

    /// Run every remaining week and close out the season.
    pub fn run_season<F>(mut self, mut decide: F) -> Result<SeasonReport, TurnError>
    where
        F: FnMut(&WeekContext) -> WeekDecision,
    {
        let mut weeks = Vec::with_capacity(self.config.weeks as usize);
        while self.is_open() {
            weeks.push(self.run_week(&mut decide)?);
        }
        let total_sold = self.summary.iter().map(|r| r.quantity).sum();
        Ok(SeasonReport {
            weeks,
            summary: self.summary,
            total_sold,
            score: self.score,
            final_cash: self.inventory.cash,
            gain_loss: self.inventory.gain_loss(),
        })
    }

    fn restock(&mut self, plan: &PurchasePlan) -> Result<(), TurnError> {
        let bill = plan.bill(&self.market);
        if bill > self.inventory.cash {
            return Err(TurnError::InsufficientCash {
                needed: bill,
                available: self.inventory.cash,
            });
        }
        self.inventory.cash -= bill;
        for kind in IngredientKind::ALL {
            let servings = plan.packs(kind) as u64 * self.market.ingredient(kind).servings as u64;
            match kind {
                IngredientKind::Cups => self.inventory.cups += servings,
                IngredientKind::Lemons => self.inventory.lemons += servings,
                IngredientKind::Sugar => self.inventory.sugar += servings,
            }
        }
        Ok(())
    }
}
