#![deny(warnings)]

//! Core domain models and invariants for the lemonade stand simulation.
//!
//! This crate defines serializable types shared across the simulation with
//! validation helpers to guarantee basic invariants.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Weather categories for a simulated Saturday, ordered best to worst.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForecastKind {
    /// Clear skies, full turnout.
    Sunny,
    /// Partly sunny.
    PartlySunny,
    /// Mostly cloudy.
    MostlyCloudy,
    /// Rainy.
    Rainy,
    /// Stormy, almost nobody shows up.
    Stormy,
}

impl ForecastKind {
    /// All forecast kinds, in sampling order.
    pub const ALL: [ForecastKind; 5] = [
        ForecastKind::Sunny,
        ForecastKind::PartlySunny,
        ForecastKind::MostlyCloudy,
        ForecastKind::Rainy,
        ForecastKind::Stormy,
    ];

    /// Turnout factor applied to the weekly sales cap (1.0 = full turnout).
    pub fn factor(self) -> f32 {
        match self {
            ForecastKind::Sunny => 1.00,
            ForecastKind::PartlySunny => 0.90,
            ForecastKind::MostlyCloudy => 0.70,
            ForecastKind::Rainy => 0.40,
            ForecastKind::Stormy => 0.10,
        }
    }

    /// Human-readable forecast name.
    pub fn label(self) -> &'static str {
        match self {
            ForecastKind::Sunny => "Sunny",
            ForecastKind::PartlySunny => "Partly Sunny",
            ForecastKind::MostlyCloudy => "Mostly Cloudy",
            ForecastKind::Rainy => "Rainy",
            ForecastKind::Stormy => "Stormy",
        }
    }
}

/// A week's weather draw: category plus temperature in Fahrenheit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    /// Weather category.
    pub kind: ForecastKind,
    /// Temperature in degrees Fahrenheit.
    pub temperature_f: i32,
}

impl Forecast {
    /// Temperature converted to whole degrees Celsius.
    pub fn temperature_c(&self) -> i32 {
        (((self.temperature_f - 32) as f64) * 5.0 / 9.0).round() as i32
    }
}

/// The three perishable inputs a serving of lemonade consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IngredientKind {
    /// Paper cups, bought by the box.
    Cups,
    /// Lemons, bought by the bag.
    Lemons,
    /// Sugar, bought by the bag.
    Sugar,
}

impl IngredientKind {
    /// All ingredient kinds, in restocking order.
    pub const ALL: [IngredientKind; 3] = [
        IngredientKind::Cups,
        IngredientKind::Lemons,
        IngredientKind::Sugar,
    ];

    /// Human-readable ingredient name.
    pub fn label(self) -> &'static str {
        match self {
            IngredientKind::Cups => "cups",
            IngredientKind::Lemons => "lemons",
            IngredientKind::Sugar => "sugar",
        }
    }
}

/// Grocery-store listing for one ingredient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Current price for one pack (box or bag) in local currency.
    pub pack_cost: Decimal,
    /// Servings yielded by one pack.
    pub servings: u32,
    /// Lowest price the pack can drift down to.
    pub floor_cost: Decimal,
}

impl Ingredient {
    pub fn new(pack_cost: Decimal, servings: u32, floor_cost: Decimal) -> Self {
        Self {
            pack_cost,
            servings,
            floor_cost,
        }
    }

    /// Cost contributed to a single serving, rounded to cents.
    pub fn unit_cost(&self) -> Decimal {
        (self.pack_cost / Decimal::from(self.servings)).round_dp(2)
    }
}

/// Current grocery-store prices for all three ingredients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    /// Box of cups.
    pub cups: Ingredient,
    /// Bag of lemons.
    pub lemons: Ingredient,
    /// Bag of sugar.
    pub sugar: Ingredient,
}

impl Default for Market {
    fn default() -> Self {
        Self {
            cups: Ingredient::new(Decimal::new(250, 2), 25, Decimal::new(99, 2)),
            lemons: Ingredient::new(Decimal::new(400, 2), 8, Decimal::new(200, 2)),
            sugar: Ingredient::new(Decimal::new(300, 2), 15, Decimal::new(150, 2)),
        }
    }
}

impl Market {
    /// Fully-loaded cost of producing one serving.
    pub fn unit_cost(&self) -> Decimal {
        self.cups.unit_cost() + self.lemons.unit_cost() + self.sugar.unit_cost()
    }

    /// Listing for one ingredient.
    pub fn ingredient(&self, kind: IngredientKind) -> &Ingredient {
        match kind {
            IngredientKind::Cups => &self.cups,
            IngredientKind::Lemons => &self.lemons,
            IngredientKind::Sugar => &self.sugar,
        }
    }

    /// Mutable listing for one ingredient.
    pub fn ingredient_mut(&mut self, kind: IngredientKind) -> &mut Ingredient {
        match kind {
            IngredientKind::Cups => &mut self.cups,
            IngredientKind::Lemons => &mut self.lemons,
            IngredientKind::Sugar => &mut self.sugar,
        }
    }
}

/// On-hand stock and cash for the stand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Cups on hand, in servings.
    pub cups: u64,
    /// Lemons on hand, in servings.
    pub lemons: u64,
    /// Sugar on hand, in servings.
    pub sugar: u64,
    /// Cash on hand.
    pub cash: Decimal,
    /// Cash at the start of the season, for gain/loss reporting.
    pub starting_cash: Decimal,
}

impl Inventory {
    pub fn new(starting_cash: Decimal) -> Self {
        Self {
            cups: 0,
            lemons: 0,
            sugar: 0,
            cash: starting_cash,
            starting_cash,
        }
    }

    /// Servings the stand can actually pour: the scarcest ingredient caps it.
    pub fn servings_on_hand(&self) -> u64 {
        self.cups.min(self.lemons).min(self.sugar)
    }

    /// Stock of one ingredient, in servings.
    pub fn stock(&self, kind: IngredientKind) -> u64 {
        match kind {
            IngredientKind::Cups => self.cups,
            IngredientKind::Lemons => self.lemons,
            IngredientKind::Sugar => self.sugar,
        }
    }

    /// Cash gained or lost since the season opened.
    pub fn gain_loss(&self) -> Decimal {
        self.cash - self.starting_cash
    }
}

/// Season configuration parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandConfig {
    /// Number of Saturdays in the season.
    pub weeks: u32,
    /// Maximum servings sellable in a single week at full turnout.
    pub weekly_sales_cap: u64,
    /// Lowest temperature a forecast can draw, inclusive (Fahrenheit).
    pub temp_min_f: i32,
    /// Highest temperature a forecast can draw, exclusive (Fahrenheit).
    pub temp_max_f: i32,
    /// Cash the stand opens the season with.
    pub starting_cash: Decimal,
    /// Seed for deterministic RNG.
    pub rng_seed: u64,
}

impl Default for StandConfig {
    fn default() -> Self {
        Self {
            weeks: 12,
            weekly_sales_cap: 99,
            temp_min_f: 69,
            temp_max_f: 100,
            starting_cash: Decimal::new(3000, 2),
            rng_seed: 42,
        }
    }
}

/// One row of the weekly sales summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRecord {
    /// Week number, 1-based.
    pub week: u32,
    /// Servings sold.
    pub quantity: u64,
    /// Price charged per serving.
    pub price: Decimal,
}

/// Running comparison of actual net profit against the best achievable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scorecard {
    /// Net profit actually earned across the season.
    pub earned: Decimal,
    /// Net profit the optimizer found achievable across the season.
    pub possible: Decimal,
}

impl Scorecard {
    /// Earned as a whole percentage of possible. None when nothing was
    /// achievable (avoids a zero division).
    pub fn percent(&self) -> Option<i32> {
        if self.possible == Decimal::ZERO {
            return None;
        }
        (self.earned / self.possible * Decimal::from(100))
            .round()
            .to_i32()
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A pack must yield at least one serving.
    #[error("pack must yield at least one serving")]
    NoServings,
    /// Price or cost must be non-negative.
    #[error("negative monetary value is invalid")]
    NegativeMoney,
    /// A season must span at least one week.
    #[error("season must span at least one week")]
    NoWeeks,
    /// The weekly sales cap must be positive.
    #[error("weekly sales cap must be > 0")]
    NoSalesCap,
    /// The forecast temperature range must be non-empty.
    #[error("temperature range [{0}, {1}) is empty")]
    EmptyTemperatureRange(i32, i32),
}

/// Validate one grocery listing.
pub fn validate_ingredient(i: &Ingredient) -> Result<(), ValidationError> {
    if i.servings == 0 {
        return Err(ValidationError::NoServings);
    }
    if i.pack_cost < Decimal::ZERO || i.floor_cost < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    Ok(())
}

/// Validate the whole grocery market.
pub fn validate_market(m: &Market) -> Result<(), ValidationError> {
    validate_ingredient(&m.cups)?;
    validate_ingredient(&m.lemons)?;
    validate_ingredient(&m.sugar)?;
    Ok(())
}

/// Validate the season configuration.
pub fn validate_config(c: &StandConfig) -> Result<(), ValidationError> {
    if c.weeks == 0 {
        return Err(ValidationError::NoWeeks);
    }
    if c.weekly_sales_cap == 0 {
        return Err(ValidationError::NoSalesCap);
    }
    if c.temp_min_f >= c.temp_max_f {
        return Err(ValidationError::EmptyTemperatureRange(
            c.temp_min_f,
            c.temp_max_f,
        ));
    }
    if c.starting_cash < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    Ok(())
}
