#![deny(warnings)]

//! Headless CLI running a full lemonade-stand season.
//!
//! Buys enough stock to cover each week's estimated demand and prices with a
//! simple cost-plus markup, then reports how the season compares to the
//! optimizer's best-achievable result.

use anyhow::Result;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sim_core::{IngredientKind, Market, StandConfig};
use sim_runtime::{PurchasePlan, Stand, WeekContext, WeekDecision};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

struct Args {
    weeks: Option<u32>,
    seed: Option<u64>,
    markup: Option<f64>,
    celsius: bool,
    json: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        weeks: None,
        seed: None,
        markup: None,
        celsius: false,
        json: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--weeks" => args.weeks = it.next().and_then(|s| s.parse().ok()),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--markup" => args.markup = it.next().and_then(|s| s.parse().ok()),
            "--celsius" => args.celsius = true,
            "--json" => args.json = true,
            _ => {}
        }
    }
    args
}

/// Buy whole packs until the week's potential is covered, capped by cash.
fn plan_purchases(ctx: &WeekContext) -> PurchasePlan {
    let mut cash = ctx.inventory.cash;
    let mut plan = PurchasePlan::default();
    for kind in IngredientKind::ALL {
        let listing = ctx.market.ingredient(kind);
        let needed = ctx.potential.saturating_sub(ctx.inventory.stock(kind));
        let packs = needed.div_ceil(listing.servings as u64);
        let affordable = if listing.pack_cost > Decimal::ZERO {
            (cash / listing.pack_cost).floor().to_u64().unwrap_or(0)
        } else {
            packs
        };
        let buying = u32::try_from(packs.min(affordable)).unwrap_or(u32::MAX);
        cash -= Decimal::from(buying) * listing.pack_cost;
        match kind {
            IngredientKind::Cups => plan.cups_packs = buying,
            IngredientKind::Lemons => plan.lemons_packs = buying,
            IngredientKind::Sugar => plan.sugar_packs = buying,
        }
    }
    plan
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    let mut config = StandConfig::default();
    if let Some(weeks) = args.weeks {
        config.weeks = weeks;
    }
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    let markup = args
        .markup
        .and_then(Decimal::from_f64)
        .unwrap_or(Decimal::ONE);
    info!(weeks = config.weeks, seed = config.rng_seed, %markup, "opening the stand");

    let stand = Stand::new(config, Market::default())?;
    let report = stand.run_season(|ctx| WeekDecision {
        plan: plan_purchases(ctx),
        price: sim_econ::cost_plus(ctx.unit_cost, markup)
            .round_dp(2)
            .max(Decimal::new(1, 2)),
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for week in &report.weeks {
        let temperature = if args.celsius {
            format!("{:>3}ºC", week.forecast.temperature_c())
        } else {
            format!("{:>3}ºF", week.forecast.temperature_f)
        };
        println!(
            "Week {:>2} | {:>13} {} | potential {:>2} | price ${} | sold {:>2} | net ${}",
            week.week,
            week.forecast.kind.label(),
            temperature,
            week.potential,
            week.price,
            week.outcome.quantity,
            week.outcome.net
        );
        if week.best.net > week.outcome.net {
            println!(
                "         could have been {} sold x ${} ea. = ${} for a net of ${}",
                week.best.quantity, week.best.price, week.best.gross, week.best.net
            );
            for kind in &week.stockouts {
                println!("         ran out of {}", kind.label());
            }
        }
    }
    println!();
    match report.score.percent() {
        Some(pct) => println!(
            "Earned ${} of a possible ${} for a score of {}%",
            report.score.earned, report.score.possible, pct
        ),
        None => println!("No profitable price existed this season."),
    }
    println!(
        "Sold {} cups total | final cash ${} | gain/loss ${}",
        report.total_sold, report.final_cash, report.gain_loss
    );

    Ok(())
}
