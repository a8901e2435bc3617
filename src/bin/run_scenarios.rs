//! Evaluate bear/base/bull exit scenarios for one investment case
//!
//! Builds the full pipeline per market variant (financing schedule, cashflow
//! projection, value curve, exit scenario), evaluates all variants in
//! parallel, and writes a comparison CSV.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use immo_engine::{
    amortization::{self, LoanTerms},
    exit::{ExitScenarioInputs, PreSaleCosts, SaleType},
    projection::{CashflowProjector, DepreciationConfig, OperatingCostAssumptions, RentAssumptions},
    scenario::{ScenarioSet, ScenarioStatus},
    valuation::{self, MarketScenario},
};

#[derive(Debug, Parser)]
#[command(about = "Compare bear/base/bull exit scenarios for an investment case")]
struct Args {
    /// Purchase price of the property
    #[arg(long, default_value_t = 500_000.0)]
    purchase_price: f64,

    /// Initial loan amount
    #[arg(long, default_value_t = 400_000.0)]
    loan: f64,

    /// Nominal interest rate in percent
    #[arg(long, default_value_t = 3.5)]
    rate: f64,

    /// Loan term in years
    #[arg(long, default_value_t = 30)]
    term_years: u32,

    /// Gross rent in year 1
    #[arg(long, default_value_t = 30_000.0)]
    rent: f64,

    /// Year of the sale
    #[arg(long, default_value_t = 10)]
    exit_year: u32,

    /// Output CSV path
    #[arg(long, default_value = "scenario_comparison.csv")]
    output: PathBuf,
}

/// Market-dependent assumption tweaks, conservative on the downside.
fn variant_assumptions(market: MarketScenario, args: &Args) -> (f64, f64) {
    let (rent_factor, vacancy) = match market {
        MarketScenario::Bear => (0.9, 0.05),
        MarketScenario::Base => (1.0, 0.03),
        MarketScenario::Bull => (1.1, 0.01),
    };
    (args.rent * rent_factor, vacancy)
}

fn build_variant(
    market: MarketScenario,
    args: &Args,
) -> anyhow::Result<ExitScenarioInputs> {
    let (rent_year1, vacancy) = variant_assumptions(market, args);

    let terms = LoanTerms::new(args.loan, args.rate, args.term_years);
    let schedule = amortization::schedule(&terms)?;

    let projector = CashflowProjector::new(
        RentAssumptions {
            base_rent_year1: rent_year1,
            growth_pct: 0.02,
            vacancy_pct: vacancy,
        },
        OperatingCostAssumptions {
            base_cost_year1: 8_000.0,
            growth_pct: 0.03,
        },
        DepreciationConfig {
            building_value: args.purchase_price * 0.8,
            flat_rate_pct: 0.015,
            accelerated_enabled: false,
            accelerated_year1_pct: 0.0,
            accelerated_year2_pct: 0.0,
            inventory_amount: 0.0,
            inventory_years: 0,
        },
        0.40,
    )?;
    let projection = projector.project(&schedule, args.term_years);
    let values = valuation::value_series(args.purchase_price, 0.03, market, args.term_years)?;

    let equity = args.purchase_price - args.loan;
    let mut inputs = ExitScenarioInputs {
        purchase_price: args.purchase_price,
        closing_costs: args.purchase_price * 0.05,
        initial_loan: args.loan,
        initial_equity: equity + args.purchase_price * 0.05,
        living_area: 160.0,
        exit_year: args.exit_year,
        pure_sale: false,
        sale_type: SaleType::Flat,
        sale_price_flat: None, // fall back to the market value curve
        sale_price_per_sqm: None,
        broker_fee_pct: 0.05,
        pre_sale_costs: PreSaleCosts::default(),
        tax_rate_pct: 0.40,
        rent_by_year: Vec::new(),
        operating_costs_by_year: Vec::new(),
        principal_by_year: Vec::new(),
        interest_by_year: Vec::new(),
        property_value_by_year: Vec::new(),
    };
    inputs.attach_projection(&projection, &values);
    Ok(inputs)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    let mut set = ScenarioSet::new();
    for market in [MarketScenario::Bear, MarketScenario::Base, MarketScenario::Bull] {
        let inputs = build_variant(market, &args)
            .with_context(|| format!("building {market:?} variant"))?;
        set.add(format!("{market:?}"), inputs);
    }

    log::info!("evaluating {} scenarios", set.len());
    set.calculate_all();
    log::info!("evaluation complete in {:?}", start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("unable to create {}", args.output.display()))?;
    writer.write_record([
        "scenario",
        "sale_price",
        "remaining_debt",
        "exit_costs",
        "net_exit_proceeds",
        "cumulative_fcf",
        "total_proceeds",
        "roi_pct",
        "irr_pct",
    ])?;

    println!("{:>8} {:>14} {:>14} {:>14} {:>10} {:>10}",
        "Case", "Sale price", "Net proceeds", "Total", "ROI %", "IRR %");
    println!("{}", "-".repeat(76));

    for record in set.iter() {
        let result = match (&record.status, &record.result) {
            (ScenarioStatus::Computed, Some(result)) => result,
            (status, _) => {
                log::warn!("scenario '{}' not computed: {status:?}", record.name);
                continue;
            }
        };

        let irr = result
            .irr_pct
            .map(|v| format!("{v:.2}"))
            .unwrap_or_else(|| "—".to_string());
        writer.write_record([
            record.name.clone(),
            format!("{:.2}", result.resolved_sale_price),
            format!("{:.2}", result.remaining_debt),
            format!("{:.2}", result.exit_costs),
            format!("{:.2}", result.net_exit_proceeds),
            format!("{:.2}", result.cumulative_free_cash_flow),
            format!("{:.2}", result.total_proceeds),
            format!("{:.2}", result.roi_pct),
            irr.clone(),
        ])?;

        println!("{:>8} {:>14.0} {:>14.0} {:>14.0} {:>10.1} {:>10}",
            record.name,
            result.resolved_sale_price,
            result.net_exit_proceeds,
            result.total_proceeds,
            result.roi_pct,
            irr,
        );
    }
    writer.flush()?;

    if let Some(best) = set.best_by_irr() {
        println!("\nBest case by IRR: {}", best.name);
    }
    println!("Comparison written to: {}", args.output.display());

    Ok(())
}
