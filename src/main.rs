//! Immo Engine CLI
//!
//! Runs a worked example investment case end to end: financing, yearly
//! cashflow projection, value growth, exit scenario, and the household
//! affordability check.

use anyhow::Context;
use immo_engine::{
    amortization::{self, LoanTerms},
    exit::{self, ExitScenarioInputs, PreSaleCosts, SaleType},
    household::{self, EmploymentIncome, EmploymentType, HaircutConfig, HouseholdInputs},
    projection::{CashflowProjector, DepreciationConfig, OperatingCostAssumptions, RentAssumptions},
    valuation::{self, MarketScenario},
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Immo Engine v0.1.0");
    println!("==================\n");

    // Worked example: 500k purchase, 80 % financing over 30 years.
    let terms = LoanTerms::new(400_000.0, 3.5, 30);
    let schedule = amortization::schedule(&terms)?;

    println!("Financing: {:.0} at {:.2} % over {} years", terms.principal, terms.annual_rate_pct, terms.term_years);
    println!("  Monthly annuity: {:.2}", amortization::annuity(terms.principal, terms.annual_rate_pct, terms.term_years));
    println!();

    let projector = CashflowProjector::new(
        RentAssumptions {
            base_rent_year1: 30_000.0,
            growth_pct: 0.02,
            vacancy_pct: 0.03,
        },
        OperatingCostAssumptions {
            base_cost_year1: 8_000.0,
            growth_pct: 0.03,
        },
        DepreciationConfig {
            building_value: 400_000.0,
            flat_rate_pct: 0.015,
            accelerated_enabled: true,
            accelerated_year1_pct: 0.045,
            accelerated_year2_pct: 0.030,
            inventory_amount: 20_000.0,
            inventory_years: 10,
        },
        0.40,
    )?;
    let projection = projector.project(&schedule, 30);

    // Print the first 10 years to console
    println!("{:>4} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "Year", "Income", "Opex", "Annuity", "FCF", "Tax", "FCF a.T.");
    println!("{}", "-".repeat(84));
    for row in projection.years.iter().take(10) {
        println!("{:>4} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2}",
            row.year,
            row.income_after_vacancy,
            row.operating_expenses,
            row.annuity,
            row.free_cash_flow,
            row.tax,
            row.free_cash_flow_after_tax,
        );
    }
    if projection.years.len() > 10 {
        println!("... ({} more years)", projection.years.len() - 10);
    }

    match projection.first_positive_year() {
        Some(year) => println!("\nCashflow turns positive in year {year}"),
        None => println!("\nCashflow never turns positive over the horizon"),
    }

    // Write full yearly series to CSV
    let csv_path = "projection_output.csv";
    let mut writer = csv::Writer::from_path(csv_path)
        .with_context(|| format!("unable to create {csv_path}"))?;
    for row in &projection.years {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("Full projection written to: {csv_path}");

    // Exit scenario: sell in year 10 at the projected market value
    let values = valuation::value_series(500_000.0, 0.03, MarketScenario::Base, 30)?;
    let mut exit_inputs = ExitScenarioInputs {
        purchase_price: 500_000.0,
        closing_costs: 25_000.0,
        initial_loan: terms.principal,
        initial_equity: 125_000.0,
        living_area: 160.0,
        exit_year: 10,
        pure_sale: false,
        sale_type: SaleType::Flat,
        sale_price_flat: None,
        sale_price_per_sqm: None,
        broker_fee_pct: 0.05,
        pre_sale_costs: PreSaleCosts {
            renovation: 0.0,
            notary: 2_500.0,
            transfer_tax: 0.0,
            other: 1_000.0,
        },
        tax_rate_pct: 0.40,
        rent_by_year: Vec::new(),
        operating_costs_by_year: Vec::new(),
        principal_by_year: Vec::new(),
        interest_by_year: Vec::new(),
        property_value_by_year: Vec::new(),
    };
    exit_inputs.attach_projection(&projection, &values);

    let result = exit::evaluate(&exit_inputs)?;
    println!("\nExit scenario (sale in year {}):", result.exit_year);
    println!("  Sale price:        {:>12.2}", result.resolved_sale_price);
    println!("  Remaining debt:    {:>12.2}", result.remaining_debt);
    println!("  Exit costs:        {:>12.2}", result.exit_costs);
    println!("  Net exit proceeds: {:>12.2}", result.net_exit_proceeds);
    println!("  Cumulative FCF:    {:>12.2}", result.cumulative_free_cash_flow);
    println!("  Total proceeds:    {:>12.2}", result.total_proceeds);
    println!("  ROI:               {:>11.1} %", result.roi_pct);
    match result.irr_pct {
        Some(irr) => println!("  IRR:               {irr:>11.1} %"),
        None => println!("  IRR:                         —"),
    }

    for warning in exit::warnings(&result) {
        println!("  ! {:?}/{:?}: {}", warning.kind, warning.severity, warning.message);
    }

    // Household affordability for the same financing
    let household_inputs = HouseholdInputs {
        adults: 2,
        children: 1,
        employment_incomes: vec![
            EmploymentIncome {
                label: "Main earner".to_string(),
                net_monthly: 3_800.0,
                employment_type: EmploymentType::Employee,
            },
            EmploymentIncome {
                label: "Partner".to_string(),
                net_monthly: 2_200.0,
                employment_type: EmploymentType::SelfEmployed,
            },
        ],
        rental_incomes: Vec::new(),
        other_incomes: Vec::new(),
        rent_or_housing_cost: 0.0,
        utilities_energy: 250.0,
        telecom_internet: 60.0,
        insurance: 180.0,
        transport_leases: 300.0,
        alimony: 0.0,
        other_fixed_expenses: 150.0,
        existing_loans: Vec::new(),
        pauschale_per_adult: 1_100.0,
        pauschale_per_child: 350.0,
        haircut: HaircutConfig {
            self_employed_pct: 0.20,
            rental_pct: 0.30,
            other_pct: 0.20,
        },
        target_loan_amount: terms.principal,
        nominal_interest_pct: terms.annual_rate_pct,
        term_years: terms.term_years,
        stress_interest_add_pct: 3.0,
        min_monthly_buffer: 300.0,
    };
    let affordability = household::evaluate(&household_inputs)?;

    println!("\nHousehold affordability:");
    println!("  Adjusted income:   {:>12.2}", affordability.adjusted_income);
    println!("  Fixed costs:       {:>12.2}", affordability.fixed_costs);
    println!("  Surplus:           {:>12.2}", affordability.surplus);
    println!("  Annuity (nominal): {:>12.2}", affordability.annuity);
    println!("  Annuity (stress):  {:>12.2}", affordability.annuity_stress);
    println!("  DSCR:              {:>12.2}", affordability.dscr);
    println!("  Max loan:          {:>12.2}", affordability.max_loan);
    println!(
        "  Verdict: nominal {} / stress {} -> {}",
        if affordability.pass_nominal { "pass" } else { "fail" },
        if affordability.pass_stress { "pass" } else { "fail" },
        if affordability.overall_pass { "AFFORDABLE" } else { "NOT AFFORDABLE" },
    );

    Ok(())
}
