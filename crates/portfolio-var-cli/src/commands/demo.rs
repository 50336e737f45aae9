use clap::Args;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use statrs::distribution::Normal;

use portfolio_var_core::value_at_risk::{
    PortfolioVaR, DEFAULT_CONFIDENCE, DEFAULT_SIMULATIONS,
};

const DEMO_PORTFOLIO_VALUE: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);
const DEMO_MEAN_RETURN: Decimal = Decimal::from_parts(1, 0, 0, false, 3);
const DEMO_VOLATILITY: Decimal = Decimal::from_parts(2, 0, 0, false, 2);

/// Arguments for the demonstration run
#[derive(Args)]
pub struct DemoArgs {
    /// Seed for the synthetic history and the Monte Carlo draws
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of synthetic daily returns (one trading year by default)
    #[arg(long, default_value = "250")]
    pub sample_size: usize,
}

/// Daily returns drawn from the demo portfolio's own normal distribution.
fn synthetic_returns(
    rng: &mut StdRng,
    n: usize,
) -> Result<Vec<Decimal>, Box<dyn std::error::Error>> {
    let mean = DEMO_MEAN_RETURN.to_f64().unwrap_or_default();
    let std_dev = DEMO_VOLATILITY.to_f64().unwrap_or_default();
    let normal = Normal::new(mean, std_dev)
        .map_err(|e| format!("Invalid demo distribution: {e}"))?;

    (0..n)
        .map(|_| {
            let r: f64 = rng.sample(normal);
            Decimal::from_f64(r)
                .map(|d| d.round_dp(8))
                .ok_or_else(|| format!("Synthetic return {r} is not representable").into())
        })
        .collect()
}

pub fn run_demo(args: DemoArgs) -> Result<String, Box<dyn std::error::Error>> {
    let mut rng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let returns = synthetic_returns(&mut rng, args.sample_size)?;
    let mut portfolio = PortfolioVaR::daily(DEMO_PORTFOLIO_VALUE, DEMO_MEAN_RETURN, DEMO_VOLATILITY)?;
    let summary =
        portfolio.summary_with_rng(&mut rng, &returns, DEFAULT_SIMULATIONS, DEFAULT_CONFIDENCE)?;

    Ok(format!(
        "Portfolio VaR Summary ({}% confidence):\n{}",
        (DEFAULT_CONFIDENCE * dec!(100)).normalize(),
        summary
    ))
}
