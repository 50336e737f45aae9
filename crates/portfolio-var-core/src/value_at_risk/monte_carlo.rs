use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;
use std::time::Instant;
use tracing::{debug, warn};

use super::quantile::{clamp_warning, quantile_index, QuantileIndex};
use super::{validate_confidence, PortfolioVaR, VarInput};
use crate::error::VarError;
use crate::types::{with_metadata, ComputationOutput, Money, Precision, Rate};
use crate::VarResult;

/// Runs with fewer trials produce a warning in the envelope.
pub(super) const MIN_RECOMMENDED_SIMULATIONS: usize = 1_000;

pub(super) fn few_simulations_warning(simulations: usize) -> Option<String> {
    (simulations < MIN_RECOMMENDED_SIMULATIONS).then(|| {
        format!("Only {simulations} simulations; at least {MIN_RECOMMENDED_SIMULATIONS} recommended")
    })
}

/// Monte Carlo VaR with statistics of the simulated returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloVarOutput {
    /// Loss amount (positive number)
    pub var: Money,
    /// VaR as a fraction of portfolio value
    pub var_pct: Rate,
    /// Simulated return at the selected order statistic
    pub quantile_return: Rate,
    pub quantile_index: usize,
    pub simulations: usize,
    pub confidence: Rate,
    pub simulated_mean: f64,
    pub simulated_std_dev: f64,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone)]
pub(crate) struct MonteCarloEstimate {
    pub var: Money,
    pub quantile_return: Rate,
    pub quantile: QuantileIndex,
}

impl PortfolioVaR {
    /// Monte Carlo VaR using the estimator's own generator: seeded from
    /// [`Self::with_seed`] if set, otherwise from OS entropy.
    pub fn monte_carlo_var(&mut self, simulations: usize, confidence: Rate) -> VarResult<Money> {
        let mut rng = self.default_rng();
        self.monte_carlo_var_with_rng(&mut rng, simulations, confidence)
    }

    /// Monte Carlo VaR drawing from `rng`.
    ///
    /// Draws `simulations` daily returns from
    /// `Normal(mean_return, volatility)` into the simulated-return cache,
    /// replacing its contents, then reads the order statistic at
    /// `floor((1 - confidence) * simulations)` and scales its absolute value
    /// by the portfolio value. Rounded to 2 dp; not scaled by the horizon.
    pub fn monte_carlo_var_with_rng<R: Rng>(
        &mut self,
        rng: &mut R,
        simulations: usize,
        confidence: Rate,
    ) -> VarResult<Money> {
        Ok(self.monte_carlo_estimate(rng, simulations, confidence)?.var)
    }

    pub(crate) fn default_rng(&self) -> StdRng {
        match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        }
    }

    pub(crate) fn monte_carlo_estimate<R: Rng>(
        &mut self,
        rng: &mut R,
        simulations: usize,
        confidence: Rate,
    ) -> VarResult<MonteCarloEstimate> {
        validate_confidence(confidence)?;
        if simulations == 0 {
            return Err(VarError::InvalidInput(
                "Monte Carlo requires at least one simulation".into(),
            ));
        }

        self.simulate(rng, simulations)?;

        let mut sorted = self.simulated_returns.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let q = quantile_index(simulations, confidence);
        if q.clamped {
            warn!(
                index = q.index,
                simulations,
                "monte carlo quantile index clamped"
            );
        }

        let selected = sorted[q.index];
        let quantile_return = Decimal::from_f64(selected).ok_or_else(|| {
            VarError::Numerical(format!("Simulated return {selected} is not representable"))
        })?;
        let var = self.loss_from_return(quantile_return)?;
        debug!(
            %confidence,
            simulations,
            index = q.index,
            quantile_return = selected,
            %var,
            "monte carlo VaR"
        );

        Ok(MonteCarloEstimate {
            var,
            quantile_return,
            quantile: q,
        })
    }

    /// Replace the cache with `n` draws from `Normal(mean_return, volatility)`.
    fn simulate<R: Rng>(&mut self, rng: &mut R, n: usize) -> VarResult<()> {
        let mean = self.mean_return.to_f64().ok_or_else(|| {
            VarError::parameter("mean_return", "Not representable as f64")
        })?;
        let std_dev = self.volatility.to_f64().ok_or_else(|| {
            VarError::parameter("volatility", "Not representable as f64")
        })?;

        self.simulated_returns.clear();
        self.simulated_returns.reserve(n);

        // A degenerate normal has every draw at the mean.
        if std_dev == 0.0 {
            self.simulated_returns.resize(n, mean);
            return Ok(());
        }

        let normal = Normal::new(mean, std_dev).map_err(|e| VarError::InvalidParameter {
            field: "volatility".into(),
            reason: format!("Invalid Normal parameters: {e}"),
        })?;
        for _ in 0..n {
            self.simulated_returns.push(rng.sample(normal));
        }
        Ok(())
    }
}

/// Mean and population standard deviation.
fn moments(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Run the Monte Carlo method for an input document.
pub fn run_monte_carlo_var(
    input: &VarInput,
) -> VarResult<ComputationOutput<MonteCarloVarOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let mut estimator = PortfolioVaR::from_input(input)?;
    let mut rng = estimator.default_rng();
    let estimate = estimator.monte_carlo_estimate(&mut rng, input.simulations, input.confidence)?;

    warnings.extend(few_simulations_warning(input.simulations));
    warnings.extend(clamp_warning(estimate.quantile, input.simulations));
    if input.horizon_days > 1 {
        warnings.push(format!(
            "Monte Carlo draws daily returns; horizon of {} days not applied",
            input.horizon_days
        ));
    }

    let (simulated_mean, simulated_std_dev) = moments(estimator.simulated_returns());

    let output = MonteCarloVarOutput {
        var: estimate.var,
        var_pct: estimator.relative(estimate.var),
        quantile_return: estimate.quantile_return.round_dp(10),
        quantile_index: estimate.quantile.index,
        simulations: input.simulations,
        confidence: input.confidence,
        simulated_mean,
        simulated_std_dev,
        seed: input.seed,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monte Carlo Simulation VaR",
        &serde_json::json!({
            "portfolio_value": input.portfolio_value,
            "mean_return": input.mean_return,
            "volatility": input.volatility,
            "distribution": "normal",
            "simulations": input.simulations,
            "confidence": input.confidence,
            "seed": input.seed,
        }),
        warnings,
        elapsed,
        Precision::Mixed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
