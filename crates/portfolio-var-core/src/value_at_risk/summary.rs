use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::debug;

use super::historical::small_sample_warning;
use super::monte_carlo::few_simulations_warning;
use super::quantile::clamp_warning;
use super::{
    PortfolioVaR, VarInput, VarMethod, ZScoreMode, DEFAULT_CONFIDENCE, DEFAULT_SIMULATIONS,
    FIXED_Z_SCORE,
};
use crate::types::{with_metadata, ComputationOutput, Money, Precision, Rate};
use crate::VarResult;

/// VaR from all three methods at one confidence level.
///
/// Serializes as a three-key object using the report labels, in the order
/// historical, variance-covariance, Monte Carlo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarSummary {
    #[serde(rename = "Historical VaR")]
    pub historical: Money,
    #[serde(rename = "Variance-Covariance VaR")]
    pub variance_covariance: Money,
    #[serde(rename = "Monte Carlo VaR")]
    pub monte_carlo: Money,
}

impl VarSummary {
    /// `(label, value)` pairs in report order.
    pub fn entries(&self) -> [(&'static str, Money); 3] {
        [
            (VarMethod::Historical.label(), self.historical),
            (
                VarMethod::VarianceCovariance.label(),
                self.variance_covariance,
            ),
            (VarMethod::MonteCarlo.label(), self.monte_carlo),
        ]
    }

    pub fn get(&self, method: VarMethod) -> Money {
        match method {
            VarMethod::Historical => self.historical,
            VarMethod::VarianceCovariance => self.variance_covariance,
            VarMethod::MonteCarlo => self.monte_carlo,
        }
    }
}

/// One `<label>: <value>` line per method.
impl fmt::Display for VarSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (label, value)) in self.entries().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{label}: {value}")?;
        }
        Ok(())
    }
}

impl PortfolioVaR {
    /// All three estimates at `confidence`, with [`DEFAULT_SIMULATIONS`]
    /// Monte Carlo trials drawn from the estimator's own generator.
    pub fn summary(&mut self, returns: &[Rate], confidence: Rate) -> VarResult<VarSummary> {
        let mut rng = self.default_rng();
        self.summary_with_rng(&mut rng, returns, DEFAULT_SIMULATIONS, confidence)
    }

    /// All three estimates at `confidence`; Monte Carlo draws from `rng`.
    ///
    /// The same confidence is passed to every method.
    pub fn summary_with_rng<R: Rng>(
        &mut self,
        rng: &mut R,
        returns: &[Rate],
        simulations: usize,
        confidence: Rate,
    ) -> VarResult<VarSummary> {
        let summary = VarSummary {
            historical: self.historical_simulation(returns, confidence)?,
            variance_covariance: self.variance_covariance_var(confidence)?,
            monte_carlo: self.monte_carlo_var_with_rng(rng, simulations, confidence)?,
        };
        debug!(
            historical = %summary.historical,
            variance_covariance = %summary.variance_covariance,
            monte_carlo = %summary.monte_carlo,
            "VaR summary"
        );
        Ok(summary)
    }
}

/// Summary envelope payload: the three labeled values plus shared inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarSummaryOutput {
    #[serde(flatten)]
    pub estimates: VarSummary,
    pub confidence: Rate,
    pub horizon_days: u32,
    pub sample_size: usize,
    pub simulations: usize,
    pub z_score: Rate,
    pub z_score_mode: ZScoreMode,
}

/// Run all three methods for an input document.
pub fn run_var_summary(input: &VarInput) -> VarResult<ComputationOutput<VarSummaryOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let mut estimator = PortfolioVaR::from_input(input)?;
    let returns = &input.historical_returns;
    let confidence = input.confidence;

    let historical = estimator.historical_estimate(returns, confidence)?;
    let variance_covariance = estimator.variance_covariance_var(confidence)?;
    let mut rng = estimator.default_rng();
    let monte_carlo = estimator.monte_carlo_estimate(&mut rng, input.simulations, confidence)?;

    warnings.extend(small_sample_warning(returns.len()));
    warnings.extend(few_simulations_warning(input.simulations));
    warnings.extend(clamp_warning(historical.quantile, returns.len()));
    warnings.extend(clamp_warning(monte_carlo.quantile, input.simulations));
    if input.z_score_mode == ZScoreMode::Fixed && confidence != DEFAULT_CONFIDENCE {
        warnings.push(format!(
            "Variance-covariance uses fixed z-score {FIXED_Z_SCORE}; confidence {confidence} does not change it"
        ));
    }
    if input.horizon_days > 1 {
        warnings.push(format!(
            "Horizon of {} days applies to the variance-covariance estimate only",
            input.horizon_days
        ));
    }

    let output = VarSummaryOutput {
        estimates: VarSummary {
            historical: historical.var,
            variance_covariance,
            monte_carlo: monte_carlo.var,
        },
        confidence,
        horizon_days: input.horizon_days,
        sample_size: returns.len(),
        simulations: input.simulations,
        z_score: input.z_score_mode.z_score(confidence)?,
        z_score_mode: input.z_score_mode,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "VaR Summary (Historical, Variance-Covariance, Monte Carlo)",
        &serde_json::json!({
            "portfolio_value": input.portfolio_value,
            "mean_return": input.mean_return,
            "volatility": input.volatility,
            "horizon_days": input.horizon_days,
            "confidence": confidence,
            "simulations": input.simulations,
            "seed": input.seed,
            "z_score_mode": input.z_score_mode,
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
