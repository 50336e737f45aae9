use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::time::Instant;
use tracing::debug;

use super::{to_cents, validate_confidence, PortfolioVaR, VarInput, DEFAULT_CONFIDENCE};
use crate::error::VarError;
use crate::types::{with_metadata, ComputationOutput, Money, Precision, Rate};
use crate::VarResult;

/// Critical value used by [`ZScoreMode::Fixed`]: the one-tailed 95% normal
/// quantile, rounded to 1.65.
pub const FIXED_Z_SCORE: Decimal = Decimal::from_parts(165, 0, 0, false, 2);

/// How the variance-covariance method picks its critical value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZScoreMode {
    /// Always [`FIXED_Z_SCORE`]; the confidence argument is validated but
    /// does not change the estimate.
    #[default]
    Fixed,
    /// Standard normal inverse CDF at the requested confidence.
    FromConfidence,
}

impl ZScoreMode {
    /// Critical value for `confidence` under this mode.
    pub fn z_score(self, confidence: Rate) -> VarResult<Rate> {
        match self {
            ZScoreMode::Fixed => Ok(FIXED_Z_SCORE),
            ZScoreMode::FromConfidence => inverse_normal(confidence),
        }
    }
}

/// Standard normal quantile, kept to 10 dp.
fn inverse_normal(p: Rate) -> VarResult<Rate> {
    let p = p
        .to_f64()
        .ok_or_else(|| VarError::Numerical(format!("Cannot convert confidence {p} to f64")))?;
    let standard = Normal::new(0.0, 1.0)
        .map_err(|e| VarError::Numerical(format!("Standard normal unavailable: {e}")))?;
    let z = standard.inverse_cdf(p);
    Decimal::from_f64(z)
        .map(|z| z.round_dp(10))
        .ok_or_else(|| VarError::Numerical(format!("Non-finite z-score for p = {p}")))
}

/// Parametric VaR with the inputs of the formula.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParametricVarOutput {
    /// Loss amount (positive number)
    pub var: Money,
    /// VaR as a fraction of portfolio value
    pub var_pct: Rate,
    pub z_score: Rate,
    pub z_score_mode: ZScoreMode,
    /// Volatility scaled to the horizon: σ × √days
    pub horizon_volatility: Rate,
    pub horizon_days: u32,
    pub confidence: Rate,
}

impl PortfolioVaR {
    /// Variance-covariance VaR: `value × volatility × √days × z`, rounded to
    /// 2 dp.
    ///
    /// Under the default [`ZScoreMode::Fixed`] the result does not depend on
    /// `confidence` beyond validation.
    pub fn variance_covariance_var(&self, confidence: Rate) -> VarResult<Money> {
        validate_confidence(confidence)?;
        let z = self.z_score_mode.z_score(confidence)?;
        let var = self
            .portfolio_value
            .checked_mul(self.horizon_volatility()?)
            .and_then(|v| v.checked_mul(z))
            .map(to_cents)
            .ok_or_else(|| {
                VarError::Numerical(format!(
                    "Parametric loss for {} over {} days overflows Decimal",
                    self.portfolio_value, self.horizon_days
                ))
            })?;
        debug!(
            %confidence,
            %z,
            horizon_days = self.horizon_days,
            %var,
            "variance-covariance VaR"
        );
        Ok(var)
    }

    fn horizon_volatility(&self) -> VarResult<Rate> {
        let sqrt_days = Decimal::from(self.horizon_days).sqrt().ok_or_else(|| {
            VarError::Numerical(format!("Cannot take sqrt of {} days", self.horizon_days))
        })?;
        self.volatility.checked_mul(sqrt_days).ok_or_else(|| {
            VarError::Numerical(format!(
                "Volatility {} scaled to {} days overflows Decimal",
                self.volatility, self.horizon_days
            ))
        })
    }
}

/// Run the variance-covariance method for an input document.
pub fn run_parametric_var(
    input: &VarInput,
) -> VarResult<ComputationOutput<ParametricVarOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let estimator = PortfolioVaR::from_input(input)?;
    let var = estimator.variance_covariance_var(input.confidence)?;
    let z_score = input.z_score_mode.z_score(input.confidence)?;

    if input.z_score_mode == ZScoreMode::Fixed && input.confidence != DEFAULT_CONFIDENCE {
        warnings.push(format!(
            "Fixed z-score {FIXED_Z_SCORE} applied; confidence {} does not change the estimate",
            input.confidence
        ));
    }
    if estimator.volatility().is_zero() {
        warnings.push("Zero volatility: parametric VaR is zero".into());
    }

    let output = ParametricVarOutput {
        var,
        var_pct: estimator.relative(var),
        z_score,
        z_score_mode: input.z_score_mode,
        horizon_volatility: estimator.horizon_volatility()?.round_dp(10),
        horizon_days: input.horizon_days,
        confidence: input.confidence,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Variance-Covariance (Parametric) VaR",
        &serde_json::json!({
            "portfolio_value": input.portfolio_value,
            "volatility": input.volatility,
            "horizon_days": input.horizon_days,
            "confidence": input.confidence,
            "z_score_mode": input.z_score_mode,
            "distribution": "normal, zero mean",
            "time_scaling": "square-root-of-time",
        }),
        warnings,
        elapsed,
        Precision::Decimal,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
