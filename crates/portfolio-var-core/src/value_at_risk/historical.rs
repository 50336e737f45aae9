use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use super::quantile::{clamp_warning, quantile_index, QuantileIndex};
use super::{validate_confidence, PortfolioVaR, VarInput};
use crate::error::VarError;
use crate::types::{with_metadata, ComputationOutput, Money, Precision, Rate};
use crate::VarResult;

/// Samples shorter than this produce a warning in the envelope.
pub(super) const MIN_RECOMMENDED_OBSERVATIONS: usize = 30;

pub(super) fn small_sample_warning(n: usize) -> Option<String> {
    (n < MIN_RECOMMENDED_OBSERVATIONS).then(|| {
        format!("Only {n} historical observations; at least {MIN_RECOMMENDED_OBSERVATIONS} recommended")
    })
}

/// Historical VaR with the order statistic it was read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalVarOutput {
    /// Loss amount (positive number)
    pub var: Money,
    /// VaR as a fraction of portfolio value
    pub var_pct: Rate,
    /// Return at the selected order statistic
    pub quantile_return: Rate,
    /// Index into the ascending sample
    pub quantile_index: usize,
    pub sample_size: usize,
    pub confidence: Rate,
}

#[derive(Debug, Clone)]
pub(crate) struct HistoricalEstimate {
    pub var: Money,
    pub quantile_return: Rate,
    pub quantile: QuantileIndex,
}

impl PortfolioVaR {
    /// Historical-simulation VaR.
    ///
    /// Sorts `returns` ascending, reads the element at
    /// `floor((1 - confidence) * n)` (clamped into range) and scales its
    /// absolute value by the portfolio value. The result is rounded to 2 dp
    /// and is not scaled by the horizon.
    pub fn historical_simulation(&self, returns: &[Rate], confidence: Rate) -> VarResult<Money> {
        Ok(self.historical_estimate(returns, confidence)?.var)
    }

    pub(crate) fn historical_estimate(
        &self,
        returns: &[Rate],
        confidence: Rate,
    ) -> VarResult<HistoricalEstimate> {
        validate_confidence(confidence)?;
        if returns.is_empty() {
            return Err(VarError::InvalidInput(
                "Historical return sample is empty".into(),
            ));
        }

        let mut sorted = returns.to_vec();
        sorted.sort();

        let q = quantile_index(sorted.len(), confidence);
        if q.clamped {
            warn!(
                index = q.index,
                sample_size = sorted.len(),
                "historical quantile index clamped"
            );
        }

        let quantile_return = sorted[q.index];
        let var = self.loss_from_return(quantile_return)?;
        debug!(
            %confidence,
            sample_size = sorted.len(),
            index = q.index,
            %quantile_return,
            %var,
            "historical VaR"
        );

        Ok(HistoricalEstimate {
            var,
            quantile_return,
            quantile: q,
        })
    }
}

/// Run historical simulation for an input document.
pub fn run_historical_var(
    input: &VarInput,
) -> VarResult<ComputationOutput<HistoricalVarOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let estimator = PortfolioVaR::from_input(input)?;
    let returns = &input.historical_returns;
    let estimate = estimator.historical_estimate(returns, input.confidence)?;

    let n = returns.len();
    warnings.extend(small_sample_warning(n));
    warnings.extend(clamp_warning(estimate.quantile, n));
    if input.horizon_days > 1 {
        warnings.push(format!(
            "Historical VaR uses the daily sample as-is; horizon of {} days not applied",
            input.horizon_days
        ));
    }

    let output = HistoricalVarOutput {
        var: estimate.var,
        var_pct: estimator.relative(estimate.var),
        quantile_return: estimate.quantile_return,
        quantile_index: estimate.quantile.index,
        sample_size: n,
        confidence: input.confidence,
    };

    let min = returns.iter().copied().min().unwrap_or(Decimal::ZERO);
    let max = returns.iter().copied().max().unwrap_or(Decimal::ZERO);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Historical Simulation VaR",
        &serde_json::json!({
            "portfolio_value": input.portfolio_value,
            "confidence": input.confidence,
            "sample_size": n,
            "sample_min": min,
            "sample_max": max,
            "quantile_rule": "floor((1 - confidence) * n), clamped to [0, n - 1]",
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_at_risk::ZScoreMode;
    use rust_decimal_macros::dec;

    fn estimator() -> PortfolioVaR {
        PortfolioVaR::daily(dec!(100000), dec!(0.001), dec!(0.02)).unwrap()
    }

    fn sample() -> Vec<Rate> {
        vec![dec!(-0.05), dec!(-0.03), dec!(-0.01), dec!(0.0), dec!(0.02)]
    }

    fn input(returns: Vec<Rate>) -> VarInput {
        VarInput {
            portfolio_value: dec!(100000),
            mean_return: dec!(0.001),
            volatility: dec!(0.02),
            horizon_days: 1,
            confidence: dec!(0.95),
            historical_returns: returns,
            simulations: 10_000,
            seed: None,
            z_score_mode: ZScoreMode::Fixed,
        }
    }

    #[test]
    fn test_worked_example() {
        let var = estimator()
            .historical_simulation(&sample(), dec!(0.95))
            .unwrap();
        assert_eq!(var, dec!(5000.00));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let shuffled = vec![dec!(0.02), dec!(-0.01), dec!(-0.05), dec!(0.0), dec!(-0.03)];
        let a = estimator().historical_simulation(&sample(), dec!(0.95)).unwrap();
        let b = estimator().historical_simulation(&shuffled, dec!(0.95)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_caller_sample_untouched() {
        let returns = vec![dec!(0.02), dec!(-0.05)];
        estimator().historical_simulation(&returns, dec!(0.95)).unwrap();
        assert_eq!(returns, vec![dec!(0.02), dec!(-0.05)]);
    }

    #[test]
    fn test_single_observation() {
        let var = estimator()
            .historical_simulation(&[dec!(-0.012)], dec!(0.95))
            .unwrap();
        assert_eq!(var, dec!(1200.00));
    }

    #[test]
    fn test_positive_quantile_return_still_non_negative() {
        // All gains: the selected return is positive, VaR is its magnitude.
        let var = estimator()
            .historical_simulation(&[dec!(0.01), dec!(0.02), dec!(0.03)], dec!(0.95))
            .unwrap();
        assert_eq!(var, dec!(1000.00));
    }

    #[test]
    fn test_lower_confidence_reads_higher_index() {
        // 0.4 * 5 = 2 -> -0.01
        let var = estimator()
            .historical_simulation(&sample(), dec!(0.6))
            .unwrap();
        assert_eq!(var, dec!(1000.00));
    }

    #[test]
    fn test_rounds_to_cents() {
        let est = PortfolioVaR::daily(dec!(12345.67), dec!(0), dec!(0.01)).unwrap();
        let var = est.historical_simulation(&[dec!(-0.012345)], dec!(0.95)).unwrap();
        // 12345.67 * 0.012345 = 152.40729615
        assert_eq!(var, dec!(152.41));
    }

    #[test]
    fn test_empty_sample_rejected() {
        let err = estimator().historical_simulation(&[], dec!(0.95)).unwrap_err();
        assert!(matches!(err, VarError::InvalidInput(_)));
    }

    #[test]
    fn test_invalid_confidence_rejected() {
        let err = estimator()
            .historical_simulation(&sample(), dec!(1.0))
            .unwrap_err();
        assert!(matches!(err, VarError::InvalidParameter { .. }));
    }

    #[test]
    fn test_run_historical_envelope() {
        let out = run_historical_var(&input(sample())).unwrap();
        assert_eq!(out.result.var, dec!(5000.00));
        assert_eq!(out.result.var_pct, dec!(0.05));
        assert_eq!(out.result.quantile_return, dec!(-0.05));
        assert_eq!(out.result.quantile_index, 0);
        assert_eq!(out.result.sample_size, 5);
        assert_eq!(out.methodology, "Historical Simulation VaR");
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
        // Short sample warning
        assert!(out.warnings.iter().any(|w| w.contains("historical observations")));
    }

    #[test]
    fn test_run_historical_horizon_warning() {
        let mut inp = input(sample());
        inp.horizon_days = 10;
        let out = run_historical_var(&inp).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("horizon of 10 days")));
    }

    #[test]
    fn test_run_historical_requires_sample() {
        assert!(run_historical_var(&input(vec![])).is_err());
    }
}
