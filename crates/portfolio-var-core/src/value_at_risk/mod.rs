//! Single-portfolio Value-at-Risk estimation.
//!
//! [`PortfolioVaR`] holds the portfolio parameters and exposes three
//! independent estimators plus an aggregating summary:
//!
//! - [`PortfolioVaR::historical_simulation`]: empirical quantile of a
//!   supplied return sample.
//! - [`PortfolioVaR::variance_covariance_var`]: `value × σ × √days × z`.
//! - [`PortfolioVaR::monte_carlo_var`]: empirical quantile of returns drawn
//!   from `Normal(mean_return, volatility)`.
//! - [`PortfolioVaR::summary`]: all three at one confidence level.
//!
//! Every estimate is a non-negative monetary amount rounded to 2 dp.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::VarError;
use crate::types::{Money, Rate};
use crate::VarResult;

pub mod historical;
pub mod parametric;
mod quantile;

#[cfg(feature = "monte_carlo")]
pub mod monte_carlo;
#[cfg(feature = "monte_carlo")]
pub mod summary;

pub use parametric::{ZScoreMode, FIXED_Z_SCORE};
#[cfg(feature = "monte_carlo")]
pub use summary::VarSummary;

/// Confidence level used when the caller does not supply one.
pub const DEFAULT_CONFIDENCE: Rate = Decimal::from_parts(95, 0, 0, false, 2);

/// Horizon used when the caller does not supply one.
pub const DEFAULT_HORIZON_DAYS: u32 = 1;

/// Number of Monte Carlo trials used when the caller does not supply one.
pub const DEFAULT_SIMULATIONS: usize = 10_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The three estimation techniques.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarMethod {
    Historical,
    VarianceCovariance,
    MonteCarlo,
}

impl VarMethod {
    /// Report label used by the summary.
    pub fn label(self) -> &'static str {
        match self {
            VarMethod::Historical => "Historical VaR",
            VarMethod::VarianceCovariance => "Variance-Covariance VaR",
            VarMethod::MonteCarlo => "Monte Carlo VaR",
        }
    }
}

/// Portfolio parameters plus per-method inputs, as read from a JSON/YAML
/// document or assembled from CLI flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarInput {
    /// Current portfolio value (must be positive).
    pub portfolio_value: Money,
    /// Mean daily return.
    pub mean_return: Rate,
    /// Standard deviation of daily returns (non-negative).
    pub volatility: Rate,
    /// Horizon in days (at least 1).
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    /// Confidence level, strictly between 0 and 1.
    #[serde(default = "default_confidence")]
    pub confidence: Rate,
    /// Historical daily returns for historical simulation.
    #[serde(default)]
    pub historical_returns: Vec<Rate>,
    /// Number of Monte Carlo trials.
    #[serde(default = "default_simulations")]
    pub simulations: usize,
    /// Optional seed for reproducibility.
    #[serde(default)]
    pub seed: Option<u64>,
    /// How the parametric critical value is chosen.
    #[serde(default)]
    pub z_score_mode: ZScoreMode,
}

fn default_horizon_days() -> u32 {
    DEFAULT_HORIZON_DAYS
}

fn default_confidence() -> Rate {
    DEFAULT_CONFIDENCE
}

fn default_simulations() -> usize {
    DEFAULT_SIMULATIONS
}

/// VaR estimator for a single portfolio.
///
/// Parameters are validated once at construction and never change. The only
/// mutable state is the Monte Carlo cache, which each simulation replaces.
#[derive(Debug, Clone)]
pub struct PortfolioVaR {
    portfolio_value: Money,
    mean_return: Rate,
    volatility: Rate,
    horizon_days: u32,
    z_score_mode: ZScoreMode,
    seed: Option<u64>,
    simulated_returns: Vec<f64>,
}

impl PortfolioVaR {
    /// Build an estimator, rejecting non-positive value, negative volatility
    /// and a zero horizon.
    pub fn new(
        portfolio_value: Money,
        mean_return: Rate,
        volatility: Rate,
        horizon_days: u32,
    ) -> VarResult<Self> {
        if portfolio_value <= Decimal::ZERO {
            return Err(VarError::parameter("portfolio_value", "Must be positive"));
        }
        if volatility < Decimal::ZERO {
            return Err(VarError::parameter("volatility", "Must be non-negative"));
        }
        if horizon_days < 1 {
            return Err(VarError::parameter("horizon_days", "Must be at least 1"));
        }

        Ok(Self {
            portfolio_value,
            mean_return,
            volatility,
            horizon_days,
            z_score_mode: ZScoreMode::default(),
            seed: None,
            simulated_returns: Vec::new(),
        })
    }

    /// One-day estimator.
    pub fn daily(portfolio_value: Money, mean_return: Rate, volatility: Rate) -> VarResult<Self> {
        Self::new(portfolio_value, mean_return, volatility, DEFAULT_HORIZON_DAYS)
    }

    /// Build an estimator from an input document, carrying its seed and
    /// z-score mode.
    pub fn from_input(input: &VarInput) -> VarResult<Self> {
        let estimator = Self::new(
            input.portfolio_value,
            input.mean_return,
            input.volatility,
            input.horizon_days,
        )?
        .with_z_score_mode(input.z_score_mode);

        Ok(match input.seed {
            Some(seed) => estimator.with_seed(seed),
            None => estimator,
        })
    }

    pub fn with_z_score_mode(mut self, mode: ZScoreMode) -> Self {
        self.z_score_mode = mode;
        self
    }

    /// Seed the generator used by [`Self::monte_carlo_var`] and
    /// [`Self::summary`]. Every seeded call replays the same draws.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn portfolio_value(&self) -> Money {
        self.portfolio_value
    }

    pub fn mean_return(&self) -> Rate {
        self.mean_return
    }

    pub fn volatility(&self) -> Rate {
        self.volatility
    }

    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    pub fn z_score_mode(&self) -> ZScoreMode {
        self.z_score_mode
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns drawn by the most recent Monte Carlo run, in draw order.
    pub fn simulated_returns(&self) -> &[f64] {
        &self.simulated_returns
    }

    /// Scale a selected quantile return into a rounded monetary loss.
    fn loss_from_return(&self, quantile_return: Rate) -> VarResult<Money> {
        self.portfolio_value
            .checked_mul(quantile_return.abs())
            .map(to_cents)
            .ok_or_else(|| {
                VarError::Numerical(format!(
                    "Loss for return {quantile_return} on {} overflows Decimal",
                    self.portfolio_value
                ))
            })
    }

    /// VaR as a fraction of portfolio value.
    fn relative(&self, var: Money) -> Rate {
        (var / self.portfolio_value).round_dp(6)
    }
}

/// Round to 2 dp and always carry exactly two decimal places.
pub(crate) fn to_cents(amount: Decimal) -> Money {
    let mut cents = amount.round_dp(2);
    cents.rescale(2);
    cents
}

/// Reject confidence levels outside the open interval (0, 1).
pub(crate) fn validate_confidence(confidence: Rate) -> VarResult<()> {
    if confidence <= Decimal::ZERO || confidence >= Decimal::ONE {
        return Err(VarError::parameter(
            "confidence",
            "Must be between 0 and 1 exclusive",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
