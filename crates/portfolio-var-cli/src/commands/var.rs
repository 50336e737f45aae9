use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use portfolio_var_core::value_at_risk::historical::run_historical_var;
use portfolio_var_core::value_at_risk::monte_carlo::run_monte_carlo_var;
use portfolio_var_core::value_at_risk::parametric::run_parametric_var;
use portfolio_var_core::value_at_risk::summary::run_var_summary;
use portfolio_var_core::value_at_risk::{VarInput, ZScoreMode};

use crate::input;

/// Portfolio parameters shared by every VaR command
#[derive(Args)]
pub struct PortfolioArgs {
    /// Path to a JSON/YAML input document (replaces the flags below)
    #[arg(long)]
    pub input: Option<String>,

    /// Current portfolio value
    #[arg(long)]
    pub portfolio_value: Option<Decimal>,

    /// Mean daily return (e.g. 0.001)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub mean_return: Decimal,

    /// Standard deviation of daily returns (e.g. 0.02)
    #[arg(long)]
    pub volatility: Option<Decimal>,

    /// Horizon in days
    #[arg(long, default_value = "1")]
    pub days: u32,

    /// Confidence level (e.g. 0.95 for 95%)
    #[arg(long, default_value = "0.95")]
    pub confidence: Decimal,
}

/// Arguments for historical-simulation VaR
#[derive(Args)]
pub struct HistoricalArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,

    /// Comma-separated daily returns (e.g. "-0.05,-0.03,0.01")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub returns: Option<Vec<Decimal>>,
}

/// Arguments for variance-covariance VaR
#[derive(Args)]
pub struct ParametricArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,

    /// How the critical value is chosen
    #[arg(long, value_enum, default_value = "fixed")]
    pub z_score_mode: ZScoreModeArg,
}

/// Arguments for Monte Carlo VaR
#[derive(Args)]
pub struct MonteCarloArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,

    /// Number of simulated daily returns
    #[arg(long, default_value = "10000")]
    pub simulations: usize,

    /// Seed for reproducible draws
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the three-method summary
#[derive(Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,

    /// Comma-separated daily returns for historical simulation
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub returns: Option<Vec<Decimal>>,

    /// Number of Monte Carlo trials
    #[arg(long, default_value = "10000")]
    pub simulations: usize,

    /// Seed for reproducible Monte Carlo draws
    #[arg(long)]
    pub seed: Option<u64>,

    /// How the variance-covariance critical value is chosen
    #[arg(long, value_enum, default_value = "fixed")]
    pub z_score_mode: ZScoreModeArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ZScoreModeArg {
    /// Always 1.65
    Fixed,
    /// Inverse normal CDF at --confidence
    FromConfidence,
}

impl From<ZScoreModeArg> for ZScoreMode {
    fn from(arg: ZScoreModeArg) -> Self {
        match arg {
            ZScoreModeArg::Fixed => ZScoreMode::Fixed,
            ZScoreModeArg::FromConfidence => ZScoreMode::FromConfidence,
        }
    }
}

/// Load the input document from `--input` or piped stdin, if one was given.
///
/// Stdin is only consulted when no `--portfolio-value` flag is present.
fn read_document(args: &PortfolioArgs) -> Result<Option<VarInput>, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return Ok(Some(input::file::read_document(path)?));
    }
    if args.portfolio_value.is_none() {
        if let Some(data) = input::stdin::read_stdin()? {
            return Ok(Some(serde_json::from_value(data)?));
        }
    }
    Ok(None)
}

/// Build an input from flags; method-specific fields take their defaults.
fn from_flags(args: &PortfolioArgs) -> Result<VarInput, Box<dyn std::error::Error>> {
    let portfolio_value = args
        .portfolio_value
        .ok_or("Provide --portfolio-value and --volatility, --input file, or pipe JSON via stdin")?;
    let volatility = args
        .volatility
        .ok_or("--volatility is required when --portfolio-value is given")?;

    Ok(VarInput {
        portfolio_value,
        mean_return: args.mean_return,
        volatility,
        horizon_days: args.days,
        confidence: args.confidence,
        historical_returns: Vec::new(),
        simulations: portfolio_var_core::value_at_risk::DEFAULT_SIMULATIONS,
        seed: None,
        z_score_mode: ZScoreMode::default(),
    })
}

fn require_returns(
    returns: &Option<Vec<Decimal>>,
) -> Result<Vec<Decimal>, Box<dyn std::error::Error>> {
    returns
        .clone()
        .ok_or_else(|| "--returns is required for historical simulation".into())
}

pub fn run_historical(args: HistoricalArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let var_input = match read_document(&args.portfolio)? {
        Some(doc) => doc,
        None => VarInput {
            historical_returns: require_returns(&args.returns)?,
            ..from_flags(&args.portfolio)?
        },
    };
    let result = run_historical_var(&var_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_parametric(args: ParametricArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let var_input = match read_document(&args.portfolio)? {
        Some(doc) => doc,
        None => VarInput {
            z_score_mode: args.z_score_mode.into(),
            ..from_flags(&args.portfolio)?
        },
    };
    let result = run_parametric_var(&var_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_monte_carlo(args: MonteCarloArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let var_input = match read_document(&args.portfolio)? {
        Some(doc) => doc,
        None => VarInput {
            simulations: args.simulations,
            seed: args.seed,
            ..from_flags(&args.portfolio)?
        },
    };
    let result = run_monte_carlo_var(&var_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_summary(args: SummaryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let var_input = match read_document(&args.portfolio)? {
        Some(doc) => doc,
        None => VarInput {
            historical_returns: require_returns(&args.returns)?,
            simulations: args.simulations,
            seed: args.seed,
            z_score_mode: args.z_score_mode.into(),
            ..from_flags(&args.portfolio)?
        },
    };
    let result = run_var_summary(&var_input)?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn portfolio(input: Option<String>) -> PortfolioArgs {
        PortfolioArgs {
            input,
            portfolio_value: Some(dec!(100000)),
            mean_return: dec!(0.001),
            volatility: Some(dec!(0.02)),
            days: 1,
            confidence: dec!(0.95),
        }
    }

    fn write_document(name: &str, contents: &str) -> String {
        let path = std::env::temp_dir().join(format!("pvar-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_from_flags_builds_input_with_defaults() {
        let input = from_flags(&portfolio(None)).unwrap();
        assert_eq!(input.portfolio_value, dec!(100000));
        assert_eq!(input.volatility, dec!(0.02));
        assert_eq!(input.horizon_days, 1);
        assert_eq!(input.confidence, dec!(0.95));
        assert_eq!(input.simulations, 10_000);
        assert_eq!(input.seed, None);
        assert_eq!(input.z_score_mode, ZScoreMode::Fixed);
        assert!(input.historical_returns.is_empty());
    }

    #[test]
    fn test_from_flags_requires_value_and_volatility() {
        let mut args = portfolio(None);
        args.portfolio_value = None;
        let err = from_flags(&args).unwrap_err().to_string();
        assert!(err.contains("--portfolio-value"), "err={}", err);

        let mut args = portfolio(None);
        args.volatility = None;
        let err = from_flags(&args).unwrap_err().to_string();
        assert!(err.contains("--volatility"), "err={}", err);
    }

    #[test]
    fn test_require_returns() {
        assert!(require_returns(&None).is_err());
        assert_eq!(
            require_returns(&Some(vec![dec!(-0.01), dec!(0.02)])).unwrap(),
            vec![dec!(-0.01), dec!(0.02)]
        );
    }

    #[test]
    fn test_historical_from_flags() {
        let value = run_historical(HistoricalArgs {
            portfolio: portfolio(None),
            returns: Some(vec![dec!(-0.05), dec!(-0.03), dec!(-0.01), dec!(0.0), dec!(0.02)]),
        })
        .unwrap();
        assert_eq!(value["result"]["var"], "5000.00");
    }

    #[test]
    fn test_historical_without_returns_errors() {
        let result = run_historical(HistoricalArgs {
            portfolio: portfolio(None),
            returns: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_parametric_flag_selects_z_score_mode() {
        let mut args = portfolio(None);
        args.confidence = dec!(0.99);
        let value = run_parametric(ParametricArgs {
            portfolio: args,
            z_score_mode: ZScoreModeArg::FromConfidence,
        })
        .unwrap();
        assert_eq!(value["result"]["z_score_mode"], "from_confidence");
        assert_ne!(value["result"]["var"], "3300.00");
    }

    #[test]
    fn test_input_document_takes_precedence_over_flags() {
        let path = write_document(
            "precedence.json",
            r#"{
                "portfolio_value": 200000,
                "mean_return": 0.0,
                "volatility": 0.01,
                "historical_returns": [-0.02, 0.01],
                "simulations": 2000,
                "seed": 3
            }"#,
        );

        let value = run_historical(HistoricalArgs {
            portfolio: portfolio(Some(path.clone())),
            returns: Some(vec![dec!(-0.05)]),
        })
        .unwrap();
        // 200000 * 0.02 from the document, not 100000 * 0.05 from flags
        assert_eq!(value["result"]["var"], "4000.00");

        let value = run_monte_carlo(MonteCarloArgs {
            portfolio: portfolio(Some(path.clone())),
            simulations: 50,
            seed: Some(99),
        })
        .unwrap();
        assert_eq!(value["result"]["simulations"], 2000);
        assert_eq!(value["result"]["seed"], 3);

        std::fs::remove_file(path).unwrap();
    }
}
