use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Read an input document and deserialise it into a typed struct.
///
/// `.yaml`/`.yml` files are parsed as YAML, anything else as JSON.
pub fn read_document<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    parse_document(&canonical, &contents)
}

fn parse_document<T: DeserializeOwned>(
    path: &Path,
    contents: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let value = if is_yaml {
        serde_yaml::from_str(contents)
            .map_err(|e| format!("Failed to parse '{}': {}", path.display(), e))?
    } else {
        serde_json::from_str(contents)
            .map_err(|e| format!("Failed to parse '{}': {}", path.display(), e))?
    };
    Ok(value)
}

/// Resolve the path against the working directory and check it is a file.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio_var_core::value_at_risk::{VarInput, ZScoreMode, DEFAULT_SIMULATIONS};
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_json_document_with_defaults() {
        let input: VarInput = parse_document(
            Path::new("portfolio.json"),
            r#"{"portfolio_value": 100000, "mean_return": 0.001, "volatility": 0.02}"#,
        )
        .unwrap();
        assert_eq!(input.portfolio_value, dec!(100000));
        assert_eq!(input.horizon_days, 1);
        assert_eq!(input.confidence, dec!(0.95));
        assert_eq!(input.simulations, DEFAULT_SIMULATIONS);
        assert!(input.historical_returns.is_empty());
    }

    #[test]
    fn test_parse_yaml_document() {
        let yaml = "\
portfolio_value: 250000
mean_return: 0.0
volatility: 0.015
horizon_days: 10
confidence: 0.99
historical_returns: [-0.04, -0.02, 0.01]
seed: 5
z_score_mode: from_confidence
";
        let input: VarInput = parse_document(Path::new("portfolio.yml"), yaml).unwrap();
        assert_eq!(input.volatility, dec!(0.015));
        assert_eq!(input.horizon_days, 10);
        assert_eq!(input.historical_returns.len(), 3);
        assert_eq!(input.seed, Some(5));
        assert_eq!(input.z_score_mode, ZScoreMode::FromConfidence);
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let err = parse_document::<VarInput>(Path::new("bad.json"), "{not json")
            .unwrap_err()
            .to_string();
        assert!(err.contains("bad.json"), "err={}", err);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = read_document::<VarInput>("/definitely/not/here.json")
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("File not found"), "err={}", err);
    }
}
