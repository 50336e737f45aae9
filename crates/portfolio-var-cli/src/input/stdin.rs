use serde_json::Value;
use std::io::{self, Read};

/// Read a JSON document from stdin if data is being piped.
/// Returns None if stdin is a TTY or the pipe is empty.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

fn parse_piped(buffer: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse stdin as JSON: {e}"))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_pipe_is_none() {
        assert!(parse_piped("  \n\t").unwrap().is_none());
    }

    #[test]
    fn test_piped_document() {
        let value = parse_piped("{\"portfolio_value\": 1000}\n").unwrap().unwrap();
        assert_eq!(value["portfolio_value"], 1000);
    }

    #[test]
    fn test_piped_garbage_errors() {
        assert!(parse_piped("portfolio_value=1000").is_err());
    }
}
