//! Average a comma-separated list of numbers.
//!
//! ```text
//! compute-average --values "9.7,9.6,9.5" --decimals 2 --expected-count 3
//! ```
//!
//! Exits with status 2 on validation failures.

use clap::Parser;
use std::process::ExitCode;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "compute-average", about = "Compute an average from a list of numeric values")]
struct Args {
    #[arg(long, help = "Comma-separated numeric values")]
    values: String,

    #[arg(long, default_value_t = 2)]
    decimals: usize,

    #[arg(long)]
    expected_count: Option<usize>,

    #[arg(long, help = "Also print count and sum")]
    print_sum: bool,
}

#[derive(Debug, Error, PartialEq)]
enum AverageError {
    #[error("No values provided")]
    NoValues,

    #[error("Non-numeric value: '{0}'")]
    NonNumeric(String),

    #[error("expected {expected} values but got {got}")]
    CountMismatch { expected: usize, got: usize },
}

fn parse_values(s: &str) -> Result<Vec<f64>, AverageError> {
    let parts: Vec<&str> = s.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return Err(AverageError::NoValues);
    }
    parts
        .into_iter()
        .map(|p| p.parse::<f64>().map_err(|_| AverageError::NonNumeric(p.to_string())))
        .collect()
}

struct Summary {
    count: usize,
    sum: f64,
    mean: f64,
}

fn summarize(values: &[f64], expected_count: Option<usize>) -> Result<Summary, AverageError> {
    if values.is_empty() {
        return Err(AverageError::NoValues);
    }
    if let Some(expected) = expected_count {
        if values.len() != expected {
            return Err(AverageError::CountMismatch {
                expected,
                got: values.len(),
            });
        }
    }
    let sum: f64 = values.iter().sum();
    Ok(Summary {
        count: values.len(),
        sum,
        mean: sum / values.len() as f64,
    })
}

fn format_mean(mean: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, mean)
}

fn run(args: &Args) -> Result<Vec<String>, AverageError> {
    let values = parse_values(&args.values)?;
    let summary = summarize(&values, args.expected_count)?;

    let mut out = Vec::new();
    if args.print_sum {
        out.push(format!("count={} sum={:?}", summary.count, summary.sum));
    }
    out.push(format_mean(summary.mean, args.decimals));
    Ok(out)
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &str) -> Args {
        Args {
            values: values.to_string(),
            decimals: 2,
            expected_count: None,
            print_sum: false,
        }
    }

    #[test]
    fn test_parse_trims_and_skips_empty() {
        assert_eq!(parse_values(" 9.7, 9.6 ,,9.5,").unwrap(), vec![9.7, 9.6, 9.5]);
    }

    #[test]
    fn test_parse_no_values() {
        assert_eq!(parse_values(" , ,"), Err(AverageError::NoValues));
        assert_eq!(parse_values(""), Err(AverageError::NoValues));
    }

    #[test]
    fn test_parse_non_numeric() {
        let err = parse_values("1,two,3").unwrap_err();
        assert_eq!(err, AverageError::NonNumeric("two".to_string()));
        assert_eq!(err.to_string(), "Non-numeric value: 'two'");
    }

    #[test]
    fn test_mean_fixed_decimals() {
        assert_eq!(run(&args("9.7,9.6,9.5")).unwrap(), ["9.60"]);
        assert_eq!(run(&args("1,2")).unwrap(), ["1.50"]);

        let mut a = args("1,2,2");
        a.decimals = 4;
        assert_eq!(run(&a).unwrap(), ["1.6667"]);

        a.decimals = 0;
        assert_eq!(run(&a).unwrap(), ["2"]);
    }

    #[test]
    fn test_negative_values() {
        assert_eq!(run(&args("-1,-2,-3")).unwrap(), ["-2.00"]);
    }

    #[test]
    fn test_expected_count_mismatch() {
        let mut a = args("1,2,3");
        a.expected_count = Some(4);
        let err = run(&a).unwrap_err();
        assert_eq!(err.to_string(), "expected 4 values but got 3");

        a.expected_count = Some(3);
        assert!(run(&a).is_ok());
    }

    #[test]
    fn test_print_sum_line_first() {
        let mut a = args("1,2,3");
        a.print_sum = true;
        assert_eq!(run(&a).unwrap(), ["count=3 sum=6.0", "2.00"]);
    }
}
