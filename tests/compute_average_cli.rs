use std::process::{Command, Output};

fn compute_average(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_compute-average"))
        .args(args)
        .output()
        .expect("failed to run compute-average")
}

#[test]
fn test_average_success() {
    let out = compute_average(&["--values", "9.7,9.6,9.5", "--decimals", "2", "--expected-count", "3"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "9.60\n");
}

#[test]
fn test_print_sum() {
    let out = compute_average(&["--values", "2,4", "--print-sum"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "count=2 sum=6.0\n3.00\n");
}

#[test]
fn test_validation_failure_exits_2() {
    let out = compute_average(&["--values", "1,abc"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty());
    assert_eq!(
        String::from_utf8_lossy(&out.stderr),
        "ERROR: Non-numeric value: 'abc'\n"
    );
}

#[test]
fn test_count_mismatch_exits_2() {
    let out = compute_average(&["--values", "1,2", "--expected-count", "3"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("expected 3 values but got 2"));
}

#[test]
fn test_missing_values_flag_is_usage_error() {
    let out = compute_average(&[]);
    assert_eq!(out.status.code(), Some(2));
}
