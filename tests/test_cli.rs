//! Tests for CLI argument parsing and the end-to-end binary

mod common;

use assert_cmd::Command;
use clap::Parser;
use predicates::prelude::*;
use senatax::cli::Cli;
use senatax::pipeline::Alternative;
use senatax::report::{EXPANDED_TABLE_FILE, MODEL_REPORT_FILE, SIMPLE_TABLE_FILE};
use std::path::PathBuf;

const REQUIRED: [&str; 7] = ["senatax", "-e", "elections", "-i", "income", "-f", "fields.csv"];

fn parse_with(extra: &[&str]) -> Cli {
    Cli::parse_from(REQUIRED.iter().chain(extra).copied())
}

#[test]
fn test_cli_default_values() {
    let cli = parse_with(&[]);

    assert_eq!(cli.output, PathBuf::from("output"));
    assert_eq!(cli.seed, 123, "Default seed should be 123");
    assert_eq!(cli.trials, 50, "Default trial count should be 50");
    assert_eq!(cli.train_fraction, 0.8);
    assert_eq!(cli.vif_threshold, 10.0);
    assert_eq!(cli.correlation_threshold, 0.7);
    assert_eq!(cli.alpha, 0.05);
    assert_eq!(cli.alternative, Alternative::TwoSided);
    assert!(cli.exclude.is_empty());
}

#[test]
fn test_cli_custom_values() {
    let cli = parse_with(&[
        "-o",
        "results",
        "--seed",
        "42",
        "--trials",
        "10",
        "--train-fraction",
        "0.75",
        "--vif-threshold",
        "5",
        "--correlation-threshold",
        "0.9",
        "--alternative",
        "less",
    ]);

    assert_eq!(cli.output, PathBuf::from("results"));
    assert_eq!(cli.seed, 42);
    assert_eq!(cli.trials, 10);
    assert_eq!(cli.train_fraction, 0.75);
    assert_eq!(cli.vif_threshold, 5.0);
    assert_eq!(cli.correlation_threshold, 0.9);
    assert_eq!(cli.alternative, Alternative::Less);
}

#[test]
fn test_cli_model_config() {
    let cli = parse_with(&["--exclude", "wagesA, agiB", "--alpha", "0.1"]);
    let config = cli.model_config();

    assert_eq!(config.manual_exclusions, vec!["wagesA", "agiB"]);
    assert_eq!(config.alpha, 0.1);
    assert_eq!(config.seed, 123);

    let paths = cli.source_paths();
    assert_eq!(paths.elections_dir, PathBuf::from("elections"));
    assert_eq!(paths.field_map, PathBuf::from("fields.csv"));
}

#[test]
fn test_cli_rejects_invalid_values() {
    let args = |extra: &[&str]| Cli::try_parse_from(REQUIRED.iter().chain(extra).copied());

    assert!(args(&["--train-fraction", "1.0"]).is_err());
    assert!(args(&["--train-fraction", "0"]).is_err());
    assert!(args(&["--correlation-threshold", "1.5"]).is_err());
    assert!(args(&["--alpha", "abc"]).is_err());
    assert!(args(&["--alternative", "sideways"]).is_err());
}

#[test]
fn test_cli_requires_inputs() {
    assert!(Cli::try_parse_from(["senatax", "-e", "elections"]).is_err());
}

#[test]
fn test_binary_help() {
    Command::cargo_bin("senatax")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--elections"))
        .stdout(predicate::str::contains("--vif-threshold"));
}

#[test]
fn test_binary_reports_missing_directory() {
    let fixture = common::Fixture::new();
    Command::cargo_bin("senatax")
        .unwrap()
        .arg("-e")
        .arg(fixture.dir.path().join("nowhere"))
        .arg("-i")
        .arg(&fixture.income)
        .arg("-f")
        .arg(&fixture.field_map)
        .arg("-o")
        .arg(fixture.output_dir())
        .assert()
        .failure();
}

#[test]
fn test_binary_end_to_end() {
    let fixture = common::synthetic_fixture();
    let out = fixture.output_dir();

    Command::cargo_bin("senatax")
        .unwrap()
        .arg("-e")
        .arg(&fixture.elections)
        .arg("-i")
        .arg(&fixture.income)
        .arg("-f")
        .arg(&fixture.field_map)
        .arg("-o")
        .arg(&out)
        .args(["--trials", "3"])
        .assert()
        .success();

    assert!(out.join(SIMPLE_TABLE_FILE).exists());
    assert!(out.join(EXPANDED_TABLE_FILE).exists());
    assert!(out.join(MODEL_REPORT_FILE).exists());
}
