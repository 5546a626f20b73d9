//! Senatax: Senate election / income-tax analysis CLI
//!
//! Builds the joined election and income tables, fits the pruned linear
//! models and the winner classifier, and writes the results to disk.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use senatax::cli::Cli;
use senatax::pipeline::{
    classifier_frame, compare_income_by_winner, fit_expanded_model, fit_simple_model,
    prepare_tables, run_classifier, Analysis, IncomeColumns,
};
use senatax::report::{
    display_classifier, display_comparison, display_linear_model, display_merge_stats,
    write_outputs,
};
use senatax::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_count, print_info, print_step_header, print_success, print_warning,
    ConfigCard,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let paths = cli.source_paths();
    let config = cli.model_config();
    let columns = IncomeColumns::default();
    let started = Instant::now();

    // Print styled banner
    print_banner(env!("CARGO_PKG_VERSION"));

    // Print configuration card
    print_config(&ConfigCard {
        elections: &cli.elections,
        income: &cli.income,
        field_map: &cli.field_map,
        output: &cli.output,
        vif_threshold: config.vif_threshold,
        correlation_threshold: config.correlation_threshold,
        seed: config.seed,
        trials: config.trials,
    });

    // Step 1: Build and join the tables
    print_step_header(1, "Build Analysis Tables");

    let spinner = create_spinner("Reading election and income files...");
    let tables = prepare_tables(&paths, &columns).context("Failed to build analysis tables")?;
    finish_with_success(&spinner, "Analysis tables built");

    print_count(
        "state-year election summaries",
        tables.elections.len(),
        None,
    );
    print_count(
        "expanded income predictors",
        tables.expanded.predictors.len(),
        None,
    );
    display_merge_stats(&tables.simple_stats);

    // Step 2: Simple model
    print_step_header(2, "Simple Linear Model");

    let spinner = create_spinner("Pruning collinear predictors...");
    let simple_model =
        fit_simple_model(&tables.simple, &config).context("Failed to fit the simple model")?;
    finish_with_success(&spinner, "Simple model fitted");
    display_linear_model("NET VOTES ~ HOUSEHOLDS + AGI", &simple_model);

    // Step 3: Expanded model
    print_step_header(3, "Expanded Linear Model");

    let spinner = create_spinner("Filtering correlated predictors...");
    let expanded_model = fit_expanded_model(&tables.expanded, &config)
        .context("Failed to fit the expanded model")?;
    finish_with_success(&spinner, "Expanded model fitted");

    if expanded_model.correlation.dropped.is_empty() {
        print_info("No highly correlated predictor pairs found");
    } else {
        print_count(
            "correlated predictor(s) dropped",
            expanded_model.correlation.dropped.len(),
            Some(&format!("(>{:.2})", config.correlation_threshold)),
        );
    }
    if !config.manual_exclusions.is_empty() {
        print_info(&format!(
            "Excluded by configuration: {}",
            config.manual_exclusions.join(", ")
        ));
    }
    display_linear_model("NET VOTES ~ EXPANDED INCOME FIELDS", &expanded_model.model);

    // Step 4: Classifier
    print_step_header(4, "Winner Classifier");

    let frame = classifier_frame(&expanded_model.reduced)?;
    print_info(&format!(
        "Headline split with seed {}, then {} unseeded trials",
        config.seed, config.trials
    ));
    let classifier = run_classifier(&frame, &config).context("Failed to run the classifier")?;
    if classifier.trials.skipped > 0 {
        print_warning(&format!(
            "{} trial(s) skipped after repeated degenerate splits",
            classifier.trials.skipped
        ));
    } else {
        print_success("All trials completed");
    }
    display_classifier(&classifier);

    // Step 5: Group comparison
    print_step_header(5, "Income Comparison");

    let comparison = compare_income_by_winner(&tables.simple, &config)
        .context("Failed to compare income between winners")?;
    display_comparison(&comparison);

    let analysis = Analysis {
        tables,
        simple_model,
        expanded_model,
        classifier,
        comparison,
    };

    // Step 6: Save output
    print_step_header(6, "Save Results");

    let spinner = create_spinner("Writing output files...");
    match write_outputs(&analysis, &paths, &config, &cli.output) {
        Ok(written) => {
            finish_with_success(
                &spinner,
                &format!("Saved to {}", cli.output.display()),
            );
            for path in written {
                println!("      {} {}", style("•").dim(), path.display());
            }
        }
        Err(e) => {
            finish_with_warning(&spinner, "Failed to write outputs");
            return Err(e);
        }
    }

    println!(
        "\n    {} {:.1}s",
        style("Total time:").dim(),
        started.elapsed().as_secs_f64()
    );
    print_completion();

    Ok(())
}
