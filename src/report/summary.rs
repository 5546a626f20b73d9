//! Terminal summaries of the fitted models

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{ClassifierReport, GroupComparison, LinearModel, MergeStats};

fn section(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn print_indented(table: &Table) {
    // Indent the table
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        header
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

fn format_p(p: f64) -> String {
    if p < 1e-4 {
        format!("{:.2e}", p)
    } else {
        format!("{:.4}", p)
    }
}

fn significance_color(p: f64) -> Color {
    if p < 0.05 {
        Color::Green
    } else {
        Color::White
    }
}

/// Join outcome of the simple analysis table
pub fn display_merge_stats(stats: &MergeStats) {
    section("🔗", "MERGE SUMMARY");

    let mut table = new_table(&["Rows", "Count"]);
    table.add_row(vec![
        Cell::new("Matched (state, year)"),
        Cell::new(stats.matched).fg(Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Election only"),
        Cell::new(stats.election_only).fg(if stats.election_only == 0 {
            Color::White
        } else {
            Color::Yellow
        }),
    ]);
    table.add_row(vec![
        Cell::new("Income only"),
        Cell::new(stats.income_only).fg(if stats.income_only == 0 {
            Color::White
        } else {
            Color::Yellow
        }),
    ]);
    print_indented(&table);
}

/// Coefficients, fit statistics and pruning history of a linear model
pub fn display_linear_model(title: &str, model: &LinearModel) {
    section("📈", title);

    let fit = &model.fit;
    let mut table = new_table(&["Term", "Estimate", "Std. Error", "t value", "Pr(>|t|)"]);
    for c in &fit.coefficients {
        table.add_row(vec![
            Cell::new(&c.name),
            Cell::new(format!("{:.4}", c.estimate)),
            Cell::new(format!("{:.4}", c.std_error)),
            Cell::new(format!("{:.3}", c.t_value)),
            Cell::new(format_p(c.p_value)).fg(significance_color(c.p_value)),
        ]);
    }
    print_indented(&table);

    println!();
    println!(
        "      R² {}  adjusted R² {}  residual SE {}",
        style(format!("{:.4}", fit.r_squared)).yellow().bold(),
        style(format!("{:.4}", fit.adj_r_squared)).yellow(),
        style(format!("{:.1}", fit.residual_std_error)).dim()
    );
    println!(
        "      F = {:.3} on {} and {} DF, p = {}",
        fit.f_statistic,
        fit.df_num,
        fit.df_den,
        style(format_p(fit.f_p_value)).bold()
    );
    println!(
        "      Directional accuracy: {}",
        style(format!("{:.1}%", model.directional_accuracy * 100.0))
            .green()
            .bold()
    );

    if !model.pruning.history.is_empty() {
        println!();
        let mut history = new_table(&["Step", "Removed", "VIF", "Remaining"]);
        for (i, step) in model.pruning.history.iter().enumerate() {
            history.add_row(vec![
                Cell::new(i + 1),
                Cell::new(&step.removed),
                Cell::new(if step.vif.is_finite() {
                    format!("{:.2}", step.vif)
                } else {
                    "inf".to_string()
                })
                .fg(Color::Red),
                Cell::new(step.remaining),
            ]);
        }
        print_indented(&history);
    }
}

/// Headline evaluation and trial distribution of the classifier
pub fn display_classifier(report: &ClassifierReport) {
    section("🎯", "WINNER CLASSIFIER (LINEAR SVM)");

    let eval = &report.headline.evaluation;
    let cm = &eval.confusion;

    let mut confusion = new_table(&["Actual \\ Predicted", "DEM", "REP"]);
    confusion.add_row(vec![
        Cell::new("DEM"),
        Cell::new(cm.dem_predicted_dem).fg(Color::Green),
        Cell::new(cm.dem_predicted_rep).fg(Color::Red),
    ]);
    confusion.add_row(vec![
        Cell::new("REP"),
        Cell::new(cm.rep_predicted_dem).fg(Color::Red),
        Cell::new(cm.rep_predicted_rep).fg(Color::Green),
    ]);
    print_indented(&confusion);

    println!();
    let mut table = new_table(&["Metric", "Value"]);
    table.add_row(vec![
        Cell::new("Predictors / rows"),
        Cell::new(format!("{} / {}", report.predictors.len(), report.rows)),
    ]);
    table.add_row(vec![
        Cell::new("Train / test"),
        Cell::new(format!(
            "{} / {}",
            report.headline.train_size, report.headline.test_size
        )),
    ]);
    table.add_row(vec![
        Cell::new("Accuracy"),
        Cell::new(format!("{:.4}", eval.accuracy))
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("95% CI"),
        Cell::new(format!("({:.4}, {:.4})", eval.ci_lower, eval.ci_upper)),
    ]);
    table.add_row(vec![
        Cell::new("No information rate"),
        Cell::new(format!("{:.4}", eval.no_information_rate)),
    ]);
    table.add_row(vec![
        Cell::new("P-value [Acc > NIR]"),
        Cell::new(format_p(eval.p_value)).fg(significance_color(eval.p_value)),
    ]);

    let trials = &report.trials;
    table.add_row(vec![
        Cell::new("Trials completed / skipped"),
        Cell::new(format!("{} / {}", trials.completed, trials.skipped)).fg(
            if trials.skipped == 0 {
                Color::White
            } else {
                Color::Yellow
            },
        ),
    ]);
    table.add_row(vec![
        Cell::new("Mean trial accuracy"),
        Cell::new(format!("{:.4} (sd {:.4})", trials.mean, trials.sd)),
    ]);
    table.add_row(vec![
        Cell::new("95% t-interval"),
        Cell::new(match trials.ci {
            Some((lo, hi)) => format!("({:.4}, {:.4})", lo, hi),
            None => "n/a".to_string(),
        }),
    ]);
    print_indented(&table);
}

/// Verdict of the DEM vs REP income comparison
pub fn display_comparison(comparison: &GroupComparison) {
    section("⚖️ ", "AGI PER HOUSEHOLD BY WINNER");

    let mut table = new_table(&["Group", "n", "Shapiro-Wilk p"]);
    let rows = [
        (&comparison.groups.0, comparison.sizes.0, comparison.normality_p.0),
        (&comparison.groups.1, comparison.sizes.1, comparison.normality_p.1),
    ];
    for (name, n, p) in rows {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(n),
            Cell::new(p.map(format_p).unwrap_or_else(|| "n/a".to_string())),
        ]);
    }
    print_indented(&table);

    if let Some(p) = comparison.levene_p {
        println!("      Levene p = {}", format_p(p));
    }
    println!();
    let verdict = if comparison.significant {
        style(&comparison.verdict).green().bold()
    } else {
        style(&comparison.verdict).white()
    };
    println!("      {}", verdict);
}
