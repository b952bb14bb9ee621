use std::collections::{BTreeMap, BTreeSet};

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ilr_model::{Severity, ValidationError};

use crate::types::ValidateResult;

/// Issues listed individually before the table is truncated.
const MAX_ISSUE_ROWS: usize = 50;

/// Findings for one rule.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RuleCounts {
    pub severity: Severity,
    pub errors: usize,
    pub learners: usize,
}

/// Per-rule finding counts, keyed by rule name.
pub fn rule_counts(errors: &[ValidationError]) -> BTreeMap<&str, RuleCounts> {
    let mut learners: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut counts: BTreeMap<&str, RuleCounts> = BTreeMap::new();
    for error in errors {
        let entry = counts.entry(error.rule_name.as_str()).or_default();
        entry.severity = error.severity;
        entry.errors += 1;
        learners
            .entry(error.rule_name.as_str())
            .or_default()
            .insert(error.learn_ref_number.as_str());
    }
    for (rule_name, refs) in learners {
        if let Some(entry) = counts.get_mut(rule_name) {
            entry.learners = refs.len();
        }
    }
    counts
}

pub fn print_summary(result: &ValidateResult) {
    let outcome = &result.outcome;
    println!("Academic year: {}", result.academic_year);
    println!(
        "Learners: {} ({} evaluated)",
        result.learners, outcome.learners_evaluated
    );
    if let Some(path) = &result.report {
        println!("Report: {}", path.display());
    }
    println!("Fingerprint: {}", result.fingerprint);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rule"),
        header_cell("Severity"),
        header_cell("Learners"),
        header_cell("Errors"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    let counts = rule_counts(&outcome.errors);
    for (rule_name, count) in &counts {
        table.add_row(vec![
            Cell::new(rule_name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            severity_cell(count.severity),
            Cell::new(count.learners),
            count_cell(count.errors, severity_color(count.severity)),
        ]);
    }
    let affected: BTreeSet<&str> = outcome
        .errors
        .iter()
        .map(|error| error.learn_ref_number.as_str())
        .collect();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(affected.len()).add_attribute(Attribute::Bold),
        count_cell(outcome.errors.len(), Color::Red).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    print_issue_table(&outcome.errors);
    if !outcome.diagnostics.is_empty() {
        eprintln!("Rules that failed to execute:");
        for diagnostic in &outcome.diagnostics {
            eprintln!(
                "- {} ({}): {}",
                diagnostic.rule_name, diagnostic.learn_ref_number, diagnostic.error
            );
        }
    }
    if outcome.cancelled {
        eprintln!("Validation was cancelled; results are incomplete.");
    }
}

fn print_issue_table(errors: &[ValidationError]) {
    if errors.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Rule"),
        header_cell("LearnRefNumber"),
        header_cell("AimSeq"),
        header_cell("Parameters"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);
    for error in errors.iter().take(MAX_ISSUE_ROWS) {
        table.add_row(vec![
            severity_cell(error.severity),
            Cell::new(&error.rule_name),
            Cell::new(&error.learn_ref_number),
            match error.aim_seq_number {
                Some(aim_seq_number) => Cell::new(aim_seq_number),
                None => dim_cell("-"),
            },
            Cell::new(format_parameters(error)),
        ]);
    }
    println!();
    println!("Issues:");
    println!("{table}");
    if errors.len() > MAX_ISSUE_ROWS {
        println!(
            "... {} more (use --output for the full list)",
            errors.len() - MAX_ISSUE_ROWS
        );
    }
}

/// `Name=value` pairs in emission order.
pub fn format_parameters(error: &ValidationError) -> String {
    error
        .parameters
        .iter()
        .map(|parameter| format!("{}={}", parameter.property_name, parameter.value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Fail => Cell::new("FAIL")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Error => Cell::new("ERROR").fg(Color::Red),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Fail | Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
