use std::io::IsTerminal;
use owo_colors::OwoColorize;
use serde::Serialize;
use terminal_size::{Width, terminal_size};

use crate::rubric::ModelInfo;
use crate::scoring::Rating;
use crate::table::{ScoreTable, TableSummary};

const EMPTY_TABLE: &str = "No companies to score.";

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Scores carry 4 decimals and are shown at full precision.
pub fn format_score(score: f64) -> String {
    format!("{:.4}", score)
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate to fit available width, counting chars rather than bytes
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(0)
        .max(header.len())
}

fn colored_rating(rating: Rating, width: usize, use_colors: bool) -> String {
    let label = format!("{:<width$}", rating, width = width);
    if !use_colors {
        return label;
    }
    match rating {
        // NR renders dimmed instead of palette black
        Rating::NotRated => label.dimmed().to_string(),
        _ => {
            let (r, g, b) = rating.rgb();
            label.truecolor(r, g, b).bold().to_string()
        }
    }
}

/// Format the score table with a header row.
/// Columns: Company, Industry, one per section, Total, Rating.
/// Company and industry names are truncated to fit the terminal; pipes get
/// full names.
pub fn format_score_table(table: &ScoreTable, use_colors: bool) -> String {
    if table.is_empty() {
        return EMPTY_TABLE.to_string();
    }

    let separator = "  ";
    let section_widths: Vec<usize> = table
        .section_names()
        .iter()
        .map(|name| name.chars().count().max(6))
        .collect();
    let total_width = 8;
    let rating_width = 6;

    let mut company_width =
        column_width(table.rows().iter().map(|r| r.company.as_str()), "Company");
    let mut industry_width =
        column_width(table.rows().iter().map(|r| r.industry.as_str()), "Industry");

    if let Some(term_width) = get_terminal_width() {
        let fixed = section_widths.iter().sum::<usize>()
            + total_width
            + rating_width
            + separator.len() * (section_widths.len() + 3);
        let available = term_width.saturating_sub(fixed).max(20);
        if company_width + industry_width > available {
            industry_width = industry_width.min(available / 3).max(8);
            company_width = available.saturating_sub(industry_width).max(12);
        }
    }

    let mut header = vec![
        format!("{:<width$}", "Company", width = company_width),
        format!("{:<width$}", "Industry", width = industry_width),
    ];
    for (name, width) in table.section_names().iter().zip(&section_widths) {
        header.push(format!("{:>width$}", name, width = width));
    }
    header.push(format!("{:>width$}", "Total", width = total_width));
    header.push(format!("{:<width$}", "Rating", width = rating_width));
    let header = header.join(separator);

    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];

    for row in table.rows() {
        let mut cells = vec![
            format!("{:<width$}", truncate(&row.company, company_width), width = company_width),
            format!("{:<width$}", truncate(&row.industry, industry_width), width = industry_width),
        ];
        for (score, width) in row.sections.iter().zip(&section_widths) {
            cells.push(format!("{:>width$}", format_score(*score), width = width));
        }
        let total = format!("{:>width$}", format_score(row.total), width = total_width);
        cells.push(if use_colors {
            total.bold().to_string()
        } else {
            total
        });
        cells.push(colored_rating(row.rating, rating_width, use_colors));
        lines.push(cells.join(separator).trim_end().to_string());
    }

    lines.join("\n")
}

/// Tab-separated values for scripting: header row, then full-precision scores.
pub fn format_tsv(table: &ScoreTable) -> String {
    if table.is_empty() {
        return String::new();
    }

    let mut header = vec!["company".to_string(), "industry".to_string()];
    header.extend(table.section_names().iter().cloned());
    header.push("total".to_string());
    header.push("rating".to_string());

    let mut lines = vec![header.join("\t")];
    lines.extend(table.rows().iter().map(|row| {
        let mut cells = vec![row.company.clone(), row.industry.clone()];
        cells.extend(row.sections.iter().map(|s| s.to_string()));
        cells.push(row.total.to_string());
        cells.push(row.rating.to_string());
        cells.join("\t")
    }));
    lines.join("\n")
}

#[derive(Serialize)]
struct JsonSection<'a> {
    section: &'a str,
    score: f64,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    company: &'a str,
    industry: &'a str,
    sections: Vec<JsonSection<'a>>,
    total: f64,
    rating: Rating,
}

#[derive(Serialize)]
struct JsonTable<'a> {
    sections: &'a [String],
    rows: Vec<JsonRow<'a>>,
    summary: Option<TableSummary>,
}

/// Pretty-printed JSON with sections kept in column order.
pub fn format_json(table: &ScoreTable) -> serde_json::Result<String> {
    let rows = table
        .rows()
        .iter()
        .map(|row| JsonRow {
            company: &row.company,
            industry: &row.industry,
            sections: table
                .section_names()
                .iter()
                .zip(&row.sections)
                .map(|(section, score)| JsonSection {
                    section,
                    score: *score,
                })
                .collect(),
            total: row.total,
            rating: row.rating,
        })
        .collect();

    serde_json::to_string_pretty(&JsonTable {
        sections: table.section_names(),
        rows,
        summary: table.summary(),
    })
}

fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * width as f64).round() as usize;
    "█".repeat(len.min(width))
}

fn chart_width() -> usize {
    get_terminal_width()
        .map(|w| w.saturating_sub(30).clamp(10, 60))
        .unwrap_or(40)
}

/// Horizontal bar chart of company counts per rating, NR to A+.
pub fn format_rating_chart(table: &ScoreTable, use_colors: bool) -> String {
    let distribution = table.rating_distribution();
    let max = distribution.iter().map(|(_, n)| *n).max().unwrap_or(0) as f64;
    let width = chart_width();

    let mut lines = vec![title("Companies per rating", use_colors)];
    for (rating, count) in distribution {
        let bar = bar(count as f64, max, width);
        let bar = if use_colors && rating != Rating::NotRated {
            let (r, g, b) = rating.rgb();
            bar.truecolor(r, g, b).to_string()
        } else {
            bar
        };
        lines.push(format!("{:>3} {:>4} {}", rating, count, bar).trim_end().to_string());
    }
    lines.join("\n")
}

/// Horizontal bar chart of mean total per industry, best first.
pub fn format_industry_chart(table: &ScoreTable, use_colors: bool) -> String {
    let averages = table.industry_averages();
    if averages.is_empty() {
        return EMPTY_TABLE.to_string();
    }

    let name_width = averages
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0)
        .min(24);
    let max = averages.iter().map(|(_, avg)| *avg).fold(0.0, f64::max);
    let width = chart_width();

    let mut lines = vec![title("Average total per industry", use_colors)];
    for (industry, average) in averages {
        let bar = bar(average, max, width);
        let bar = if use_colors {
            bar.cyan().to_string()
        } else {
            bar
        };
        lines.push(format!(
            "{:<name_width$} {:>8} {}",
            truncate(&industry, name_width),
            format_score(average),
            bar,
            name_width = name_width
        ));
    }
    lines.join("\n")
}

pub fn format_summary(summary: &TableSummary) -> String {
    format!(
        "Highest: {}  Lowest: {}  Mean: {}  Companies: {}",
        format_score(summary.highest),
        format_score(summary.lowest),
        format_score(summary.mean),
        summary.companies
    )
}

/// One model per line, default model marked with `*`.
pub fn format_model_list(models: &[ModelInfo], default_model: &str, use_colors: bool) -> String {
    if models.is_empty() {
        return "No models found.".to_string();
    }

    models
        .iter()
        .map(|model| {
            let is_default = model.model_name == default_model;
            let marker = if is_default { "*" } else { " " };
            match (use_colors, is_default) {
                (true, true) => format!("{} {}", marker.green(), model.model_name.bold()),
                _ => format!("{} {}", marker, model.model_name),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn title(text: &str, use_colors: bool) -> String {
    if use_colors {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}
