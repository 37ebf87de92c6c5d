use crate::scoring::{Rating, ScoreRun};
use serde::Serialize;
use std::collections::HashMap;

/// One company's line in the score table. `sections` follows the table's
/// column order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    pub company: String,
    pub industry: String,
    pub sections: Vec<f64>,
    pub total: f64,
    pub rating: Rating,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTable {
    section_names: Vec<String>,
    rows: Vec<ScoreRow>,
}

/// Highest, lowest and mean total over the whole table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TableSummary {
    pub highest: f64,
    pub lowest: f64,
    pub mean: f64,
    pub companies: usize,
}

impl ScoreTable {
    /// Columns follow rubric section order, rows follow answer-set order.
    pub fn from_run(run: &ScoreRun) -> Self {
        let rows = run
            .companies
            .iter()
            .map(|score| ScoreRow {
                company: score.name.clone(),
                industry: score.industry.clone(),
                sections: run
                    .section_names
                    .iter()
                    .map(|name| score.sections.get(name).copied().unwrap_or(0.0))
                    .collect(),
                total: score.total,
                rating: score.rating,
            })
            .collect();

        Self {
            section_names: run.section_names.clone(),
            rows,
        }
    }

    pub fn section_names(&self) -> &[String] {
        &self.section_names
    }

    pub fn rows(&self) -> &[ScoreRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Highest total first; equal totals keep their input order.
    pub fn sort_by_total_desc(&mut self) {
        self.rows.sort_by(|a, b| b.total.total_cmp(&a.total));
    }

    /// Industry ascending, then rating label as text ("A" < "A+" < "B" ... < "NR" < "R").
    pub fn sort_by_industry_rating(&mut self) {
        self.rows.sort_by(|a, b| {
            a.industry
                .cmp(&b.industry)
                .then_with(|| a.rating.label().cmp(b.rating.label()))
        });
    }

    /// Company count per rating, every rating present, worst to best.
    pub fn rating_distribution(&self) -> Vec<(Rating, usize)> {
        Rating::ALL
            .iter()
            .map(|rating| {
                let count = self.rows.iter().filter(|r| r.rating == *rating).count();
                (*rating, count)
            })
            .collect()
    }

    /// Mean total per industry, best industry first.
    pub fn industry_averages(&self) -> Vec<(String, f64)> {
        let mut order: Vec<&str> = Vec::new();
        let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();

        for row in &self.rows {
            let entry = sums.entry(row.industry.as_str()).or_insert_with(|| {
                order.push(row.industry.as_str());
                (0.0, 0)
            });
            entry.0 += row.total;
            entry.1 += 1;
        }

        let mut averages: Vec<(String, f64)> = order
            .into_iter()
            .map(|industry| {
                let (sum, count) = sums[industry];
                (industry.to_string(), sum / count as f64)
            })
            .collect();
        averages.sort_by(|a, b| b.1.total_cmp(&a.1));
        averages
    }

    pub fn summary(&self) -> Option<TableSummary> {
        if self.rows.is_empty() {
            return None;
        }
        let totals = self.rows.iter().map(|r| r.total);
        let highest = totals.clone().fold(f64::NEG_INFINITY, f64::max);
        let lowest = totals.clone().fold(f64::INFINITY, f64::min);
        let mean = totals.sum::<f64>() / self.rows.len() as f64;

        Some(TableSummary {
            highest,
            lowest,
            mean,
            companies: self.rows.len(),
        })
    }
}
