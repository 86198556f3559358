//! Aggregation and rendering of zombie disk reports
//!
//! - [`table`] - fixed-width text table and summary line
//! - [`export`] - JSON and CSV renderings of the same report

pub mod export;
pub mod table;

use crate::config::OutputFormat;
use crate::disks::CostedDisk;
use std::cmp::Ordering;

pub use table::{render_summary, render_table, NO_ZOMBIES_MESSAGE};

/// Zombie disks ordered by descending monthly cost
#[derive(Debug, Clone)]
pub struct Report {
    disks: Vec<CostedDisk>,
    rate_per_gb_month: f64,
}

impl Report {
    pub fn disks(&self) -> &[CostedDisk] {
        &self.disks
    }

    pub fn rate_per_gb_month(&self) -> f64 {
        self.rate_per_gb_month
    }

    /// Sum of every disk's monthly cost
    pub fn total(&self) -> f64 {
        total_monthly_cost(&self.disks)
    }
}

/// Successful result of one run
#[derive(Debug, Clone)]
pub enum Outcome {
    NoZombies { rate_per_gb_month: f64 },
    Report(Report),
}

impl Outcome {
    pub fn render(&self, format: OutputFormat) -> crate::error::Result<String> {
        match (format, self) {
            (OutputFormat::Text, Outcome::NoZombies { .. }) => Ok(NO_ZOMBIES_MESSAGE.to_string()),
            (OutputFormat::Text, Outcome::Report(report)) => Ok(format!(
                "{}\n\n{}",
                render_table(report),
                render_summary(report)
            )),
            (OutputFormat::Json, outcome) => export::to_json(outcome),
            (OutputFormat::Csv, outcome) => Ok(export::to_csv(outcome)),
        }
    }
}

pub fn total_monthly_cost(disks: &[CostedDisk]) -> f64 {
    disks.iter().map(CostedDisk::monthly_cost).sum()
}

/// Highest cost first; equal costs ordered by name, then by input order
fn by_cost_descending(a: &CostedDisk, b: &CostedDisk) -> Ordering {
    b.monthly_cost()
        .partial_cmp(&a.monthly_cost())
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.disk().name().cmp(b.disk().name()))
}

/// Sort zombies into a report, or `NoZombies` when there are none
pub fn aggregate(mut disks: Vec<CostedDisk>, rate_per_gb_month: f64) -> Outcome {
    if disks.is_empty() {
        return Outcome::NoZombies { rate_per_gb_month };
    }
    // sort_by is stable
    disks.sort_by(by_cost_descending);
    Outcome::Report(Report {
        disks,
        rate_per_gb_month,
    })
}
