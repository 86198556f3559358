//! Machine-readable renderings of a run outcome

use crate::error::Result;
use crate::report::table::HEADERS;
use crate::report::Outcome;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ReportJson {
    pub generated_at: DateTime<Utc>,
    pub rate_per_gb_month: f64,
    pub total_monthly_cost: f64,
    pub zombie_count: usize,
    pub disks: Vec<ZombieDiskJson>,
}

#[derive(Debug, Serialize)]
pub struct ZombieDiskJson {
    pub name: String,
    pub size_gb: u64,
    pub resource_group: String,
    pub monthly_cost: f64,
}

impl From<&Outcome> for ReportJson {
    fn from(outcome: &Outcome) -> Self {
        let (rate_per_gb_month, disks, total_monthly_cost) = match outcome {
            Outcome::NoZombies { rate_per_gb_month } => (*rate_per_gb_month, Vec::new(), 0.0),
            Outcome::Report(report) => {
                let disks = report
                    .disks()
                    .iter()
                    .map(|costed| ZombieDiskJson {
                        name: costed.disk().name().to_string(),
                        size_gb: costed.disk().size_gb(),
                        resource_group: costed.disk().resource_group().to_string(),
                        monthly_cost: costed.monthly_cost(),
                    })
                    .collect();
                (report.rate_per_gb_month(), disks, report.total())
            }
        };
        ReportJson {
            generated_at: Utc::now(),
            rate_per_gb_month,
            total_monthly_cost,
            zombie_count: disks.len(),
            disks,
        }
    }
}

pub fn to_json(outcome: &Outcome) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ReportJson::from(outcome))?)
}

pub fn to_csv(outcome: &Outcome) -> String {
    let mut csv = HEADERS.join(",");
    csv.push('\n');

    if let Outcome::Report(report) = outcome {
        for costed in report.disks() {
            let disk = costed.disk();
            csv.push_str(&format!(
                "{},{},{},{:.2}\n",
                csv_field(disk.name()),
                disk.size_gb(),
                csv_field(disk.resource_group()),
                costed.monthly_cost()
            ));
        }
    }

    csv
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
