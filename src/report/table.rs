//! Text table rendering
//!
//! Produces an ASCII table such as:
//!
//! ```text
//! +-----------+-----------+----------------+-------------------+
//! | Disk Name | Size (GB) | Resource Group | Est. Monthly Cost |
//! +===========+===========+================+===================+
//! | d1        | 100       | rg1            | $150.00           |
//! +-----------+-----------+----------------+-------------------+
//! ```
//!
//! Columns are as wide as their widest cell. Nothing is truncated or wrapped.

use crate::report::Report;
use crate::utils::{format_money, format_rate};
use comfy_table::{ContentArrangement, Table};

pub const HEADERS: [&str; 4] = ["Disk Name", "Size (GB)", "Resource Group", "Est. Monthly Cost"];

pub const NO_ZOMBIES_MESSAGE: &str = "No zombies detected. Good job!";

/// `+`/`-` borders, `=` under the header, no lines between data rows.
/// Same layout as `ASCII_FULL_CONDENSED` but with `+` at the header intersections.
const ZOMBIE_TABLE_PRESET: &str = "||--+=++|    ++++++";

pub fn render_table(report: &Report) -> String {
    let mut table = Table::new();
    table
        .load_preset(ZOMBIE_TABLE_PRESET)
        .set_content_arrangement(ContentArrangement::Disabled)
        .set_header(HEADERS.to_vec());

    for costed in report.disks() {
        let disk = costed.disk();
        table.add_row(vec![
            disk.name().to_string(),
            disk.size_gb().to_string(),
            disk.resource_group().to_string(),
            format_money(costed.monthly_cost()),
        ]);
    }

    table.to_string()
}

pub fn render_summary(report: &Report) -> String {
    format!(
        "Total estimated monthly waste: {} (rate: {}/GB-month)",
        format_money(report.total()),
        format_rate(report.rate_per_gb_month())
    )
}
