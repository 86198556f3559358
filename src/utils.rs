//! Formatting helpers shared by the reporters

/// Format a dollar amount with thousands separators and two decimals
///
/// `1234.5` becomes `$1,234.50`. Negative amounts keep the sign in front of
/// the dollar sign.
pub fn format_money(value: f64) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (whole, cents) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    // -0.001 rounds to 0.00; do not print "-$0.00"
    let sign = if value < 0.0 && rounded != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

/// Format a per-GB rate the way it appears in the summary line
pub fn format_rate(rate: f64) -> String {
    format!("${:.2}", rate)
}
