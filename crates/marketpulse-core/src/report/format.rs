//! Human-readable number formatting for text reports.

const TRILLION: f64 = 1_000_000_000_000.0;
const BILLION: f64 = 1_000_000_000.0;
const MILLION: f64 = 1_000_000.0;

/// Formats a monetary amount with `T`/`B`/`M` suffixes at or above one
/// million, and as a plain amount with thousands separators below that.
///
/// ```
/// use marketpulse_core::format_money;
///
/// assert_eq!(format_money(2_500_000_000.0, "USD"), "$2.50B");
/// assert_eq!(format_money(45_000.0, "USD"), "$45,000.00");
/// assert_eq!(format_money(1_250.5, "CHF"), "CHF 1,250.50");
/// ```
pub fn format_money(value: f64, currency: &str) -> String {
    if !value.is_finite() {
        return String::from("n/a");
    }

    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();
    let amount = if magnitude >= TRILLION {
        format!("{:.2}T", magnitude / TRILLION)
    } else if magnitude >= BILLION {
        format!("{:.2}B", magnitude / BILLION)
    } else if magnitude >= MILLION {
        format!("{:.2}M", magnitude / MILLION)
    } else {
        group_thousands(&format!("{magnitude:.2}"))
    };

    format!("{sign}{}{amount}", currency_prefix(currency))
}

/// Formats a percentage with an explicit sign and two decimals.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return String::from("n/a");
    }
    // Avoid rendering "-0.00%" for values that round to zero.
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        return String::from("+0.00%");
    }
    format!("{rounded:+.2}%")
}

/// Formats a count with thousands separators.
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

fn currency_prefix(currency: &str) -> String {
    match currency.to_ascii_uppercase().as_str() {
        "USD" => String::from("$"),
        "EUR" => String::from("€"),
        "GBP" => String::from("£"),
        "JPY" => String::from("¥"),
        other => format!("{other} "),
    }
}

fn group_thousands(number: &str) -> String {
    let (integer, fraction) = match number.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (number, None),
    };

    let digits = integer.len();
    let mut grouped = String::with_capacity(digits + digits / 3 + 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (digits - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_magnitude_suffixes() {
        assert_eq!(format_money(2_500_000_000_000.0, "USD"), "$2.50T");
        assert_eq!(format_money(2_500_000_000.0, "USD"), "$2.50B");
        assert_eq!(format_money(1_234_567.0, "USD"), "$1.23M");
        assert_eq!(format_money(999_999.0, "USD"), "$999,999.00");
    }

    #[test]
    fn plain_amounts_use_separators_and_two_decimals() {
        assert_eq!(format_money(45_000.0, "usd"), "$45,000.00");
        assert_eq!(format_money(0.085, "USD"), "$0.09");
        assert_eq!(format_money(-1_500.0, "EUR"), "-€1,500.00");
    }

    #[test]
    fn percentages_carry_explicit_sign() {
        assert_eq!(format_percent(16.0), "+16.00%");
        assert_eq!(format_percent(-2.1), "-2.10%");
        assert_eq!(format_percent(-0.001), "+0.00%");
    }

    #[test]
    fn counts_group_thousands() {
        assert_eq!(format_count(9_876), "9,876");
        assert_eq!(format_count(12), "12");
        assert_eq!(format_count(1_000_000), "1,000,000");
    }
}
