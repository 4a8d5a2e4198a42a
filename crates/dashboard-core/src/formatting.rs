/// Format a number with thousands separators and a fixed number of decimals.
///
/// # Examples
///
/// ```
/// use dashboard_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.prec$}", value.abs(), prec = decimals as usize);

    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    if negative && fixed.chars().any(|c| c != '0' && c != '.') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format a number with no decimals when it is whole, two otherwise.
///
/// ```
/// use dashboard_core::formatting::format_value;
///
/// assert_eq!(format_value(1500.0), "1,500");
/// assert_eq!(format_value(12.346), "12.35");
/// ```
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format_number(value, 0)
    } else {
        format_number(value, 2)
    }
}

/// Format a revenue amount in rupiah with thousands separators.
///
/// ```
/// use dashboard_core::formatting::format_rupiah;
///
/// assert_eq!(format_rupiah(1250000.0), "Rp 1,250,000");
/// assert_eq!(format_rupiah(-500.0), "-Rp 500");
/// ```
pub fn format_rupiah(amount: f64) -> String {
    if amount < 0.0 {
        format!("-Rp {}", format_number(amount.abs(), 0))
    } else {
        format!("Rp {}", format_number(amount, 0))
    }
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` when `whole` is zero.
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let factor = 10_f64.powi(decimal_places as i32);
    ((part / whole) * 100.0 * factor).round() / factor
}

/// Format a share as `"12.5%"` with one decimal, like a pie-chart label.
pub fn format_share(part: f64, whole: f64) -> String {
    format!("{:.1}%", percentage(part, whole, 1))
}

/// Short English month name for a calendar month, or `"?"` outside 1–12.
pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    month
        .checked_sub(1)
        .and_then(|i| NAMES.get(i as usize))
        .copied()
        .unwrap_or("?")
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of a digit string.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_with_thousands() {
        assert_eq!(format_number(1_234.5, 1), "1,234.5");
        assert_eq!(format_number(1_000.0, 0), "1,000");
        assert_eq!(format_number(999.0, 0), "999");
    }

    #[test]
    fn test_format_number_millions() {
        assert_eq!(format_number(12_345_678.0, 0), "12,345,678");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-9_876.5, 1), "-9,876.5");
    }

    #[test]
    fn test_format_number_negative_rounding_to_zero_has_no_sign() {
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    // ── format_value ─────────────────────────────────────────────────────────

    #[test]
    fn test_format_value_whole_and_fractional() {
        assert_eq!(format_value(20.0), "20");
        assert_eq!(format_value(0.5), "0.50");
    }

    // ── format_rupiah ────────────────────────────────────────────────────────

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(0.0), "Rp 0");
        assert_eq!(format_rupiah(15_000_000.0), "Rp 15,000,000");
    }

    // ── percentage / format_share ────────────────────────────────────────────

    #[test]
    fn test_percentage_basic() {
        let p = percentage(50.0, 200.0, 1);
        assert!((p - 25.0).abs() < 1e-9, "percentage = {p}");
    }

    #[test]
    fn test_percentage_zero_whole() {
        assert_eq!(percentage(10.0, 0.0, 2), 0.0);
    }

    #[test]
    fn test_format_share() {
        assert_eq!(format_share(1.0, 3.0), "33.3%");
        assert_eq!(format_share(0.0, 0.0), "0.0%");
    }

    // ── month_name ───────────────────────────────────────────────────────────

    #[test]
    fn test_month_name_bounds() {
        assert_eq!(month_name(1), "Jan");
        assert_eq!(month_name(12), "Dec");
        assert_eq!(month_name(0), "?");
        assert_eq!(month_name(13), "?");
    }
}
