// ── Display formatting ──

use num_format::{Locale, ToFormattedString};

/// Render an amount as Indonesian rupiah: `Rp 1.500.000`.
///
/// Fixed locale (`id`), whole rupiah, `.` as the thousands separator.
/// Pure: identical input always yields identical bytes.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub fn currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "Rp -".to_owned();
    }
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_formatted_string(&Locale::id);
    if whole < 0 {
        format!("-Rp {digits}")
    } else {
        format!("Rp {digits}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_rupiah() {
        assert_eq!(currency(1_500_000.0), "Rp 1.500.000");
        assert_eq!(currency(0.0), "Rp 0");
        assert_eq!(currency(999.0), "Rp 999");
        assert_eq!(currency(1_000.0), "Rp 1.000");
    }

    #[test]
    fn rounds_to_whole_rupiah() {
        assert_eq!(currency(12_499.5), "Rp 12.500");
        assert_eq!(currency(-2_500.0), "-Rp 2.500");
        assert_eq!(currency(-0.2), "Rp 0");
    }
}
