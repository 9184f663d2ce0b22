//! Amount display helpers.

use ferry_types::Amount;

/// Render a raw amount with `decimals` fractional digits, trimming trailing zeros.
///
/// `format_amount(&Amount::from(1_500_000_000_000_000_000u128), 18) == "1.5"`
pub fn format_amount(amount: &Amount, decimals: usize) -> String {
    let digits = amount.to_string();
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_units() {
        let one = Amount::from(1_000_000_000_000_000_000u128);
        assert_eq!(format_amount(&one, 18), "1");
    }

    #[test]
    fn fractional_units() {
        let amount = Amount::from(1_500_000_000_000_000_000u128);
        assert_eq!(format_amount(&amount, 18), "1.5");
    }

    #[test]
    fn smaller_than_one_unit() {
        let fee = Amount::from(2_000_000_000_000_000u64);
        assert_eq!(format_amount(&fee, 18), "0.002");
        assert_eq!(format_amount(&Amount::from(1u64), 18), "0.000000000000000001");
    }

    #[test]
    fn zero_and_no_decimals() {
        assert_eq!(format_amount(&Amount::zero(), 18), "0");
        assert_eq!(format_amount(&Amount::from(42u64), 0), "42");
    }
}
