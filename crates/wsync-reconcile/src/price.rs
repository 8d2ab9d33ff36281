//! Price normalization for feed prices.

/// Reduce a localized price to the digits of its integer part.
///
/// Everything from the first `.` onward is discarded, then every non-digit
/// (thousands separators, currency, whitespace) is dropped. No rounding.
///
/// `"19'990.00 руб."` becomes `"19990"`. A string without `.` is treated as
/// all integer part. The result may be empty when the input has no digits
/// before the decimal point; callers decide whether that is an error.
pub fn normalize_price(raw: &str) -> String {
    let integer_part = raw.split('.').next().unwrap_or_default();
    integer_part.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_separators_currency_and_fraction() {
        assert_eq!(normalize_price("19'990.00 руб."), "19990");
        assert_eq!(normalize_price("5 990.50 руб."), "5990");
    }

    #[test]
    fn no_decimal_point_keeps_whole_string() {
        assert_eq!(normalize_price("1 200 руб"), "1200");
        assert_eq!(normalize_price("42"), "42");
    }

    #[test]
    fn only_first_decimal_point_splits() {
        assert_eq!(normalize_price("1.234.56"), "1");
    }

    #[test]
    fn idempotent_on_digit_strings() {
        let once = normalize_price("19'990.00 руб.");
        assert_eq!(normalize_price(&once), once);
    }

    #[test]
    fn no_integer_digits_yields_empty() {
        assert_eq!(normalize_price(".99"), "");
        assert_eq!(normalize_price("руб."), "");
    }
}
