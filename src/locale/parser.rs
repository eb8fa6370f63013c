//! pt-BR numeric text parsing
//!
//! Currency uses `.` for thousands grouping and `,` before exactly two
//! decimal digits (`1.234,56`). Percentages use `,` as decimal separator with
//! at most two decimals (`12,5`). Periods are plain whole numbers.

use crate::error::ValidationError;

/// Parse a currency amount such as `1.234,56`
///
/// Only `^\d{1,3}(\.\d{3})*,\d{2}$` is accepted.
pub fn parse_currency(text: &str) -> Result<f64, ValidationError> {
    let malformed = || ValidationError::MalformedCurrency(text.to_string());

    let (int_part, frac_part) = text.split_once(',').ok_or_else(malformed)?;
    if frac_part.len() != 2 || !all_digits(frac_part) {
        return Err(malformed());
    }

    let mut groups = int_part.split('.');
    let lead = groups.next().unwrap_or_default();
    if lead.is_empty() || lead.len() > 3 || !all_digits(lead) {
        return Err(malformed());
    }
    if !groups.all(|g| g.len() == 3 && all_digits(g)) {
        return Err(malformed());
    }

    let normalized = format!("{}.{}", int_part.replace('.', ""), frac_part);
    normalized.parse::<f64>().map_err(|_| malformed())
}

/// Parse a percentage such as `12,5`
///
/// Accepts `^\d*(,\d{0,2})?$`; missing integer or fraction digits count as
/// zero. With `positive_required`, a value `<= 0` is rejected.
pub fn parse_percentage(text: &str, positive_required: bool) -> Result<f64, ValidationError> {
    let malformed = || ValidationError::MalformedPercentage(text.to_string());

    let (int_part, frac_part) = match text.split_once(',') {
        Some((i, f)) => (i, f),
        None => (text, ""),
    };
    if !all_digits(int_part) || !all_digits(frac_part) || frac_part.len() > 2 {
        return Err(malformed());
    }

    let value = if int_part.is_empty() && frac_part.is_empty() {
        0.0
    } else {
        let int_digits = if int_part.is_empty() { "0" } else { int_part };
        let frac_digits = if frac_part.is_empty() { "0" } else { frac_part };
        format!("{}.{}", int_digits, frac_digits)
            .parse::<f64>()
            .map_err(|_| malformed())?
    };

    if positive_required && value <= 0.0 {
        return Err(ValidationError::NonPositiveRate);
    }

    Ok(value)
}

/// Parse a period count such as `24`
pub fn parse_period(text: &str) -> Result<u32, ValidationError> {
    if text.is_empty() || !all_digits(text) {
        return Err(ValidationError::MalformedPeriod(text.to_string()));
    }

    let value: u32 = text
        .parse()
        .map_err(|_| ValidationError::MalformedPeriod(text.to_string()))?;

    if value == 0 {
        return Err(ValidationError::NonPositivePeriod);
    }

    Ok(value)
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_parse_currency_grouped() {
        assert_abs_diff_eq!(parse_currency("1.234,56").unwrap(), 1234.56, epsilon = 1e-9);
        assert_abs_diff_eq!(parse_currency("0,00").unwrap(), 0.0);
        assert_abs_diff_eq!(parse_currency("999,99").unwrap(), 999.99, epsilon = 1e-9);
        assert_abs_diff_eq!(
            parse_currency("12.345.678,90").unwrap(),
            12_345_678.90,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_parse_currency_rejects_bad_grouping() {
        for bad in ["1234.56", "1234,56", "1.23,45", "1.234,5", "1.234", ",50", "", "1.234,567", "-1,00", "1 234,56"] {
            assert_eq!(
                parse_currency(bad),
                Err(ValidationError::MalformedCurrency(bad.to_string())),
                "input {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_parse_percentage() {
        assert_abs_diff_eq!(parse_percentage("12,5", true).unwrap(), 12.5, epsilon = 1e-12);
        assert_abs_diff_eq!(parse_percentage("6", true).unwrap(), 6.0);
        assert_abs_diff_eq!(parse_percentage("0,75", true).unwrap(), 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(parse_percentage(",5", true).unwrap(), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(parse_percentage("7,", true).unwrap(), 7.0);
    }

    #[test]
    fn test_parse_percentage_rejects() {
        assert_eq!(
            parse_percentage("12.5", true),
            Err(ValidationError::MalformedPercentage("12.5".into()))
        );
        assert_eq!(
            parse_percentage("1,234", true),
            Err(ValidationError::MalformedPercentage("1,234".into()))
        );
        assert_eq!(
            parse_percentage("1,2,3", false),
            Err(ValidationError::MalformedPercentage("1,2,3".into()))
        );
        assert_eq!(parse_percentage("0", true), Err(ValidationError::NonPositiveRate));
        assert_eq!(parse_percentage("", true), Err(ValidationError::NonPositiveRate));
    }

    #[test]
    fn test_parse_percentage_zero_allowed_when_not_required() {
        assert_abs_diff_eq!(parse_percentage("0", false).unwrap(), 0.0);
        assert_abs_diff_eq!(parse_percentage("", false).unwrap(), 0.0);
    }

    #[test]
    fn test_parse_period() {
        assert_eq!(parse_period("12"), Ok(12));
        assert_eq!(parse_period("0"), Err(ValidationError::NonPositivePeriod));
        assert_eq!(parse_period("1,5"), Err(ValidationError::MalformedPeriod("1,5".into())));
        assert_eq!(parse_period(""), Err(ValidationError::MalformedPeriod(String::new())));
        assert_eq!(
            parse_period("99999999999"),
            Err(ValidationError::MalformedPeriod("99999999999".into()))
        );
    }
}
