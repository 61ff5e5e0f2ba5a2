//! Number formatting and lenient parsing for currency text.

/// Format a number the way it is printed in plain text: integers without a
/// fractional part, everything else with the shortest round-tripping form.
pub fn format_plain(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Format a number with `,` thousands separators and an optional fixed
/// number of decimals.
pub fn format_with_separators(value: f64, decimals: Option<usize>) -> String {
    let formatted = match decimals {
        Some(places) => format!("{:.*}", places, value.abs()),
        None => format_plain(value.abs()),
    };
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3 + 4);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
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

/// Parse the longest numeric prefix of `text`, ignoring leading whitespace.
///
/// `"12.5kg"` parses as `12.5`, `"abc"` does not parse at all.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let integer_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - integer_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while fraction_end < bytes.len() && bytes[fraction_end].is_ascii_digit() {
            fraction_end += 1;
        }
        digits += fraction_end - fraction_start;
        if digits > 0 {
            end = fraction_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exponent_end = end + 1;
        if exponent_end < bytes.len() && matches!(bytes[exponent_end], b'+' | b'-') {
            exponent_end += 1;
        }
        let exponent_digits_start = exponent_end;
        while exponent_end < bytes.len() && bytes[exponent_end].is_ascii_digit() {
            exponent_end += 1;
        }
        if exponent_end > exponent_digits_start {
            end = exponent_end;
        }
    }

    text[..end].parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_plain() {
        assert_eq!(format_plain(946.0), "946");
        assert_eq!(format_plain(1250.5), "1250.5");
        assert_eq!(format_plain(0.25), "0.25");
        assert_eq!(format_plain(-12.0), "-12");
    }

    #[test]
    fn test_format_with_separators() {
        assert_eq!(format_with_separators(946.0, None), "946");
        assert_eq!(format_with_separators(1250.0, None), "1,250");
        assert_eq!(format_with_separators(1234567.0, None), "1,234,567");
        assert_eq!(format_with_separators(1250.0, Some(2)), "1,250.00");
        assert_eq!(format_with_separators(100000.5, Some(2)), "100,000.50");
        assert_eq!(format_with_separators(-2500.0, None), "-2,500");
    }

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float("946"), Some(946.0));
        assert_eq!(parse_leading_float("800."), Some(800.0));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("12.5kg"), Some(12.5));
        assert_eq!(parse_leading_float("3rd"), Some(3.0));
        assert_eq!(parse_leading_float("1e3"), Some(1000.0));
        assert_eq!(parse_leading_float("1e"), Some(1.0));
        assert_eq!(parse_leading_float("abc"), None);
        assert_eq!(parse_leading_float("."), None);
        assert_eq!(parse_leading_float(""), None);
        assert_eq!(parse_leading_float("-"), None);
    }
}
