//! Number rounding and formatting for stored figures and generated text

/// Round to the nearest integer, ties toward positive infinity (`-12.5` -> `-12`)
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to two decimal places with [`round_half_up`] tie-breaking
pub fn round_cents(value: f64) -> f64 {
    round_half_up(value * 100.0) / 100.0
}

/// Format a number with comma thousands separators (`168000` -> `168,000`)
///
/// At most three fractional digits are kept and trailing zeros dropped.
pub fn thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = (value * 1000.0).round() / 1000.0;
    let negative = rounded < 0.0;
    let text = format!("{}", rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format a figure the way it reads in prose (`13.6`, `15`, `27.3`)
pub fn plain(value: f64) -> String {
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(168000.0), "168,000");
        assert_eq!(thousands(8650.0), "8,650");
        assert_eq!(thousands(999.0), "999");
        assert_eq!(thousands(1234567.5), "1,234,567.5");
        assert_eq!(thousands(-13440.0), "-13,440");
        assert_eq!(thousands(0.0), "0");
    }

    #[test]
    fn test_round_half_up_ties_toward_positive() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
        assert_eq!(round_half_up(7957.6), 7958.0);
        assert_eq!(round_cents(-0.125), -0.12);
        assert_eq!(round_cents(0.625), 0.63);
    }

    #[test]
    fn test_plain_drops_trailing_zero() {
        assert_eq!(plain(15.0), "15");
        assert_eq!(plain(13.6), "13.6");
    }
}
