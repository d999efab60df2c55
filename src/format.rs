use num_format::{Locale, ToFormattedString};

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "\u{b5}", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

const MINUS: char = '\u{2212}';

// Significant digits and decimal exponent of `x` rounded to `precision` digits.
fn decimal_parts(x: f64, precision: usize) -> (String, i32) {
    let formatted = if precision == 0 {
        format!("{:e}", x)
    } else {
        format!("{:.*e}", precision - 1, x)
    };
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => (
            mantissa.chars().filter(char::is_ascii_digit).collect(),
            exponent.parse().unwrap_or(0),
        ),
        None => (formatted, 0),
    }
}

/// SI-prefixed formatting with `precision` significant digits, e.g. `.3s`
/// turns 1234567 into `1.23M` and `.2s` turns 2e12 into `2.0T`.
///
/// Trailing zeros are kept and negative values use the Unicode minus sign.
pub fn format_si(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    let precision = precision.max(1);
    let magnitude = value.abs();

    let body = if magnitude.is_infinite() {
        "Infinity".to_string()
    } else {
        let (coefficient, exponent) = decimal_parts(magnitude, precision);
        let prefix_exponent = exponent.div_euclid(3).clamp(-8, 8) * 3;
        let i = exponent - prefix_exponent + 1;
        let n = coefficient.len() as i32;

        let digits = if i == n {
            coefficient
        } else if i > n {
            coefficient + &"0".repeat((i - n) as usize)
        } else if i > 0 {
            let (head, tail) = coefficient.split_at(i as usize);
            format!("{}.{}", head, tail)
        } else {
            let rest = (precision as i32 + i - 1).max(0) as usize;
            format!("0.{}{}", "0".repeat((-i) as usize), decimal_parts(magnitude, rest).0)
        };

        let prefix = SI_PREFIXES[(8 + prefix_exponent / 3) as usize];
        format!("{}{}", digits, prefix)
    };

    let rounds_to_zero = body.chars().all(|c| !c.is_ascii_digit() || c == '0');
    if value < 0.0 && !rounds_to_zero {
        format!("{}{}", MINUS, body)
    } else {
        body
    }
}

/// en-US display formatting: thousands separators and at most three
/// fraction digits, trailing zeros dropped.
pub fn format_locale(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "\u{221e}".to_string() } else { "-\u{221e}".to_string() };
    }

    let magnitude = value.abs();
    let mut whole = magnitude.trunc();
    let mut millis = ((magnitude - whole) * 1000.0).round();
    if millis >= 1000.0 {
        whole += 1.0;
        millis = 0.0;
    }

    let mut out = String::new();
    if value < 0.0 && (whole > 0.0 || millis > 0.0) {
        out.push('-');
    }
    out.push_str(&(whole as u128).to_formatted_string(&Locale::en));
    if millis > 0.0 {
        let fraction = format!("{:03}", millis as u32);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}
