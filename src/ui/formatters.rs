use std::fmt;
use thiserror::Error;

/// Leading fractional zeros required before a price is compressed into the
/// `0.0₍n₎digits` form. Fixed policy, not configurable.
pub const SUBSCRIPT_MIN_ZEROS: usize = 4;

/// Character budget used when the caller does not supply one.
pub const DEFAULT_MAX_LENGTH: usize = 16;

const FIXED_PRECISION: usize = 20;
const SUBSCRIPT_PREFIX: &str = "0.0";
const ABBREVIATE_FROM: f64 = 10_000.0;
const SUFFIXES: [&str; 5] = ["", "K", "M", "B", "T"];

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum FormatError {
    #[error("cannot format {0}: value must be finite and non-negative")]
    InvalidInput(f64),
}

fn check_input(value: f64) -> Result<f64, FormatError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(FormatError::InvalidInput(value))
    }
}

/// A price split into its significant digits and, for very small values,
/// the number of elided leading fractional zeros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedPrice {
    pub main: String,
    pub subscript: Option<usize>,
}

impl FormattedPrice {
    fn plain(main: impl Into<String>) -> Self {
        Self {
            main: main.into(),
            subscript: None,
        }
    }
}

/// Split `value` into a display-friendly representation.
///
/// Values of 1 or more keep their full fixed-point rendering (trailing
/// fractional zeros dropped). Values below 1 with fewer than
/// [`SUBSCRIPT_MIN_ZEROS`] leading zeros render as their shortest decimal.
/// Anything smaller becomes `"0.0" + significant digits` with the zero count
/// carried in `subscript`.
pub fn format_token_price(value: f64) -> Result<FormattedPrice, FormatError> {
    let value = check_input(value)?;
    if value == 0.0 {
        return Ok(FormattedPrice::plain("0"));
    }

    let fixed = format!("{:.*}", FIXED_PRECISION, value);
    let Some(fraction) = fixed.strip_prefix("0.") else {
        return Ok(FormattedPrice::plain(trim_fraction(&fixed)));
    };

    // Below the fixed-point resolution there is nothing left to show.
    let Some(zeros) = fraction.find(|c: char| c != '0') else {
        return Ok(FormattedPrice::plain("0"));
    };

    if zeros < SUBSCRIPT_MIN_ZEROS {
        return Ok(FormattedPrice::plain(value.to_string()));
    }

    let significant = fraction[zeros..].trim_end_matches('0');
    Ok(FormattedPrice {
        main: format!("{SUBSCRIPT_PREFIX}{significant}"),
        subscript: Some(zeros),
    })
}

/// A [`FormattedPrice`] re-rounded to fit a character budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FittedPrice {
    Plain(String),
    Subscript { zeros: usize, digits: String },
}

impl FittedPrice {
    /// Rendered width in terminal cells.
    pub fn width(&self) -> usize {
        match self {
            FittedPrice::Plain(s) => s.chars().count(),
            FittedPrice::Subscript { zeros, digits } => {
                SUBSCRIPT_PREFIX.len() + zeros.to_string().len() + digits.chars().count()
            }
        }
    }
}

impl fmt::Display for FittedPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FittedPrice::Plain(s) => f.write_str(s),
            FittedPrice::Subscript { zeros, digits } => {
                write!(f, "{SUBSCRIPT_PREFIX}{}{digits}", subscript_digits(*zeros))
            }
        }
    }
}

/// Re-round `price` so that its rendering fits in `max_len` characters.
///
/// Plain prices are rounded to the fractional places left in the budget and
/// keep their trailing zeros, so the width stays steady between ticks. The `"0.0"` prefix and the zero count are never dropped, so a budget smaller
/// than prefix + count + one digit is exceeded rather than hidden.
pub fn fit_price(price: &FormattedPrice, max_len: usize) -> FittedPrice {
    let Some(zeros) = price.subscript else {
        let value: f64 = price.main.parse().unwrap_or(0.0);
        let point = price.main.find('.').unwrap_or(price.main.len());
        let places = max_len.saturating_sub(point + 1);
        return FittedPrice::Plain(format!("{value:.places$}"));
    };

    let digits = price
        .main
        .strip_prefix(SUBSCRIPT_PREFIX)
        .unwrap_or(&price.main);
    let allowed = max_len
        .saturating_sub(SUBSCRIPT_PREFIX.len() + zeros.to_string().len())
        .max(1);

    match round_digits(digits, allowed) {
        Rounded::Digits(digits) => FittedPrice::Subscript { zeros, digits },
        // Carry rolled over into the next decade: 0.0000999 -> 0.0001
        Rounded::Overflow => match zeros.checked_sub(1) {
            Some(zeros) if zeros >= SUBSCRIPT_MIN_ZEROS => FittedPrice::Subscript {
                zeros,
                digits: "1".to_string(),
            },
            Some(zeros) => FittedPrice::Plain(format!("0.{}1", "0".repeat(zeros))),
            None => FittedPrice::Plain("1".to_string()),
        },
    }
}

/// Convenience wrapper over [`fit_price`] returning the rendered text.
pub fn fit_to_budget(price: &FormattedPrice, max_len: usize) -> String {
    fit_price(price, max_len).to_string()
}

enum Rounded {
    Digits(String),
    Overflow,
}

/// Round a run of fractional digits to at most `keep` digits, half-up.
fn round_digits(digits: &str, keep: usize) -> Rounded {
    if digits.len() <= keep {
        return Rounded::Digits(digits.to_string());
    }

    let mut kept: Vec<u8> = digits.as_bytes()[..keep].to_vec();
    if digits.as_bytes()[keep] >= b'5' {
        let mut carried = true;
        for d in kept.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carried = false;
                break;
            }
        }
        if carried {
            return Rounded::Overflow;
        }
    }

    let rounded = String::from_utf8_lossy(&kept);
    let trimmed = rounded.trim_end_matches('0');
    if trimmed.is_empty() {
        Rounded::Digits("0".to_string())
    } else {
        Rounded::Digits(trimmed.to_string())
    }
}

/// Render `n` with Unicode subscript digits (`10` -> `₁₀`).
pub fn subscript_digits(n: usize) -> String {
    n.to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .filter_map(|d| char::from_u32('₀' as u32 + d))
        .collect()
}

/// Shorten large counts (liquidity, market cap, supply) with K/M/B/T.
///
/// Below 10,000 the value is shown in full with thousands separators.
pub fn abbreviate(value: f64) -> Result<String, FormatError> {
    let mut value = check_input(value)?;
    if value < ABBREVIATE_FROM {
        return Ok(group_thousands(value));
    }

    let mut index = 0;
    while value >= 1000.0 && index < SUFFIXES.len() - 1 {
        value /= 1000.0;
        index += 1;
    }
    Ok(format!("{value:.2}{}", SUFFIXES[index]))
}

/// Thousands-separated rendering with up to three fractional digits.
pub fn group_thousands(value: f64) -> String {
    let fixed = trim_fraction(&format!("{value:.3}"));
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Drop trailing fractional zeros and a dangling decimal point.
fn trim_fraction(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

/// Format a price for a fixed-width cell, falling back to a dash.
pub fn display_price(value: f64, max_len: usize) -> String {
    match format_token_price(value) {
        Ok(price) => fit_to_budget(&price, max_len),
        Err(_) => "—".to_string(),
    }
}

/// Abbreviate for display, falling back to a dash.
pub fn display_amount(value: f64) -> String {
    abbreviate(value).unwrap_or_else(|_| "—".to_string())
}

/// `0x77Ad5F358CD673FCA1673e20E928B3CcADC84706` -> `0x77Ad…4706`
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let end = s
            .char_indices()
            .nth(max_len.saturating_sub(3))
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        format!("{}...", &s[..end])
    } else {
        s.to_string()
    }
}
