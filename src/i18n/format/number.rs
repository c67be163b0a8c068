//! Locale-aware number and byte-size formatting.
//!
//! Separators are chosen by language code. This covers the decimal and
//! grouping conventions MovLib's UI languages need; it is not a full CLDR
//! number formatter.

use crate::i18n::Locale;

/// Decimal and grouping separators for a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberSymbols {
    pub decimal: char,
    pub group: char,
    /// Whether a percent sign is separated from the number by a no-break space
    pub spaced_percent: bool,
}

const NBSP: char = '\u{a0}';
const NNBSP: char = '\u{202f}';

impl NumberSymbols {
    pub fn for_locale(locale: &Locale) -> NumberSymbols {
        let (decimal, group, spaced_percent) = match locale.language_code() {
            "de" | "es" | "it" | "nl" | "pt" | "id" | "tr" | "da" => (',', '.', true),
            "fr" => (',', NNBSP, true),
            "ru" | "uk" | "pl" | "cs" | "sv" | "fi" | "nb" => (',', NBSP, true),
            _ => ('.', ',', false),
        };
        NumberSymbols {
            decimal,
            group,
            spaced_percent,
        }
    }
}

/// Format a number with at most `max_fraction` fractional digits, trailing zeros trimmed.
pub fn format_number(locale: &Locale, value: f64, max_fraction: usize) -> String {
    let fixed = format!("{:.*}", max_fraction, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let symbols = NumberSymbols::for_locale(locale);
    let mut out = String::new();
    // "-0" is not a thing
    if value < 0.0 && (int_part.bytes().any(|b| b != b'0') || !frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_digits(int_part, symbols.group));
    if !frac_part.is_empty() {
        out.push(symbols.decimal);
        out.push_str(frac_part);
    }
    out
}

/// Format an integer with grouping separators.
pub fn format_integer(locale: &Locale, value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let grouped = group_digits(&digits, NumberSymbols::for_locale(locale).group);
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Format a ratio as a whole percentage (`0.5` -> `50%`).
pub fn format_percent(locale: &Locale, value: f64) -> String {
    let number = format_number(locale, value * 100.0, 0);
    if NumberSymbols::for_locale(locale).spaced_percent {
        format!("{number}{NBSP}%")
    } else {
        format!("{number}%")
    }
}

const BYTE_UNITS: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];

/// Human readable size with binary (1024) units and up to two fractional digits.
pub fn format_bytes(locale: &Locale, bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    // Rounding to two digits can carry into the next unit
    if unit > 0 && unit < BYTE_UNITS.len() - 1 && (value * 100.0).round() / 100.0 >= 1024.0 {
        value /= 1024.0;
        unit += 1;
    }

    let number = if unit == 0 {
        format_integer(locale, bytes as i64)
    } else {
        format_number(locale, value, 2)
    };
    format!("{} {}", number, BYTE_UNITS[unit])
}

fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len_utf8());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}
