//! Amount parsing
//!
//! Rent roll amount cells are wildly inconsistent: plain numbers,
//! currency strings, comma-grouped values, accounting-style
//! parenthesized negatives. [`parse_amount`] folds all of them into a
//! signed float and never fails; anything unparseable is `0.0`.

use rentroll_core::CellValue;

/// Parse a cell value as a monetary amount
///
/// Numeric cells pass through unchanged. Text goes through
/// sanitization: thousands separators (comma and non-breaking space)
/// are stripped, a fully parenthesized value becomes negative, and any
/// remaining non-numeric characters (currency symbols, stray text) are
/// discarded before the float conversion. Empty, unparseable, and
/// non-finite input all produce `0.0`.
pub fn parse_amount(value: &CellValue) -> f64 {
    match value {
        CellValue::Empty => 0.0,
        CellValue::Number(n) if n.is_finite() => *n,
        CellValue::Number(_) => 0.0,
        CellValue::String(s) => parse_amount_text(s.as_str()),
        // Booleans take the text path and fall out as 0.0
        CellValue::Boolean(b) => parse_amount_text(if *b { "TRUE" } else { "FALSE" }),
    }
}

fn parse_amount_text(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let mut s: String = trimmed
        .chars()
        .filter(|&c| c != ',' && c != '\u{a0}')
        .collect();

    // Accounting convention: (1234.50) means -1234.50
    if s.starts_with('(') && s.ends_with(')') && s.len() >= 2 {
        s = format!("-{}", &s[1..s.len() - 1]);
    }

    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() {
        return 0.0;
    }

    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}
