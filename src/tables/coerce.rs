//! Lenient text coercion applied at the table load boundary
//!
//! Reference data is hand-edited. Numbers may carry stray whitespace, a
//! thousands separator or a percent sign; anything unparseable becomes zero
//! (or `None`) instead of failing the whole load.

/// Parse a number, treating unparseable or non-finite text as absent
pub fn parse_opt_f64(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a number, defaulting to 0
pub fn parse_f64(text: &str) -> f64 {
    parse_opt_f64(text).unwrap_or(0.0)
}

/// Parse a non-negative whole amount; fractions are rounded, negatives clamp to 0
pub fn parse_u64(text: &str) -> u64 {
    parse_opt_f64(text).map(|v| v.max(0.0).round() as u64).unwrap_or(0)
}

pub fn parse_u32(text: &str) -> u32 {
    parse_u64(text).min(u32::MAX as u64) as u32
}

pub fn parse_opt_u32(text: &str) -> Option<u32> {
    parse_opt_f64(text).filter(|v| *v >= 0.0).map(|v| v.round().min(u32::MAX as f64) as u32)
}

/// `Y`, `yes`, `true` or `1` (any case) are set; everything else is unset
pub fn parse_flag(text: &str) -> bool {
    matches!(text.trim().to_ascii_lowercase().as_str(), "y" | "yes" | "true" | "1")
}

/// Comma separated amounts, zeros dropped, sorted ascending and de-duplicated
pub fn parse_amount_list(text: &str) -> Vec<u64> {
    let mut values: Vec<u64> = text.split(',').map(parse_u64).filter(|v| *v > 0).collect();
    values.sort_unstable();
    values.dedup();
    values
}

pub fn parse_year_list(text: &str) -> Vec<u32> {
    let mut values: Vec<u32> = text.split(',').map(parse_u32).filter(|v| *v > 0).collect();
    values.sort_unstable();
    values.dedup();
    values
}

/// Trimmed text, `None` when blank
pub fn optional_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
