//! Normalization of form input into [`QueryCriteria`].

use shared::{
    domain::{QueryCriteria, RawCriteria},
    error::ValidationError,
};

const CURRENCY_PREFIXES: [&str; 4] = ["₹", "rs.", "rs", "inr"];

pub fn validate(raw: &RawCriteria) -> Result<QueryCriteria, ValidationError> {
    let education_level = trimmed(raw.education_level.as_deref());
    let free_text_interest = non_empty(raw.free_text_interest.as_deref());

    if education_level.is_empty() && free_text_interest.is_none() {
        return Err(ValidationError::EmptyCriteria);
    }

    Ok(QueryCriteria {
        education_level,
        annual_income: parse_income(raw.annual_income.as_deref()),
        category: trimmed(raw.category.as_deref()),
        region: non_empty(raw.region.as_deref()),
        free_text_interest,
    })
}

/// Parses a typed income. Anything unusable becomes 0.
pub fn parse_income(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return 0;
    };

    let mut value = raw.trim().to_lowercase();
    for prefix in CURRENCY_PREFIXES {
        if let Some(rest) = value.strip_prefix(prefix) {
            value = rest.to_string();
            break;
        }
    }

    let digits: String = value
        .chars()
        .filter(|c| !matches!(c, ',' | '_') && !c.is_whitespace())
        .collect();
    if digits.is_empty() || digits.starts_with('-') {
        return 0;
    }

    if let Ok(parsed) = digits.parse::<u64>() {
        return parsed;
    }
    match digits.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed >= 0.0 && parsed < u64::MAX as f64 => {
            parsed.trunc() as u64
        }
        _ => 0,
    }
}

fn trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    let value = trimmed(value);
    (!value.is_empty()).then_some(value)
}
