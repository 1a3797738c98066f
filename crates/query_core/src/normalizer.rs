//! Conversion of backend payloads into [`QueryResult`].
//!
//! Generative backends rarely return exactly the requested shape. Listings
//! are searched for JSON (bare, fenced, or embedded in prose) and entries are
//! read through a set of field aliases. A payload without any JSON is kept as
//! advice text so the user still sees what the backend said. An empty listing
//! is always an error.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use shared::{
    domain::{CourseEntry, QueryKind, QueryResult, ScholarshipEntry},
    error::NormalizationError,
};

const SCHOLARSHIP_LIST_KEYS: [&str; 4] = ["scholarships", "items", "results", "data"];
const COURSE_LIST_KEYS: [&str; 4] = ["courses", "items", "results", "data"];
const ADVICE_KEYS: [&str; 4] = ["text", "advice", "guidance", "content"];

const TITLE_KEYS: [&str; 4] = ["title", "name", "scholarship", "scheme"];
const ELIGIBILITY_KEYS: [&str; 5] = [
    "eligibility_summary",
    "eligibilitySummary",
    "eligibility",
    "summary",
    "description",
];
const AMOUNT_KEYS: [&str; 3] = ["amount", "award", "value"];
const DEADLINE_KEYS: [&str; 5] = ["deadline", "last_date", "lastDate", "due_date", "dueDate"];

const COURSE_TITLE_KEYS: [&str; 3] = ["title", "name", "course"];
const PROVIDER_KEYS: [&str; 5] = ["provider", "platform", "source", "offered_by", "offeredBy"];
const FREE_KEYS: [&str; 3] = ["is_free", "isFree", "free"];
const CERTIFICATE_KEYS: [&str; 4] = [
    "certificate_offered",
    "certificateOffered",
    "certificate",
    "certification",
];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d %B %Y", "%B %d, %Y"];

pub fn normalize(raw: &str, kind: QueryKind) -> Result<QueryResult, NormalizationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(NormalizationError::EmptyResult);
    }

    match kind {
        QueryKind::Scholarship => normalize_listing(raw, kind),
        QueryKind::Course => normalize_listing(raw, kind),
        QueryKind::Advice => normalize_advice(raw),
    }
}

fn normalize_listing(raw: &str, kind: QueryKind) -> Result<QueryResult, NormalizationError> {
    let Some((value, origin)) = extract_json(raw) else {
        return Ok(QueryResult::AdviceText(raw.to_string()));
    };

    let listing = locate_items(&value, kind).map(|items| match kind {
        QueryKind::Scholarship => {
            QueryResult::ScholarshipList(items.iter().filter_map(scholarship_entry).collect())
        }
        _ => QueryResult::CourseList(items.iter().filter_map(course_entry).collect()),
    });

    match (listing, origin) {
        (Ok(result), _) if !result.is_empty() => Ok(result),
        // A bracketed fragment inside prose (a citation like `[1]`) is not a listing.
        (_, JsonOrigin::Embedded) => Ok(QueryResult::AdviceText(raw.to_string())),
        (Ok(_), _) => Err(NormalizationError::EmptyResult),
        (Err(err), _) => Err(err),
    }
}

fn normalize_advice(raw: &str) -> Result<QueryResult, NormalizationError> {
    let text = match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(text)) => text,
        Ok(Value::Object(object)) => ADVICE_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))
            .unwrap_or(raw)
            .to_string(),
        _ => raw.to_string(),
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(NormalizationError::EmptyResult);
    }
    Ok(QueryResult::AdviceText(text.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsonOrigin {
    Whole,
    Fenced,
    Embedded,
}

/// Finds the first JSON array or object in `text` and where it came from.
fn extract_json(text: &str) -> Option<(Value, JsonOrigin)> {
    if let Some(value) = parse_container(text) {
        return Some((value, JsonOrigin::Whole));
    }

    if let Some(fenced) = fenced_block(text) {
        if let Some(value) = parse_container(fenced) {
            return Some((value, JsonOrigin::Fenced));
        }
    }

    let mut candidates = Vec::new();
    for (open, close) in [('[', ']'), ('{', '}')] {
        if let (Some(start), Some(end)) = (text.find(open), text.rfind(close)) {
            if start < end {
                candidates.push((start, &text[start..=end]));
            }
        }
    }
    candidates.sort_by_key(|(start, _)| *start);
    candidates
        .into_iter()
        .find_map(|(_, slice)| parse_container(slice))
        .map(|value| (value, JsonOrigin::Embedded))
}

fn parse_container(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value @ (Value::Array(_) | Value::Object(_))) => Some(value),
        _ => None,
    }
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")? + 3;
    let rest = &text[start..];
    let body_start = rest.find('\n').map(|idx| idx + 1).unwrap_or(0);
    let body = &rest[body_start..];
    let end = body.find("```")?;
    Some(&body[..end])
}

fn locate_items(value: &Value, kind: QueryKind) -> Result<Vec<Value>, NormalizationError> {
    let keys: &[&str] = match kind {
        QueryKind::Scholarship => &SCHOLARSHIP_LIST_KEYS,
        _ => &COURSE_LIST_KEYS,
    };

    match value {
        Value::Array(items) => Ok(items.clone()),
        Value::Object(object) => {
            if let Some(items) = keys
                .iter()
                .find_map(|key| object.get(*key).and_then(Value::as_array))
            {
                return Ok(items.clone());
            }
            let title_keys: &[&str] = match kind {
                QueryKind::Scholarship => &TITLE_KEYS,
                _ => &COURSE_TITLE_KEYS,
            };
            if object.keys().any(|key| title_keys.contains(&key.as_str())) {
                return Ok(vec![value.clone()]);
            }
            Err(NormalizationError::Malformed(format!(
                "no {kind} list in backend payload"
            )))
        }
        _ => Err(NormalizationError::Malformed(format!(
            "unexpected {kind} payload shape"
        ))),
    }
}

fn scholarship_entry(item: &Value) -> Option<ScholarshipEntry> {
    match item {
        Value::String(title) => non_blank(title).map(|title| ScholarshipEntry {
            title,
            eligibility_summary: String::new(),
            amount: None,
            deadline: None,
        }),
        Value::Object(object) => Some(ScholarshipEntry {
            title: first_string(object, &TITLE_KEYS)?,
            eligibility_summary: first_string(object, &ELIGIBILITY_KEYS).unwrap_or_default(),
            amount: first_value(object, &AMOUNT_KEYS).and_then(parse_amount),
            deadline: first_string(object, &DEADLINE_KEYS).and_then(|raw| parse_date(&raw)),
        }),
        _ => None,
    }
}

fn course_entry(item: &Value) -> Option<CourseEntry> {
    match item {
        Value::String(title) => non_blank(title).map(|title| CourseEntry {
            title,
            provider: String::new(),
            is_free: false,
            certificate_offered: false,
        }),
        Value::Object(object) => Some(CourseEntry {
            title: first_string(object, &COURSE_TITLE_KEYS)?,
            provider: first_string(object, &PROVIDER_KEYS).unwrap_or_default(),
            is_free: first_value(object, &FREE_KEYS)
                .and_then(parse_flag)
                .or_else(|| object.get("price").and_then(price_is_free))
                .unwrap_or(false),
            certificate_offered: first_value(object, &CERTIFICATE_KEYS)
                .and_then(parse_flag)
                .unwrap_or(false),
        }),
        _ => None,
    }
}

fn first_value<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| object.get(*key).filter(|value| !value.is_null()))
}

fn first_string(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::String(value) => non_blank(value),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    })
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Reads `50000`, `"₹50,000"` or `"Up to 1,20,000 per year"`.
fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let run: String = text
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(|c| c.is_ascii_digit() || matches!(c, ',' | '.'))
                .filter(|c| *c != ',')
                .collect();
            run.trim_end_matches('.').parse::<f64>().ok()
        }
        _ => None,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // RFC 3339 timestamps: keep the date.
    let date_part = match raw.split_once('T') {
        Some((date, _)) if date.len() == 10 => Some(date),
        _ => None,
    };
    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(raw, format)
            .ok()
            .or_else(|| date_part.and_then(|part| NaiveDate::parse_from_str(part, format).ok()))
    })
}

fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_f64().map(|n| n != 0.0),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "free" | "1" => Some(true),
            "false" | "no" | "n" | "paid" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn price_is_free(value: &Value) -> Option<bool> {
    match value {
        Value::Number(number) => number.as_f64().map(|n| n == 0.0),
        Value::String(text) => {
            let text = text.trim().to_ascii_lowercase();
            if text == "free" {
                Some(true)
            } else {
                parse_amount(value).map(|n| n == 0.0)
            }
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/normalizer_tests.rs"]
mod tests;
