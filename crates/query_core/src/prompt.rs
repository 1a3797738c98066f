use std::fmt::Write as _;

use shared::domain::{QueryCriteria, QueryKind};

const MAX_LISTING_ITEMS: usize = 5;

pub fn build_prompt(criteria: &QueryCriteria, kind: QueryKind) -> String {
    let mut prompt = String::new();
    match kind {
        QueryKind::Scholarship => {
            let _ = writeln!(
                prompt,
                "Find up to {MAX_LISTING_ITEMS} scholarships in India that this student is eligible for."
            );
        }
        QueryKind::Course => {
            let _ = writeln!(
                prompt,
                "Recommend up to {MAX_LISTING_ITEMS} online courses, preferring free courses that offer a certificate."
            );
        }
        QueryKind::Advice => {
            let _ = writeln!(
                prompt,
                "Give short, practical career guidance for this person: suitable career paths, skills to learn, and next steps."
            );
        }
    }

    prompt.push_str("\nProfile:\n");
    append_field(&mut prompt, "Education", &criteria.education_level);
    if criteria.annual_income > 0 {
        let _ = writeln!(prompt, "- Annual family income (INR): {}", criteria.annual_income);
    }
    append_field(&mut prompt, "Category", &criteria.category);
    if let Some(region) = &criteria.region {
        append_field(&mut prompt, "State", region);
    }
    if let Some(interest) = &criteria.free_text_interest {
        append_field(&mut prompt, "Interests", interest);
    }

    prompt.push('\n');
    prompt.push_str(response_format(kind));
    prompt
}

fn append_field(prompt: &mut String, label: &str, value: &str) {
    if !value.is_empty() {
        let _ = writeln!(prompt, "- {label}: {value}");
    }
}

fn response_format(kind: QueryKind) -> &'static str {
    match kind {
        QueryKind::Scholarship => {
            "Respond with a JSON array only. Each element must have the keys \
             \"title\", \"eligibility_summary\", \"amount\" (number in INR or null) and \
             \"deadline\" (YYYY-MM-DD or null)."
        }
        QueryKind::Course => {
            "Respond with a JSON array only. Each element must have the keys \
             \"title\", \"provider\", \"is_free\" (boolean) and \"certificate_offered\" (boolean)."
        }
        QueryKind::Advice => "Respond in plain text with short bullet points.",
    }
}
