//! Recommendation backend answered from a small built-in catalog.
//!
//! Payloads are produced in the same JSON shapes a remote backend is asked
//! for, so results still go through the normalizer.

use async_trait::async_trait;
use serde_json::json;
use shared::{
    domain::{QueryCriteria, QueryKind},
    error::ClientError,
};

use crate::RecommendationClient;

struct CatalogScholarship {
    title: &'static str,
    eligibility: &'static str,
    amount: u32,
    deadline: &'static str,
    income_ceiling: Option<u64>,
}

struct CatalogCourse {
    title: &'static str,
    provider: &'static str,
    certificate: bool,
    keywords: &'static [&'static str],
}

const SCHOLARSHIPS: &[CatalogScholarship] = &[
    CatalogScholarship {
        title: "National Scholarship Portal",
        eligibility: "Central and state schemes for enrolled students",
        amount: 30_000,
        deadline: "2025-11-30",
        income_ceiling: None,
    },
    CatalogScholarship {
        title: "State Scholarship Scheme",
        eligibility: "Domicile of the state with family income below 2.5 lakh",
        amount: 30_000,
        deadline: "2025-12-15",
        income_ceiling: Some(250_000),
    },
    CatalogScholarship {
        title: "Merit-cum-Means Scholarship",
        eligibility: "Professional and technical courses, family income below 2.5 lakh",
        amount: 50_000,
        deadline: "2025-12-31",
        income_ceiling: Some(250_000),
    },
];

const COURSES: &[CatalogCourse] = &[
    CatalogCourse {
        title: "SWAYAM courses",
        provider: "Government of India",
        certificate: true,
        keywords: &["government", "general", "all"],
    },
    CatalogCourse {
        title: "NPTEL engineering and science lectures",
        provider: "IIT/IISc",
        certificate: true,
        keywords: &["engineering", "science", "tech", "b.tech"],
    },
    CatalogCourse {
        title: "Digital Marketing Fundamentals",
        provider: "Google Digital Garage",
        certificate: true,
        keywords: &["marketing", "business", "communication"],
    },
    CatalogCourse {
        title: "Technology learning paths",
        provider: "Microsoft Learn",
        certificate: true,
        keywords: &["tech", "coding", "computer", "cloud", "ai"],
    },
    CatalogCourse {
        title: "Coursera for Women",
        provider: "Coursera",
        certificate: true,
        keywords: &["data", "python", "business", "health"],
    },
    CatalogCourse {
        title: "Udemy free courses",
        provider: "Udemy",
        certificate: false,
        keywords: &["design", "creative", "finance"],
    },
];

const TECH_CAREERS: &[&str] = &[
    "Software Developer",
    "Data Analyst",
    "Digital Marketing Specialist",
    "UI/UX Designer",
    "Cybersecurity Analyst",
];
const TEACHING_CAREERS: &[&str] = &[
    "School Teacher",
    "Online Tutor",
    "Educational Content Creator",
    "Career Counselor",
    "Training & Development Specialist",
];
const HEALTH_CAREERS: &[&str] = &[
    "Nurse",
    "Medical Technician",
    "Nutritionist",
    "Public Health Worker",
    "Healthcare Administrator",
];

#[derive(Default)]
pub struct OfflineRecommendationClient;

impl OfflineRecommendationClient {
    pub fn new() -> Self {
        Self
    }

    fn scholarships(criteria: &QueryCriteria) -> String {
        let income = criteria.annual_income;
        let items: Vec<_> = SCHOLARSHIPS
            .iter()
            .filter(|item| item.income_ceiling.map_or(true, |ceiling| income <= ceiling))
            .map(|item| {
                json!({
                    "title": item.title,
                    "eligibility_summary": item.eligibility,
                    "amount": item.amount,
                    "deadline": item.deadline,
                })
            })
            .collect();
        serde_json::Value::Array(items).to_string()
    }

    fn courses(criteria: &QueryCriteria) -> String {
        let haystack = search_text(criteria);
        let matching: Vec<_> = COURSES
            .iter()
            .filter(|course| course.keywords.iter().any(|kw| haystack.contains(kw)))
            .collect();
        let selected = if matching.is_empty() {
            COURSES.iter().collect()
        } else {
            matching
        };

        let items: Vec<_> = selected
            .into_iter()
            .map(|course| {
                json!({
                    "title": course.title,
                    "provider": course.provider,
                    "is_free": true,
                    "certificate_offered": course.certificate,
                })
            })
            .collect();
        serde_json::Value::Array(items).to_string()
    }

    fn advice(criteria: &QueryCriteria) -> String {
        let haystack = search_text(criteria);
        let careers = if haystack.contains("tech") {
            Some(TECH_CAREERS)
        } else if haystack.contains("teach") {
            Some(TEACHING_CAREERS)
        } else if haystack.contains("health") {
            Some(HEALTH_CAREERS)
        } else {
            None
        };

        let mut text = String::from("Career paths:\n");
        match careers {
            Some(careers) => {
                for career in careers {
                    text.push_str("• ");
                    text.push_str(career);
                    text.push('\n');
                }
            }
            None => {
                text.push_str("• Several career options fit your interests\n");
                text.push_str("• Take the skill assessment for personalized suggestions\n");
                text.push_str("• Connect with a mentor for guidance\n");
            }
        }
        text.push_str(
            "\nNext steps:\n1. Take a skill assessment\n2. Complete relevant courses\n\
             3. Build a portfolio or resume\n4. Network with professionals\n\
             5. Apply for internships or jobs",
        );
        text
    }
}

fn search_text(criteria: &QueryCriteria) -> String {
    let mut text = criteria.education_level.to_lowercase();
    if let Some(interest) = &criteria.free_text_interest {
        text.push(' ');
        text.push_str(&interest.to_lowercase());
    }
    text
}

#[async_trait]
impl RecommendationClient for OfflineRecommendationClient {
    async fn query(
        &self,
        criteria: &QueryCriteria,
        kind: QueryKind,
    ) -> Result<String, ClientError> {
        Ok(match kind {
            QueryKind::Scholarship => Self::scholarships(criteria),
            QueryKind::Course => Self::courses(criteria),
            QueryKind::Advice => Self::advice(criteria),
        })
    }
}
