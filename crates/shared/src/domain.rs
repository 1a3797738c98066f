use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(RequestHandle);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Scholarship,
    Course,
    Advice,
}

impl QueryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryKind::Scholarship => "scholarship",
            QueryKind::Course => "course",
            QueryKind::Advice => "advice",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Criteria exactly as typed into the form; nothing is trimmed or parsed yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCriteria {
    #[serde(default)]
    pub education_level: Option<String>,
    #[serde(default)]
    pub annual_income: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub free_text_interest: Option<String>,
}

impl RawCriteria {
    pub fn with_education(mut self, value: impl Into<String>) -> Self {
        self.education_level = Some(value.into());
        self
    }

    pub fn with_income(mut self, value: impl Into<String>) -> Self {
        self.annual_income = Some(value.into());
        self
    }

    pub fn with_category(mut self, value: impl Into<String>) -> Self {
        self.category = Some(value.into());
        self
    }

    pub fn with_region(mut self, value: impl Into<String>) -> Self {
        self.region = Some(value.into());
        self
    }

    pub fn with_interest(mut self, value: impl Into<String>) -> Self {
        self.free_text_interest = Some(value.into());
        self
    }
}

/// Validated criteria. At least one of `education_level` and
/// `free_text_interest` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCriteria {
    pub education_level: String,
    pub annual_income: u64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_text_interest: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarshipEntry {
    pub title: String,
    pub eligibility_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEntry {
    pub title: String,
    pub provider: String,
    pub is_free: bool,
    pub certificate_offered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum QueryResult {
    ScholarshipList(Vec<ScholarshipEntry>),
    CourseList(Vec<CourseEntry>),
    AdviceText(String),
}

impl QueryResult {
    pub fn len(&self) -> usize {
        match self {
            QueryResult::ScholarshipList(items) => items.len(),
            QueryResult::CourseList(items) => items.len(),
            QueryResult::AdviceText(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            QueryResult::ScholarshipList(items) => items.is_empty(),
            QueryResult::CourseList(items) => items.is_empty(),
            QueryResult::AdviceText(text) => text.trim().is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading(RequestHandle),
    Succeeded(RequestHandle, QueryResult),
    Failed(RequestHandle, ErrorKind),
}

impl RequestState {
    pub fn handle(&self) -> Option<RequestHandle> {
        match self {
            RequestState::Idle => None,
            RequestState::Loading(handle)
            | RequestState::Succeeded(handle, _)
            | RequestState::Failed(handle, _) => Some(*handle),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading(_))
    }

    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            RequestState::Succeeded(..) | RequestState::Failed(..)
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::Loading(_) => "loading",
            RequestState::Succeeded(..) => "succeeded",
            RequestState::Failed(..) => "failed",
        }
    }
}
