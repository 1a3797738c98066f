//! Self-assessment of selected skills.
//!
//! Scores come from an injected [`SkillScorer`]; the app uses
//! [`RandomScorer`] until a real assessment exists.

use std::{collections::HashSet, ops::RangeInclusive};

use rand::Rng;
use serde::Serialize;
use thiserror::Error;

pub const MAX_SCORE: u8 = 100;
pub const DEFAULT_SCORE_RANGE: RangeInclusive<u8> = 60..=95;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssessmentError {
    #[error("select at least one skill to assess")]
    NoSkillsSelected,
}

pub trait SkillScorer: Send + Sync {
    fn score(&self, skill: &str) -> u8;
}

impl<F> SkillScorer for F
where
    F: Fn(&str) -> u8 + Send + Sync,
{
    fn score(&self, skill: &str) -> u8 {
        self(skill)
    }
}

#[derive(Debug, Clone)]
pub struct RandomScorer {
    range: RangeInclusive<u8>,
}

impl RandomScorer {
    pub fn new(range: RangeInclusive<u8>) -> Self {
        Self { range }
    }
}

impl Default for RandomScorer {
    fn default() -> Self {
        Self::new(DEFAULT_SCORE_RANGE)
    }
}

impl SkillScorer for RandomScorer {
    fn score(&self, _skill: &str) -> u8 {
        if self.range.is_empty() {
            return *self.range.start();
        }
        rand::thread_rng().gen_range(self.range.clone())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedScorer(pub u8);

impl SkillScorer for FixedScorer {
    fn score(&self, _skill: &str) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillScore {
    pub skill: String,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentReport {
    pub scores: Vec<SkillScore>,
    pub average: f64,
    /// Lowest-scoring skills, in selection order.
    pub focus_areas: Vec<String>,
}

pub fn assess<S>(skills: &[S], scorer: &dyn SkillScorer) -> Result<AssessmentReport, AssessmentError>
where
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let scores: Vec<SkillScore> = skills
        .iter()
        .map(|skill| skill.as_ref().trim())
        .filter(|skill| !skill.is_empty() && seen.insert(skill.to_lowercase()))
        .map(|skill| SkillScore {
            skill: skill.to_string(),
            score: scorer.score(skill).min(MAX_SCORE),
        })
        .collect();

    let Some(lowest) = scores.iter().map(|entry| entry.score).min() else {
        return Err(AssessmentError::NoSkillsSelected);
    };

    let total: u32 = scores.iter().map(|entry| u32::from(entry.score)).sum();
    let average = f64::from(total) / scores.len() as f64;
    let focus_areas = scores
        .iter()
        .filter(|entry| entry.score == lowest)
        .map(|entry| entry.skill.clone())
        .collect();

    Ok(AssessmentReport {
        scores,
        average,
        focus_areas,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_is_rejected() {
        let none: [&str; 0] = [];
        assert_eq!(
            assess(&none, &FixedScorer(80)),
            Err(AssessmentError::NoSkillsSelected)
        );
        assert_eq!(
            assess(&["  ", ""], &FixedScorer(80)),
            Err(AssessmentError::NoSkillsSelected)
        );
    }

    #[test]
    fn report_uses_injected_scores() {
        let scorer = |skill: &str| -> u8 {
            match skill {
                "Communication Skills" => 90,
                "Problem Solving" => 70,
                "Financial Literacy" => 70,
                _ => 80,
            }
        };
        let report = assess(
            &[
                "Communication Skills",
                " Problem Solving ",
                "Creative Thinking",
                "Financial Literacy",
                "problem solving",
            ],
            &scorer,
        )
        .expect("report");

        let skills: Vec<_> = report.scores.iter().map(|s| s.skill.as_str()).collect();
        assert_eq!(
            skills,
            [
                "Communication Skills",
                "Problem Solving",
                "Creative Thinking",
                "Financial Literacy"
            ]
        );
        assert_eq!(report.average, 77.5);
        assert_eq!(report.focus_areas, ["Problem Solving", "Financial Literacy"]);
    }

    #[test]
    fn scores_are_clamped() {
        let report = assess(&["Leadership"], &FixedScorer(250)).expect("report");
        assert_eq!(report.scores[0].score, MAX_SCORE);
    }

    #[test]
    fn random_scores_stay_in_range() {
        let scorer = RandomScorer::default();
        for _ in 0..200 {
            assert!(DEFAULT_SCORE_RANGE.contains(&scorer.score("Creative Thinking")));
        }
        assert_eq!(RandomScorer::new(70..=70).score("x"), 70);
    }
}
