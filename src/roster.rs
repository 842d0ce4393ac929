use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::LoadError;
use crate::grade::GradeValue;

/// Learners are keyed by name; uniqueness is checked when the roster is built.
pub type LearnerId = String;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Learner {
    #[serde(rename = "learner")]
    pub name: String,
    /// Subject name to grade, in display order.
    pub subjects: IndexMap<String, GradeValue>,
}

impl Learner {
    pub fn new(name: impl Into<String>) -> Self {
        Learner {
            name: name.into(),
            subjects: IndexMap::new(),
        }
    }

    pub fn with(mut self, subject: impl Into<String>, grade: impl Into<GradeValue>) -> Self {
        self.subjects.insert(subject.into(), grade.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.name
    }
}

/// An immutable, ordered class list. Replaced wholesale on every load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    learners: Vec<Learner>,
}

impl Roster {
    pub fn new(learners: Vec<Learner>) -> Result<Self, LoadError> {
        {
            let mut seen = HashSet::new();
            for (position, learner) in learners.iter().enumerate() {
                if learner.name.trim().is_empty() {
                    return Err(LoadError::BlankLearnerName(position));
                }
                if !seen.insert(learner.name.as_str()) {
                    return Err(LoadError::DuplicateLearner(learner.name.clone()));
                }
            }
        }

        Ok(Roster { learners })
    }

    pub fn learners(&self) -> &[Learner] {
        &self.learners
    }

    pub fn len(&self) -> usize {
        self.learners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.learners.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Learner> {
        self.learners.iter().find(|learner| learner.name == id)
    }

    /// Every subject any learner has, in first-seen order.
    pub fn subjects(&self) -> Vec<&str> {
        self.learners
            .iter()
            .flat_map(|learner| learner.subjects.keys())
            .map(String::as_str)
            .unique()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_names() {
        let err = Roster::new(vec![Learner::new("Amina"), Learner::new("Amina")]).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateLearner(name) if name == "Amina"));
    }

    #[test]
    fn rejects_blank_names() {
        let err = Roster::new(vec![Learner::new("Amina"), Learner::new("  ")]).unwrap_err();
        assert!(matches!(err, LoadError::BlankLearnerName(1)));
    }

    #[test]
    fn subjects_are_the_union_in_first_seen_order() {
        let roster = Roster::new(vec![
            Learner::new("A").with("Math", "EE1").with("English", "ME1"),
            Learner::new("B").with("Kiswahili", "AE1").with("Math", "ME2"),
            Learner::new("C").with("Science", "BE1"),
        ])
        .unwrap();

        assert_eq!(
            roster.subjects(),
            vec!["Math", "English", "Kiswahili", "Science"]
        );
    }

    #[test]
    fn lookup_by_name() {
        let roster = Roster::new(vec![Learner::new("A"), Learner::new("B")]).unwrap();
        assert_eq!(roster.get("B").map(Learner::id), Some("B"));
        assert!(roster.get("Z").is_none());
    }
}
