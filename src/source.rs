//! Adapters from the data file formats to a canonical [`Roster`].
//!
//! Two layouts exist in the wild:
//!
//! * a document with a `detailed_performance` array of
//!   `{ "learner": .., "subjects": { .. } }` records (and an ignored
//!   `performance_summary`), and
//! * a flat array of `{ "Learner": .., <subject>: <grade>, .. }` rows, where
//!   every key besides `Learner` is a subject.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::LoadError;
use crate::grade::GradeValue;
use crate::roster::{Learner, Roster};

#[derive(Deserialize)]
struct DetailedDocument {
    detailed_performance: Vec<Learner>,
}

#[derive(Deserialize)]
struct FlatRow {
    #[serde(rename = "Learner")]
    learner: String,
    #[serde(flatten)]
    subjects: IndexMap<String, GradeValue>,
}

impl From<FlatRow> for Learner {
    fn from(row: FlatRow) -> Self {
        Learner {
            name: row.learner,
            subjects: row.subjects,
        }
    }
}

pub fn parse_roster(text: &str) -> Result<Roster, LoadError> {
    let learners = match text.trim_start().chars().next() {
        Some('{') => serde_json::from_str::<DetailedDocument>(text)?.detailed_performance,
        Some('[') => serde_json::from_str::<Vec<FlatRow>>(text)?
            .into_iter()
            .map(Learner::from)
            .collect(),
        _ => return Err(LoadError::UnsupportedShape),
    };

    Roster::new(learners)
}
