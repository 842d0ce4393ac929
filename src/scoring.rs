use apply::Apply;
use serde::Serialize;

use crate::config::{MaxTotal, MissingSubject};
use crate::error::ScoringError;
use crate::grade::{score_of, Band, GradeCode, GradeValue, Scale};
use crate::roster::{Learner, Roster};
use crate::util;

pub fn total_for(learner: &Learner, scale: Scale) -> f64 {
    learner
        .subjects
        .values()
        .map(|value| score_of(value, scale))
        .sum()
}

/// Total as a percentage of `max_total`, rounded to one decimal place.
pub fn percentage_for(learner: &Learner, scale: Scale, max_total: MaxTotal) -> f64 {
    (total_for(learner, scale) / max_total.get() * 100.0).apply(util::round_to_tenth)
}

// ------ Class table ------

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ClassTable {
    /// Column headers, in roster order.
    pub learners: Vec<String>,
    pub rows: Vec<ClassRow>,
    /// Column sums; equal to `total_for` of each learner.
    pub totals: Vec<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ClassRow {
    pub subject: String,
    pub cells: Vec<ClassCell>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct ClassCell {
    pub score: f64,
    /// The learner had no grade for this subject; the score is a zero fill.
    pub missing: bool,
}

pub fn class_table(
    roster: &Roster,
    scale: Scale,
    policy: MissingSubject,
) -> Result<ClassTable, ScoringError> {
    let subjects = reference_subjects(roster, policy)?;

    let rows = subjects
        .iter()
        .map(|subject| ClassRow {
            subject: subject.to_string(),
            cells: roster
                .learners()
                .iter()
                .map(|learner| match learner.subjects.get(*subject) {
                    Some(value) => ClassCell {
                        score: score_of(value, scale),
                        missing: false,
                    },
                    None => ClassCell {
                        score: 0.0,
                        missing: true,
                    },
                })
                .collect(),
        })
        .collect();

    Ok(ClassTable {
        learners: roster.learners().iter().map(|l| l.name.clone()).collect(),
        rows,
        totals: roster
            .learners()
            .iter()
            .map(|learner| total_for(learner, scale))
            .collect(),
    })
}

// ------ Tally ------

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Tally {
    /// Column headers: every code of the scale, in fixed order.
    pub codes: Vec<GradeCode>,
    pub rows: Vec<TallyRow>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TallyRow {
    pub subject: String,
    /// One count per entry of `Tally::codes`, zeros included.
    pub counts: Vec<usize>,
    /// Learners with no countable code here: missing, unrecognized, or raw scores.
    pub ungraded: usize,
}

impl TallyRow {
    pub fn graded(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl Tally {
    pub fn count(&self, subject: &str, code: GradeCode) -> Option<usize> {
        let column = self.codes.iter().position(|c| *c == code)?;
        self.rows
            .iter()
            .find(|row| row.subject == subject)
            .map(|row| row.counts[column])
    }
}

pub fn tally(roster: &Roster, scale: Scale, policy: MissingSubject) -> Result<Tally, ScoringError> {
    let subjects = reference_subjects(roster, policy)?;
    let codes = scale.codes().to_vec();

    let rows = subjects
        .iter()
        .map(|subject| {
            let mut counts = vec![0; codes.len()];
            let mut ungraded = 0;
            for learner in roster.learners() {
                let column = learner
                    .subjects
                    .get(*subject)
                    .and_then(|value| value.code_in(scale))
                    .and_then(|code| codes.iter().position(|c| *c == code));
                match column {
                    Some(column) => counts[column] += 1,
                    None => ungraded += 1,
                }
            }
            TallyRow {
                subject: subject.to_string(),
                counts,
                ungraded,
            }
        })
        .collect();

    Ok(Tally { codes, rows })
}

// ------ Band summary ------

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BandRow {
    pub learner: String,
    /// Counts per `Band::ALL` entry.
    pub counts: [usize; 4],
    /// Subjects holding raw scores or codes outside the scale.
    pub other: usize,
}

impl BandRow {
    pub fn count(&self, band: Band) -> usize {
        Band::ALL
            .iter()
            .position(|b| *b == band)
            .map_or(0, |i| self.counts[i])
    }
}

/// Per-learner count of subjects in each expectation band.
///
/// A raw number stored under a band label (`"EE": 4`) is a count supplied
/// by the data file and is added to that band as is.
pub fn band_summary(roster: &Roster, scale: Scale) -> Vec<BandRow> {
    roster
        .learners()
        .iter()
        .map(|learner| {
            let mut row = BandRow {
                learner: learner.name.clone(),
                counts: [0; 4],
                other: 0,
            };
            for (subject, value) in &learner.subjects {
                let supplied = match (Band::from_label(subject), value) {
                    (Some(band), GradeValue::Raw(n)) if n.is_finite() && *n >= 0.0 => {
                        Some((band, n.round() as usize))
                    }
                    _ => None,
                };
                let (band, count) = match supplied {
                    Some(supplied) => supplied,
                    None => match value.code_in(scale) {
                        Some(code) => (code.band(), 1),
                        None => {
                            row.other += 1;
                            continue;
                        }
                    },
                };
                if let Some(i) = Band::ALL.iter().position(|b| *b == band) {
                    row.counts[i] += count;
                }
            }
            row
        })
        .collect()
}

// ------ Diagnostics ------

/// A grade the scale could not score; it counted as 0.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub learner: String,
    pub subject: String,
    pub value: String,
}

pub fn unrecognized_grades(roster: &Roster, scale: Scale) -> Vec<Diagnostic> {
    roster
        .learners()
        .iter()
        .flat_map(|learner| {
            learner
                .subjects
                .iter()
                .filter(|(_, value)| value.is_unrecognized(scale))
                .map(move |(subject, value)| Diagnostic {
                    learner: learner.name.clone(),
                    subject: subject.clone(),
                    value: value.to_string(),
                })
        })
        .collect()
}

/// The union of subjects across the roster, after applying the missing-subject policy.
fn reference_subjects(roster: &Roster, policy: MissingSubject) -> Result<Vec<&str>, ScoringError> {
    if roster.is_empty() {
        return Err(ScoringError::EmptyRoster);
    }

    let subjects = roster.subjects();
    if policy == MissingSubject::Reject {
        for learner in roster.learners() {
            if let Some(subject) = subjects
                .iter()
                .find(|subject| !learner.subjects.contains_key(**subject))
            {
                return Err(ScoringError::MissingSubject {
                    learner: learner.name.clone(),
                    subject: subject.to_string(),
                });
            }
        }
    }

    Ok(subjects)
}
