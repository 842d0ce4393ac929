use serde::Serialize;

use crate::config::{MaxTotal, ReportConfig, UnrecognizedGrade};
use crate::error::{Result, ScoringError};
use crate::grade::{score_of, Scale};
use crate::roster::{Learner, LearnerId, Roster};
use crate::scoring::{self, BandRow, ClassTable, Diagnostic, Tally};

/// Export title used when no learner is selected.
pub const FALLBACK_TITLE: &str = "Report";

/// Everything the page shows, computed once per load.
#[derive(Debug, Clone)]
pub struct Dashboard {
    roster: Roster,
    scale: Scale,
    max_total: MaxTotal,
    selected: Option<LearnerId>,
    pub class_table: ClassTable,
    pub tally: Tally,
    pub bands: Vec<BandRow>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Per-learner data handed to the chart and summary renderers.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LearnerReport {
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub lines: Vec<SummaryLine>,
    pub total: f64,
    pub max_total: f64,
    pub percentage: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SummaryLine {
    pub subject: String,
    pub grade: String,
    pub score: f64,
}

impl Dashboard {
    pub fn build(roster: Roster, config: &ReportConfig) -> Result<Dashboard> {
        if roster.is_empty() {
            return Err(ScoringError::EmptyRoster.into());
        }

        let scale = config.scale;
        let diagnostics = scoring::unrecognized_grades(&roster, scale);
        if config.unrecognized_grade == UnrecognizedGrade::Reject {
            if let Some(first) = diagnostics.first() {
                return Err(ScoringError::UnrecognizedGrade {
                    learner: first.learner.clone(),
                    subject: first.subject.clone(),
                    value: first.value.clone(),
                }
                .into());
            }
        }

        let class_table = scoring::class_table(&roster, scale, config.missing_subject)?;
        if class_table.rows.is_empty() {
            return Err(ScoringError::NoSubjects.into());
        }
        let tally = scoring::tally(&roster, scale, config.missing_subject)?;
        let bands = scoring::band_summary(&roster, scale);

        // Resolved once for the whole class, never per learner.
        let max_total = match config.max_total {
            Some(max) => max,
            None => MaxTotal::new(class_table.rows.len() as f64 * scale.max_score())?,
        };

        let selected = roster.learners().first().map(|l| l.name.clone());

        Ok(Dashboard {
            roster,
            scale,
            max_total,
            selected,
            class_table,
            tally,
            bands,
            diagnostics,
        })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn max_total(&self) -> MaxTotal {
        self.max_total
    }

    pub fn select(&mut self, id: &str) -> Result<(), ScoringError> {
        if self.roster.get(id).is_none() {
            return Err(ScoringError::UnknownLearner(id.to_string()));
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Learner> {
        self.selected.as_deref().and_then(|id| self.roster.get(id))
    }

    pub fn selected_report(&self) -> Option<LearnerReport> {
        self.selected().map(|learner| self.learner_report(learner))
    }

    pub fn learner_report(&self, learner: &Learner) -> LearnerReport {
        let lines: Vec<SummaryLine> = learner
            .subjects
            .iter()
            .map(|(subject, value)| SummaryLine {
                subject: subject.clone(),
                grade: value.to_string(),
                score: score_of(value, self.scale),
            })
            .collect();

        LearnerReport {
            name: learner.name.clone(),
            labels: lines.iter().map(|line| line.subject.clone()).collect(),
            values: lines.iter().map(|line| line.score).collect(),
            total: scoring::total_for(learner, self.scale),
            max_total: self.max_total.get(),
            percentage: scoring::percentage_for(learner, self.scale, self.max_total),
            lines,
        }
    }

    pub fn export_title(&self) -> String {
        self.selected()
            .map_or_else(|| FALLBACK_TITLE.to_string(), |learner| learner.name.clone())
    }

    pub fn export_file_name(&self) -> String {
        export_file_name(&self.export_title())
    }
}

pub fn export_file_name(title: &str) -> String {
    format!("{}_CBC_Report.pdf", title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MissingSubject;
    use crate::error::Error;

    fn roster() -> Roster {
        Roster::new(vec![
            Learner::new("Wanjiru").with("Math", "EE1").with("English", "ME2"),
            Learner::new("Otieno").with("Math", "AE1").with("English", "QQ"),
        ])
        .unwrap()
    }

    #[test]
    fn selects_first_learner_and_derives_max_once() {
        let dashboard = Dashboard::build(roster(), &ReportConfig::default()).unwrap();

        assert_eq!(dashboard.selected().map(Learner::id), Some("Wanjiru"));
        assert_eq!(dashboard.max_total().get(), 16.0);
        assert_eq!(dashboard.diagnostics.len(), 1);
        assert_eq!(dashboard.class_table.totals, vec![13.0, 4.0]);
    }

    #[test]
    fn learner_report_for_collaborators() {
        let dashboard = Dashboard::build(roster(), &ReportConfig::default()).unwrap();
        let report = dashboard.selected_report().unwrap();

        assert_eq!(report.labels, vec!["Math", "English"]);
        assert_eq!(report.values, vec![8.0, 5.0]);
        assert_eq!(
            report.lines[1],
            SummaryLine {
                subject: "English".into(),
                grade: "ME2".into(),
                score: 5.0
            }
        );
        assert_eq!(report.total, 13.0);
        assert_eq!(report.max_total, 16.0);
        assert_eq!(report.percentage, 81.3);
    }

    #[test]
    fn selection_is_by_name() {
        let mut dashboard = Dashboard::build(roster(), &ReportConfig::default()).unwrap();

        dashboard.select("Otieno").unwrap();
        assert_eq!(dashboard.export_title(), "Otieno");
        assert_eq!(dashboard.export_file_name(), "Otieno_CBC_Report.pdf");

        assert_eq!(
            dashboard.select("Nobody").unwrap_err(),
            ScoringError::UnknownLearner("Nobody".into())
        );
        assert_eq!(dashboard.export_title(), "Otieno");

        dashboard.clear_selection();
        assert!(dashboard.selected_report().is_none());
        assert_eq!(dashboard.export_title(), FALLBACK_TITLE);
        assert_eq!(dashboard.export_file_name(), "Report_CBC_Report.pdf");
    }

    #[test]
    fn explicit_max_total_wins() {
        let config = ReportConfig {
            max_total: Some(MaxTotal::new(20.0).unwrap()),
            ..ReportConfig::default()
        };
        let dashboard = Dashboard::build(roster(), &config).unwrap();
        assert_eq!(dashboard.selected_report().unwrap().percentage, 65.0);
    }

    #[test]
    fn empty_roster_fails_explicitly() {
        let result = Dashboard::build(Roster::default(), &ReportConfig::default());
        assert!(matches!(
            result,
            Err(Error::Scoring(ScoringError::EmptyRoster))
        ));
    }

    #[test]
    fn roster_without_subjects_is_no_data() {
        let roster = Roster::new(vec![Learner::new("A"), Learner::new("B")]).unwrap();
        let result = Dashboard::build(roster, &ReportConfig::default());
        assert!(matches!(
            result,
            Err(Error::Scoring(ScoringError::NoSubjects))
        ));
    }

    #[test]
    fn reject_policies_fail_the_build() {
        let config = ReportConfig {
            unrecognized_grade: UnrecognizedGrade::Reject,
            ..ReportConfig::default()
        };
        let result = Dashboard::build(roster(), &config);
        assert!(matches!(
            result,
            Err(Error::Scoring(ScoringError::UnrecognizedGrade { ref value, .. })) if value == "QQ"
        ));

        let ragged = Roster::new(vec![
            Learner::new("A").with("Math", "EE1"),
            Learner::new("B").with("Art", "EE1"),
        ])
        .unwrap();
        let config = ReportConfig {
            missing_subject: MissingSubject::Reject,
            ..ReportConfig::default()
        };
        assert!(matches!(
            Dashboard::build(ragged, &config),
            Err(Error::Scoring(ScoringError::MissingSubject { .. }))
        ));
    }
}
