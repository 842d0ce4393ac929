use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grade::Scale;

const DEFAULT_DATA_URL: &str = "data.json";

/// What to do when a learner lacks a subject some other learner has.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MissingSubject {
    /// Score the cell 0 and carry on.
    ZeroFill,
    Reject,
}

/// What to do with a grade the chosen scale cannot score.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum UnrecognizedGrade {
    /// Score the cell 0 and report a diagnostic.
    ScoreZero,
    Reject,
}

/// Class-wide maximum total. Always finite and positive.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(try_from = "f64", into = "f64")]
pub struct MaxTotal(f64);

impl MaxTotal {
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if value.is_finite() && value > 0.0 {
            Ok(MaxTotal(value))
        } else {
            Err(ConfigError::InvalidMaxTotal(value.to_string()))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl std::convert::TryFrom<f64> for MaxTotal {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        MaxTotal::new(value)
    }
}

impl From<MaxTotal> for f64 {
    fn from(max: MaxTotal) -> f64 {
        max.0
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub data_url: String,
    pub scale: Scale,
    /// Fixed maximum total; derived from the class's subjects when unset.
    pub max_total: Option<MaxTotal>,
    pub missing_subject: MissingSubject,
    pub unrecognized_grade: UnrecognizedGrade,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            data_url: DEFAULT_DATA_URL.into(),
            scale: Scale::default(),
            max_total: None,
            missing_subject: MissingSubject::ZeroFill,
            unrecognized_grade: UnrecognizedGrade::ScoreZero,
        }
    }
}

impl ReportConfig {
    /// Applies `key=value` overrides, as found in the page's query string.
    /// Unknown keys are ignored.
    pub fn with_overrides<I, K, V>(mut self, pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "data" if !value.is_empty() => self.data_url = value.to_string(),
                "scale" => {
                    self.scale = value
                        .parse()
                        .map_err(|_| ConfigError::UnknownScale(value.to_string()))?
                }
                "max" => {
                    let max = value
                        .parse::<f64>()
                        .map_err(|_| ConfigError::InvalidMaxTotal(value.to_string()))?;
                    self.max_total = Some(MaxTotal::new(max)?);
                }
                "missing" => {
                    self.missing_subject = match value {
                        "zero" => MissingSubject::ZeroFill,
                        "reject" => MissingSubject::Reject,
                        _ => return Err(unknown_policy("missing", value)),
                    }
                }
                "unrecognized" => {
                    self.unrecognized_grade = match value {
                        "zero" => UnrecognizedGrade::ScoreZero,
                        "reject" => UnrecognizedGrade::Reject,
                        _ => return Err(unknown_policy("unrecognized", value)),
                    }
                }
                _ => (),
            }
        }

        Ok(self)
    }
}

fn unknown_policy(key: &str, value: &str) -> ConfigError {
    ConfigError::UnknownPolicy {
        key: key.into(),
        value: value.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.data_url, "data.json");
        assert_eq!(config.scale, Scale::EightPoint);
        assert_eq!(config.max_total, None);
        assert_eq!(config.missing_subject, MissingSubject::ZeroFill);
        assert_eq!(config.unrecognized_grade, UnrecognizedGrade::ScoreZero);
    }

    #[test]
    fn overrides_from_query_pairs() {
        let config = ReportConfig::default()
            .with_overrides(vec![
                ("scale", "5"),
                ("max", "25"),
                ("missing", "reject"),
                ("unrecognized", "reject"),
                ("data", "class-7.json"),
                ("utm_source", "ignored"),
            ])
            .unwrap();

        assert_eq!(config.scale, Scale::FivePoint);
        assert_eq!(config.max_total.map(MaxTotal::get), Some(25.0));
        assert_eq!(config.missing_subject, MissingSubject::Reject);
        assert_eq!(config.unrecognized_grade, UnrecognizedGrade::Reject);
        assert_eq!(config.data_url, "class-7.json");
    }

    #[test]
    fn bad_overrides_are_errors() {
        let base = ReportConfig::default();
        assert_eq!(
            base.clone().with_overrides(vec![("scale", "7")]).unwrap_err(),
            ConfigError::UnknownScale("7".into())
        );
        assert_eq!(
            base.clone().with_overrides(vec![("max", "0")]).unwrap_err(),
            ConfigError::InvalidMaxTotal("0".into())
        );
        assert_eq!(
            base.clone().with_overrides(vec![("max", "lots")]).unwrap_err(),
            ConfigError::InvalidMaxTotal("lots".into())
        );
        assert!(matches!(
            base.with_overrides(vec![("missing", "maybe")]),
            Err(ConfigError::UnknownPolicy { .. })
        ));
    }

    #[test]
    fn max_total_must_be_positive_and_finite() {
        assert!(MaxTotal::new(16.0).is_ok());
        assert!(MaxTotal::new(0.0).is_err());
        assert!(MaxTotal::new(-3.0).is_err());
        assert!(MaxTotal::new(f64::NAN).is_err());
        assert!(MaxTotal::new(f64::INFINITY).is_err());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ReportConfig =
            serde_json::from_str(r#"{ "scale": "five-point", "max_total": 20 }"#).unwrap();
        assert_eq!(config.scale, Scale::FivePoint);
        assert_eq!(config.max_total, Some(MaxTotal(20.0)));
        assert_eq!(config.data_url, "data.json");

        assert!(serde_json::from_str::<ReportConfig>(r#"{ "max_total": -1 }"#).is_err());
    }
}
