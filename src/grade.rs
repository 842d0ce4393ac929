use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GradeCode {
    EE1,
    EE2,
    ME1,
    ME2,
    AE1,
    AE2,
    BE1,
    BE2,
}

impl GradeCode {
    pub const ALL: [GradeCode; 8] = [
        GradeCode::EE1,
        GradeCode::EE2,
        GradeCode::ME1,
        GradeCode::ME2,
        GradeCode::AE1,
        GradeCode::AE2,
        GradeCode::BE1,
        GradeCode::BE2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GradeCode::EE1 => "EE1",
            GradeCode::EE2 => "EE2",
            GradeCode::ME1 => "ME1",
            GradeCode::ME2 => "ME2",
            GradeCode::AE1 => "AE1",
            GradeCode::AE2 => "AE2",
            GradeCode::BE1 => "BE1",
            GradeCode::BE2 => "BE2",
        }
    }

    pub fn band(self) -> Band {
        match self {
            GradeCode::EE1 | GradeCode::EE2 => Band::Exceeding,
            GradeCode::ME1 | GradeCode::ME2 => Band::Meeting,
            GradeCode::AE1 | GradeCode::AE2 => Band::Approaching,
            GradeCode::BE1 | GradeCode::BE2 => Band::Below,
        }
    }
}

impl fmt::Display for GradeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradeCode {
    type Err = ();

    /// Exact, case-sensitive match against the code labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GradeCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or(())
    }
}

/// Expectation band, i.e. the letter prefix of a code.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Exceeding,
    Meeting,
    Approaching,
    Below,
}

impl Band {
    pub const ALL: [Band; 4] = [Band::Exceeding, Band::Meeting, Band::Approaching, Band::Below];

    pub fn from_label(label: &str) -> Option<Band> {
        Band::ALL.iter().copied().find(|band| band.label() == label)
    }

    pub fn label(self) -> &'static str {
        match self {
            Band::Exceeding => "EE",
            Band::Meeting => "ME",
            Band::Approaching => "AE",
            Band::Below => "BE",
        }
    }
}

// ------ Scale ------

const FIVE_POINT_CODES: [GradeCode; 5] = [
    GradeCode::EE1,
    GradeCode::EE2,
    GradeCode::ME1,
    GradeCode::ME2,
    GradeCode::AE1,
];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Scale {
    /// EE1=8 down to BE2=1.
    EightPoint,
    /// Legacy scale: EE1..AE1 only, EE1=5 in half-point steps.
    FivePoint,
}

impl Default for Scale {
    fn default() -> Self {
        Scale::EightPoint
    }
}

impl Scale {
    /// Codes recognized by this scale, in display order.
    pub fn codes(self) -> &'static [GradeCode] {
        match self {
            Scale::EightPoint => &GradeCode::ALL,
            Scale::FivePoint => &FIVE_POINT_CODES,
        }
    }

    pub fn score(self, code: GradeCode) -> Option<f64> {
        match self {
            Scale::EightPoint => Some(match code {
                GradeCode::EE1 => 8.0,
                GradeCode::EE2 => 7.0,
                GradeCode::ME1 => 6.0,
                GradeCode::ME2 => 5.0,
                GradeCode::AE1 => 4.0,
                GradeCode::AE2 => 3.0,
                GradeCode::BE1 => 2.0,
                GradeCode::BE2 => 1.0,
            }),
            Scale::FivePoint => match code {
                GradeCode::EE1 => Some(5.0),
                GradeCode::EE2 => Some(4.5),
                GradeCode::ME1 => Some(4.0),
                GradeCode::ME2 => Some(3.5),
                GradeCode::AE1 => Some(3.0),
                _ => None,
            },
        }
    }

    pub fn max_score(self) -> f64 {
        match self {
            Scale::EightPoint => 8.0,
            Scale::FivePoint => 5.0,
        }
    }

    pub fn recognizes(self, code: GradeCode) -> bool {
        self.score(code).is_some()
    }
}

impl FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "8" | "eight-point" => Ok(Scale::EightPoint),
            "5" | "five-point" => Ok(Scale::FivePoint),
            other => Err(other.to_string()),
        }
    }
}

// ------ GradeValue ------

/// A single subject cell as supplied by the data file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "RawGrade", into = "RawGrade")]
pub enum GradeValue {
    Code(GradeCode),
    /// Numeric score supplied directly by the data source.
    Raw(f64),
    Unrecognized(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawGrade {
    Number(f64),
    Text(String),
    /// `null`, booleans, arrays or objects.
    Other(serde_json::Value),
}

impl From<RawGrade> for GradeValue {
    fn from(raw: RawGrade) -> Self {
        match raw {
            RawGrade::Number(n) => GradeValue::Raw(n),
            RawGrade::Text(text) => GradeValue::from(text.as_str()),
            RawGrade::Other(value) => GradeValue::Unrecognized(value.to_string()),
        }
    }
}

impl From<GradeValue> for RawGrade {
    fn from(value: GradeValue) -> Self {
        match value {
            GradeValue::Code(code) => RawGrade::Text(code.as_str().to_string()),
            GradeValue::Raw(n) => RawGrade::Number(n),
            GradeValue::Unrecognized(text) => RawGrade::Text(text),
        }
    }
}

impl From<&str> for GradeValue {
    fn from(text: &str) -> Self {
        match text.parse::<GradeCode>() {
            Ok(code) => GradeValue::Code(code),
            Err(()) => GradeValue::Unrecognized(text.to_string()),
        }
    }
}

impl From<f64> for GradeValue {
    fn from(n: f64) -> Self {
        GradeValue::Raw(n)
    }
}

impl GradeValue {
    /// The code, if it is one the scale knows how to score.
    pub fn code_in(&self, scale: Scale) -> Option<GradeCode> {
        match self {
            GradeValue::Code(code) if scale.recognizes(*code) => Some(*code),
            _ => None,
        }
    }

    /// True for text the scale cannot score. Raw numbers are never unrecognized.
    pub fn is_unrecognized(&self, scale: Scale) -> bool {
        match self {
            GradeValue::Code(code) => !scale.recognizes(*code),
            GradeValue::Raw(_) => false,
            GradeValue::Unrecognized(_) => true,
        }
    }
}

impl fmt::Display for GradeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeValue::Code(code) => write!(f, "{}", code),
            GradeValue::Raw(n) => write!(f, "{}", n),
            GradeValue::Unrecognized(text) => f.write_str(text),
        }
    }
}

/// Numeric score for one cell. Unrecognized text scores 0, raw numbers pass through.
pub fn score_of(value: &GradeValue, scale: Scale) -> f64 {
    match value {
        GradeValue::Code(code) => scale.score(*code).unwrap_or(0.0),
        GradeValue::Raw(n) => *n,
        GradeValue::Unrecognized(_) => 0.0,
    }
}
