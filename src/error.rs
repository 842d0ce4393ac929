use thiserror::Error;

/// The data file could not be turned into a roster.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load data: {0}")]
    Fetch(String),

    #[error("data file is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("data file is neither a `detailed_performance` document nor a learner array")]
    UnsupportedShape,

    #[error("learner `{0}` appears more than once")]
    DuplicateLearner(String),

    #[error("learner at position {0} has no name")]
    BlankLearnerName(usize),
}

#[derive(Debug, Error, PartialEq)]
pub enum ScoringError {
    #[error("the roster has no learners")]
    EmptyRoster,

    #[error("no learner has any subjects")]
    NoSubjects,

    #[error("learner `{learner}` has no grade for `{subject}`")]
    MissingSubject { learner: String, subject: String },

    #[error("learner `{learner}` has unrecognized grade `{value}` for `{subject}`")]
    UnrecognizedGrade {
        learner: String,
        subject: String,
        value: String,
    },

    #[error("no learner named `{0}`")]
    UnknownLearner(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("maximum total must be a positive number, got `{0}`")]
    InvalidMaxTotal(String),

    #[error("unknown grade scale `{0}` (expected 5 or 8)")]
    UnknownScale(String),

    #[error("unknown value `{value}` for `{key}`")]
    UnknownPolicy { key: String, value: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
