use serde::{Deserialize, Serialize};

/// Fields derived from the CV text by regex heuristics and the optional profile parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    /// Heuristic estimate, capped at 30.
    pub years_experience: f64,
}

/// One CV submission. Lives for a single ranking request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub file: String,
    pub raw_text: String,
    pub derived: DerivedFields,
}
