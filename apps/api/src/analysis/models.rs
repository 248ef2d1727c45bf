//! The structured outcome of one analysis action.

use serde::{Deserialize, Serialize};

/// Career pivot suggestion decoded from the model's JSON reply.
///
/// Every field is required when decoding; extra keys are ignored. Values are
/// taken as-is: `match_percentage` is expected in 0–100 but not checked, and
/// `skills_detected` may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerMatchResult {
    pub current_role: String,
    pub skills_detected: Vec<String>,
    pub green_career_match: String,
    pub match_percentage: i32,
    pub reasoning: String,
    pub certification_course: String,
}
