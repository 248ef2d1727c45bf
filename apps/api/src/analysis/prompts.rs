// Career match LLM prompt.
// The field names below are a hard contract with `CareerMatchResult`.

pub const CAREER_MATCH_PROMPT: &str = r#"Analyze this image of a workspace/worker.
Act as a Career Transition Expert.
Return ONLY a raw JSON object (no markdown formatting, no code fences) with this exact structure:
{
    "current_role": "Predicted current job title (e.g. Diesel Mechanic)",
    "skills_detected": ["Skill 1", "Skill 2", "Skill 3", "Skill 4"],
    "green_career_match": "High-growth Green Economy Job Title",
    "match_percentage": 85,
    "reasoning": "Short 1-sentence explanation of why this fits.",
    "certification_course": "Name of a specific certification to take"
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_every_result_field() {
        for field in [
            "current_role",
            "skills_detected",
            "green_career_match",
            "match_percentage",
            "reasoning",
            "certification_course",
        ] {
            assert!(
                CAREER_MATCH_PROMPT.contains(&format!("\"{field}\"")),
                "prompt is missing {field}"
            );
        }
    }

    #[test]
    fn test_prompt_forbids_markdown() {
        assert!(CAREER_MATCH_PROMPT.contains("no markdown formatting"));
    }
}
