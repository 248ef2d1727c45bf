//! Maps a `CareerMatchResult` onto the display fields of the results
//! dashboard. Styling is the front-end's concern; this only fixes labels,
//! values and the course search link.

use serde::Serialize;

use crate::analysis::models::CareerMatchResult;

pub const COURSE_SEARCH_PREFIX: &str = "https://www.google.com/search?q=";
pub const SKILL_SEPARATOR: &str = " • ";
pub const COMPLETION_MESSAGE: &str = "Analysis Complete.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillBridge {
    pub reasoning_label: &'static str,
    pub reasoning: String,
    pub skills_label: &'static str,
    pub skills: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificationCard {
    pub label: &'static str,
    pub course: String,
    pub link: SearchLink,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub metrics: Vec<MetricCard>,
    pub skill_bridge: SkillBridge,
    pub certification: CertificationCard,
    pub message: &'static str,
}

impl DashboardView {
    pub fn from_result(result: &CareerMatchResult) -> Self {
        Self {
            metrics: vec![
                MetricCard {
                    label: "Current Role",
                    value: result.current_role.clone(),
                },
                MetricCard {
                    label: "Green Career Match",
                    value: result.green_career_match.clone(),
                },
                MetricCard {
                    label: "Match Confidence",
                    value: format!("{}%", result.match_percentage),
                },
            ],
            skill_bridge: SkillBridge {
                reasoning_label: "Why this match?",
                reasoning: result.reasoning.clone(),
                skills_label: "Detected Skills",
                skills: result.skills_detected.join(SKILL_SEPARATOR),
            },
            certification: CertificationCard {
                label: "Recommended Certification",
                course: result.certification_course.clone(),
                link: SearchLink {
                    label: format!("Find Courses: {}", result.certification_course),
                    url: course_search_url(&result.certification_course),
                },
            },
            message: COMPLETION_MESSAGE,
        }
    }
}

/// Plain concatenation onto the search prefix. The course name is not
/// escaped, so reserved characters such as `&` or `#` yield a broken query.
pub fn course_search_url(course: &str) -> String {
    format!("{COURSE_SEARCH_PREFIX}{course}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> CareerMatchResult {
        CareerMatchResult {
            current_role: "Welder".to_string(),
            skills_detected: vec!["Torch Handling".to_string(), "Metal Fabrication".to_string()],
            green_career_match: "Solar Panel Installer".to_string(),
            match_percentage: 82,
            reasoning: "Transferable fabrication skills.".to_string(),
            certification_course: "NABCEP Associate".to_string(),
        }
    }

    #[test]
    fn test_metric_cards_in_display_order() {
        let view = DashboardView::from_result(&result());
        let labels: Vec<_> = view.metrics.iter().map(|m| m.label).collect();
        assert_eq!(labels, ["Current Role", "Green Career Match", "Match Confidence"]);
        assert_eq!(view.metrics[2].value, "82%");
    }

    #[test]
    fn test_skills_joined_with_bullet() {
        let view = DashboardView::from_result(&result());
        assert_eq!(view.skill_bridge.skills, "Torch Handling • Metal Fabrication");
    }

    #[test]
    fn test_search_link_contains_course_verbatim() {
        let view = DashboardView::from_result(&result());
        let link = &view.certification.link;
        assert_eq!(link.url, "https://www.google.com/search?q=NABCEP Associate");
        assert!(link.url.contains("NABCEP Associate"));
        assert_eq!(link.label, "Find Courses: NABCEP Associate");
    }

    #[test]
    fn test_search_url_does_not_escape() {
        assert_eq!(
            course_search_url("OSHA 10 & 30"),
            "https://www.google.com/search?q=OSHA 10 & 30"
        );
    }
}
