use serde::{Deserialize, Serialize};

/// Value substituted for a blank institution or role
pub const UNKNOWN: &str = "Unknown";

/// Everything the recommendation provider needs to know about the viewer.
///
/// Built fresh for every render and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewerContext {
    pub user_id: i64,
    pub institution: String,
    pub role_attribute: String,
    pub category_id: Option<i64>,
}

impl ViewerContext {
    /// Whether the viewer asked for a category, i.e. the block should leave static mode
    pub fn wants_recommendations(&self) -> bool {
        wants_recommendations(self.category_id)
    }
}

/// `None` and `Some(0)` both mean "no category requested"
pub fn wants_recommendations(category_id: Option<i64>) -> bool {
    matches!(category_id, Some(id) if id > 0)
}

/// Assembles the viewer context for a recommendation request.
///
/// Blank institution and role values become `"Unknown"`, other values are
/// trimmed. The category id is passed through untouched.
pub fn build_request(
    viewer_id: i64,
    raw_institution: Option<&str>,
    raw_role: Option<&str>,
    category_id: Option<i64>,
) -> ViewerContext {
    ViewerContext {
        user_id: viewer_id,
        institution: normalize(raw_institution),
        role_attribute: normalize(raw_role),
        category_id,
    }
}

fn normalize(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_become_unknown() {
        let ctx = build_request(42, Some(""), Some(""), Some(5));
        assert_eq!(
            ctx,
            ViewerContext {
                user_id: 42,
                institution: "Unknown".to_string(),
                role_attribute: "Unknown".to_string(),
                category_id: Some(5),
            }
        );
    }

    #[test]
    fn test_whitespace_and_missing_fields_become_unknown() {
        let ctx = build_request(1, Some("   \t"), None, None);
        assert_eq!(ctx.institution, UNKNOWN);
        assert_eq!(ctx.role_attribute, UNKNOWN);
    }

    #[test]
    fn test_values_are_trimmed() {
        let ctx = build_request(1, Some(" HPS eAcademy "), Some("Nurse\n"), Some(3));
        assert_eq!(ctx.institution, "HPS eAcademy");
        assert_eq!(ctx.role_attribute, "Nurse");
    }

    #[test]
    fn test_category_id_passes_through() {
        assert_eq!(build_request(1, None, None, Some(0)).category_id, Some(0));
        assert_eq!(build_request(1, None, None, None).category_id, None);
    }

    #[test]
    fn test_wants_recommendations() {
        assert!(!wants_recommendations(None));
        assert!(!wants_recommendations(Some(0)));
        assert!(wants_recommendations(Some(5)));
        assert!(build_request(9, None, None, Some(12)).wants_recommendations());
    }
}
