use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A course as returned by the recommendation provider or read from storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: i64,
    pub full_name: String,
    pub url: String,
    pub image_url: String,
    pub category_label: String,
    pub last_modified: DateTime<Utc>,
}

/// A category together with the number of categories directly beneath it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: i64,
    pub name: String,
    pub last_modified: DateTime<Utc>,
    pub child_category_count: i64,
}

/// A subcategory and its courses in storage order
#[derive(Debug, Clone, PartialEq)]
pub struct SubcategoryCourses {
    pub category: CategorySummary,
    pub courses: Vec<CourseSummary>,
}

/// A child of the requested category together with its own subcategories
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBranch {
    pub category: CategorySummary,
    pub subcategories: Vec<SubcategoryCourses>,
}

/// Converts a platform timestamp (unix seconds) to UTC, clamping garbage to the epoch
pub fn from_unix(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

// ============================================================================
// Recommendation web service types
// ============================================================================

/// One entry of the recommendation service response.
///
/// Every field is optional on the wire so a single malformed entry can be
/// rejected without failing the whole response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCourse {
    pub id: Option<i64>,
    #[serde(alias = "fullname")]
    pub full_name: Option<String>,
    #[serde(alias = "courseurl")]
    pub url: Option<String>,
    #[serde(alias = "courseimage", alias = "imageurl")]
    pub image_url: Option<String>,
    #[serde(alias = "categoryname")]
    pub category_label: Option<String>,
    #[serde(alias = "timemodified")]
    pub last_modified: Option<i64>,
}

impl TryFrom<ApiCourse> for CourseSummary {
    type Error = &'static str;

    fn try_from(course: ApiCourse) -> Result<Self, Self::Error> {
        Ok(CourseSummary {
            id: course.id.ok_or("id")?,
            full_name: course.full_name.ok_or("full_name")?,
            url: course.url.ok_or("url")?,
            image_url: course.image_url.unwrap_or_default(),
            category_label: course.category_label.unwrap_or_default(),
            last_modified: from_unix(course.last_modified.ok_or("last_modified")?),
        })
    }
}

/// Error payload returned by the platform web service layer
#[derive(Debug, Clone, Deserialize)]
pub struct ApiException {
    pub exception: String,
    #[serde(default)]
    pub errorcode: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
