mod card;
mod course;
mod viewer;

pub use card::{BlockContent, DisplayCard, DrilldownSection, SubcategoryGroup};
pub use course::{
    from_unix, ApiCourse, ApiException, CategoryBranch, CategorySummary, CourseSummary,
    SubcategoryCourses,
};
pub use viewer::{build_request, wants_recommendations, ViewerContext, UNKNOWN};
