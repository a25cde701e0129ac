use chrono::{DateTime, Utc};

use crate::{
    config::BlockSettings,
    models::{
        CategoryBranch, CategorySummary, CourseSummary, DisplayCard, DrilldownSection,
        SubcategoryGroup,
    },
};

/// Courses shown per subcategory in drilldown mode
pub const MAX_COURSES_PER_GROUP: usize = 3;

/// Day, full month name, four digit year, e.g. `05 March 2024`
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%d %B %Y").to_string()
}

pub fn modified_label(date: &DateTime<Utc>) -> String {
    format!("Modified {}", format_date(date))
}

pub fn course_card(course: &CourseSummary) -> DisplayCard {
    DisplayCard {
        image_url: course.image_url.clone(),
        link_url: course.url.clone(),
        title: course.full_name.clone(),
        modified_label: modified_label(&course.last_modified),
        badge_text: course.category_label.clone(),
    }
}

/// Maps provider output to cards one to one, keeping the provider's order
pub fn format(courses: &[CourseSummary]) -> Vec<DisplayCard> {
    courses.iter().map(course_card).collect()
}

/// Card for a category; the badge carries the number of child categories
pub fn category_card(category: &CategorySummary, settings: &BlockSettings) -> DisplayCard {
    DisplayCard {
        image_url: settings.category_image_url.clone(),
        link_url: category_url(&settings.wwwroot, category.id),
        title: category.name.clone(),
        modified_label: modified_label(&category.last_modified),
        badge_text: category.child_category_count.to_string(),
    }
}

pub fn category_url(wwwroot: &str, category_id: i64) -> String {
    format!("{}/course/index.php?categoryid={}", wwwroot, category_id)
}

/// Builds drilldown sections, keeping at most the first
/// [`MAX_COURSES_PER_GROUP`] courses of every subcategory.
pub fn drilldown(branches: &[CategoryBranch], settings: &BlockSettings) -> Vec<DrilldownSection> {
    branches
        .iter()
        .map(|branch| DrilldownSection {
            category: category_card(&branch.category, settings),
            subcategories: branch
                .subcategories
                .iter()
                .map(|sub| SubcategoryGroup {
                    category_id: sub.category.id,
                    name: sub.category.name.clone(),
                    cards: sub
                        .courses
                        .iter()
                        .take(MAX_COURSES_PER_GROUP)
                        .map(course_card)
                        .collect(),
                })
                .collect(),
        })
        .collect()
}
