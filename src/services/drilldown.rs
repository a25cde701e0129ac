use crate::{
    db::CategoryStore,
    error::AppResult,
    models::{CategoryBranch, SubcategoryCourses},
};

/// Walks two levels below `category_id`: its children, and for each child
/// the subcategories with their courses. Storage order is kept throughout.
pub async fn load_branches(
    store: &dyn CategoryStore,
    category_id: i64,
) -> AppResult<Vec<CategoryBranch>> {
    let children = store.child_categories(category_id).await?;
    let mut branches = Vec::with_capacity(children.len());

    for child in children {
        let mut subcategories = Vec::new();
        for sub in store.child_categories(child.id).await? {
            let courses = store.courses_in_category(sub.id).await?;
            subcategories.push(SubcategoryCourses {
                category: sub,
                courses,
            });
        }
        branches.push(CategoryBranch {
            category: child,
            subcategories,
        });
    }

    tracing::debug!(
        category_id,
        children = branches.len(),
        "Loaded category drilldown"
    );

    Ok(branches)
}
