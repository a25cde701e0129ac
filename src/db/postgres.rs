use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    config::BlockSettings,
    db::{CategoryStore, ProfileStore, ViewerProfile},
    error::AppResult,
    models::{from_unix, CategorySummary, CourseSummary},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    timemodified: i64,
    coursecategoriescount: i64,
}

impl From<CategoryRow> for CategorySummary {
    fn from(row: CategoryRow) -> Self {
        CategorySummary {
            id: row.id,
            name: row.name,
            last_modified: from_unix(row.timemodified),
            child_category_count: row.coursecategoriescount,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: i64,
    fullname: String,
    timemodified: i64,
    categoryname: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    institution: Option<String>,
    role_attribute: Option<String>,
}

/// Read-only access to the learning platform's schema
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
    table_prefix: String,
    profile_field: String,
    wwwroot: String,
    course_image_url: String,
}

impl PgCatalog {
    pub fn new(
        pool: PgPool,
        table_prefix: impl Into<String>,
        profile_field: impl Into<String>,
        settings: &BlockSettings,
    ) -> Self {
        Self {
            pool,
            table_prefix: table_prefix.into(),
            profile_field: profile_field.into(),
            wwwroot: settings.wwwroot.clone(),
            course_image_url: settings.course_image_url.clone(),
        }
    }

    fn table(&self, name: &str) -> String {
        format!("{}{}", self.table_prefix, name)
    }

    fn course_from_row(&self, row: CourseRow) -> CourseSummary {
        CourseSummary {
            id: row.id,
            full_name: row.fullname,
            url: format!("{}/course/view.php?id={}", self.wwwroot, row.id),
            image_url: self.course_image_url.clone(),
            category_label: row.categoryname,
            last_modified: from_unix(row.timemodified),
        }
    }
}

#[async_trait::async_trait]
impl CategoryStore for PgCatalog {
    async fn child_categories(&self, parent_id: i64) -> AppResult<Vec<CategorySummary>> {
        let categories = self.table("course_categories");
        let sql = format!(
            r#"
            SELECT cc1.id, cc1.name, cc1.timemodified,
                (SELECT COUNT(*) FROM {categories} cc2 WHERE cc2.parent = cc1.id) AS coursecategoriescount
            FROM {categories} cc1
            WHERE cc1.parent = $1
            ORDER BY cc1.sortorder, cc1.id
            "#
        );

        let rows: Vec<CategoryRow> = sqlx::query_as(&sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(parent_id, count = rows.len(), "Loaded child categories");

        Ok(rows.into_iter().map(CategorySummary::from).collect())
    }

    async fn courses_in_category(&self, category_id: i64) -> AppResult<Vec<CourseSummary>> {
        let sql = format!(
            r#"
            SELECT c.id, c.fullname, c.timemodified, cc.name AS categoryname
            FROM {course} c
            JOIN {categories} cc ON cc.id = c.category
            WHERE c.category = $1 AND c.visible = 1
            ORDER BY c.sortorder, c.id
            "#,
            course = self.table("course"),
            categories = self.table("course_categories"),
        );

        let rows: Vec<CourseRow> = sqlx::query_as(&sql)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| self.course_from_row(row))
            .collect())
    }
}

#[async_trait::async_trait]
impl ProfileStore for PgCatalog {
    async fn viewer_profile(&self, user_id: i64) -> AppResult<Option<ViewerProfile>> {
        let sql = format!(
            r#"
            SELECT u.institution, d.data AS role_attribute
            FROM {user} u
            LEFT JOIN {field} f ON f.shortname = $2
            LEFT JOIN {data} d ON d.userid = u.id AND d.fieldid = f.id
            WHERE u.id = $1 AND u.deleted = 0
            "#,
            user = self.table("user"),
            field = self.table("user_info_field"),
            data = self.table("user_info_data"),
        );

        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(&self.profile_field)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| ViewerProfile {
            institution: r.institution,
            role_attribute: r.role_attribute,
        }))
    }
}
