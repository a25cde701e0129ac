pub mod postgres;
pub mod redis;

use crate::{
    error::AppResult,
    models::{CategorySummary, CourseSummary},
};

pub use postgres::{create_pool, PgCatalog};
pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};

/// Institution and custom profile field of a viewer, as stored
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerProfile {
    pub institution: Option<String>,
    pub role_attribute: Option<String>,
}

/// Category tree lookups used by drilldown mode
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CategoryStore: Send + Sync {
    /// Direct children of `parent_id`, each with its own child count
    async fn child_categories(&self, parent_id: i64) -> AppResult<Vec<CategorySummary>>;

    /// Visible courses of a category in platform sort order
    async fn courses_in_category(&self, category_id: i64) -> AppResult<Vec<CourseSummary>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// `None` when the user does not exist
    async fn viewer_profile(&self, user_id: i64) -> AppResult<Option<ViewerProfile>>;
}
