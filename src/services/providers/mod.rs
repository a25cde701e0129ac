//! Recommendation provider abstraction
//!
//! Course selection lives outside this service. A provider turns a viewer
//! context into an ordered list of courses; the web service client talks to
//! the platform, and the caching decorator keeps repeated renders stable.

use crate::{
    error::AppResult,
    models::{CourseSummary, ViewerContext},
};

pub mod cached;
pub mod web_service;

pub use cached::CachedProvider;
pub use web_service::WebServiceProvider;

/// Source of course recommendations for a viewer
///
/// Implementations return an empty list, not an error, when there is nothing
/// to recommend. The order of the returned courses is final.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationProvider: Send + Sync {
    async fn get_recommendations(&self, viewer: &ViewerContext) -> AppResult<Vec<CourseSummary>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

