use std::sync::Arc;

use crate::{
    config::{BlockSettings, RecommendationSource},
    db::{CategoryStore, ProfileStore},
    error::{AppError, AppResult},
    models::{wants_recommendations, BlockContent},
    render::formatter,
    services::{drilldown, providers::RecommendationProvider, recommendations},
};

/// Decides what the block shows for one request and gathers the data for it.
///
/// Two modes exist: static text when no category is requested, and
/// recommendations otherwise. Which recommendation source is used is fixed by
/// configuration. Nothing is remembered between requests.
#[derive(Clone)]
pub struct BlockService {
    provider: Arc<dyn RecommendationProvider>,
    categories: Arc<dyn CategoryStore>,
    profiles: Arc<dyn ProfileStore>,
    source: RecommendationSource,
    settings: BlockSettings,
}

impl BlockService {
    pub fn new(
        provider: Arc<dyn RecommendationProvider>,
        categories: Arc<dyn CategoryStore>,
        profiles: Arc<dyn ProfileStore>,
        source: RecommendationSource,
        settings: BlockSettings,
    ) -> Self {
        Self {
            provider,
            categories,
            profiles,
            source,
            settings,
        }
    }

    pub fn settings(&self) -> &BlockSettings {
        &self.settings
    }

    pub fn source(&self) -> RecommendationSource {
        self.source
    }

    /// Builds the block content for `category_id` as seen by `viewer_id`
    pub async fn content(
        &self,
        category_id: Option<i64>,
        viewer_id: Option<i64>,
    ) -> AppResult<BlockContent> {
        let category_id = match category_id {
            Some(id) if wants_recommendations(Some(id)) => id,
            _ => {
                return Ok(BlockContent::Static {
                    text: self.settings.static_text().to_string(),
                })
            }
        };

        match self.source {
            RecommendationSource::Delegated => {
                let viewer_id = viewer_id.ok_or_else(|| {
                    AppError::Unauthorized("Recommendations require a viewer".to_string())
                })?;
                self.delegated(category_id, viewer_id).await
            }
            RecommendationSource::Drilldown => self.drilldown(category_id).await,
        }
    }

    /// Delegated mode regardless of the configured source
    pub async fn delegated(&self, category_id: i64, viewer_id: i64) -> AppResult<BlockContent> {
        let viewer =
            recommendations::resolve_viewer(self.profiles.as_ref(), viewer_id, Some(category_id))
                .await?;
        let cards = recommendations::delegated_cards(self.provider.as_ref(), &viewer).await?;
        Ok(BlockContent::Delegated { cards })
    }

    /// Drilldown mode regardless of the configured source
    pub async fn drilldown(&self, category_id: i64) -> AppResult<BlockContent> {
        let branches = drilldown::load_branches(self.categories.as_ref(), category_id).await?;
        Ok(BlockContent::Drilldown {
            sections: formatter::drilldown(&branches, &self.settings),
        })
    }
}
