use crate::{
    db::ProfileStore,
    error::{AppError, AppResult},
    models::{build_request, DisplayCard, ViewerContext},
    render::format,
    services::providers::RecommendationProvider,
};

/// Looks up the viewer's institution and profile field and builds the request
/// context. Unknown users are an error; missing values become `"Unknown"`.
pub async fn resolve_viewer(
    profiles: &dyn ProfileStore,
    viewer_id: i64,
    category_id: Option<i64>,
) -> AppResult<ViewerContext> {
    let profile = profiles
        .viewer_profile(viewer_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} does not exist", viewer_id)))?;

    Ok(build_request(
        viewer_id,
        profile.institution.as_deref(),
        profile.role_attribute.as_deref(),
        category_id,
    ))
}

/// Asks the provider for courses and maps every one of them to a card
pub async fn delegated_cards(
    provider: &dyn RecommendationProvider,
    viewer: &ViewerContext,
) -> AppResult<Vec<DisplayCard>> {
    let courses = provider.get_recommendations(viewer).await?;
    Ok(format(&courses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MockProfileStore, ViewerProfile};
    use crate::models::{from_unix, CourseSummary};
    use crate::services::providers::MockRecommendationProvider;
    use mockall::predicate::eq;

    fn course(id: i64) -> CourseSummary {
        CourseSummary {
            id,
            full_name: format!("Course {}", id),
            url: format!("http://lms/course/view.php?id={}", id),
            image_url: String::new(),
            category_label: "Hygiene".to_string(),
            last_modified: from_unix(0),
        }
    }

    #[tokio::test]
    async fn test_resolve_viewer_normalizes_profile() {
        let mut profiles = MockProfileStore::new();
        profiles
            .expect_viewer_profile()
            .with(eq(42))
            .times(1)
            .returning(|_| {
                Ok(Some(ViewerProfile {
                    institution: Some(String::new()),
                    role_attribute: None,
                }))
            });

        let ctx = resolve_viewer(&profiles, 42, Some(5)).await.unwrap();
        assert_eq!(ctx, build_request(42, None, None, Some(5)));
        assert_eq!(ctx.institution, "Unknown");
        assert_eq!(ctx.role_attribute, "Unknown");
    }

    #[tokio::test]
    async fn test_resolve_viewer_unknown_user() {
        let mut profiles = MockProfileStore::new();
        profiles.expect_viewer_profile().returning(|_| Ok(None));

        let err = resolve_viewer(&profiles, 404, Some(5)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delegated_cards_keep_provider_order_without_cap() {
        let mut provider = MockRecommendationProvider::new();
        provider
            .expect_get_recommendations()
            .times(1)
            .returning(|_| Ok(vec![course(5), course(3), course(9), course(1), course(7)]));

        let viewer = build_request(1, Some("A"), Some("B"), Some(2));
        let cards = delegated_cards(&provider, &viewer).await.unwrap();

        let titles: Vec<_> = cards.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Course 5", "Course 3", "Course 9", "Course 1", "Course 7"]
        );
    }

    #[tokio::test]
    async fn test_provider_errors_propagate() {
        let mut provider = MockRecommendationProvider::new();
        provider
            .expect_get_recommendations()
            .returning(|_| Err(AppError::ExternalApi("down".to_string())));

        let viewer = build_request(1, None, None, Some(2));
        let result = delegated_cards(&provider, &viewer).await;
        tokio_test::assert_err!(result);
    }
}
