use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use std::convert::Infallible;

use crate::error::AppError;

/// Header carrying the authenticated viewer's user id, set by the host
pub const VIEWER_ID_HEADER: &str = "x-viewer-id";

/// The viewer, if the host identified one.
///
/// A missing or unparsable header yields `ViewerId(None)`; whether that is
/// acceptable depends on the render mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerId(pub Option<i64>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ViewerId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let viewer = parts
            .headers
            .get(VIEWER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|id| *id > 0);

        if viewer.is_none() && parts.headers.contains_key(VIEWER_ID_HEADER) {
            tracing::warn!("Ignoring malformed viewer id header");
        }

        Ok(ViewerId(viewer))
    }
}

#[derive(Debug, Deserialize)]
struct BlockQuery {
    categoryid: Option<i64>,
}

/// The page's `categoryid` query parameter.
///
/// Malformed or negative values are rejected as `AppError::InvalidInput`, so
/// callers get the same JSON error body as every other failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryId(pub Option<i64>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CategoryId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<BlockQuery>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError::InvalidInput(format!("invalid categoryid: {}", rejection.body_text()))
            })?;

        match query.categoryid {
            Some(id) if id < 0 => Err(AppError::InvalidInput(format!(
                "categoryid must be a non-negative integer, got {}",
                id
            ))),
            other => Ok(CategoryId(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    fn parts(uri: &str) -> Parts {
        let (parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        parts
    }

    async fn category(uri: &str) -> Result<CategoryId, AppError> {
        CategoryId::from_request_parts(&mut parts(uri), &()).await
    }

    #[tokio::test]
    async fn test_category_id_parsed() {
        assert_eq!(category("/block?categoryid=5").await.unwrap(), CategoryId(Some(5)));
        assert_eq!(category("/block?categoryid=0").await.unwrap(), CategoryId(Some(0)));
        assert_eq!(category("/block").await.unwrap(), CategoryId(None));
    }

    #[tokio::test]
    async fn test_malformed_category_id_is_invalid_input() {
        let err = category("/block?categoryid=abc").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref msg) if msg.contains("categoryid")));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_negative_category_id_is_invalid_input() {
        let err = category("/block?categoryid=-3").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_viewer_id_from_header() {
        let (mut with_header, _) = Request::builder()
            .header(VIEWER_ID_HEADER, " 7 ")
            .body(())
            .unwrap()
            .into_parts();
        let ViewerId(viewer) = ViewerId::from_request_parts(&mut with_header, &())
            .await
            .unwrap();
        assert_eq!(viewer, Some(7));

        let ViewerId(viewer) = ViewerId::from_request_parts(&mut parts("/"), &()).await.unwrap();
        assert_eq!(viewer, None);
    }
}
