//! Platform web service provider
//!
//! Calls the recommendation function exposed through the platform's REST
//! web service endpoint:
//!
//! `POST {base}/webservice/rest/server.php` with `wstoken`, `wsfunction`,
//! `moodlewsrestformat=json` and the viewer fields as form parameters.
//!
//! The endpoint answers with a JSON array of courses (optionally wrapped in
//! `{"courses": [...]}`) or with an exception object on failure.

use crate::{
    error::{AppError, AppResult},
    models::{ApiCourse, ApiException, CourseSummary, ViewerContext},
    services::providers::RecommendationProvider,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;

const REST_PATH: &str = "/webservice/rest/server.php";

#[derive(Deserialize)]
#[serde(untagged)]
enum ServiceResponse {
    Exception(ApiException),
    Wrapped { courses: Vec<serde_json::Value> },
    Courses(Vec<serde_json::Value>),
}

#[derive(Clone)]
pub struct WebServiceProvider {
    http_client: HttpClient,
    base_url: String,
    token: String,
    function: String,
    timeout: Duration,
}

impl WebServiceProvider {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        function: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(AppError::HttpClient)?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            function: function.into(),
            timeout,
        })
    }

    fn classify(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::ProviderTimeout(self.timeout)
        } else {
            AppError::HttpClient(e)
        }
    }

    /// Keeps well-formed entries in order, dropping the rest
    fn parse_courses(entries: Vec<serde_json::Value>) -> Vec<CourseSummary> {
        let total = entries.len();
        let courses: Vec<CourseSummary> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let parsed = serde_json::from_value::<ApiCourse>(entry)
                    .map_err(|e| e.to_string())
                    .and_then(|api| {
                        CourseSummary::try_from(api).map_err(|field| format!("missing {}", field))
                    });
                match parsed {
                    Ok(course) => Some(course),
                    Err(reason) => {
                        tracing::warn!(index, reason = %reason, "Dropping malformed recommendation");
                        None
                    }
                }
            })
            .collect();

        if courses.len() < total {
            tracing::warn!(
                kept = courses.len(),
                dropped = total - courses.len(),
                "Recommendation response contained malformed entries"
            );
        }

        courses
    }
}

#[async_trait::async_trait]
impl RecommendationProvider for WebServiceProvider {
    async fn get_recommendations(&self, viewer: &ViewerContext) -> AppResult<Vec<CourseSummary>> {
        let url = format!("{}{}", self.base_url, REST_PATH);
        let user_id = viewer.user_id.to_string();
        let category_id = viewer.category_id.unwrap_or(0).to_string();

        let response = self
            .http_client
            .post(&url)
            .form(&[
                ("wstoken", self.token.as_str()),
                ("wsfunction", self.function.as_str()),
                ("moodlewsrestformat", "json"),
                ("userid", user_id.as_str()),
                ("institution", viewer.institution.as_str()),
                ("function", viewer.role_attribute.as_str()),
                ("categoryid", category_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Recommendation service returned status {}: {}",
                status, body
            )));
        }

        let payload: ServiceResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                AppError::ProviderTimeout(self.timeout)
            } else {
                AppError::ExternalApi(format!("Invalid recommendation response: {}", e))
            }
        })?;

        let entries = match payload {
            ServiceResponse::Exception(ex) => {
                return Err(AppError::ExternalApi(format!(
                    "Recommendation service raised {} ({}): {}",
                    ex.exception,
                    ex.errorcode.as_deref().unwrap_or("unknown"),
                    ex.message.as_deref().unwrap_or("no message")
                )));
            }
            ServiceResponse::Wrapped { courses } | ServiceResponse::Courses(courses) => courses,
        };

        let courses = Self::parse_courses(entries);

        tracing::info!(
            provider = self.name(),
            user_id = viewer.user_id,
            category_id = ?viewer.category_id,
            count = courses.len(),
            "Fetched recommendations"
        );

        Ok(courses)
    }

    fn name(&self) -> &'static str {
        "web_service"
    }
}
