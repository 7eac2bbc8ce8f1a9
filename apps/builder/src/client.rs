//! Sections API client: the single point of entry for every backend call the
//! sync engine makes.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    CreateSection, CvMetaUpdate, DeleteEnvelope, MetaEnvelope, Section, SectionEnvelope,
    SectionList, UpdateSection,
};

/// Anti-forgery token header expected by the backend on every call.
pub const CSRF_HEADER: &str = "X-CSRFToken";

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One failure signal per call site. Transport errors, non-success statuses
/// and malformed bodies all land here; callers do not distinguish them.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Typed client for the backend sections resource.
#[derive(Debug, Clone)]
pub struct SectionsClient {
    client: Client,
    base_url: String,
    csrf_token: String,
}

impl SectionsClient {
    pub fn new(base_url: &str, csrf_token: &str) -> Self {
        SectionsClient {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            csrf_token: csrf_token.to_string(),
        }
    }

    /// GET /cv/api/{cv_id}/sections
    pub async fn list_sections(&self, cv_id: &str) -> Result<Vec<Section>, ApiError> {
        let url = format!("{}/cv/api/{}/sections", self.base_url, cv_id);
        let response = self
            .client
            .get(&url)
            .header(CSRF_HEADER, &self.csrf_token)
            .send()
            .await?;
        let list: SectionList = decode(response).await?;
        debug!(count = list.sections.len(), "Listed sections");
        Ok(list.sections)
    }

    /// POST /cv/api/{cv_id}/sections
    pub async fn create_section(
        &self,
        cv_id: &str,
        body: &CreateSection,
    ) -> Result<SectionEnvelope, ApiError> {
        let url = format!("{}/cv/api/{}/sections", self.base_url, cv_id);
        let response = self
            .client
            .post(&url)
            .header(CSRF_HEADER, &self.csrf_token)
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    /// PUT /cv/api/{cv_id}/sections/{section_id}
    pub async fn update_section(
        &self,
        cv_id: &str,
        section_id: &str,
        body: &UpdateSection,
    ) -> Result<SectionEnvelope, ApiError> {
        let url = format!("{}/cv/api/{}/sections/{}", self.base_url, cv_id, section_id);
        let response = self
            .client
            .put(&url)
            .header(CSRF_HEADER, &self.csrf_token)
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    /// DELETE /cv/api/{cv_id}/sections/{section_id}
    pub async fn delete_section(
        &self,
        cv_id: &str,
        section_id: &str,
    ) -> Result<DeleteEnvelope, ApiError> {
        let url = format!("{}/cv/api/{}/sections/{}", self.base_url, cv_id, section_id);
        let response = self
            .client
            .delete(&url)
            .header(CSRF_HEADER, &self.csrf_token)
            .send()
            .await?;
        decode(response).await
    }

    /// PUT /cv/api/{cv_id}/meta
    pub async fn update_meta(
        &self,
        cv_id: &str,
        meta: &CvMetaUpdate,
    ) -> Result<MetaEnvelope, ApiError> {
        let url = format!("{}/cv/api/{}/meta", self.base_url, cv_id);
        let response = self
            .client
            .put(&url)
            .header(CSRF_HEADER, &self.csrf_token)
            .json(meta)
            .send()
            .await?;
        decode(response).await
    }
}

/// Folds status and body failures into [`ApiError`]. On a non-success status
/// the backend's `error` field becomes the message when the body parses,
/// otherwise the raw body does.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SectionType;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_sections_sends_token_and_parses() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/cv/api/cv-1/sections")
            .match_header(CSRF_HEADER, "tok")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"sections":[{"id":"s1","section_type":"personal","label":null,"content":{"name":"Ada"},"display_order":0,"is_visible":true}]}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let client = SectionsClient::new(&server.url(), "tok");
        let sections = client.list_sections("cv-1").await.unwrap();

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].id, "s1");
        assert_eq!(sections[0].section_type, SectionType::Personal);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_section_posts_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/cv/api/cv-1/sections")
            .match_header(CSRF_HEADER, "tok")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "section_type": "summary",
                "content": {"text": "hello"}
            })))
            .with_status(200)
            .with_body(
                r#"{"success":true,"section":{"id":"s2","section_type":"summary","content":{"text":"hello"},"display_order":999,"is_visible":true}}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let client = SectionsClient::new(&server.url(), "tok");
        let envelope = client
            .create_section(
                "cv-1",
                &CreateSection::new(SectionType::Summary, json!({"text": "hello"})),
            )
            .await
            .unwrap();

        assert!(envelope.success);
        assert_eq!(envelope.section.id, "s2");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_becomes_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/cv/api/cv-1/sections/s1")
            .with_status(403)
            .with_body(r#"{"error":"Unauthorized"}"#)
            .create_async()
            .await;

        let client = SectionsClient::new(&server.url(), "tok");
        let err = client.delete_section("cv-1", "s1").await.unwrap_err();

        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Unauthorized");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_becomes_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/cv/api/cv-1/sections")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = SectionsClient::new(&server.url(), "tok");
        let err = client.list_sections("cv-1").await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[tokio::test]
    async fn test_update_meta_puts_to_meta_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/cv/api/cv-1/meta")
            .match_header(CSRF_HEADER, "tok")
            .match_body(Matcher::Json(json!({"title": "Engineer CV"})))
            .with_status(200)
            .with_body(r#"{"success":true,"cv":{"id":"cv-1","title":"Engineer CV"}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = SectionsClient::new(&server.url(), "tok");
        let meta = CvMetaUpdate {
            title: Some("Engineer CV".to_string()),
            ..Default::default()
        };
        let envelope = client.update_meta("cv-1", &meta).await.unwrap();

        assert!(envelope.success);
        mock.assert_async().await;
    }
}
