use super::StudentBackend;
use crate::config::RollbookConfig;
use crate::error::{ApiError, Result, RollbookError};
use crate::model::{DeleteResponse, Student, StudentDraft, StudentPatch};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const API_PREFIX: &str = "/api";

/// REST client for the student service.
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    /// `host` is the service origin, e.g. `http://localhost:8000`. Requests go to `{host}/api/...`.
    pub fn new(host: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RollbookError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: format!("{}{}", host.trim_end_matches('/'), API_PREFIX),
        })
    }

    pub fn from_config(config: &RollbookConfig) -> Result<Self> {
        Self::new(
            &config.backend_host(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("Accept", "application/json")
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let request = request
            .build()
            .map_err(|e| RollbookError::Network(e.to_string()))?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| RollbookError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RollbookError::Network(e.to_string()))?;

        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), &body);
            warn!(%method, %url, status = status.as_u16(), code = %err.code, "request rejected");
            return Err(err.into());
        }

        debug!(%method, %url, status = status.as_u16(), bytes = body.len(), "request succeeded");
        serde_json::from_slice(&body).map_err(|e| {
            RollbookError::MalformedResponse(format!("{} {}: {}", method, url.path(), e))
        })
    }
}

#[async_trait]
impl StudentBackend for HttpBackend {
    async fn list(&self, search: Option<&str>) -> Result<Vec<Student>> {
        let mut request = self.request(Method::GET, "/students");
        if let Some(term) = search.filter(|s| !s.is_empty()) {
            request = request.query(&[("search", term)]);
        }
        self.send(request).await
    }

    async fn get(&self, id: i64) -> Result<Student> {
        self.send(self.request(Method::GET, &format!("/students/{}", id)))
            .await
    }

    async fn create(&self, draft: &StudentDraft) -> Result<Student> {
        self.send(self.request(Method::POST, "/students").json(draft))
            .await
    }

    async fn update(&self, id: i64, draft: &StudentDraft) -> Result<Student> {
        self.send(
            self.request(Method::PUT, &format!("/students/{}", id))
                .json(draft),
        )
        .await
    }

    async fn patch(&self, id: i64, patch: &StudentPatch) -> Result<Student> {
        self.send(
            self.request(Method::PATCH, &format!("/students/{}", id))
                .json(patch),
        )
        .await
    }

    async fn delete(&self, id: i64) -> Result<DeleteResponse> {
        self.send(self.request(Method::DELETE, &format!("/students/{}", id)))
            .await
    }
}
