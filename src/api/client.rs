//! Blocking HTTP client for the recommendation service

use crate::api::types::{HealthStatus, RecommendRequest, RecommendResponse};
use crate::{Result, StyleSenseError};
use reqwest::blocking::{Client, Response};
use std::time::{Duration, Instant};

/// Path of the recommendation endpoint
pub const RECOMMEND_PATH: &str = "/api/recommend";
/// Path of the health endpoint
pub const HEALTH_PATH: &str = "/health";

/// Anything that can answer a recommendation request.
///
/// Calls block; the terminal UI runs them on worker threads.
pub trait Recommender: Send + Sync {
    /// Issue one `POST /api/recommend`
    fn recommend(&self, request: &RecommendRequest) -> Result<RecommendResponse>;

    /// Check that an image URL can be fetched
    fn probe_image(&self, url: &str) -> Result<()>;

    /// Query `GET /health`
    fn health(&self) -> Result<HealthStatus>;
}

/// [`Recommender`] over HTTP
pub struct HttpRecommender {
    client: Client,
    base_url: String,
}

impl HttpRecommender {
    /// `timeout = None` waits indefinitely
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("stylesense/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Recommender for HttpRecommender {
    fn recommend(&self, request: &RecommendRequest) -> Result<RecommendResponse> {
        let start = Instant::now();
        tracing::debug!(
            target: "api",
            q = %request.q,
            image = request.is_image_search(),
            top_k = request.top_k,
            rerank = request.rerank,
            "POST {}",
            RECOMMEND_PATH
        );

        let resp = self.client.post(self.url(RECOMMEND_PATH)).json(request).send()?;
        let resp = ensure_success(resp)?;
        let body = resp.text()?;
        let parsed: RecommendResponse = serde_json::from_str(&body)?;

        tracing::debug!(
            target: "api",
            results = parsed.results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "recommend complete"
        );
        Ok(parsed)
    }

    fn probe_image(&self, url: &str) -> Result<()> {
        let resp = self.client.head(url).send()?;
        ensure_success(resp).map(|_| ())
    }

    fn health(&self) -> Result<HealthStatus> {
        let resp = self.client.get(self.url(HEALTH_PATH)).send()?;
        let body = ensure_success(resp)?.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Turn a non-2xx response into [`StyleSenseError::Status`].
///
/// FastAPI reports failures as `{"detail": ...}`; the detail is kept when present,
/// otherwise the raw body is used.
fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().unwrap_or_default();
    let detail = extract_detail(&body);
    tracing::warn!(target: "api", status = status.as_u16(), detail = %detail, "request rejected");
    Err(StyleSenseError::from_status(status.as_u16(), Some(detail)))
}

fn extract_detail(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("detail") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => body.trim().to_string(),
        },
        _ => body.trim().to_string(),
    }
}
