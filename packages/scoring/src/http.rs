//! HTTP client for `POST /api/hotspot_score` and `GET /api/analyze_point`.

use std::time::Duration;

use hotspot_map_scoring_models::{PointQuery, PointScore, ScoreRequest, ScoreResponse};
use reqwest::StatusCode;

use crate::{ScoredBatch, ScoringError, ScoringService};

/// Path of the scoring endpoint relative to the service base URL.
pub const SCORE_PATH: &str = "/api/hotspot_score";

/// Path of the single-point endpoint relative to the service base URL.
pub const POINT_PATH: &str = "/api/analyze_point";

/// Default request timeout. The service fetches climate data for every
/// point before answering.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum length of a response body quoted in an error message.
const BODY_PREVIEW_LEN: usize = 300;

/// Scoring service reached over HTTP.
pub struct HttpScoringService {
    endpoint: String,
    point_endpoint: String,
    client: reqwest::Client,
}

impl HttpScoringService {
    /// Creates a client for the service at `base_url`
    /// (e.g. `"http://localhost:5000"`).
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ScoringError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base = base_url.trim_end_matches('/');
        Ok(Self {
            endpoint: format!("{base}{SCORE_PATH}"),
            point_endpoint: format!("{base}{POINT_PATH}"),
            client,
        })
    }

    /// Full URL batch requests are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full URL of the single-point endpoint.
    #[must_use]
    pub fn point_endpoint(&self) -> &str {
        &self.point_endpoint
    }
}

#[async_trait::async_trait]
impl ScoringService for HttpScoringService {
    async fn score(&self, request: &ScoreRequest) -> Result<ScoredBatch, ScoringError> {
        log::info!(
            "Scoring {} point(s) for {}..{} via {}",
            request.points.len(),
            request.start,
            request.end,
            self.endpoint
        );

        let resp = self.client.post(&self.endpoint).json(request).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        parse_response(status, &body)
    }

    async fn score_point(&self, query: &PointQuery) -> Result<PointScore, ScoringError> {
        log::info!(
            "Scoring {} at {}, {} via {}",
            query.structure_type,
            query.lat,
            query.lon,
            self.point_endpoint
        );

        let resp = self
            .client
            .get(&self.point_endpoint)
            .query(query)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        parse_point_response(status, &body)
    }
}

/// Interprets a scoring response.
///
/// A non-2xx status and a body carrying an `error` field are both failures;
/// a 2xx body without `results` is malformed.
///
/// # Errors
///
/// Returns [`ScoringError::Status`], [`ScoringError::Service`] or
/// [`ScoringError::Malformed`] as described above.
pub fn parse_response(status: StatusCode, body: &str) -> Result<ScoredBatch, ScoringError> {
    let parsed = serde_json::from_str::<ScoreResponse>(body);

    if !status.is_success() {
        let message = parsed
            .ok()
            .and_then(|r| r.error)
            .unwrap_or_else(|| preview(body));
        return Err(ScoringError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let response = parsed.map_err(|e| ScoringError::Malformed {
        message: format!("{e}: {}", preview(body)),
    })?;

    if let Some(message) = response.error {
        return Err(ScoringError::Service { message });
    }

    let results = response.results.ok_or_else(|| ScoringError::Malformed {
        message: "response has neither 'results' nor 'error'".to_string(),
    })?;

    for warning in &response.warnings {
        log::warn!("Scoring service warning: {warning}");
    }

    Ok(ScoredBatch {
        results,
        warnings: response.warnings,
    })
}

/// Interprets a single-point response with the same rules as
/// [`parse_response`].
///
/// # Errors
///
/// Returns [`ScoringError::Status`] for a non-2xx status,
/// [`ScoringError::Service`] for an `error` field, and
/// [`ScoringError::Malformed`] for a body that is not a point score.
pub fn parse_point_response(status: StatusCode, body: &str) -> Result<PointScore, ScoringError> {
    let parsed = serde_json::from_str::<serde_json::Value>(body);
    let error = parsed
        .as_ref()
        .ok()
        .and_then(|v| v.get("error"))
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string);

    if !status.is_success() {
        return Err(ScoringError::Status {
            status: status.as_u16(),
            message: error.unwrap_or_else(|| preview(body)),
        });
    }

    if let Some(message) = error {
        return Err(ScoringError::Service { message });
    }

    parsed
        .and_then(serde_json::from_value::<PointScore>)
        .map_err(|e| ScoringError::Malformed {
            message: format!("{e}: {}", preview(body)),
        })
}

fn preview(body: &str) -> String {
    if body.len() > BODY_PREVIEW_LEN {
        let cut = (0..=BODY_PREVIEW_LEN)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
