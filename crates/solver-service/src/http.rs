//! JSON-over-HTTP solver client.
//!
//! The service receives `{"facelets": "<54 chars>"}` and answers either
//! `{"solution": "R U R' ..."}` or `{"error": "<message>"}`.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{FaceletString, OracleError, SolvingOracle};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::SolverServiceError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Request body sent to the solver service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveRequest {
    pub facelets: String,
}

/// Reply body from the solver service. Exactly one field is expected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A [`SolvingOracle`] that posts facelets to a solver service.
#[derive(Debug, Clone)]
pub struct HttpSolvingOracle {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpSolvingOracle {
    /// Create a client for the solver endpoint at `url`.
    ///
    /// # Errors
    ///
    /// Returns `SolverServiceError::Misconfiguration` if the URL is not
    /// http(s) or the HTTP client cannot be constructed.
    pub fn new(url: impl Into<String>) -> Result<Self, SolverServiceError> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SolverServiceError::Misconfiguration(format!(
                "Solver URL must start with http:// or https://, got '{url}'"
            )));
        }
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .use_rustls_tls()
            .build()
            .map_err(|e| {
                SolverServiceError::Misconfiguration(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            url,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl SolvingOracle for HttpSolvingOracle {
    fn name(&self) -> &str {
        "http"
    }

    async fn solve(&self, facelets: &FaceletString) -> Result<String, OracleError> {
        debug!(oracle = "http", url = %self.url, facelets = %facelets, "Requesting solution");

        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&SolveRequest {
                facelets: facelets.as_str().to_string(),
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::unavailable(format!("Solver timed out after {:?}", self.timeout))
                } else {
                    OracleError::unavailable(format!("Solver request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body: SolveResponse = response.json().await.map_err(|e| {
            OracleError::unavailable(format!("Failed to parse solver response ({status}): {e}"))
        })?;

        if status.is_server_error() {
            warn!(oracle = "http", status = status.as_u16(), "Solver service error");
            let detail = body.error.unwrap_or_default();
            return Err(OracleError::unavailable(format!("{status} {detail}").trim_end().to_string()));
        }
        match body {
            SolveResponse {
                error: Some(message),
                ..
            } => Err(OracleError::solve_failure(message)),
            SolveResponse {
                solution: Some(solution),
                ..
            } if status.is_success() => Ok(solution),
            _ => Err(OracleError::unavailable(format!(
                "Solver response missing solution ({status})"
            ))),
        }
    }
}
