// crates/dnr-replay-solver/src/http.rs
// ============================================================================
// Module: HTTP Solver Client
// Description: Blocking HTTP client for the remote solving service.
// Purpose: POST gzip-compressed solve requests and parse the response.
// Dependencies: dnr-replay-core, dnr-replay-config, reqwest, serde_json
// ============================================================================

//! ## Overview
//! Each submission serializes the request payload, gzip-compresses it, and
//! posts it with `Content-Encoding: gzip`. Solve jobs are long-running, so the
//! client carries an explicit timeout from configuration. Redirects are not
//! followed and response bodies are read under a byte cap.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use dnr_replay_config::SolverConfig;
use dnr_replay_core::SolveResponse;
use dnr_replay_core::SolverClient;
use dnr_replay_core::SolverError;
use dnr_replay_core::runtime::gzip_compress;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_ENCODING;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Media type of request and response bodies.
const JSON_CONTENT_TYPE: &str = "application/json";
/// Maximum bytes of an error body kept in [`SolverError::Status`].
const MAX_ERROR_BODY_BYTES: usize = 1024;

// ============================================================================
// SECTION: Client
// ============================================================================

/// Solver client bound to a single endpoint.
pub struct HttpSolverClient {
    /// Solver submission URL.
    url: Url,
    /// Endpoint label used in events.
    endpoint: String,
    /// Maximum response body size.
    max_response_bytes: usize,
    /// HTTP client used for outbound requests.
    client: Client,
}

impl HttpSolverClient {
    /// Creates a client from solver configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::Http`] when the URL is invalid or the HTTP
    /// client cannot be created.
    pub fn new(config: &SolverConfig) -> Result<Self, SolverError> {
        config.validate().map_err(|err| SolverError::Http(err.to_string()))?;
        let url = Url::parse(config.url.trim())
            .map_err(|err| SolverError::Http(format!("invalid solver url: {err}")))?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(Policy::none())
            .build()
            .map_err(|err| SolverError::Http(format!("http client build failed: {err}")))?;
        Ok(Self {
            endpoint: url.to_string(),
            url,
            max_response_bytes: config.max_response_bytes,
            client,
        })
    }
}

impl SolverClient for HttpSolverClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn submit(&self, payload: &Value) -> Result<SolveResponse, SolverError> {
        let body = serde_json::to_vec(payload)
            .map_err(|err| SolverError::Http(format!("request serialization failed: {err}")))?;
        let compressed = gzip_compress(&body)
            .map_err(|err| SolverError::Http(format!("request compression failed: {err}")))?;
        let mut response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .header(CONTENT_ENCODING, "gzip")
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .body(compressed)
            .send()
            .map_err(|err| SolverError::Http(format!("solver request failed: {err}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SolverError::Status {
                status: status.as_u16(),
                body: read_error_excerpt(&mut response),
            });
        }
        let bytes = read_response_limited(&mut response, self.max_response_bytes)?;
        serde_json::from_slice(&bytes)
            .map_err(|err| SolverError::InvalidResponse(err.to_string()))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads the leading bytes of an error body, lossily decoded.
fn read_error_excerpt(response: &mut Response) -> String {
    let mut buf = Vec::new();
    let limit = u64::try_from(MAX_ERROR_BODY_BYTES).unwrap_or(u64::MAX);
    let _ = response.take(limit).read_to_end(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(response: &mut Response, max_bytes: usize) -> Result<Vec<u8>, SolverError> {
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| SolverError::Http("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(SolverError::TooLarge {
            max_bytes,
            actual_bytes: usize::try_from(expected).unwrap_or(usize::MAX),
        });
    }
    let mut buf = Vec::new();
    response
        .take(max_bytes_u64.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|err| SolverError::Http(format!("failed to read response: {err}")))?;
    if buf.len() > max_bytes {
        return Err(SolverError::TooLarge {
            max_bytes,
            actual_bytes: buf.len(),
        });
    }
    Ok(buf)
}
