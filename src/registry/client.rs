//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Fixed per-call timeout and User-Agent
//! - Exponential backoff retry logic for transport errors and rate limits
//! - Optional per-request Authorization header

use crate::config::HTTP_TIMEOUT;
use crate::error::CollaboratorError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Default User-Agent header (GitHub rejects requests without one)
const DEFAULT_USER_AGENT: &str = concat!("depwise/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 2;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, CollaboratorError> {
        Self::with_config(HTTP_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, CollaboratorError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                CollaboratorError::network_error(
                    "",
                    "HTTP client",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Perform a GET request with retry logic and error context
    ///
    /// 404 maps to [`CollaboratorError::NotFound`] without retrying.
    pub async fn get_with_context(
        &self,
        url: &str,
        resource: &str,
        service: &str,
        authorization: Option<&str>,
    ) -> Result<reqwest::Response, CollaboratorError> {
        let headers = build_headers(authorization);
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            match self.client.get(url).headers(headers.clone()).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(CollaboratorError::rate_limit_exceeded(service));
                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(delay)).await;
                            delay *= 2;
                            continue;
                        }
                        break;
                    }

                    if status == StatusCode::NOT_FOUND {
                        return Err(CollaboratorError::not_found(resource, service));
                    }

                    if !status.is_success() {
                        return Err(CollaboratorError::network_error(
                            resource,
                            service,
                            format!("HTTP {}", status),
                        ));
                    }

                    return Ok(response);
                }
                Err(e) => {
                    last_error = Some(if e.is_timeout() {
                        CollaboratorError::timeout(resource, service)
                    } else {
                        CollaboratorError::network_error(resource, service, e.to_string())
                    });

                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            CollaboratorError::network_error(resource, service, "unknown error")
        }))
    }

    /// Perform a GET request and parse the JSON response
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        resource: &str,
        service: &str,
        authorization: Option<&str>,
    ) -> Result<T, CollaboratorError> {
        let response = self
            .get_with_context(url, resource, service, authorization)
            .await?;

        response.json::<T>().await.map_err(|e| {
            CollaboratorError::invalid_response(
                resource,
                service,
                format!("failed to parse JSON: {}", e),
            )
        })
    }

    /// Perform a GET request and return the body as text
    pub async fn get_text(
        &self,
        url: &str,
        resource: &str,
        service: &str,
    ) -> Result<String, CollaboratorError> {
        let response = self.get_with_context(url, resource, service, None).await?;

        response.text().await.map_err(|e| {
            CollaboratorError::invalid_response(
                resource,
                service,
                format!("failed to get text response: {}", e),
            )
        })
    }
}

fn build_headers(authorization: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(value) = authorization.and_then(|v| HeaderValue::from_str(v).ok()) {
        headers.insert(AUTHORIZATION, value);
    }
    headers
}
