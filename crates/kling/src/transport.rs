//! The HTTP capability the SDK is built on.
//!
//! [`AsyncTransport`] and [`Transport`] are the seams: the accessor and the
//! clients only ever see `ApiRequest -> ApiResponse`. Credential headers are
//! attached here and nowhere else.

use std::sync::Arc;

use async_trait::async_trait;
use kling_proto::{Envelope, KlingError, Result};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;

use crate::auth::Credentials;
use crate::config::KlingConfig;

/// One call against the API, relative to the base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }
}

/// Raw HTTP outcome: status code and undecoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn into_envelope(self) -> Result<Envelope> {
        Envelope::decode(self.status, &self.body)
    }
}

/// Non-blocking transport, used by [`crate::KlingClient`].
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Thread-blocking transport, used by [`crate::blocking::KlingClient`].
pub trait Transport: Send + Sync {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}

#[async_trait]
impl<T: AsyncTransport + ?Sized> AsyncTransport for Arc<T> {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        (**self).execute(request).await
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        (**self).execute(request)
    }
}

/// Base URL plus credentials; shared by both reqwest transports.
#[derive(Debug, Clone)]
struct Endpoint {
    base_url: String,
    credentials: Credentials,
}

impl Endpoint {
    fn new(base_url: &str, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// [`AsyncTransport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    endpoint: Endpoint,
}

impl ReqwestTransport {
    pub fn new(config: &KlingConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(KlingError::transport)?;
        Ok(Self::with_client(client, &config.base_url, config.credentials()))
    }

    /// Reuse an existing client (and its connection pool).
    pub fn with_client(client: reqwest::Client, base_url: &str, credentials: Credentials) -> Self {
        Self {
            client,
            endpoint: Endpoint::new(base_url, credentials),
        }
    }
}

#[async_trait]
impl AsyncTransport for ReqwestTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.endpoint.url(&request.path);
        debug!(method = %request.method, %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method, &url)
            .header(AUTHORIZATION, self.endpoint.credentials.authorization()?)
            .header(CONTENT_TYPE, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(KlingError::transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(KlingError::transport)?;
        debug!(status, bytes = body.len(), "Received response");

        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// [`Transport`] backed by `reqwest::blocking::Client`.
///
/// Must not be created or used from inside an async runtime.
#[derive(Debug, Clone)]
pub struct BlockingReqwestTransport {
    client: reqwest::blocking::Client,
    endpoint: Endpoint,
}

impl BlockingReqwestTransport {
    pub fn new(config: &KlingConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(KlingError::transport)?;
        Ok(Self::with_client(client, &config.base_url, config.credentials()))
    }

    pub fn with_client(
        client: reqwest::blocking::Client,
        base_url: &str,
        credentials: Credentials,
    ) -> Self {
        Self {
            client,
            endpoint: Endpoint::new(base_url, credentials),
        }
    }
}

impl Transport for BlockingReqwestTransport {
    fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.endpoint.url(&request.path);
        debug!(method = %request.method, %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method, &url)
            .header(AUTHORIZATION, self.endpoint.credentials.authorization()?)
            .header(CONTENT_TYPE, "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().map_err(KlingError::transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(KlingError::transport)?;
        debug!(status, bytes = body.len(), "Received response");

        Ok(ApiResponse {
            status,
            body: body.to_vec(),
        })
    }
}
