use std::collections::HashMap;

use bytes::Bytes;
use futures_util::{StreamExt, stream::BoxStream};
use reqwest::{Method, Response};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{self, TransportError};

/// HTTP method for API endpoints
#[derive(Debug, Clone, Copy)]
pub enum HttpMethod {
    Get,
    Post,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }
}

/// Where the API key goes for a given provider family
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// Bearer token authentication (Authorization: Bearer <key>)
    Bearer(String),
    /// Query parameter authentication (e.g. ?key=<key>)
    QueryParam(String, String),
}

/// Represents an API endpoint with its configuration
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub path: String,
    pub method: HttpMethod,
    pub query_params: Vec<(String, String)>,
}

impl Endpoint {
    pub fn new(path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            path: path.into(),
            method,
            query_params: Vec::new(),
        }
    }

    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }
}

/// Configuration for request building
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub base_url: String,
    pub auth: Option<AuthMethod>,
    pub default_headers: HashMap<String, String>,
}

impl RequestConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth: None,
            default_headers: HashMap::new(),
        }
    }

    pub fn with_auth(mut self, auth: AuthMethod) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }
}

/// Generic request builder that handles the HTTP patterns shared by both
/// provider families.
pub struct RequestBuilder {
    client: reqwest::Client,
    config: RequestConfig,
}

impl RequestBuilder {
    pub fn new(client: reqwest::Client, config: RequestConfig) -> Self {
        Self { client, config }
    }

    /// Build a reqwest RequestBuilder for the given endpoint
    pub fn build_request(&self, endpoint: &Endpoint) -> reqwest::RequestBuilder {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.path.trim_start_matches('/')
        );

        let mut req = self.client.request(endpoint.method.into(), &url);

        if !endpoint.query_params.is_empty() {
            req = req.query(&endpoint.query_params);
        }

        if let Some(auth) = &self.config.auth {
            req = match auth {
                AuthMethod::Bearer(token) => req.bearer_auth(token),
                AuthMethod::QueryParam(name, value) => req.query(&[(name, value)]),
            };
        }

        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }

        if matches!(endpoint.method, HttpMethod::Post) {
            req = req.header("content-type", "application/json");
        }

        req
    }

    /// Execute a request with an optional JSON body and return the
    /// deserialized response
    pub async fn request_json<T, B>(
        &self,
        endpoint: &Endpoint,
        body: Option<&B>,
    ) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut req = self.build_request(endpoint);
        if let Some(body) = body {
            req = req.json(body);
        }
        let res = req.send().await?;
        Self::handle_response(res).await
    }

    /// Open a streaming request: send the body, check the status, and hand
    /// back the response byte stream. A non-2xx status is fatal and carries
    /// the provider's error message when one can be extracted.
    pub async fn open_stream<B>(
        &self,
        endpoint: &Endpoint,
        body: &B,
    ) -> Result<BoxStream<'static, Result<Bytes, TransportError>>, TransportError>
    where
        B: Serialize + ?Sized,
    {
        let response = self.build_request(endpoint).json(body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let bytes = response.bytes().await?;
            return Err(error::parse_error_response(status, bytes));
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(TransportError::from))
            .boxed())
    }

    /// Handle a buffered response and parse errors
    async fn handle_response<T: DeserializeOwned>(res: Response) -> Result<T, TransportError> {
        let status = res.status();
        let bytes = res.bytes().await?;

        if status.is_success() {
            serde_json::from_slice(&bytes).map_err(|e| {
                TransportError::UnexpectedResponse(format!(
                    "HTTP {} but failed to decode JSON: {}",
                    status.as_u16(),
                    e
                ))
            })
        } else {
            Err(error::parse_error_response(status, bytes))
        }
    }
}
