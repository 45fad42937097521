//! Authenticated request gateway for the farm-management REST API.
//!
//! One shared `reqwest` client bound to a single base URL. Every call
//! returns the parsed JSON payload directly; status-code semantics are left
//! to callers.

mod error;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::records::ImageUpload;
use crate::util::{is_http_url, normalize_text_option};

pub use error::RequestError;
use error::parse_api_error;

/// HTTP verbs accepted by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Shared transport for all API calls.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Builds a client for an explicit API base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, RequestError> {
        let base_url = normalize_base_url(base_url.into())?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|error| RequestError::Transport(error.to_string()))?;

        Ok(Self { base_url, client })
    }

    /// Returns the base URL this client was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a request and return the response payload.
    ///
    /// `body` is sent as JSON for mutating verbs and as query parameters for
    /// GET. The bearer header is attached only when `token` is non-blank.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Value, RequestError> {
        tracing::debug!(?method, path, "Sending API request");

        let mut request = self.client.request(method.as_reqwest(), self.url(path));
        request = match (method, body) {
            (Method::Get, Some(params)) => request.query(&query_pairs(params)?),
            (Method::Post | Method::Put | Method::Patch, Some(payload)) => request.json(payload),
            (Method::Post | Method::Put | Method::Patch, None) => {
                request.json(&Value::Object(serde_json::Map::new()))
            }
            (Method::Delete, Some(payload)) if !is_empty_payload(payload) => request.json(payload),
            _ => request,
        };

        let response = authorize(request, token)
            .send()
            .await
            .map_err(|error| RequestError::Transport(error.to_string()))?;
        read_payload(response).await
    }

    /// Issue a request and decode the payload into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<T, RequestError> {
        let payload = self.request(method, path, body, token).await?;
        serde_json::from_value(payload).map_err(|error| RequestError::Decode(error.to_string()))
    }

    pub async fn get(
        &self,
        path: &str,
        params: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Value, RequestError> {
        self.request(Method::Get, path, params, token).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: &Value,
        token: Option<&str>,
    ) -> Result<Value, RequestError> {
        self.request(Method::Post, path, Some(body), token).await
    }

    pub async fn put(
        &self,
        path: &str,
        body: &Value,
        token: Option<&str>,
    ) -> Result<Value, RequestError> {
        self.request(Method::Put, path, Some(body), token).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<Value, RequestError> {
        self.request(Method::Delete, path, None, token).await
    }

    /// POST a multipart form with text fields and one file part.
    pub async fn upload(
        &self,
        path: &str,
        fields: Vec<(String, String)>,
        file_field: &str,
        file: &ImageUpload,
        token: Option<&str>,
    ) -> Result<Value, RequestError> {
        tracing::debug!(path, file = %file.file_name(), "Sending multipart upload");

        let file_part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name())
            .mime_str(&file.mime_type())
            .map_err(|error| RequestError::Invalid(error.to_string()))?;
        let form = fields
            .into_iter()
            .fold(multipart::Form::new(), |form, (name, value)| {
                form.text(name, value)
            })
            .part(file_field.to_string(), file_part);

        let request = self.client.post(self.url(path)).multipart(form);
        let response = authorize(request, token)
            .send()
            .await
            .map_err(|error| RequestError::Transport(error.to_string()))?;
        read_payload(response).await
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim();
        if path.is_empty() {
            return self.base_url.clone();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn authorize(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token.filter(|token| !token.trim().is_empty()) {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

async fn read_payload(response: Response) -> Result<Value, RequestError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|error| RequestError::Transport(error.to_string()))?;

    if !status.is_success() {
        let detail = parse_api_error(status.as_u16(), &body);
        tracing::debug!(status = status.as_u16(), %detail, "API request failed");
        return Err(RequestError::Server {
            status: status.as_u16(),
            detail,
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|error| RequestError::Decode(error.to_string()))
}

fn query_pairs(params: &Value) -> Result<Vec<(String, String)>, RequestError> {
    match params {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => Ok(map
            .iter()
            .filter_map(|(name, value)| {
                let rendered = match value {
                    Value::Null => return None,
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                Some((name.clone(), rendered))
            })
            .collect()),
        _ => Err(RequestError::Invalid(
            "GET parameters must be a JSON object".to_string(),
        )),
    }
}

fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn normalize_base_url(raw: String) -> Result<String, RequestError> {
    let url = normalize_text_option(Some(raw))
        .ok_or_else(|| RequestError::Invalid("API base URL must not be empty".to_string()))?;
    if !is_http_url(&url) {
        return Err(RequestError::Invalid(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(url.trim_end_matches('/').to_string())
}
