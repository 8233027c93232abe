//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `ServiceClient` builds
//! `HttpRequest` values and parses `HttpResponse` values without touching the
//! network; whatever implements [`Transport`] performs the round trip and owns
//! authentication, timeouts and connection pooling.
//!
//! All fields use owned types (`String`, `Vec`) so values can be moved to
//! another thread or recorded by test doubles without lifetime concerns.

use std::sync::Arc;

use crate::error::ApiError;

pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the absolute URL, query string included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub(crate) fn without_body(method: HttpMethod, path: String) -> Self {
        Self {
            method,
            path,
            headers: Vec::new(),
            body: None,
        }
    }

    pub(crate) fn form(method: HttpMethod, path: String, pairs: &[(&str, &str)]) -> Self {
        Self {
            method,
            path,
            headers: vec![("content-type".to_string(), CONTENT_TYPE_FORM.to_string())],
            body: Some(encode_form(pairs)),
        }
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes one request and hands back the raw response.
///
/// Implementations return non-2xx responses as `Ok` data; status
/// interpretation belongs to the `parse_*` methods. `Err` is reserved for
/// requests that produced no response at all.
pub trait Transport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).send(request)
    }
}

/// Encode `key=value` pairs as an `application/x-www-form-urlencoded` body.
pub fn encode_form(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
