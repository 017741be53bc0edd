//! Fetch Model
//!
//! Request/response types routed by the policy, and the backend seam the
//! host adapter implements to perform real network fetches.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// HTTP request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Default for Method {
    fn default() -> Self {
        Self::Get
    }
}

impl Method {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

/// An intercepted request.
///
/// Only GET requests to the application's own origin are ever cached; the
/// policy routes everything else back to the host untouched.
#[derive(Debug, Clone)]
pub struct Request {
    /// Request URL (root-relative or absolute)
    pub url: String,
    /// HTTP method
    pub method: Method,
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Request body (if any)
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Create a new GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Create a request with an explicit method
    pub fn with_method(url: impl Into<String>, method: Method) -> Self {
        Self {
            method,
            ..Self::get(url)
        }
    }
}

/// Response type as seen by the cache.
///
/// Only `Basic` (same-origin, non-redirected) responses are eligible for
/// the static cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// Same-origin response
    Basic,
    /// Cross-origin response with CORS headers
    Cors,
    /// Cross-origin response without readable details
    Opaque,
    /// Redirect the caller never sees through
    OpaqueRedirect,
    /// Network-level error response
    Error,
}

impl Default for ResponseType {
    fn default() -> Self {
        Self::Basic
    }
}

/// A fetched response, or a stored snapshot of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response type
    pub response_type: ResponseType,
    /// Final URL
    pub url: String,
    /// Whether a redirect was followed
    pub redirected: bool,
    /// Status code
    pub status: u16,
    /// Status text
    pub status_text: String,
    /// Response headers
    pub headers: BTreeMap<String, String>,
    /// Response body
    pub body: Option<Vec<u8>>,
}

impl Response {
    /// Create a new response
    pub fn new(status: u16) -> Self {
        Self {
            response_type: ResponseType::Basic,
            url: String::new(),
            redirected: false,
            status,
            status_text: status_text_for(status).to_string(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Create a response with a body
    pub fn with_body(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let mut response = Self::new(status);
        response.body = Some(body.into());
        response
    }

    /// Check if the status indicates success
    pub fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Get status text for status code
fn status_text_for(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Network fetch error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No connectivity
    Offline,
    /// The fetch failed for another reason
    Failed(String),
}

/// Network backend seam.
///
/// Implemented by the host adapter; a single attempt per call, no retries.
/// A hung fetch blocks only the request that issued it.
pub trait FetchBackend: Send + Sync {
    /// Perform a network fetch
    fn fetch(&self, request: &Request) -> Result<Response, FetchError>;
}

impl<T: FetchBackend> FetchBackend for alloc::sync::Arc<T> {
    fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        (**self).fetch(request)
    }
}

/// Check whether a URL belongs to the application's own origin.
///
/// Root-relative URLs are same-origin by construction; protocol-relative
/// URLs (`//host/...`) are not.
pub fn is_same_origin(url: &str, origin: &str) -> bool {
    if url.starts_with("//") {
        return false;
    }
    if url.starts_with('/') {
        return true;
    }
    if origin.is_empty() {
        return false;
    }
    match url.strip_prefix(origin) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

/// Reduce a same-origin URL to its origin-relative form.
pub fn origin_relative<'a>(url: &'a str, origin: &str) -> &'a str {
    if origin.is_empty() {
        return url;
    }
    match url.strip_prefix(origin) {
        Some(rest) if rest.is_empty() => "/",
        Some(rest) => rest,
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_as_str() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Post.as_str(), "POST");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }

    #[test]
    fn test_request_get() {
        let req = Request::get("/api/words");
        assert_eq!(req.url, "/api/words");
        assert_eq!(req.method, Method::Get);
        assert!(req.body.is_none());
    }

    #[test]
    fn test_request_with_method() {
        let req = Request::with_method("/api/session", Method::Post);
        assert_eq!(req.method, Method::Post);
    }

    #[test]
    fn test_response_ok_range() {
        assert!(Response::new(200).ok());
        assert!(Response::new(204).ok());
        assert!(!Response::new(304).ok());
        assert!(!Response::new(404).ok());
        assert!(!Response::new(500).ok());
    }

    #[test]
    fn test_response_status_text() {
        assert_eq!(Response::new(200).status_text, "OK");
        assert_eq!(Response::new(404).status_text, "Not Found");
        assert_eq!(Response::new(418).status_text, "Unknown");
    }

    #[test]
    fn test_response_with_body() {
        let resp = Response::with_body(200, b"hello".as_slice());
        assert_eq!(resp.body.as_deref(), Some(b"hello".as_slice()));
    }

    #[test]
    fn test_same_origin_root_relative() {
        assert!(is_same_origin("/index.html", ""));
        assert!(is_same_origin("/api/x", "https://trainer.example.com"));
    }

    #[test]
    fn test_same_origin_absolute() {
        let origin = "https://trainer.example.com";
        assert!(is_same_origin("https://trainer.example.com/app.js", origin));
        assert!(is_same_origin("https://trainer.example.com", origin));
        assert!(!is_same_origin("https://cdn.example.com/font.woff2", origin));
    }

    #[test]
    fn test_same_origin_protocol_relative_rejected() {
        assert!(!is_same_origin("//cdn.example.com/font.woff2", ""));
        assert!(!is_same_origin(
            "//trainer.example.com/app.js",
            "https://trainer.example.com"
        ));
    }

    #[test]
    fn test_same_origin_prefix_confusion() {
        // An origin that is a string prefix of another host must not match.
        let origin = "https://trainer.example.com";
        assert!(!is_same_origin("https://trainer.example.com.evil.io/x", origin));
    }

    #[test]
    fn test_origin_relative() {
        let origin = "https://trainer.example.com";
        assert_eq!(
            origin_relative("https://trainer.example.com/api/x", origin),
            "/api/x"
        );
        assert_eq!(origin_relative("https://trainer.example.com", origin), "/");
        assert_eq!(origin_relative("/static/css/main.css", origin), "/static/css/main.css");
    }
}
