//! Fetch Primitives
//!
//! Request/response types, fetch events, and the network interface the
//! proxy consumes.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use super::events::EventType;

/// Fetch event ID counter
static NEXT_FETCH_ID: AtomicU64 = AtomicU64::new(1);

/// Fetch event ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchEventId(u64);

impl FetchEventId {
    /// Create a new ID
    pub fn new() -> Self {
        Self(NEXT_FETCH_ID.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for FetchEventId {
    fn default() -> Self {
        Self::new()
    }
}

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
    /// Convert to string representation
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

/// Network error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Network unreachable.
    NetworkUnreachable,
    /// Host unreachable.
    HostUnreachable,
    /// Connection refused.
    ConnectionRefused,
    /// Connection reset.
    ConnectionReset,
    /// Connection timed out.
    TimedOut,
    /// DNS resolution failed.
    DnsError(String),
    /// Invalid address.
    InvalidAddress,
}

/// An outbound request
#[derive(Debug, Clone)]
pub struct Request {
    /// Request URL
    pub url: String,
    /// HTTP method
    pub method: Method,
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Request body (if any)
    pub body: Option<Vec<u8>>,
    /// Issuing client ID
    pub client_id: Option<String>,
}

impl Request {
    /// Create a new GET request
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: BTreeMap::new(),
            body: None,
            client_id: None,
        }
    }

    /// Attribute the request to an issuing client
    pub fn with_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Path component of the request URL
    pub fn path(&self) -> String {
        request_path(&self.url)
    }
}

/// A response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Final URL
    pub url: String,
    /// Status code (0 for a network-error response)
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
            url: String::new(),
            status,
            status_text: status_text_for(status).to_string(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Create a response with a body
    pub fn with_body(status: u16, body: Vec<u8>) -> Self {
        let mut response = Self::new(status);
        response.body = Some(body);
        response
    }

    /// The network-error response: status 0, no body
    pub fn error() -> Self {
        Self {
            url: String::new(),
            status: 0,
            status_text: String::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Check if the status is in the 2xx range
    pub fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Check if this is the network-error response
    pub fn is_error(&self) -> bool {
        self.status == 0
    }

    /// Clone the response
    pub fn clone_response(&self) -> Self {
        self.clone()
    }

    /// Size of the body in bytes
    pub fn body_size(&self) -> usize {
        self.body.as_ref().map(|b| b.len()).unwrap_or(0)
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
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}

/// Extract the path component of a URL.
///
/// Scheme, host, query, and fragment are ignored; a bare path passes
/// through unchanged, and a URL with no path maps to `/`.
pub fn request_path(url: &str) -> String {
    let mut rest = url;
    if let Some(pos) = rest.find("://") {
        rest = &rest[pos + 3..];
        rest = match rest.find('/') {
            Some(slash) => &rest[slash..],
            None => "/",
        };
    }
    let end = rest.find(&['?', '#'][..]).unwrap_or(rest.len());
    let path = &rest[..end];
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

/// The network interface the proxy consumes.
///
/// One call is exactly one attempt. Transport failures are errors;
/// non-2xx statuses are still responses.
pub trait Network: Send + Sync {
    /// Fetch a request from the network
    fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}

/// Fetch event
#[derive(Debug)]
pub struct FetchEvent {
    /// Event ID
    id: FetchEventId,
    /// Request
    request: Request,
    /// Issuing client
    client_id: Option<String>,
    /// Whether respond_with was called
    responded: bool,
    /// Response (if respond_with was called)
    response: Option<Response>,
}

impl FetchEvent {
    /// Create a new fetch event
    pub fn new(request: Request) -> Self {
        let client_id = request.client_id.clone();
        Self {
            id: FetchEventId::new(),
            request,
            client_id,
            responded: false,
            response: None,
        }
    }

    /// Get the event ID
    pub fn id(&self) -> FetchEventId {
        self.id
    }

    /// Get the issuing client
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Get the event type
    pub fn event_type(&self) -> EventType {
        EventType::Fetch
    }

    /// Get the request
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Check if respond_with was called
    pub fn responded(&self) -> bool {
        self.responded
    }

    /// Respond with a response. The first call wins; later calls are ignored.
    pub fn respond_with(&mut self, response: Response) {
        if !self.responded {
            self.responded = true;
            self.response = Some(response);
        }
    }

    /// Take the response out of the event
    pub fn take_response(&mut self) -> Option<Response> {
        self.response.take()
    }
}
