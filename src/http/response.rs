use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::http::mime;
use crate::static_files::StaticOptions;

/// HTTP status codes emitted by the engine and its handlers.
///
/// Common HTTP status codes used in responses:
/// - `Ok` (200): Request successful
/// - `NotFound` (404): Resource not found
/// - `InternalServerError` (500): Server error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 202 Accepted
    Accepted,
    /// 204 No Content
    NoContent,
    /// 301 Moved Permanently
    MovedPermanently,
    /// 302 Found
    Found,
    /// 304 Not Modified
    NotModified,
    /// 400 Bad Request
    BadRequest,
    /// 401 Unauthorized
    Unauthorized,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 409 Conflict
    Conflict,
    /// 413 Payload Too Large
    PayloadTooLarge,
    /// 422 Unprocessable Entity
    UnprocessableEntity,
    /// 500 Internal Server Error
    InternalServerError,
    /// 503 Service Unavailable
    ServiceUnavailable,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use junction::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::Accepted => 202,
            StatusCode::NoContent => 204,
            StatusCode::MovedPermanently => 301,
            StatusCode::Found => 302,
            StatusCode::NotModified => 304,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::Conflict => 409,
            StatusCode::PayloadTooLarge => 413,
            StatusCode::UnprocessableEntity => 422,
            StatusCode::InternalServerError => 500,
            StatusCode::ServiceUnavailable => 503,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use junction::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::Accepted => "Accepted",
            StatusCode::NoContent => "No Content",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::Found => "Found",
            StatusCode::NotModified => "Not Modified",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::Conflict => "Conflict",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::UnprocessableEntity => "Unprocessable Entity",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }
}

/// The outbound response, handed mutably through the pipeline.
///
/// Wraps the eventual wire response with convenience state: a settable
/// status code and a single terminal "send" operation. Once a terminating
/// write is issued the response is flagged ended; every later helper call
/// and pipeline stage observes the flag and performs no further writes.
#[derive(Debug)]
pub struct Response {
    /// The HTTP status code. Last write before the terminal send wins.
    pub status: StatusCode,
    /// HTTP headers as key-value pairs
    pub headers: HashMap<String, String>,
    /// Response body as bytes
    pub body: Vec<u8>,
    ended: bool,
}

impl Response {
    /// Creates an open response with the transport default status (200).
    pub fn new() -> Self {
        Self {
            status: StatusCode::Ok,
            headers: HashMap::new(),
            body: Vec::new(),
            ended: false,
        }
    }

    /// True once a terminal write was issued. Pipeline stages check this
    /// before acting; helper methods become no-ops.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Sets the status code. Chainable; no effect once ended.
    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        if !self.ended {
            self.status = status;
        }
        self
    }

    /// Adds or replaces a header. Chainable; no effect once ended.
    ///
    /// # Arguments
    ///
    /// * `key` - Header name (case-insensitive in HTTP)
    /// * `value` - Header value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        if !self.ended {
            self.headers.insert(key.into(), value.into());
        }
        self
    }

    /// Terminal write of a plain-text body.
    ///
    /// Sets `Content-Type: text/plain` unless a type was already set, then
    /// ends the response. A second call is a no-op.
    pub fn send(&mut self, text: impl Into<String>) {
        if self.ended {
            return;
        }
        self.headers
            .entry("Content-Type".to_string())
            .or_insert_with(|| "text/plain; charset=utf-8".to_string());
        self.body = text.into().into_bytes();
        self.ended = true;
    }

    /// Terminal write of a JSON body.
    ///
    /// Serialization failure is reported to the caller so it can travel
    /// through the error pipeline like any other handler error.
    pub fn json<T: Serialize>(&mut self, value: &T) -> anyhow::Result<()> {
        if self.ended {
            return Ok(());
        }
        let body = serde_json::to_vec(value).context("failed to serialize JSON response")?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.body = body;
        self.ended = true;
        Ok(())
    }

    /// Terminal write of a raw byte body. Leaves Content-Type untouched.
    pub fn send_bytes(&mut self, bytes: Vec<u8>) {
        if self.ended {
            return;
        }
        self.body = bytes;
        self.ended = true;
    }

    /// Terminal write of a file's contents.
    ///
    /// The content type is inferred from the file extension unless the
    /// options carry an override. A missing or unreadable file is an error;
    /// unlike static-mount serving there is no pass-through here.
    pub async fn send_file(
        &mut self,
        path: impl AsRef<Path>,
        options: &StaticOptions,
    ) -> anyhow::Result<()> {
        if self.ended {
            return Ok(());
        }
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read file {}", path.display()))?;

        let content_type = options
            .mime_type
            .clone()
            .unwrap_or_else(|| mime::content_type_for(path).to_string());
        self.set("Content-Type", content_type);
        if let Some(max_age) = options.max_age {
            self.set("Cache-Control", format!("max-age={max_age}"));
        }
        self.send_bytes(bytes);
        Ok(())
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}
