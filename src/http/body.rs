//! Request payload decoding.
//!
//! External collaborator of the pipeline: buffering already happened at the
//! wire parser, this module only interprets the bytes per content type.

use std::collections::HashMap;

use anyhow::Context;
use bytes::Bytes;

/// A decoded request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// No payload, or a non-mutating verb.
    Empty,
    /// Payload of an unrecognized content type, kept verbatim.
    Raw(Bytes),
    /// `application/json` payload.
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` payload.
    Form(HashMap<String, String>),
}

impl Body {
    /// Decodes a buffered payload according to its declared content type.
    ///
    /// A malformed JSON payload is an error; the pipeline routes it into the
    /// error handlers rather than crashing the request task.
    pub fn parse(content_type: Option<&str>, bytes: &[u8]) -> anyhow::Result<Body> {
        if bytes.is_empty() {
            return Ok(Body::Empty);
        }

        let content_type = content_type.unwrap_or("");

        if content_type.starts_with("application/json") {
            let value = serde_json::from_slice(bytes).context("invalid JSON request body")?;
            return Ok(Body::Json(value));
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let pairs = url::form_urlencoded::parse(bytes)
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            return Ok(Body::Form(pairs));
        }

        Ok(Body::Raw(Bytes::copy_from_slice(bytes)))
    }

    /// Returns the JSON value if this body was decoded as JSON.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the form map if this body was decoded as a urlencoded form.
    pub fn as_form(&self) -> Option<&HashMap<String, String>> {
        match self {
            Body::Form(pairs) => Some(pairs),
            _ => None,
        }
    }
}
