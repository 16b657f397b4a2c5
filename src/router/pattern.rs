//! Path pattern matching.

use std::collections::HashMap;

/// A segment in a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A literal string segment. May be empty (consecutive slashes).
    Literal(String),
    /// A named parameter segment (e.g., `:id`).
    Param(String),
}

/// A parsed route pattern.
///
/// Matching compares `/`-split segments positionally: counts must be equal,
/// literals must be identical, and `:name` segments bind the percent-decoded
/// request segment. There is no partial-length matching and no
/// trailing-slash normalization.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parses a pattern string.
    ///
    /// # Example
    ///
    /// ```
    /// use junction::router::PathPattern;
    ///
    /// let pattern = PathPattern::parse("/users/:id");
    /// let params = pattern.match_path("/users/42").unwrap();
    /// assert_eq!(params.get("id").map(String::as_str), Some("42"));
    /// assert!(pattern.match_path("/users").is_none());
    /// ```
    pub fn parse(pattern: &str) -> Self {
        // Empty segments are kept: they are literals that must match
        // positionally, so "//a" and "/a" are different shapes.
        let segments = pattern
            .split('/')
            .map(|part| match part.strip_prefix(':') {
                Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                _ => Segment::Literal(part.to_string()),
            })
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    /// Attempts to match a request path against this pattern.
    ///
    /// Returns the bound parameters on a match, `None` otherwise. Never
    /// fails: any shape mismatch is simply no-match.
    pub fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let mut parts = path.split('/');
        let mut params = HashMap::new();

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(lit) => {
                    if lit != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), decode_segment(part));
                }
            }
        }

        // Segment counts must be equal; a leftover request segment is a miss.
        if parts.next().is_some() {
            return None;
        }

        Some(params)
    }

    /// Returns the original pattern string.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// Percent-decodes one path segment, falling back to the raw text when the
/// encoding is invalid.
fn decode_segment(part: &str) -> String {
    urlencoding::decode(part)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| part.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_segments_bind_decoded_values() {
        let pattern = PathPattern::parse("/files/:name");
        let params = pattern.match_path("/files/a%20b").unwrap();
        assert_eq!(params.get("name").map(String::as_str), Some("a b"));
    }

    #[test]
    fn empty_segments_are_literals() {
        let pattern = PathPattern::parse("//a");
        assert!(pattern.match_path("//a").is_some());
        assert!(pattern.match_path("/a").is_none());
    }
}
