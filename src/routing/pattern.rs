//! URI pattern parsing and matching.
//!
//! # Responsibilities
//! - Parse `/items/{id}/{slug?}` into literal and parameter segments
//! - Match a split request path, applying per-parameter constraints
//! - Build a concrete path back from parameter values
//!
//! # Design Decisions
//! - Empty segments are ignored on both sides, so trailing slashes never matter
//! - Literal comparison is case-sensitive
//! - Optional parameters may be skipped; matching backtracks over them
//! - Captured values are percent-decoded before constraints are applied

use std::borrow::Cow;

use regex::Regex;

use crate::routing::error::{RouteError, UrlError};

/// One `/`-separated piece of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param { name: String, optional: bool },
}

/// Ordered parameters captured by a route match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(Vec<(String, String)>);

impl RouteParams {
    /// Value of a named parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value at a declaration position.
    pub fn position(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<(String, String)>> for RouteParams {
    fn from(params: Vec<(String, String)>) -> Self {
        Self(params)
    }
}

/// A parameter constraint compiled from a `where` clause.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub param: String,
    pub source: String,
    regex: Regex,
}

impl Constraint {
    /// Compile `source` anchored to the whole value.
    pub fn new(param: &str, source: &str) -> Result<Self, RouteError> {
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|e| {
            RouteError::InvalidConstraint {
                param: param.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            param: param.to_string(),
            source: source.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// A parsed URI pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<Self, RouteError> {
        let mut segments = Vec::new();
        let mut seen: Vec<&str> = Vec::new();

        for raw in split_path(pattern) {
            let segment = match raw.strip_prefix('{') {
                Some(rest) => {
                    let inner = rest.strip_suffix('}').ok_or_else(|| RouteError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: format!("unterminated parameter `{raw}`"),
                    })?;
                    let (name, optional) = match inner.strip_suffix('?') {
                        Some(name) => (name, true),
                        None => (inner, false),
                    };
                    if name.is_empty()
                        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                    {
                        return Err(RouteError::InvalidPattern {
                            pattern: pattern.to_string(),
                            reason: format!("invalid parameter name `{name}`"),
                        });
                    }
                    if seen.contains(&name) {
                        return Err(RouteError::DuplicateParameter {
                            pattern: pattern.to_string(),
                            param: name.to_string(),
                        });
                    }
                    seen.push(name);
                    Segment::Param {
                        name: name.to_string(),
                        optional,
                    }
                }
                None if raw.contains('{') || raw.contains('}') => {
                    return Err(RouteError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: format!("parameters must span a whole segment, got `{raw}`"),
                    });
                }
                None => Segment::Literal(raw.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameter names in declaration order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.param_names().any(|p| p == name)
    }

    /// Match already-split path segments.
    pub fn matches(&self, path: &[&str], constraints: &[Constraint]) -> Option<RouteParams> {
        let mut captured = Vec::new();
        if self.match_from(0, path, 0, &mut captured, constraints) {
            Some(RouteParams(captured))
        } else {
            None
        }
    }

    /// Substitute named values into the pattern, percent-encoding them.
    ///
    /// Returns the path and the values the pattern did not consume. Empty
    /// values count as missing.
    pub fn build(
        &self,
        route: &str,
        params: &[(String, String)],
        constraints: &[Constraint],
    ) -> Result<(String, Vec<(String, String)>), UrlError> {
        let mut remaining = params.to_vec();
        let mut parts = Vec::with_capacity(self.segments.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => parts.push(literal.clone()),
                Segment::Param { name, optional } => {
                    let value = remaining
                        .iter()
                        .position(|(k, _)| k == name)
                        .map(|index| remaining.remove(index).1)
                        .filter(|v| !v.is_empty());

                    match value {
                        Some(value) => {
                            if let Some(c) = constraints
                                .iter()
                                .find(|c| &c.param == name && !c.is_match(&value))
                            {
                                return Err(UrlError::InvalidParameter {
                                    route: route.to_string(),
                                    param: name.clone(),
                                    constraint: c.source.clone(),
                                });
                            }
                            parts.push(urlencoding::encode(&value).into_owned());
                        }
                        None if *optional => {}
                        None => {
                            return Err(UrlError::MissingParameter {
                                route: route.to_string(),
                                param: name.clone(),
                            })
                        }
                    }
                }
            }
        }

        Ok((format!("/{}", parts.join("/")), remaining))
    }

    fn match_from(
        &self,
        seg_idx: usize,
        path: &[&str],
        path_idx: usize,
        captured: &mut Vec<(String, String)>,
        constraints: &[Constraint],
    ) -> bool {
        let Some(segment) = self.segments.get(seg_idx) else {
            return path_idx == path.len();
        };

        match segment {
            Segment::Literal(literal) => {
                path.get(path_idx).is_some_and(|p| *p == literal.as_str())
                    && self.match_from(seg_idx + 1, path, path_idx + 1, captured, constraints)
            }
            Segment::Param { name, optional } => {
                if let Some(raw) = path.get(path_idx) {
                    let value = decode_segment(raw);
                    let allowed = constraints
                        .iter()
                        .filter(|c| &c.param == name)
                        .all(|c| c.is_match(&value));
                    if allowed {
                        captured.push((name.clone(), value.into_owned()));
                        if self.match_from(seg_idx + 1, path, path_idx + 1, captured, constraints) {
                            return true;
                        }
                        captured.pop();
                    }
                }
                *optional && self.match_from(seg_idx + 1, path, path_idx, captured, constraints)
            }
        }
    }
}

/// Split a path on `/`, dropping empty segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Join two path fragments with exactly one separator.
pub fn join_paths(prefix: &str, path: &str) -> String {
    let joined: Vec<&str> = split_path(prefix)
        .into_iter()
        .chain(split_path(path))
        .collect();
    format!("/{}", joined.join("/"))
}

fn decode_segment(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, path: &str) -> Option<RouteParams> {
        RoutePattern::parse(pattern)
            .unwrap()
            .matches(&split_path(path), &[])
    }

    #[test]
    fn test_literal_match() {
        assert!(matches("/contact", "/contact").is_some());
        assert!(matches("/contact", "/contact/").is_some());
        assert!(matches("/contact", "/Contact").is_none());
        assert!(matches("/contact", "/contact/extra").is_none());
        assert!(matches("/", "/").is_some());
        assert!(matches("/", "/x").is_none());
    }

    #[test]
    fn test_param_capture() {
        let params = matches("/items/{id}/edit", "/items/42/edit").unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.position(0), Some("42"));
        assert!(matches("/items/{id}/edit", "/items/edit").is_none());
    }

    #[test]
    fn test_param_is_decoded() {
        let params = matches("/tags/{tag}", "/tags/rust%20lang").unwrap();
        assert_eq!(params.get("tag"), Some("rust lang"));
    }

    #[test]
    fn test_optional_param() {
        let pattern = "/posts/{year?}";
        assert_eq!(matches(pattern, "/posts").unwrap().get("year"), None);
        assert_eq!(matches(pattern, "/posts/2024").unwrap().get("year"), Some("2024"));
        assert!(matches(pattern, "/posts/2024/extra").is_none());
    }

    #[test]
    fn test_optional_param_backtracks() {
        let params = matches("/docs/{lang?}/guide", "/docs/guide").unwrap();
        assert!(params.is_empty());
        let params = matches("/docs/{lang?}/guide", "/docs/en/guide").unwrap();
        assert_eq!(params.get("lang"), Some("en"));
    }

    #[test]
    fn test_constraint() {
        let pattern = RoutePattern::parse("/items/{id}").unwrap();
        let digits = [Constraint::new("id", "[0-9]+").unwrap()];
        assert!(pattern.matches(&split_path("/items/42"), &digits).is_some());
        assert!(pattern.matches(&split_path("/items/abc"), &digits).is_none());
        // Anchored to the whole segment.
        assert!(pattern.matches(&split_path("/items/42abc"), &digits).is_none());
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            RoutePattern::parse("/items/{id"),
            Err(RouteError::InvalidPattern { .. })
        ));
        assert!(matches!(
            RoutePattern::parse("/items/x{id}"),
            Err(RouteError::InvalidPattern { .. })
        ));
        assert!(matches!(
            RoutePattern::parse("/a/{id}/b/{id}"),
            Err(RouteError::DuplicateParameter { .. })
        ));
        assert!(matches!(
            Constraint::new("id", "[0-9"),
            Err(RouteError::InvalidConstraint { .. })
        ));
    }

    #[test]
    fn test_build_path() {
        let pattern = RoutePattern::parse("/items/{id}/{slug?}").unwrap();
        let params = vec![
            ("id".to_string(), "4 2".to_string()),
            ("page".to_string(), "2".to_string()),
        ];
        let (path, rest) = pattern.build("items.show", &params, &[]).unwrap();
        assert_eq!(path, "/items/4%202");
        assert_eq!(rest, vec![("page".to_string(), "2".to_string())]);
    }

    #[test]
    fn test_build_errors() {
        let pattern = RoutePattern::parse("/items/{id}").unwrap();
        let digits = [Constraint::new("id", "[0-9]+").unwrap()];
        assert_eq!(
            pattern.build("items.show", &[], &digits),
            Err(UrlError::MissingParameter {
                route: "items.show".into(),
                param: "id".into()
            })
        );
        let bad = vec![("id".to_string(), "abc".to_string())];
        assert!(matches!(
            pattern.build("items.show", &bad, &digits),
            Err(UrlError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_join_paths() {
        assert_eq!(join_paths("/admin/", "/users"), "/admin/users");
        assert_eq!(join_paths("", "/"), "/");
        assert_eq!(join_paths("api", "v1/items"), "/api/v1/items");
    }
}
