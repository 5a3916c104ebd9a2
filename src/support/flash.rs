//! Flash messages: notices that survive exactly one redirect.
//!
//! A [`FlashBag`] lives for one request. It holds the messages left by the
//! previous request (`incoming`) and the ones this request wants shown on
//! the next (`outgoing`). A [`FlashStore`] moves them between requests.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::http::{Request, Response};

pub const DEFAULT_COOKIE_NAME: &str = "trellis_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

/// Request-scoped flash messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashBag {
    incoming: Vec<FlashMessage>,
    outgoing: Vec<FlashMessage>,
}

impl FlashBag {
    pub fn with_incoming(incoming: Vec<FlashMessage>) -> Self {
        Self {
            incoming,
            outgoing: Vec::new(),
        }
    }

    /// Messages left by the previous request.
    pub fn incoming(&self) -> &[FlashMessage] {
        &self.incoming
    }

    /// Messages queued for the next request.
    pub fn outgoing(&self) -> &[FlashMessage] {
        &self.outgoing
    }

    pub fn push(&mut self, level: FlashLevel, message: impl Into<String>) {
        self.outgoing.push(FlashMessage {
            level,
            message: message.into(),
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(FlashLevel::Success, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(FlashLevel::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(FlashLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(FlashLevel::Error, message);
    }

    /// Carry the incoming messages over to the next request as well.
    pub fn reflash(&mut self) {
        let incoming = self.incoming.clone();
        self.outgoing.extend(incoming);
    }
}

/// Moves flash messages from one request to the next.
pub trait FlashStore: Send + Sync {
    /// All messages pending for this request.
    fn load(&self, request: &Request) -> Vec<FlashMessage>;

    /// Store `bag`'s outgoing messages on `response`, clearing the
    /// consumed incoming ones.
    fn persist(&self, bag: &FlashBag, response: &mut Response);
}

/// Keeps flash messages in a cookie as percent-encoded JSON.
#[derive(Debug, Clone)]
pub struct CookieFlashStore {
    cookie: String,
}

impl Default for CookieFlashStore {
    fn default() -> Self {
        Self::new(DEFAULT_COOKIE_NAME)
    }
}

impl CookieFlashStore {
    pub fn new(cookie: &str) -> Self {
        Self {
            cookie: cookie.to_string(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie
    }

    fn set_cookie(&self, response: &mut Response, value: &str, max_age: Option<u32>) {
        let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", self.cookie, value);
        if let Some(age) = max_age {
            cookie.push_str(&format!("; Max-Age={age}"));
        }
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "Flash cookie not representable as a header"),
        }
    }
}

impl FlashStore for CookieFlashStore {
    fn load(&self, request: &Request) -> Vec<FlashMessage> {
        let Some(raw) = request
            .headers()
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie)
            .map(|(_, value)| value)
        else {
            return Vec::new();
        };

        let decoded = match urlencoding::decode(raw) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring malformed flash cookie");
                return Vec::new();
            }
        };
        match serde_json::from_str(&decoded) {
            Ok(messages) => messages,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring malformed flash cookie");
                Vec::new()
            }
        }
    }

    fn persist(&self, bag: &FlashBag, response: &mut Response) {
        if !bag.outgoing().is_empty() {
            match serde_json::to_string(bag.outgoing()) {
                Ok(json) => {
                    let encoded = urlencoding::encode(&json);
                    self.set_cookie(response, &encoded, None);
                }
                Err(e) => tracing::warn!(error = %e, "Flash messages not serializable"),
            }
        } else if !bag.incoming().is_empty() {
            self.set_cookie(response, "", Some(0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::HeaderName;

    fn cookie_from(response: &Response) -> String {
        let header = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        header.split(';').next().unwrap().to_string()
    }

    #[test]
    fn test_round_trip_through_cookie() {
        let store = CookieFlashStore::default();

        let mut bag = FlashBag::default();
        bag.success("Thanks; we'll be in touch");
        bag.error("Ünïcode = fine");
        let mut response = Response::redirect("/contact");
        store.persist(&bag, &mut response);

        let request = Request::get("/contact").with_header(
            HeaderName::from_static("cookie"),
            HeaderValue::from_str(&format!("other=1; {}", cookie_from(&response))).unwrap(),
        );
        let loaded = store.load(&request);
        assert_eq!(loaded, bag.outgoing());
    }

    #[test]
    fn test_consumed_messages_are_cleared() {
        let store = CookieFlashStore::default();
        let bag = FlashBag::with_incoming(vec![FlashMessage {
            level: FlashLevel::Info,
            message: "hello".into(),
        }]);
        let mut response = Response::text("ok");
        store.persist(&bag, &mut response);

        let header = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(header.starts_with("trellis_flash=;"));
        assert!(header.contains("Max-Age=0"));
    }

    #[test]
    fn test_nothing_to_do_sets_no_cookie() {
        let store = CookieFlashStore::default();
        let mut response = Response::text("ok");
        store.persist(&FlashBag::default(), &mut response);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[test]
    fn test_malformed_cookie_is_ignored() {
        let store = CookieFlashStore::default();
        let request = Request::get("/").with_header(
            HeaderName::from_static("cookie"),
            HeaderValue::from_static("trellis_flash=%7Bnot-json"),
        );
        assert!(store.load(&request).is_empty());
    }

    #[test]
    fn test_reflash_keeps_incoming() {
        let mut bag = FlashBag::with_incoming(vec![FlashMessage {
            level: FlashLevel::Warning,
            message: "again".into(),
        }]);
        bag.reflash();
        assert_eq!(bag.outgoing(), bag.incoming());
    }
}
