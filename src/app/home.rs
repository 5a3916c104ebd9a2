use serde_json::json;

use crate::http::{HandlerResult, RequestContext, Response};

pub struct HomeController;

impl HomeController {
    pub fn index(&self, _cx: &mut RequestContext) -> HandlerResult {
        Ok(Response::view("home", json!({ "title": "Home" })))
    }
}
