//! Middleware chain.
//!
//! # Design Decisions
//! - Effective chain = global + group + route middleware, outermost first
//! - A middleware short-circuits by returning without calling `next`
//! - The chain borrows the route's middleware; nothing is cloned per link

use std::sync::Arc;

use crate::http::{HandlerResult, RequestContext};
use crate::routing::action::Handler;

/// A request interceptor wrapped around the route action.
pub trait Middleware: Send + Sync {
    fn handle(&self, cx: &mut RequestContext, next: Next<'_>) -> HandlerResult;
}

/// The remainder of the chain after the current middleware.
pub struct Next<'a> {
    stack: &'a [Arc<dyn Middleware>],
    handler: &'a Handler,
}

impl<'a> Next<'a> {
    pub(crate) fn new(stack: &'a [Arc<dyn Middleware>], handler: &'a Handler) -> Self {
        Self { stack, handler }
    }

    /// Run the next middleware, or the action when none remain.
    pub fn run(self, cx: &mut RequestContext) -> HandlerResult {
        match self.stack.split_first() {
            Some((head, rest)) => head.handle(cx, Next::new(rest, self.handler)),
            None => (self.handler)(cx),
        }
    }
}

/// Middleware built from a closure, see [`from_fn`].
pub struct FromFn<F>(F);

impl<F> Middleware for FromFn<F>
where
    F: for<'a> Fn(&mut RequestContext, Next<'a>) -> HandlerResult + Send + Sync,
{
    fn handle(&self, cx: &mut RequestContext, next: Next<'_>) -> HandlerResult {
        (self.0)(cx, next)
    }
}

/// Wrap a closure as middleware.
pub fn from_fn<F>(f: F) -> Arc<dyn Middleware>
where
    F: for<'a> Fn(&mut RequestContext, Next<'a>) -> HandlerResult + Send + Sync + 'static,
{
    Arc::new(FromFn(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Request, Response};
    use std::sync::Mutex;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Arc<dyn Middleware> {
        let log = Arc::clone(log);
        from_fn(move |cx, next| {
            log.lock().unwrap().push(format!("enter {tag}"));
            let response = next.run(cx);
            log.lock().unwrap().push(format!("leave {tag}"));
            response
        })
    }

    #[test]
    fn test_chain_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let stack = vec![recorder(&log, "outer"), recorder(&log, "inner")];
        let handler_log = Arc::clone(&log);
        let handler: Handler = Arc::new(move |_cx: &mut RequestContext| -> HandlerResult {
            handler_log.lock().unwrap().push("action".to_string());
            Ok(Response::text("ok"))
        });

        let mut cx = RequestContext::new(Request::get("/"));
        Next::new(&stack, &handler).run(&mut cx).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["enter outer", "enter inner", "action", "leave inner", "leave outer"]
        );
    }

    #[test]
    fn test_short_circuit() {
        let stack = vec![from_fn(|_cx, _next| Ok(Response::text("blocked")))];
        let handler: Handler = Arc::new(|_cx: &mut RequestContext| -> HandlerResult {
            panic!("action must not run")
        });

        let mut cx = RequestContext::new(Request::get("/"));
        let response = Next::new(&stack, &handler).run(&mut cx).unwrap();
        assert_eq!(response.body_text(), Some("blocked"));
    }
}
