//! Reverse URL generation seam.

use crate::routing::error::UrlError;

/// Produces URLs for named routes.
///
/// Implemented by the [`Router`](crate::routing::Router); views and request
/// contexts only see this trait.
pub trait UrlGenerator: Send + Sync {
    fn route_url(
        &self,
        name: &str,
        params: &[(String, String)],
        absolute: bool,
    ) -> Result<String, UrlError>;
}
