//! The bundled application: a home page and a contact form.
//!
//! Controllers are registered as `Controller@method` actions so routes can
//! be cached; routes live in `routes.rs`.

pub mod contact;
pub mod home;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use crate::routing::RouterBuilder;
use crate::support::ContactSubmissions;

pub use routes::register_routes;

/// Services the bundled controllers depend on.
#[derive(Clone)]
pub struct AppServices {
    pub submissions: Arc<dyn ContactSubmissions>,
}

/// Register controller actions and middleware. Routes are registered
/// separately so they can come from the route cache instead.
pub fn register(router: &mut RouterBuilder, services: &AppServices) {
    router.global_middleware(middleware::security_headers());
    router.alias_middleware("no_store", middleware::no_store());

    router
        .actions()
        .controller("HomeController", || home::HomeController)
        .method("index", home::HomeController::index);

    let submissions = Arc::clone(&services.submissions);
    router
        .actions()
        .controller("ContactController", move || {
            contact::ContactController::new(Arc::clone(&submissions))
        })
        .method("index", contact::ContactController::index)
        .method("submit", contact::ContactController::submit);
}
