//! Route table of the bundled application.

use crate::routing::{GroupAttributes, RouterBuilder};

pub fn register_routes(routes: &mut RouterBuilder) {
    routes.get("/", "HomeController@index").name("home");

    routes.group(
        GroupAttributes::new()
            .prefix("/contact")
            .name("contact.")
            .middleware(["no_store"]),
        |routes| {
            routes.get("/", "ContactController@index").name("index");
            routes.post("/", "ContactController@submit").name("submit");
        },
    );
}
