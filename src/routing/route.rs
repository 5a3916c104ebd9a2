//! Route definitions and group attributes, as registered.

use axum::http::Method;

use crate::routing::action::Action;
use crate::routing::pattern::join_paths;

/// Attributes shared by every route registered inside a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupAttributes {
    prefix: String,
    namespace: String,
    name_prefix: String,
    middleware: Vec<String>,
}

impl GroupAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// URI prefix, e.g. `/admin`.
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Namespace prepended to `Controller@method` actions, joined with `::`.
    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    /// Prefix prepended to route names, e.g. `admin.`.
    pub fn name(mut self, name_prefix: &str) -> Self {
        self.name_prefix = name_prefix.to_string();
        self
    }

    pub fn middleware<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Compose a child group onto this one.
    pub(crate) fn merge(&self, child: &GroupAttributes) -> GroupAttributes {
        let prefix = if self.prefix.is_empty() {
            child.prefix.clone()
        } else if child.prefix.is_empty() {
            self.prefix.clone()
        } else {
            join_paths(&self.prefix, &child.prefix)
        };

        let namespace = match (self.namespace.is_empty(), child.namespace.is_empty()) {
            (_, true) => self.namespace.clone(),
            (true, false) => child.namespace.clone(),
            (false, false) => format!("{}::{}", self.namespace, child.namespace),
        };

        let mut middleware = self.middleware.clone();
        middleware.extend(child.middleware.iter().cloned());

        GroupAttributes {
            prefix,
            namespace,
            name_prefix: format!("{}{}", self.name_prefix, child.name_prefix),
            middleware,
        }
    }
}

/// A registered route, configurable until the router is built.
#[derive(Debug, Clone)]
pub struct Route {
    methods: Vec<Method>,
    uri: String,
    action: Action,
    name: Option<String>,
    name_prefix: String,
    wheres: Vec<(String, String)>,
    middleware: Vec<String>,
}

impl Route {
    pub(crate) fn new(methods: Vec<Method>, uri: &str, action: Action, group: &GroupAttributes) -> Self {
        let action = match action {
            Action::Controller(id) if !group.namespace.is_empty() => {
                Action::Controller(format!("{}::{}", group.namespace, id))
            }
            other => other,
        };

        Self {
            methods,
            uri: join_paths(&group.prefix, uri),
            action,
            name: None,
            name_prefix: group.name_prefix.clone(),
            wheres: Vec::new(),
            middleware: group.middleware.clone(),
        }
    }

    /// Rebuild a route from its cached parts; `uri`, `action` and
    /// `middleware` are taken as already resolved against their groups.
    pub(crate) fn from_cached(
        methods: Vec<Method>,
        uri: String,
        action: Action,
        name: Option<String>,
        wheres: Vec<(String, String)>,
        middleware: Vec<String>,
    ) -> Self {
        Self {
            methods,
            uri,
            action,
            name,
            name_prefix: String::new(),
            wheres,
            middleware,
        }
    }

    /// Name the route; the enclosing groups' name prefix is prepended.
    pub fn name(&mut self, name: &str) -> &mut Self {
        self.name = Some(format!("{}{}", self.name_prefix, name));
        self
    }

    /// Constrain a parameter to a regular expression.
    pub fn where_param(&mut self, param: &str, regex: &str) -> &mut Self {
        self.wheres.push((param.to_string(), regex.to_string()));
        self
    }

    /// Append route-specific middleware after the group's.
    pub fn middleware<I, S>(&mut self, ids: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn route_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn wheres(&self) -> &[(String, String)] {
        &self.wheres
    }

    pub fn middleware_ids(&self) -> &[String] {
        &self.middleware
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_merge() {
        let parent = GroupAttributes::new()
            .prefix("/admin")
            .namespace("admin")
            .name("admin.")
            .middleware(["auth"]);
        let child = GroupAttributes::new()
            .prefix("users")
            .namespace("users")
            .name("users.")
            .middleware(["audit"]);

        let merged = parent.merge(&child);
        assert_eq!(merged.prefix, "/admin/users");
        assert_eq!(merged.namespace, "admin::users");
        assert_eq!(merged.name_prefix, "admin.users.");
        assert_eq!(merged.middleware, vec!["auth", "audit"]);
    }

    #[test]
    fn test_route_inherits_group() {
        let group = GroupAttributes::new()
            .prefix("/admin")
            .namespace("admin")
            .name("admin.")
            .middleware(["auth"]);
        let mut route = Route::new(vec![Method::GET], "/users/{id}", "UserController@show".into(), &group);
        route.name("users.show").where_param("id", "[0-9]+").middleware(["audit"]);

        assert_eq!(route.uri(), "/admin/users/{id}");
        assert_eq!(route.action().describe(), "admin::UserController@show");
        assert_eq!(route.route_name(), Some("admin.users.show"));
        assert_eq!(route.middleware_ids(), ["auth".to_string(), "audit".to_string()]);
    }
}
