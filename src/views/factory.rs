//! The entry point controllers and the kernel use to produce HTML.

use std::sync::Arc;

use serde_json::Value;

use crate::views::error::ViewError;
use crate::views::finder::ViewFinder;
use crate::views::layout::LayoutManager;
use crate::views::renderer::{overlay, ViewRenderer};
use crate::views::{Layout, ViewData};

/// Coordinates finder, renderer and layouts around a set of shared data.
///
/// Cloning is cheap apart from the shared data map; the kernel clones the
/// application factory for every request so shares never leak across
/// requests.
#[derive(Clone)]
pub struct ViewFactory {
    finder: Arc<ViewFinder>,
    renderer: Arc<ViewRenderer>,
    layouts: Arc<LayoutManager>,
    shared: ViewData,
}

impl ViewFactory {
    pub fn new(finder: Arc<ViewFinder>, renderer: Arc<ViewRenderer>, layouts: Arc<LayoutManager>) -> Self {
        Self {
            finder,
            renderer,
            layouts,
            shared: ViewData::new(),
        }
    }

    pub fn share(&mut self, key: impl Into<String>, value: Value) {
        self.shared.insert(key.into(), value);
    }

    pub fn share_many(&mut self, values: ViewData) {
        self.shared.extend(values);
    }

    pub fn shared(&self) -> &ViewData {
        &self.shared
    }

    pub fn finder(&self) -> &ViewFinder {
        &self.finder
    }

    pub fn renderer(&self) -> &ViewRenderer {
        &self.renderer
    }

    pub fn layouts(&self) -> &LayoutManager {
        &self.layouts
    }

    /// Render `view` with `data` over the shared data, then apply the layout.
    pub fn make(&self, view: &str, data: &ViewData, layout: &Layout) -> Result<String, ViewError> {
        self.make_inner(view, data, layout).map_err(|err| {
            tracing::error!(view, error = %err, "View rendering failed");
            ViewError::Context {
                view: view.to_string(),
                source: Box::new(err),
            }
        })
    }

    fn make_inner(&self, view: &str, data: &ViewData, layout: &Layout) -> Result<String, ViewError> {
        let path = self
            .finder
            .find(view)
            .ok_or_else(|| ViewError::ViewNotFound(view.to_string()))?;

        let data = overlay(&self.shared, data);
        let content = self.renderer.render(&path, &data)?;

        match layout {
            Layout::Default => self.layouts.apply_layout(content, None, &data),
            Layout::Named(name) => self.layouts.apply_layout(content, Some(name), &data),
            Layout::Disabled => Ok(content),
        }
    }

    /// Render a partial with `data` over `parent_data`.
    pub fn partial(&self, name: &str, data: &ViewData, parent_data: &ViewData) -> Result<String, ViewError> {
        let path = self
            .finder
            .find_partial(name)
            .ok_or_else(|| ViewError::PartialNotFound(name.to_string()))?;
        self.renderer.render_partial(&path, data, parent_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    use crate::views::renderer::view_data;

    fn factory() -> (tempfile::TempDir, ViewFactory) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("layouts")).unwrap();
        fs::create_dir_all(root.join("partials")).unwrap();
        fs::write(root.join("layouts/app.hbs"), "<title>{{app_name}}</title>{{{content}}}").unwrap();
        fs::write(root.join("greeting.hbs"), "Hi {{name}} from {{app_name}}").unwrap();
        fs::write(root.join("partials/badge.hbs"), "[{{label}}:{{user}}]").unwrap();

        let mut finder = ViewFinder::default();
        finder.add_path("app", root, false).unwrap();
        let finder = Arc::new(finder);
        let renderer = Arc::new(ViewRenderer::new());
        let layouts = Arc::new(LayoutManager::new(Arc::clone(&finder), Arc::clone(&renderer)));
        (dir, ViewFactory::new(finder, renderer, layouts))
    }

    #[test]
    fn test_make_merges_shared_under_call_data() {
        let (_dir, mut views) = factory();
        views.share("app_name", json!("Trellis"));
        views.share("name", json!("shared"));

        let out = views
            .make("greeting", &view_data(json!({"name": "Ada"})), &Layout::Disabled)
            .unwrap();
        assert_eq!(out, "Hi Ada from Trellis");
    }

    #[test]
    fn test_make_applies_layouts() {
        let (_dir, mut views) = factory();
        views.share_many(view_data(json!({"app_name": "Trellis", "name": "Ada"})));
        let data = ViewData::new();

        assert_eq!(views.make("greeting", &data, &Layout::Default).unwrap(), "Hi Ada from Trellis");

        views.layouts().set_default_layout(Some("app"));
        assert_eq!(
            views.make("greeting", &data, &Layout::Default).unwrap(),
            "<title>Trellis</title>Hi Ada from Trellis"
        );
        assert_eq!(
            views.make("greeting", &data, &Layout::named("app")).unwrap(),
            "<title>Trellis</title>Hi Ada from Trellis"
        );
        assert_eq!(views.make("greeting", &data, &Layout::Disabled).unwrap(), "Hi Ada from Trellis");
    }

    #[test]
    fn test_missing_view_is_wrapped_with_context() {
        let (_dir, views) = factory();
        let err = views.make("nope", &ViewData::new(), &Layout::Default).unwrap_err();
        assert!(matches!(&err, ViewError::Context { view, .. } if view == "nope"));
        assert!(matches!(err.root(), ViewError::ViewNotFound(name) if name == "nope"));
    }

    #[test]
    fn test_missing_layout_is_wrapped_with_context() {
        let (_dir, views) = factory();
        let err = views
            .make("greeting", &ViewData::new(), &Layout::named("missing"))
            .unwrap_err();
        assert!(matches!(err.root(), ViewError::LayoutNotFound(_)));
        assert_eq!(views.renderer().capture_depth(), 0);
    }

    #[test]
    fn test_clones_do_not_share_data() {
        let (_dir, app) = factory();
        let mut first = app.clone();
        first.share("user", json!("ada"));
        let second = app.clone();

        assert!(first.shared().contains_key("user"));
        assert!(!second.shared().contains_key("user"));
        assert!(!app.shared().contains_key("user"));
    }

    #[test]
    fn test_partial() {
        let (_dir, views) = factory();
        let out = views
            .partial(
                "badge",
                &view_data(json!({"label": "admin"})),
                &view_data(json!({"label": "guest", "user": "ada"})),
            )
            .unwrap();
        assert_eq!(out, "[admin:ada]");

        let err = views.partial("nope", &ViewData::new(), &ViewData::new()).unwrap_err();
        assert!(matches!(err, ViewError::PartialNotFound(_)));
    }
}
