//! Layout wrapping.
//!
//! A layout is an ordinary template under `layouts/` that receives the
//! rendered view as `content` (emit it with `{{{content}}}`).

use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde_json::Value;

use crate::views::error::ViewError;
use crate::views::finder::ViewFinder;
use crate::views::renderer::ViewRenderer;
use crate::views::ViewData;

/// Reserved data key holding the wrapped view's output.
pub const CONTENT_KEY: &str = "content";

pub struct LayoutManager {
    finder: Arc<ViewFinder>,
    renderer: Arc<ViewRenderer>,
    default_layout: ArcSwapOption<String>,
}

impl LayoutManager {
    pub fn new(finder: Arc<ViewFinder>, renderer: Arc<ViewRenderer>) -> Self {
        Self {
            finder,
            renderer,
            default_layout: ArcSwapOption::empty(),
        }
    }

    pub fn set_default_layout(&self, name: Option<&str>) {
        self.default_layout.store(name.map(|n| Arc::new(n.to_string())));
    }

    pub fn default_layout(&self) -> Option<String> {
        self.default_layout.load().as_ref().map(|n| n.as_ref().clone())
    }

    pub fn layout_exists(&self, name: &str) -> bool {
        self.finder.find_layout(name).is_some()
    }

    pub fn layout_path(&self, name: &str) -> Option<PathBuf> {
        self.finder.find_layout(name)
    }

    /// Wrap `content` in `layout`, or in the default layout when `layout`
    /// is `None`. With neither, the content is returned unchanged.
    pub fn apply_layout(
        &self,
        content: String,
        layout: Option<&str>,
        data: &ViewData,
    ) -> Result<String, ViewError> {
        let default = self.default_layout();
        let Some(name) = layout.or(default.as_deref()) else {
            return Ok(content);
        };

        let path = self
            .finder
            .find_layout(name)
            .ok_or_else(|| ViewError::LayoutNotFound(name.to_string()))?;

        let mut data = data.clone();
        data.insert(CONTENT_KEY.to_string(), Value::String(content));

        tracing::trace!(layout = name, path = %path.display(), "Applying layout");
        self.renderer.render(&path, &data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn manager() -> (tempfile::TempDir, LayoutManager) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("layouts")).unwrap();
        fs::write(dir.path().join("layouts/app.hbs"), "<main>{{{content}}}</main>").unwrap();
        fs::write(dir.path().join("layouts/admin.hbs"), "<admin title=\"{{title}}\">{{{content}}}</admin>").unwrap();

        let mut finder = ViewFinder::default();
        finder.add_path("app", dir.path(), false).unwrap();
        let manager = LayoutManager::new(Arc::new(finder), Arc::new(ViewRenderer::new()));
        (dir, manager)
    }

    #[test]
    fn test_no_layout_returns_content() {
        let (_dir, manager) = manager();
        let out = manager.apply_layout("<p>hi</p>".into(), None, &ViewData::new()).unwrap();
        assert_eq!(out, "<p>hi</p>");
    }

    #[test]
    fn test_explicit_beats_default() {
        let (_dir, manager) = manager();
        manager.set_default_layout(Some("app"));
        assert_eq!(manager.default_layout().as_deref(), Some("app"));

        let out = manager.apply_layout("x".into(), None, &ViewData::new()).unwrap();
        assert_eq!(out, "<main>x</main>");

        let mut data = ViewData::new();
        data.insert("title".into(), Value::String("Users".into()));
        let out = manager.apply_layout("x".into(), Some("admin"), &data).unwrap();
        assert_eq!(out, "<admin title=\"Users\">x</admin>");

        manager.set_default_layout(None);
        assert_eq!(manager.apply_layout("x".into(), None, &ViewData::new()).unwrap(), "x");
    }

    #[test]
    fn test_missing_layout() {
        let (_dir, manager) = manager();
        let err = manager.apply_layout("x".into(), Some("nope"), &ViewData::new()).unwrap_err();
        assert!(matches!(err, ViewError::LayoutNotFound(name) if name == "nope"));
        assert!(manager.layout_exists("app"));
        assert!(!manager.layout_exists("nope"));
        assert!(manager.layout_path("admin").is_some());
    }
}
