//! Template rendering.
//!
//! # Responsibilities
//! - Render Handlebars files and in-memory templates with JSON data
//! - Scope every render in an output capture region
//! - Attach the template path and line to render failures
//!
//! # Design Decisions
//! - Templates are read at render time, so a file removed after lookup is
//!   a `FileSystem` error rather than a panic
//! - HTML escaping is on (Handlebars default); `{{{ }}}` opts out
//! - Helpers are registered once at boot; the registry is read-only after

use std::fs;
use std::path::Path;
use std::time::Instant;

use handlebars::{Handlebars, HelperDef, RenderError};
use serde_json::Value;

use crate::observability::metrics;
use crate::views::capture::{self, OutputCapture};
use crate::views::error::ViewError;
use crate::views::ViewData;

const INLINE_TEMPLATE: &str = "inline";

/// Renders templates into strings.
pub struct ViewRenderer {
    registry: Handlebars<'static>,
}

impl Default for ViewRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewRenderer {
    pub fn new() -> Self {
        Self {
            registry: Handlebars::new(),
        }
    }

    /// Fail renders that reference missing variables instead of printing nothing.
    pub fn set_strict_mode(&mut self, strict: bool) {
        self.registry.set_strict_mode(strict);
    }

    pub fn register_helper(&mut self, name: &str, helper: Box<dyn HelperDef + Send + Sync + 'static>) {
        self.registry.register_helper(name, helper);
    }

    /// Number of capture regions open on the calling thread.
    pub fn capture_depth(&self) -> usize {
        capture::depth()
    }

    /// Render a template file.
    pub fn render(&self, path: &Path, data: &ViewData) -> Result<String, ViewError> {
        let source = read_template(path)?;
        let started = Instant::now();
        let result = self.render_source(&source, &path.display().to_string(), data);

        metrics::record_view_render(result.is_ok(), started.elapsed());
        tracing::trace!(
            path = %path.display(),
            ok = result.is_ok(),
            duration_us = started.elapsed().as_micros() as u64,
            "Template rendered"
        );
        result
    }

    /// Render a partial file. `data` overrides `parent_data` key by key.
    pub fn render_partial(
        &self,
        path: &Path,
        data: &ViewData,
        parent_data: &ViewData,
    ) -> Result<String, ViewError> {
        self.render(path, &overlay(parent_data, data))
    }

    /// Render an in-memory template.
    pub fn render_string(&self, template: &str, data: &ViewData) -> Result<String, ViewError> {
        self.render_source(template, INLINE_TEMPLATE, data)
    }

    fn render_source(&self, source: &str, template: &str, data: &ViewData) -> Result<String, ViewError> {
        let mut capture = OutputCapture::open();

        // On error the capture drops here, before the error leaves.
        self.registry
            .render_template_to_write(source, data, &mut capture)
            .map_err(|e| render_error(template, e))?;

        Ok(capture.finish())
    }
}

/// `base` overlaid by `top`; `top` wins on conflicts.
pub fn overlay(base: &ViewData, top: &ViewData) -> ViewData {
    let mut merged = base.clone();
    for (key, value) in top {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

pub(crate) fn read_template(path: &Path) -> Result<String, ViewError> {
    fs::read_to_string(path).map_err(|source| ViewError::FileSystem {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn render_error(template: &str, err: RenderError) -> ViewError {
    ViewError::Render {
        template: template.to_string(),
        line: err.line_no,
        source: Box::new(err),
    }
}

/// Wrap a plain value as view data, the way `Response::view` does.
pub fn view_data(value: Value) -> ViewData {
    match value {
        Value::Object(map) => map,
        Value::Null => ViewData::new(),
        other => {
            let mut map = ViewData::new();
            map.insert("data".to_string(), other);
            map
        }
    }
}
