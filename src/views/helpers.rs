//! Template helpers backed by framework collaborators.
//!
//! ```text
//! {{t "contact.thanks" name=user}}
//! {{route "contact.index" success=1}}   {{route "home" absolute=true}}
//! {{asset "css/app.css"}}
//! {{partial "flash" messages=flash}}
//! ```

use std::sync::Arc;

use handlebars::{
    html_escape, Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
    RenderError,
};
use serde_json::Value;

use crate::routing::UrlGenerator;
use crate::support::Translator;
use crate::views::capture::OutputCapture;
use crate::views::error::ViewError;
use crate::views::finder::ViewFinder;
use crate::views::renderer::{read_template, render_error, ViewRenderer};
use crate::views::ViewData;

/// Collaborators the helpers need, handed over at boot.
pub struct ViewHelpers {
    pub translator: Arc<dyn Translator>,
    pub urls: Arc<dyn UrlGenerator>,
    pub finder: Arc<ViewFinder>,
    pub asset_url: String,
}

impl ViewHelpers {
    /// Register `t`, `route`, `asset` and `partial` on `renderer`.
    pub fn install(self, renderer: &mut ViewRenderer) {
        renderer.register_helper(
            "t",
            Box::new(TranslateHelper {
                translator: self.translator,
            }),
        );
        renderer.register_helper("route", Box::new(RouteHelper { urls: self.urls }));
        renderer.register_helper(
            "asset",
            Box::new(AssetHelper {
                base: self.asset_url.trim_end_matches('/').to_string(),
            }),
        );
        renderer.register_helper(
            "partial",
            Box::new(PartialHelper {
                finder: self.finder,
            }),
        );
    }
}

fn string_param<'a>(h: &'a Helper<'_, '_>, helper: &str) -> Result<&'a str, RenderError> {
    h.param(0)
        .and_then(|p| p.value().as_str())
        .ok_or_else(|| RenderError::new(format!("`{helper}` expects a string as its first argument")))
}

/// Escape for a double-quoted attribute. `=` and `'` stay as written so
/// query strings read naturally.
fn escape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

struct TranslateHelper {
    translator: Arc<dyn Translator>,
}

impl HelperDef for TranslateHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let key = string_param(h, "t")?;
        let replacements: Vec<(String, String)> = h
            .hash()
            .iter()
            .map(|(k, v)| (k.to_string(), display(v.value())))
            .collect();
        let line = self.translator.translate(key, &replacements);
        out.write(&html_escape(&line))?;
        Ok(())
    }
}

struct RouteHelper {
    urls: Arc<dyn UrlGenerator>,
}

impl HelperDef for RouteHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let name = string_param(h, "route")?;
        let mut absolute = false;
        let mut params = Vec::new();
        for (key, value) in h.hash() {
            if *key == "absolute" {
                absolute = value.value().as_bool().unwrap_or(false);
            } else {
                params.push((key.to_string(), display(value.value())));
            }
        }

        let url = self
            .urls
            .route_url(name, &params, absolute)
            .map_err(|e| RenderError::from_error("route", e))?;
        out.write(&escape_url(&url))?;
        Ok(())
    }
}

struct AssetHelper {
    base: String,
}

impl HelperDef for AssetHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let path = string_param(h, "asset")?;
        let url = format!("{}/{}", self.base, path.trim_start_matches('/'));
        out.write(&escape_url(&url))?;
        Ok(())
    }
}

/// Renders `partials/<name>` with the calling template's data as parent
/// data, overlaid by the helper's hash arguments. Inside a block such as
/// `{{#each}}` the current item's fields are layered over the root data.
struct PartialHelper {
    finder: Arc<ViewFinder>,
}

impl HelperDef for PartialHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let name = string_param(h, "partial")?;
        let path = self
            .finder
            .find_partial(name)
            .ok_or_else(|| RenderError::from_error("partial", ViewError::PartialNotFound(name.to_string())))?;
        let source = read_template(&path).map_err(|e| RenderError::from_error("partial", e))?;

        let mut data = match ctx.data() {
            Value::Object(map) => map.clone(),
            _ => ViewData::new(),
        };
        if let Ok(current) = rc.evaluate(ctx, "this") {
            if let Value::Object(block) = current.as_json() {
                data.extend(block.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        for (key, value) in h.hash() {
            data.insert(key.to_string(), value.value().clone());
        }

        let mut capture = OutputCapture::open();
        r.render_template_to_write(&source, &data, &mut capture)
            .map_err(|e| {
                let template = path.display().to_string();
                RenderError::from_error(&format!("partial `{name}`"), render_error(&template, e))
            })?;
        out.write(&capture.finish())?;
        Ok(())
    }
}
