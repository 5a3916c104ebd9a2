//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Build every component in dependency order
//! - Hand the finished pieces to a [`Kernel`]
//!
//! # Design Decisions
//! - Fail fast: any boot error is fatal and typed
//! - Relative paths in the config resolve against the base directory
//! - Components are explicitly constructed and passed, never global

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::app::{self, AppServices};
use crate::config::{validate_config, AppConfig, ConfigError};
use crate::kernel::errors::ErrorHandler;
use crate::kernel::Kernel;
use crate::routing::{RouteError, RouteErrors, Router, RouterBuilder};
use crate::support::{
    ContactSubmissions, CookieFlashStore, FlashStore, JsonTranslator, LogSubmissions,
    TranslationError, Translator,
};
use crate::views::{LayoutManager, ViewError, ViewFactory, ViewFinder, ViewHelpers, ViewRenderer};

#[derive(Debug, Error)]
pub enum BootError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("view setup failed: {0}")]
    Views(#[from] ViewError),

    #[error("translations failed to load: {0}")]
    Translation(#[from] TranslationError),

    #[error("route cache failed to load: {0}")]
    RouteCache(#[from] RouteError),

    #[error("invalid routes:\n{0}")]
    Routes(#[from] RouteErrors),

    #[error("default layout `{0}` not found")]
    MissingDefaultLayout(String),
}

type RouteHook = Box<dyn FnOnce(&mut RouterBuilder)>;

/// Builds a [`Kernel`] from configuration.
pub struct KernelBuilder {
    config: AppConfig,
    base_dir: PathBuf,
    submissions: Arc<dyn ContactSubmissions>,
    translator: Option<Arc<dyn Translator>>,
    flash: Option<Arc<dyn FlashStore>>,
    route_hooks: Vec<RouteHook>,
}

impl KernelBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            base_dir: PathBuf::from("."),
            submissions: Arc::new(LogSubmissions),
            translator: None,
            flash: None,
            route_hooks: Vec::new(),
        }
    }

    /// Directory relative config paths resolve against.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn submissions(mut self, submissions: Arc<dyn ContactSubmissions>) -> Self {
        self.submissions = submissions;
        self
    }

    /// Replace the JSON catalogue translator.
    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Replace the cookie flash store.
    pub fn flash_store(mut self, store: Arc<dyn FlashStore>) -> Self {
        self.flash = Some(store);
        self
    }

    /// Register extra routes after the application's own.
    pub fn routes<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut RouterBuilder) + 'static,
    {
        self.route_hooks.push(Box::new(f));
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Build only the router, as the `routes` and `route-cache` commands do.
    pub fn build_router(&mut self) -> Result<Router, BootError> {
        let config = &self.config;
        let mut router = RouterBuilder::new().base_url(&config.app.url);

        let services = AppServices {
            submissions: Arc::clone(&self.submissions),
        };
        app::register(&mut router, &services);

        if config.routing.use_cache {
            let cache = self.resolve(&config.routing.cache_path);
            router.load_cache(&cache)?;
        } else {
            app::register_routes(&mut router);
        }
        for hook in self.route_hooks.drain(..) {
            hook(&mut router);
        }

        Ok(router.build()?)
    }

    pub fn build(mut self) -> Result<Kernel, BootError> {
        validate_config(&self.config).map_err(ConfigError::Validation)?;
        let config = self.config.clone();

        let mut finder = ViewFinder::new(&config.views.extension);
        for root in &config.views.paths {
            finder.add_path(&root.name, &self.resolve(&root.path), false)?;
        }
        let finder = Arc::new(finder);

        let translator: Arc<dyn Translator> = match self.translator.take() {
            Some(translator) => translator,
            None => Arc::new(JsonTranslator::load(
                &self.resolve(&config.translation.path),
                &config.translation.locale,
                &config.translation.fallback_locale,
            )?),
        };

        let router = Arc::new(self.build_router()?);

        let mut renderer = ViewRenderer::new();
        renderer.set_strict_mode(config.views.strict);
        ViewHelpers {
            translator,
            urls: router.clone(),
            finder: Arc::clone(&finder),
            asset_url: config.views.asset_url.clone(),
        }
        .install(&mut renderer);
        let renderer = Arc::new(renderer);

        let layouts = Arc::new(LayoutManager::new(Arc::clone(&finder), Arc::clone(&renderer)));
        if let Some(layout) = &config.views.default_layout {
            if !layouts.layout_exists(layout) {
                return Err(BootError::MissingDefaultLayout(layout.clone()));
            }
        }
        layouts.set_default_layout(config.views.default_layout.as_deref());

        let mut views = ViewFactory::new(finder, renderer, layouts);
        views.share("app_name", Value::String(config.app.name.clone()));

        let errors = ErrorHandler::new(views.clone(), config.app.debug);
        let flash: Arc<dyn FlashStore> = match self.flash.take() {
            Some(store) => store,
            None => Arc::new(CookieFlashStore::new(&config.flash.cookie_name)),
        };

        tracing::info!(
            app = %config.app.name,
            routes = router.routes().len(),
            debug = config.app.debug,
            "Application booted"
        );

        Ok(Kernel::new(router, views, errors, flash))
    }
}
