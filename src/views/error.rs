//! View errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("view directory `{0}` does not exist")]
    MissingDirectory(PathBuf),

    #[error("view `{0}` not found")]
    ViewNotFound(String),

    #[error("layout `{0}` not found")]
    LayoutNotFound(String),

    #[error("partial `{0}` not found")]
    PartialNotFound(String),

    #[error("cannot read `{}`: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} failed to render{}: {}", template, line.map(|l| format!(" at line {l}")).unwrap_or_default(), source.desc)]
    Render {
        /// File path, or `inline` for string templates.
        template: String,
        line: Option<usize>,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    #[error("while rendering `{view}`: {source}")]
    Context {
        view: String,
        #[source]
        source: Box<ViewError>,
    },
}

impl ViewError {
    /// Innermost view error, looking through `Context` wrappers.
    pub fn root(&self) -> &ViewError {
        match self {
            ViewError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// Template location of a render failure, if any.
    pub fn location(&self) -> Option<(&str, Option<usize>)> {
        match self.root() {
            ViewError::Render { template, line, .. } => Some((template.as_str(), *line)),
            _ => None,
        }
    }
}
