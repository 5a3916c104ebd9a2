//! View file resolution.
//!
//! # Responsibilities
//! - Keep the ordered list of named search roots
//! - Map dot-notation names (`contact.index`) to template files
//! - Resolve layouts and partials from their subdirectories
//!
//! # Design Decisions
//! - Conventions are tried in order; every root is tried for one
//!   convention before moving to the next
//! - Lookups never fail; a missing view is `None`
//! - Names containing `..` never resolve outside a root

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::views::error::ViewError;

pub const LAYOUTS_DIR: &str = "layouts";
pub const PARTIALS_DIR: &str = "partials";
pub const DEFAULT_EXTENSION: &str = "hbs";

#[derive(Debug, Clone)]
struct SearchRoot {
    name: String,
    path: PathBuf,
}

/// Resolves view names to files under registered roots.
#[derive(Debug, Clone)]
pub struct ViewFinder {
    roots: Vec<SearchRoot>,
    extension: String,
}

impl Default for ViewFinder {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}

impl ViewFinder {
    pub fn new(extension: &str) -> Self {
        Self {
            roots: Vec::new(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Register a search root. `prepend` gives it priority over existing roots.
    pub fn add_path(&mut self, name: &str, path: &Path, prepend: bool) -> Result<(), ViewError> {
        if !path.is_dir() {
            return Err(ViewError::MissingDirectory(path.to_path_buf()));
        }
        let path = path.canonicalize().map_err(|source| ViewError::FileSystem {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(root = name, path = %path.display(), prepend, "View root registered");

        let root = SearchRoot {
            name: name.to_string(),
            path,
        };
        if prepend {
            self.roots.insert(0, root);
        } else {
            self.roots.push(root);
        }
        Ok(())
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Root names in search order.
    pub fn roots(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.roots.iter().map(|r| (r.name.as_str(), r.path.as_path()))
    }

    pub fn find(&self, view: &str) -> Option<PathBuf> {
        self.search(None, view)
    }

    pub fn find_layout(&self, name: &str) -> Option<PathBuf> {
        self.search(Some(LAYOUTS_DIR), name)
    }

    pub fn find_partial(&self, name: &str) -> Option<PathBuf> {
        self.search(Some(PARTIALS_DIR), name)
    }

    pub fn exists(&self, view: &str) -> bool {
        self.find(view).is_some()
    }

    fn search(&self, subdir: Option<&str>, view: &str) -> Option<PathBuf> {
        let relative = relative_path(view)?;

        for candidate in self.candidates(&relative) {
            for root in &self.roots {
                let base = match subdir {
                    Some(dir) => root.path.join(dir),
                    None => root.path.clone(),
                };
                let path = base.join(&candidate);
                if is_readable_file(&path) {
                    tracing::trace!(view, root = %root.name, path = %path.display(), "View resolved");
                    return Some(path);
                }
            }
        }

        tracing::debug!(view, subdir = subdir.unwrap_or("-"), "View not found");
        None
    }

    /// Relative file names to try, in convention order.
    fn candidates(&self, relative: &str) -> Vec<String> {
        let ext = &self.extension;
        let namespaced = relative.contains('/');
        let mut out = vec![format!("{relative}.{ext}")];

        if !namespaced {
            out.push(format!("{}/index.{ext}", capitalize(relative)));
        }
        out.push(format!("{}/index.{ext}", relative.to_lowercase()));
        if namespaced {
            out.push(format!("{relative}/index.{ext}"));
        }

        out.dedup();
        out
    }
}

/// `contact.index` → `contact/index`. `None` for names that could escape a root.
fn relative_path(view: &str) -> Option<String> {
    let segments: Vec<&str> = view.split('.').collect();
    let valid = !view.is_empty()
        && segments.iter().all(|s| {
            !s.is_empty() && !s.contains(['/', '\\']) && !s.contains(':')
        });
    if !valid || view.contains("..") {
        return None;
    }
    Some(segments.join("/"))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_readable_file(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, relative).unwrap();
    }

    #[test]
    fn test_dot_notation_and_conventions() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "home.hbs");
        touch(dir.path(), "Contact/index.hbs");
        touch(dir.path(), "blog/index.hbs");
        touch(dir.path(), "admin/users/index.hbs");
        touch(dir.path(), "admin/users/show.hbs");

        let mut finder = ViewFinder::default();
        finder.add_path("app", dir.path(), false).unwrap();

        assert!(finder.find("home").unwrap().ends_with("home.hbs"));
        assert!(finder.find("contact").unwrap().ends_with("Contact/index.hbs"));
        assert!(finder.find("Blog").unwrap().ends_with("blog/index.hbs"));
        assert!(finder.find("admin.users").unwrap().ends_with("admin/users/index.hbs"));
        assert!(finder.find("admin.users.show").unwrap().ends_with("admin/users/show.hbs"));
        assert!(finder.find("missing").is_none());
        assert!(finder.exists("home"));
    }

    #[test]
    fn test_find_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Contact/index.hbs");

        let mut finder = ViewFinder::default();
        finder.add_path("app", dir.path(), false).unwrap();

        let first = finder.find("contact").unwrap();
        for _ in 0..3 {
            assert_eq!(finder.find("contact").unwrap(), first);
        }
        assert!(first.is_absolute());
        assert_eq!(finder.find("nope"), finder.find("nope"));
    }

    #[test]
    fn test_convention_beats_root_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        touch(first.path(), "Contact/index.hbs");
        touch(second.path(), "contact.hbs");

        let mut finder = ViewFinder::default();
        finder.add_path("first", first.path(), false).unwrap();
        finder.add_path("second", second.path(), false).unwrap();

        let found = finder.find("contact").unwrap();
        assert!(found.starts_with(second.path().canonicalize().unwrap()));
    }

    #[test]
    fn test_prepend_takes_priority() {
        let app = tempfile::tempdir().unwrap();
        let theme = tempfile::tempdir().unwrap();
        touch(app.path(), "home.hbs");
        touch(theme.path(), "home.hbs");

        let mut finder = ViewFinder::default();
        finder.add_path("app", app.path(), false).unwrap();
        finder.add_path("theme", theme.path(), true).unwrap();

        let found = finder.find("home").unwrap();
        assert!(found.starts_with(theme.path().canonicalize().unwrap()));
        assert_eq!(finder.roots().next().map(|(name, _)| name), Some("theme"));
    }

    #[test]
    fn test_layouts_and_partials_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "layouts/app.hbs");
        touch(dir.path(), "partials/flash.hbs");

        let mut finder = ViewFinder::default();
        finder.add_path("app", dir.path(), false).unwrap();

        assert!(finder.find_layout("app").is_some());
        assert!(finder.find_partial("flash").is_some());
        assert!(finder.find_layout("flash").is_none());
        assert!(finder.find("layouts.app").is_some());
    }

    #[test]
    fn test_traversal_never_resolves() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "views/home.hbs");
        touch(dir.path(), "secret.hbs");

        let mut finder = ViewFinder::default();
        finder.add_path("app", &dir.path().join("views"), false).unwrap();

        assert!(finder.find("..secret").is_none());
        assert!(finder.find("../secret").is_none());
        assert!(finder.find("/etc/passwd").is_none());
        assert!(finder.find("").is_none());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut finder = ViewFinder::default();
        let err = finder.add_path("app", &dir.path().join("nope"), false).unwrap_err();
        assert!(matches!(err, ViewError::MissingDirectory(_)));
    }
}
