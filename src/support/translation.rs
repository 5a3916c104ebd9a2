//! Translation lookup.
//!
//! Catalogues are JSON files named after their locale (`lang/en.json`).
//! Nested objects are flattened into dotted keys, so
//! `{"contact": {"title": "Contact"}}` answers `contact.title`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("cannot read translations `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid translations `{}`: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("translations `{}` must be a JSON object", path.display())]
    NotAnObject { path: PathBuf },
}

/// Looks up translated strings by key.
pub trait Translator: Send + Sync {
    /// Translate `key`, replacing `:name` placeholders. Unknown keys
    /// come back unchanged.
    fn translate(&self, key: &str, replacements: &[(String, String)]) -> String;

    fn locale(&self) -> &str;
}

/// Translator backed by per-locale JSON catalogues.
#[derive(Debug, Clone, Default)]
pub struct JsonTranslator {
    locale: String,
    lines: HashMap<String, String>,
    fallback: HashMap<String, String>,
}

impl JsonTranslator {
    /// Load `locale` and `fallback` from `dir`. A missing fallback catalogue
    /// is tolerated; a missing primary one is not.
    pub fn load(dir: &Path, locale: &str, fallback: &str) -> Result<Self, TranslationError> {
        let lines = load_catalogue(&dir.join(format!("{locale}.json")))?;
        let fallback_lines = if fallback == locale {
            HashMap::new()
        } else {
            let path = dir.join(format!("{fallback}.json"));
            if path.exists() {
                load_catalogue(&path)?
            } else {
                tracing::warn!(path = %path.display(), "Fallback translations missing");
                HashMap::new()
            }
        };

        tracing::info!(locale, fallback, keys = lines.len(), "Translations loaded");
        Ok(Self {
            locale: locale.to_string(),
            lines,
            fallback: fallback_lines,
        })
    }

    /// Build from an in-memory catalogue.
    pub fn from_value(locale: &str, catalogue: &Value) -> Self {
        let mut lines = HashMap::new();
        flatten("", catalogue, &mut lines);
        Self {
            locale: locale.to_string(),
            lines,
            fallback: HashMap::new(),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.lines.contains_key(key) || self.fallback.contains_key(key)
    }
}

impl Translator for JsonTranslator {
    fn translate(&self, key: &str, replacements: &[(String, String)]) -> String {
        let line = self
            .lines
            .get(key)
            .or_else(|| self.fallback.get(key))
            .map(String::as_str)
            .unwrap_or(key);
        replace_placeholders(line, replacements)
    }

    fn locale(&self) -> &str {
        &self.locale
    }
}

fn load_catalogue(path: &Path) -> Result<HashMap<String, String>, TranslationError> {
    let text = fs::read_to_string(path).map_err(|source| TranslationError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| TranslationError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if !value.is_object() {
        return Err(TranslationError::NotAnObject {
            path: path.to_path_buf(),
        });
    }

    let mut lines = HashMap::new();
    flatten("", &value, &mut lines);
    Ok(lines)
}

fn flatten(prefix: &str, value: &Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&key, child, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        Value::Null => {}
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

fn replace_placeholders(line: &str, replacements: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = replacements.iter().collect();
    // Longest first, so `:name` never eats the prefix of `:names`.
    sorted.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = line.to_string();
    for (name, value) in sorted {
        out = out.replace(&format!(":{name}"), value);
    }
    out
}
