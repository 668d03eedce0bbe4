// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Property files.
//!
//! A property set `base` lives in a resources directory as either
//! `base.properties` (Java-style key/value text) or `base.json` (a top-level
//! JSON object). `.properties` wins when both exist. Parsed files are
//! memoized per path in a [`PropertyCache`].

use crate::sdk::Value;
use crate::{Error, Result};
use dashmap::DashMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Extensions tried for a property set, in order.
pub const PROPERTY_EXTENSIONS: &[&str] = &["properties", "json"];

/// Parsed properties of one file.
pub type Properties = HashMap<String, Value>;

/// Parse `.properties` text. `path` is only used in error messages.
pub fn parse_properties(text: &str, path: &Path) -> Result<Properties> {
    let mut props = Properties::new();
    let mut lines = text.lines().enumerate();

    while let Some((index, raw)) = lines.next() {
        let first = raw.trim_start();
        if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
            continue;
        }

        // Join continuation lines.
        let mut logical = String::from(first);
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_key_value(&logical);
        let key = unescape(key).map_err(|reason| Error::PropertyFormat {
            path: path.to_path_buf(),
            line: index + 1,
            reason,
        })?;
        let value = unescape(value).map_err(|reason| Error::PropertyFormat {
            path: path.to_path_buf(),
            line: index + 1,
            reason,
        })?;
        props.insert(key, Value::String(value));
    }

    Ok(props)
}

/// Odd number of trailing backslashes.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => return (&line[..i], line[i + 1..].trim_start()),
            c if c.is_whitespace() => {
                let rest = line[i..].trim_start();
                let rest = rest
                    .strip_prefix(['=', ':'])
                    .map_or(rest, str::trim_start);
                return (&line[..i], rest);
            }
            _ => {}
        }
    }
    (line, "")
}

fn unescape(s: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| format!("invalid unicode escape '\\u{}'", hex))?;
                out.push(code);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

/// Parse a JSON property file. The document must be an object.
pub fn parse_json(text: &str, path: &Path) -> Result<Properties> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(Error::PropertyFormat {
            path: path.to_path_buf(),
            line: 1,
            reason: "top-level JSON value must be an object".into(),
        }),
    }
}

/// Load and parse a property file, choosing the parser by extension.
pub fn load_file(path: &Path) -> Result<Properties> {
    let text = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_json(&text, path),
        _ => parse_properties(&text, path),
    }
}

/// First existing file for property set `base` in `dir`.
pub fn find_property_file(dir: &Path, base: &str) -> Option<PathBuf> {
    PROPERTY_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", base, ext)))
        .find(|p| p.is_file())
}

/// Parsed property files memoized by path.
#[derive(Default)]
pub struct PropertyCache {
    files: DashMap<PathBuf, Arc<Properties>>,
}

impl PropertyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache.
    pub fn global() -> &'static PropertyCache {
        static GLOBAL: OnceLock<PropertyCache> = OnceLock::new();
        GLOBAL.get_or_init(PropertyCache::new)
    }

    /// Parsed contents of `path`, loaded on first use.
    pub fn load(&self, path: &Path) -> Result<Arc<Properties>> {
        if let Some(props) = self.files.get(path) {
            return Ok(Arc::clone(props.value()));
        }
        let props = Arc::new(load_file(path)?);
        log::debug!("[Properties] Loaded {} keys from {}", props.len(), path.display());
        let entry = self.files.entry(path.to_path_buf()).or_insert(props);
        Ok(Arc::clone(entry.value()))
    }

    /// Look `key` up in property set `base`. A missing file or key is `None`.
    pub fn get_property(&self, dir: &Path, base: &str, key: &str) -> Result<Option<Value>> {
        let Some(path) = find_property_file(dir, base) else {
            log::trace!("[Properties] No '{}' in {}", base, dir.display());
            return Ok(None);
        };
        Ok(self.load(&path)?.get(key).cloned())
    }

    /// Forget every cached file.
    pub fn clear(&self) {
        self.files.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// [`PropertyCache::get_property`] on the global cache.
pub fn get_property(dir: &Path, base: &str, key: &str) -> Result<Option<Value>> {
    PropertyCache::global().get_property(dir, base, key)
}
