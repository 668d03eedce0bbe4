// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Localized text lookup.
//!
//! Localized resources are named `<base>_<code>` where `code` is an ISO
//! language code such as `fr` or `pt_BR`. A lookup for `pt_BR` tries
//! `base_pt_BR`, then `base_pt`, then plain `base`.
//!
//! | Resource              | Example                   | Used by               |
//! |-----------------------|---------------------------|-----------------------|
//! | `.properties`/`.json` | `defaults_fr.properties`  | [`get_property`]      |
//! | `.txt`                | `example_fr.txt`          | [`read_text_options`] |

use crate::properties::{find_property_file, PropertyCache};
use crate::sdk::Value;
use crate::Result;
use std::path::{Path, PathBuf};

/// Code used when a language is unknown.
pub const DEFAULT_LANGUAGE: &str = "en";

const LANGUAGES: &[(&str, &str)] = &[
    ("Arabic", "ar"),
    ("Brazilian", "pt_BR"),
    ("Chinese", "zh"),
    ("Czech", "cs"),
    ("Danish", "da"),
    ("Dutch", "nl"),
    ("English", "en"),
    ("Finnish", "fi"),
    ("French", "fr"),
    ("German", "de"),
    ("Greek", "el"),
    ("Italian", "it"),
    ("Japanese", "ja"),
    ("Korean", "ko"),
    ("Norwegian", "no"),
    ("Polish", "pl"),
    ("Portuguese", "pt"),
    ("Russian", "ru"),
    ("Spanish", "es"),
    ("Swedish", "sv"),
    ("Turkish", "tr"),
];

/// ISO code for a language name as the text-to-speech service reports it.
pub fn language_to_code(name: &str) -> Option<&'static str> {
    let name = name.trim();
    LANGUAGES
        .iter()
        .find(|(lang, _)| lang.eq_ignore_ascii_case(name))
        .map(|(_, code)| *code)
}

/// Resource names to try for `base` in `lang`, most specific first.
pub fn candidates(base: &str, lang: &str) -> Vec<String> {
    let mut names = Vec::with_capacity(3);
    if !lang.is_empty() {
        names.push(format!("{}_{}", base, lang));
        if let Some((primary, _)) = lang.split_once(['_', '-']) {
            names.push(format!("{}_{}", base, primary));
        }
    }
    names.push(base.to_string());
    names
}

/// Localized property `key` from set `base`, using the global cache.
pub fn get_property(dir: &Path, base: &str, lang: &str, key: &str) -> Result<Option<Value>> {
    get_property_in(PropertyCache::global(), dir, base, lang, key)
}

/// [`get_property`] with an explicit cache.
///
/// Stops at the first file that exists, even when it lacks `key`.
pub fn get_property_in(
    cache: &PropertyCache,
    dir: &Path,
    base: &str,
    lang: &str,
    key: &str,
) -> Result<Option<Value>> {
    for name in candidates(base, lang) {
        if let Some(path) = find_property_file(dir, &name) {
            log::trace!("[I18n] '{}' ({}) from {}", key, lang, path.display());
            return Ok(cache.load(&path)?.get(key).cloned());
        }
    }
    log::debug!("[I18n] No '{}' resources for '{}' in {}", base, lang, dir.display());
    Ok(None)
}

/// Candidate text options.
///
/// With `key`, the localized property is split on `separator`. Without one,
/// the lines of `<base>_<lang>.txt` are returned. Blank entries and `#`
/// comment lines are dropped. Missing resources give an empty list.
pub fn read_text_options(
    dir: &Path,
    base: &str,
    lang: &str,
    key: Option<&str>,
    separator: &str,
) -> Result<Vec<String>> {
    read_text_options_in(PropertyCache::global(), dir, base, lang, key, separator)
}

/// [`read_text_options`] with an explicit cache.
pub fn read_text_options_in(
    cache: &PropertyCache,
    dir: &Path,
    base: &str,
    lang: &str,
    key: Option<&str>,
    separator: &str,
) -> Result<Vec<String>> {
    match key {
        Some(key) => {
            let value = get_property_in(cache, dir, base, lang, key)?;
            Ok(value.map(|v| split_options(&v, separator)).unwrap_or_default())
        }
        None => match find_text_file(dir, base, lang) {
            Some(path) => {
                let text = std::fs::read_to_string(&path)?;
                Ok(text
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty() && !l.starts_with('#'))
                    .map(str::to_string)
                    .collect())
            }
            None => {
                log::debug!("[I18n] No '{}.txt' for '{}' in {}", base, lang, dir.display());
                Ok(Vec::new())
            }
        },
    }
}

fn find_text_file(dir: &Path, base: &str, lang: &str) -> Option<PathBuf> {
    candidates(base, lang)
        .into_iter()
        .map(|name| dir.join(format!("{}.txt", name)))
        .find(|p| p.is_file())
}

fn split_options(value: &Value, separator: &str) -> Vec<String> {
    match value {
        Value::String(s) if separator.is_empty() => vec![s.trim().to_string()],
        Value::String(s) => s
            .split(separator)
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect(),
        // A JSON array already holds the options.
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            })
            .filter(|o| !o.is_empty())
            .collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}
