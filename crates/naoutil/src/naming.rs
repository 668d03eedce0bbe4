// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Helpers for Rust type paths (`crate::module::Type`).

/// Module part of a type path, `None` for a bare name.
pub fn type_path_to_module(path: &str) -> Option<&str> {
    let path = strip_generics(path);
    path.rfind("::").map(|pos| &path[..pos])
}

/// Last segment of a type path.
pub fn type_path_to_name(path: &str) -> &str {
    let path = strip_generics(path);
    match path.rfind("::") {
        Some(pos) => &path[pos + 2..],
        None => path,
    }
}

/// Middleware module name derived from a Rust type.
///
/// `my_app::Greeter` becomes `my_app_Greeter`. Generic arguments are
/// dropped and leading underscores stripped.
pub fn module_name_for<T: ?Sized>() -> String {
    module_name_from_path(std::any::type_name::<T>())
}

pub(crate) fn module_name_from_path(path: &str) -> String {
    strip_generics(path)
        .replace("::", "_")
        .trim_start_matches('_')
        .to_string()
}

fn strip_generics(path: &str) -> &str {
    match path.find('<') {
        Some(pos) => &path[..pos],
        None => path,
    }
}
