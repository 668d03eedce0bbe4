// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed JSON envelopes.
//!
//! Values are stored as `{"class": "<type path>", "data": ...}` so a reader
//! can check it is reconstituting the type that was written, e.g. before
//! storing an object in the robot's memory.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    class: &'a str,
    data: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
    class: String,
    data: serde_json::Value,
}

/// Class name written for `T`.
pub fn class_name<T: ?Sized>() -> &'static str {
    std::any::type_name::<T>()
}

/// Serialize `value` inside a class envelope.
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(&EnvelopeRef {
        class: class_name::<T>(),
        data: value,
    })?)
}

/// Read a value written by [`to_json_string`].
///
/// Empty or blank input yields `Ok(None)`.
pub fn from_json_string<T: DeserializeOwned>(s: &str) -> Result<Option<T>> {
    if s.trim().is_empty() {
        return Ok(None);
    }
    let envelope: Envelope = serde_json::from_str(s)?;
    let expected = class_name::<T>();
    if envelope.class != expected {
        return Err(Error::ClassMismatch {
            expected: expected.to_string(),
            found: envelope.class,
        });
    }
    Ok(Some(serde_json::from_value(envelope.data)?))
}
