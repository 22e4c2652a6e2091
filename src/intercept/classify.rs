// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Best-effort error summaries for successful call results.
//!
//! Validation-style calls return a list of errors; execution-style calls
//! return an object carrying an `errors` list. Neither raises, so the span
//! would look healthy unless the result itself is inspected.

use serde_json::Value;

/// How a call result carries errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultShape<'a> {
    /// A non-empty list whose first element is error-like.
    ErrorList(&'a [Value]),
    /// An object with a non-empty `errors` list.
    ErrorBearing(&'a [Value]),
    /// Anything else.
    Opaque,
}

impl<'a> ResultShape<'a> {
    /// Determine the shape of a result.
    ///
    /// Only the first element of a list is checked: a list that starts with
    /// a non-error is opaque even if errors follow.
    pub fn inspect(result: &'a Value) -> Self {
        match result {
            Value::Array(items) if items.first().is_some_and(is_error_like) => {
                Self::ErrorList(items)
            }
            Value::Object(fields) => match fields.get("errors") {
                Some(Value::Array(errors)) if !errors.is_empty() => Self::ErrorBearing(errors),
                _ => Self::Opaque,
            },
            _ => Self::Opaque,
        }
    }

    /// The errors carried by this shape.
    pub fn errors(&self) -> &'a [Value] {
        match self {
            Self::ErrorList(errors) | Self::ErrorBearing(errors) => errors,
            Self::Opaque => &[],
        }
    }
}

/// An error-like value is an object with a string `message`.
pub fn is_error_like(value: &Value) -> bool {
    matches!(value.get("message"), Some(Value::String(_)))
}

/// One error found in a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub message: String,
}

impl ErrorDescriptor {
    fn from_value(value: &Value) -> Self {
        let message = match value.get("message") {
            Some(Value::String(message)) => message.clone(),
            _ => match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        };
        Self { message }
    }
}

/// Extract error descriptors from a call result, in order.
pub fn classify(result: &Value) -> Vec<ErrorDescriptor> {
    ResultShape::inspect(result)
        .errors()
        .iter()
        .map(ErrorDescriptor::from_value)
        .collect()
}

/// Join error messages with newlines, or `None` when there are none.
pub fn summarize(errors: &[ErrorDescriptor]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
    )
}
