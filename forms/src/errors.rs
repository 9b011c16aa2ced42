// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

/// A single failed validation, addressed to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `employees[0].resident_no`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Form error
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Data failed schema validation
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
    /// Data references a section the schema does not declare
    #[error("Unknown section: {0}")]
    UnknownSection(String),
    /// Value could not be encoded into its wire charset
    #[error("Encoding failed for field {field}: {source}")]
    Encoding {
        field: String,
        source: kedi_encoding::Error,
    },
    /// Date string is not in a recognized format
    #[error("Unrecognized date format: {0}")]
    BadDate(String),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
