// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::errors::{Error, ValidationError};
use crate::field::FormField;
use crate::form::Record;

/// An ordered group of fields emitted as one fixed-width line.
///
/// Repeating sections hold detail rows (one line per record) and carry a
/// cardinality bound.
#[derive(Clone)]
pub struct FormSection {
    pub name: &'static str,
    pub label: &'static str,
    pub fields: Vec<FormField>,
    pub repeating: bool,
    pub min_items: usize,
    pub max_items: usize,
}

impl FormSection {
    pub fn new(name: &'static str, label: &'static str, fields: Vec<FormField>) -> Self {
        Self {
            name,
            label,
            fields,
            repeating: false,
            min_items: 0,
            max_items: 9999,
        }
    }

    pub fn repeating(mut self, min_items: usize, max_items: usize) -> Self {
        self.repeating = true;
        self.min_items = min_items;
        self.max_items = max_items;
        self
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Total line width in bytes.
    pub fn line_width(&self) -> usize {
        self.fields.iter().map(|f| f.width).sum()
    }

    /// Validate one record against every field, prefixing errors with the
    /// given field-path prefix.
    pub fn validate(&self, data: &Record, prefix: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for field in &self.fields {
            for message in field.validate(data.get(field.name)) {
                errors.push(ValidationError::new(
                    format!("{prefix}{}", field.name),
                    message,
                ));
            }
        }
        errors
    }

    /// Encode one record as a fixed-width line.
    pub fn encode_line(&self, data: &Record) -> Result<Vec<u8>, Error> {
        let mut line = Vec::with_capacity(self.line_width());
        for field in &self.fields {
            line.extend(field.encode(data.get(field.name))?);
        }
        Ok(line)
    }
}
