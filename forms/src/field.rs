// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use kedi_encoding::{fit_left, fit_right_space, fit_right_zero};

use crate::errors::Error;

/// Field data kinds, a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Decimal,
    Date,
    Boolean,
    Choice,
}

/// On-wire alignment. Left pads with spaces; right pads with zeroes for
/// numeric kinds and spaces otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

/// A caller-supplied field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// String form used for validation and formatting.
    fn render(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Integer(n) => n.to_string(),
            Value::Decimal(x) => x.to_string(),
            Value::Bool(b) => (if *b { "Y" } else { "N" }).to_string(),
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, Value::Text(s) if s.is_empty())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Custom per-field validator: returns a message on failure.
pub type Validator = fn(&str) -> Option<String>;

/// A single field declaration inside a form section.
#[derive(Clone)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// On-wire width in bytes after charset encoding.
    pub width: usize,
    pub alignment: Alignment,
    pub default: Option<&'static str>,
    /// `(value, label)` pairs for `FieldKind::Choice`.
    pub choices: &'static [(&'static str, &'static str)],
    pub validators: &'static [Validator],
}

impl FormField {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind, width: usize) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            width,
            alignment: Alignment::Left,
            default: None,
            choices: &[],
            validators: &[],
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn right_aligned(mut self) -> Self {
        self.alignment = Alignment::Right;
        self
    }

    pub fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_choices(mut self, choices: &'static [(&'static str, &'static str)]) -> Self {
        self.choices = choices;
        self
    }

    pub fn with_validators(mut self, validators: &'static [Validator]) -> Self {
        self.validators = validators;
        self
    }

    /// Validate one value against kind, requiredness, choices and custom
    /// validators. Returns all messages, not only the first.
    pub fn validate(&self, value: Option<&Value>) -> Vec<String> {
        let mut errors = Vec::new();

        let missing = value.is_none() || value.is_some_and(Value::is_empty);
        if missing {
            if self.required && self.default.is_none() {
                errors.push(format!("{} is required", self.label));
            }
            return errors;
        }
        let rendered = value.expect("checked above").render();

        match self.kind {
            FieldKind::Integer => {
                if rendered.parse::<i64>().is_err() {
                    errors.push(format!("{} must be an integer", self.label));
                }
            }
            FieldKind::Decimal => {
                if rendered.parse::<f64>().is_err() {
                    errors.push(format!("{} must be a number", self.label));
                }
            }
            FieldKind::Date => {
                let clean = crate::dates::normalize_date(&rendered);
                if clean.len() != 8 || clean.chars().any(|c| !c.is_ascii_digit()) {
                    errors.push(format!("{} must be a date (YYYYMMDD)", self.label));
                }
            }
            FieldKind::Choice => {
                if !self.choices.iter().any(|(v, _)| *v == rendered) {
                    errors.push(format!("{} is not a valid choice", self.label));
                }
            }
            FieldKind::Text | FieldKind::Boolean => {}
        }

        for validator in self.validators {
            if let Some(message) = validator(&rendered) {
                errors.push(message);
            }
        }

        errors
    }

    /// Render a value (or the default) as its unpadded string form.
    pub fn format_value(&self, value: Option<&Value>) -> String {
        let raw = match value {
            Some(v) if !v.is_empty() => v.render(),
            _ => self.default.unwrap_or("").to_string(),
        };
        match self.kind {
            FieldKind::Integer => {
                if raw.is_empty() {
                    "0".to_string()
                } else {
                    raw
                }
            }
            FieldKind::Decimal => {
                if raw.is_empty() {
                    "0".to_string()
                } else {
                    raw
                }
            }
            FieldKind::Date => {
                let clean = crate::dates::normalize_date(&raw);
                clean.chars().take(8).collect()
            }
            FieldKind::Boolean => match raw.as_str() {
                "" | "N" | "false" => "N".to_string(),
                "Y" | "true" => "Y".to_string(),
                other => other.to_string(),
            },
            FieldKind::Text | FieldKind::Choice => raw,
        }
    }

    /// Encode a value at this field's exact byte width.
    pub fn encode(&self, value: Option<&Value>) -> Result<Vec<u8>, Error> {
        let rendered = self.format_value(value);
        let numeric = matches!(self.kind, FieldKind::Integer | FieldKind::Decimal);
        let result = match (self.alignment, numeric) {
            (Alignment::Left, _) => fit_left(&rendered, self.width),
            (Alignment::Right, true) => fit_right_zero(&rendered, self.width),
            (Alignment::Right, false) => fit_right_space(&rendered, self.width),
        };
        result.map_err(|source| Error::Encoding {
            field: self.name.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_field_rejects_missing() {
        let f = FormField::new("name", "name", FieldKind::Text, 20).required();
        assert_eq!(f.validate(None), vec!["name is required"]);
        assert_eq!(f.validate(Some(&Value::text(""))), vec!["name is required"]);
        assert!(f.validate(Some(&Value::text("Hong"))).is_empty());
    }

    #[test]
    fn required_with_default_passes_missing() {
        let f = FormField::new("job", "job type", FieldKind::Text, 2)
            .required()
            .with_default("01");
        assert!(f.validate(None).is_empty());
        assert_eq!(f.format_value(None), "01");
    }

    #[test]
    fn integer_kind_validates() {
        let f = FormField::new("income", "monthly income", FieldKind::Integer, 15);
        assert!(f.validate(Some(&Value::Integer(3_000_000))).is_empty());
        assert_eq!(
            f.validate(Some(&Value::text("abc"))),
            vec!["monthly income must be an integer"]
        );
    }

    #[test]
    fn date_kind_accepts_separated_forms() {
        let f = FormField::new("date", "acquisition date", FieldKind::Date, 8);
        assert!(f.validate(Some(&Value::text("2026-01-15"))).is_empty());
        assert!(f.validate(Some(&Value::text("20260115"))).is_empty());
        assert!(!f.validate(Some(&Value::text("Jan 15"))).is_empty());
        assert_eq!(f.format_value(Some(&Value::text("2026-01-15"))), "20260115");
    }

    #[test]
    fn choice_kind_checks_membership() {
        const CHOICES: &[(&str, &str)] = &[("01", "new"), ("02", "re-entry")];
        let f = FormField::new("type", "acquisition type", FieldKind::Choice, 2)
            .with_choices(CHOICES);
        assert!(f.validate(Some(&Value::text("01"))).is_empty());
        assert_eq!(
            f.validate(Some(&Value::text("09"))),
            vec!["acquisition type is not a valid choice"]
        );
    }

    #[test]
    fn boolean_renders_y_n() {
        let f = FormField::new("flag", "flag", FieldKind::Boolean, 1);
        assert_eq!(f.format_value(Some(&Value::Bool(true))), "Y");
        assert_eq!(f.format_value(Some(&Value::Bool(false))), "N");
        assert_eq!(f.format_value(None), "N");
    }

    #[test]
    fn encode_applies_alignment() {
        let left = FormField::new("name", "name", FieldKind::Text, 6);
        assert_eq!(left.encode(Some(&Value::text("Kim"))).unwrap(), b"Kim   ");

        let num = FormField::new("amount", "amount", FieldKind::Integer, 8).right_aligned();
        assert_eq!(
            num.encode(Some(&Value::Integer(3500))).unwrap(),
            b"00003500"
        );

        let code = FormField::new("code", "code", FieldKind::Text, 4).right_aligned();
        assert_eq!(code.encode(Some(&Value::text("AB"))).unwrap(), b"  AB");
    }

    #[test]
    fn custom_validators_run() {
        fn no_x(v: &str) -> Option<String> {
            v.contains('x').then(|| "value must not contain x".to_string())
        }
        const VALIDATORS: &[super::Validator] = &[no_x];
        let f = FormField::new("v", "v", FieldKind::Text, 4).with_validators(VALIDATORS);
        assert!(f.validate(Some(&Value::text("ok"))).is_empty());
        assert_eq!(
            f.validate(Some(&Value::text("xx"))),
            vec!["value must not contain x"]
        );
    }
}
