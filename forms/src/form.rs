// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::collections::HashMap;

use crate::errors::{Error, ValidationError};
use crate::section::FormSection;

/// Field values for one record, keyed by field name.
pub type Record = HashMap<String, crate::field::Value>;

/// Data for one section: a single record, or rows for a repeating section.
#[derive(Debug, Clone)]
pub enum SectionData {
    Single(Record),
    Repeated(Vec<Record>),
}

/// Complete form input, keyed by section name. Missing sections validate as
/// empty records so required-field errors surface with full paths.
pub type FormData = HashMap<String, SectionData>;

/// A complete filing-form declaration.
pub struct Form {
    /// Authority form code, e.g. `NPS-1001`.
    pub code: &'static str,
    pub name: &'static str,
    /// Owning authority short code (`NPS`, `NHIS`, `EI`, `WCI`).
    pub authority: &'static str,
    pub sections: Vec<FormSection>,
}

impl Form {
    pub fn section(&self, name: &str) -> Option<&FormSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// The repeating detail section, which every filing form has exactly
    /// one of.
    pub fn detail_section(&self) -> Option<&FormSection> {
        self.sections.iter().find(|s| s.repeating)
    }

    /// Validate complete form data, collecting every error.
    pub fn validate(&self, data: &FormData) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let empty = Record::new();

        for section in &self.sections {
            match data.get(section.name) {
                Some(SectionData::Repeated(rows)) if section.repeating => {
                    if rows.len() < section.min_items {
                        errors.push(ValidationError::new(
                            section.name,
                            format!("{} requires at least {} rows", section.label, section.min_items),
                        ));
                    }
                    if rows.len() > section.max_items {
                        errors.push(ValidationError::new(
                            section.name,
                            format!("{} allows at most {} rows", section.label, section.max_items),
                        ));
                    }
                    for (i, row) in rows.iter().enumerate() {
                        errors.extend(section.validate(row, &format!("{}[{i}].", section.name)));
                    }
                }
                Some(SectionData::Single(record)) if !section.repeating => {
                    errors.extend(section.validate(record, &format!("{}.", section.name)));
                }
                Some(_) => {
                    errors.push(ValidationError::new(
                        section.name,
                        format!("{} has the wrong shape", section.label),
                    ));
                }
                None if section.repeating => {
                    if section.min_items > 0 {
                        errors.push(ValidationError::new(
                            section.name,
                            format!("{} requires at least {} rows", section.label, section.min_items),
                        ));
                    }
                }
                None => {
                    errors.extend(section.validate(&empty, &format!("{}.", section.name)));
                }
            }
        }

        errors
    }

    /// Encode validated form data into the canonical body: every section
    /// line in schema order, LF separated, charset encoded.
    pub fn to_edi(&self, data: &FormData) -> Result<Vec<u8>, Error> {
        let errors = self.validate(data);
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        let empty = Record::new();
        let mut lines: Vec<Vec<u8>> = Vec::new();
        for section in &self.sections {
            match data.get(section.name) {
                Some(SectionData::Repeated(rows)) => {
                    for row in rows {
                        lines.push(section.encode_line(row)?);
                    }
                }
                Some(SectionData::Single(record)) => lines.push(section.encode_line(record)?),
                None => lines.push(section.encode_line(&empty)?),
            }
        }
        Ok(lines.join(&b'\n'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldKind, FormField, Value};

    fn form() -> Form {
        Form {
            code: "TST-0001",
            name: "test form",
            authority: "NPS",
            sections: vec![
                FormSection::new(
                    "company",
                    "company",
                    vec![FormField::new("business_no", "business number", FieldKind::Text, 10)
                        .required()],
                ),
                FormSection::new(
                    "employees",
                    "employee rows",
                    vec![
                        FormField::new("name", "name", FieldKind::Text, 6).required(),
                        FormField::new("income", "income", FieldKind::Integer, 8).right_aligned(),
                    ],
                )
                .repeating(1, 3),
            ],
        }
    }

    fn valid_data() -> FormData {
        let mut company = Record::new();
        company.insert("business_no".into(), Value::text("1234567891"));
        let mut employee = Record::new();
        employee.insert("name".into(), Value::text("Kim"));
        employee.insert("income".into(), Value::Integer(900));
        FormData::from([
            ("company".to_string(), SectionData::Single(company)),
            ("employees".to_string(), SectionData::Repeated(vec![employee])),
        ])
    }

    #[test]
    fn valid_data_passes() {
        assert!(form().validate(&valid_data()).is_empty());
    }

    #[test]
    fn missing_section_surfaces_required_fields() {
        let mut data = valid_data();
        data.remove("company");
        let errors = form().validate(&data);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "company.business_no");
    }

    #[test]
    fn repeating_cardinality_enforced() {
        let mut data = valid_data();
        data.insert("employees".into(), SectionData::Repeated(vec![]));
        let errors = form().validate(&data);
        assert!(errors.iter().any(|e| e.message.contains("at least 1")));

        let row = || {
            let mut r = Record::new();
            r.insert("name".into(), Value::text("Kim"));
            r
        };
        data.insert(
            "employees".into(),
            SectionData::Repeated(vec![row(), row(), row(), row()]),
        );
        let errors = form().validate(&data);
        assert!(errors.iter().any(|e| e.message.contains("at most 3")));
    }

    #[test]
    fn row_errors_carry_indices() {
        let mut data = valid_data();
        let bad = Record::new();
        data.insert("employees".into(), SectionData::Repeated(vec![bad]));
        let errors = form().validate(&data);
        assert_eq!(errors[0].field, "employees[0].name");
    }

    #[test]
    fn wrong_shape_is_reported() {
        let mut data = valid_data();
        let record = Record::new();
        data.insert("employees".into(), SectionData::Single(record));
        let errors = form().validate(&data);
        assert!(errors.iter().any(|e| e.message.contains("wrong shape")));
    }

    #[test]
    fn to_edi_emits_schema_order_lines() {
        let body = form().to_edi(&valid_data()).unwrap();
        let text = String::from_utf8(body).unwrap();
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "1234567891");
        assert_eq!(lines[1], "Kim   00000900");
    }

    #[test]
    fn to_edi_rejects_invalid_data() {
        let mut data = valid_data();
        data.remove("company");
        assert!(matches!(
            form().to_edi(&data).unwrap_err(),
            Error::Validation(_)
        ));
    }
}
