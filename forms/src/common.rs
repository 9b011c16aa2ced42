// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Sections shared by every authority's filing forms.

use crate::field::{FieldKind, FormField, Validator};
use crate::section::FormSection;
use crate::validators;

const BUSINESS_NO: &[Validator] = &[validators::business_number_field];
pub(crate) const RESIDENT_NO: &[Validator] = &[validators::resident_number_field];

/// Leading header line: form code and submission date.
pub(crate) fn header_section(form_code: &'static str) -> FormSection {
    FormSection::new(
        "header",
        "report header",
        vec![
            FormField::new("form_code", "form code", FieldKind::Text, 10).with_default(form_code),
            FormField::new("submit_date", "submission date", FieldKind::Date, 8).required(),
        ],
    )
}

/// Workplace identification line.
pub(crate) fn company_section(with_representative: bool) -> FormSection {
    let mut fields = vec![
        FormField::new("business_no", "business registration number", FieldKind::Text, 10)
            .required()
            .with_validators(BUSINESS_NO),
        FormField::new("workplace_no", "workplace management number", FieldKind::Text, 13)
            .required(),
        FormField::new("company_name", "workplace name", FieldKind::Text, 40).required(),
    ];
    if with_representative {
        fields.push(FormField::new(
            "representative",
            "representative name",
            FieldKind::Text,
            20,
        ));
    }
    FormSection::new("company", "workplace information", fields)
}

/// The leading record-type discriminator on every detail row.
pub(crate) fn record_type_field() -> FormField {
    FormField::new("record_type", "record type", FieldKind::Text, 1).with_default("D")
}

pub(crate) fn resident_no_field() -> FormField {
    FormField::new("resident_no", "resident registration number", FieldKind::Text, 13)
        .required()
        .with_validators(RESIDENT_NO)
}

pub(crate) fn employee_name_field() -> FormField {
    FormField::new("name", "employee name", FieldKind::Text, 20).required()
}
