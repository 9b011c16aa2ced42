// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Employment-insurance and workers'-compensation filing forms, filed with
//! COMWEL (codes 3001/3002 employment, 4001/4002 workers' comp). The two
//! programs share record layouts; the document code selects the program.

use crate::common::{
    company_section, employee_name_field, header_section, record_type_field, resident_no_field,
};
use crate::field::{FieldKind, FormField};
use crate::form::Form;
use crate::section::FormSection;

/// Employment type codes reported on acquisition.
pub const EMPLOYMENT_TYPES: &[(&str, &str)] = &[
    ("1", "regular"),
    ("2", "daily worker"),
    ("3", "self-employed"),
    ("4", "artist"),
    ("5", "platform/gig worker"),
];

/// Loss reason codes; eligibility for unemployment benefit follows from
/// these (see the employment provider).
pub const LOSS_REASONS: &[(&str, &str)] = &[
    ("11", "dismissal for company reasons"),
    ("12", "contract expiry"),
    ("13", "mandatory retirement"),
    ("14", "restructuring"),
    ("15", "workplace relocation"),
    ("16", "recommended resignation"),
    ("21", "voluntary resignation"),
    ("22", "job change"),
    ("23", "personal reasons"),
    ("31", "resignation over wage arrears"),
    ("32", "workplace harassment"),
    ("33", "family care"),
];

/// Acquisition report, shared by employment and workers'-comp filings.
pub fn acquisition_form() -> Form {
    Form {
        code: "EI-3001",
        name: "employment insurance acquisition report",
        authority: "EI",
        sections: vec![
            header_section("EI-3001"),
            company_section(false),
            FormSection::new(
                "employees",
                "acquired employees",
                vec![
                    record_type_field(),
                    resident_no_field(),
                    employee_name_field(),
                    FormField::new("acquisition_date", "acquisition date", FieldKind::Date, 8)
                        .required(),
                    FormField::new("monthly_income", "monthly remuneration", FieldKind::Integer, 15)
                        .required()
                        .right_aligned(),
                    FormField::new("work_hours_weekly", "weekly work hours", FieldKind::Integer, 2)
                        .right_aligned()
                        .with_default("40"),
                    FormField::new("employment_type", "employment type", FieldKind::Choice, 1)
                        .required()
                        .with_choices(EMPLOYMENT_TYPES)
                        .with_default("1"),
                    FormField::new("contract_period", "contract period", FieldKind::Text, 20),
                    FormField::new("job_code", "occupation code", FieldKind::Text, 3)
                        .with_default("000"),
                    FormField::new("is_foreign_worker", "foreign worker", FieldKind::Boolean, 1),
                    FormField::new("visa_type", "visa type", FieldKind::Text, 3),
                ],
            )
            .repeating(1, 9999),
        ],
    }
}

/// Loss report; carries the benefit-eligibility determination.
pub fn loss_form() -> Form {
    Form {
        code: "EI-3002",
        name: "employment insurance loss report",
        authority: "EI",
        sections: vec![
            header_section("EI-3002"),
            company_section(false),
            FormSection::new(
                "employees",
                "lost employees",
                vec![
                    record_type_field(),
                    resident_no_field(),
                    employee_name_field(),
                    FormField::new("loss_date", "loss date", FieldKind::Date, 8).required(),
                    FormField::new("loss_reason_code", "loss reason code", FieldKind::Choice, 2)
                        .required()
                        .with_choices(LOSS_REASONS),
                    FormField::new("loss_reason_detail", "loss reason detail", FieldKind::Text, 30),
                    FormField::new("final_income", "final monthly income", FieldKind::Integer, 15)
                        .required()
                        .right_aligned(),
                    FormField::new("total_work_days", "total work days", FieldKind::Integer, 4)
                        .right_aligned()
                        .with_default("0"),
                    FormField::new("is_voluntary", "voluntary departure", FieldKind::Boolean, 1),
                    FormField::new("benefit_eligible", "benefit eligible", FieldKind::Boolean, 1),
                ],
            )
            .repeating(1, 9999),
        ],
    }
}

/// Membership change report. COMWEL has not published a dedicated change
/// document for the EDI channel; the record layout mirrors the pension one.
pub fn change_form() -> Form {
    Form {
        code: "EI-3001C",
        name: "employment insurance change report",
        authority: "EI",
        sections: vec![
            header_section("EI-3001C"),
            company_section(false),
            FormSection::new(
                "changes",
                "change rows",
                vec![
                    record_type_field(),
                    resident_no_field(),
                    employee_name_field(),
                    FormField::new("change_type", "change type", FieldKind::Text, 2)
                        .required()
                        .with_default("01"),
                    FormField::new("change_date", "change date", FieldKind::Date, 8).required(),
                    FormField::new("before_value", "value before change", FieldKind::Text, 50),
                    FormField::new("after_value", "value after change", FieldKind::Text, 50)
                        .required(),
                    FormField::new("reason", "change reason", FieldKind::Text, 100),
                ],
            )
            .repeating(1, 9999),
        ],
    }
}
