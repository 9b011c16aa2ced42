// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! National Health Insurance Service filing forms (codes 2001-2004).

use crate::common::{
    company_section, employee_name_field, header_section, record_type_field, resident_no_field,
};
use crate::field::{FieldKind, FormField};
use crate::form::Form;
use crate::section::FormSection;

const CONTRACT_TYPES: &[(&str, &str)] = &[
    ("1", "regular"),
    ("2", "fixed term"),
    ("3", "daily"),
];

const LOSS_REASONS: &[(&str, &str)] = &[
    ("11", "retirement"),
    ("12", "death"),
    ("21", "conversion to regional subscriber"),
    ("31", "acquired at another workplace"),
];

const RELATIONSHIPS: &[(&str, &str)] = &[
    ("01", "spouse"),
    ("02", "child"),
    ("03", "parent"),
    ("04", "grandparent"),
    ("05", "sibling"),
    ("99", "other"),
];

const DEPENDENT_REPORT_TYPES: &[(&str, &str)] = &[("1", "register"), ("2", "remove")];

/// Health insurance acquisition report.
pub fn acquisition_form() -> Form {
    Form {
        code: "NHIS-2001",
        name: "health insurance acquisition report",
        authority: "NHIS",
        sections: vec![
            header_section("NHIS-2001"),
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
                    FormField::new("monthly_salary", "monthly salary", FieldKind::Integer, 15)
                        .required()
                        .right_aligned(),
                    FormField::new("work_hours_weekly", "weekly work hours", FieldKind::Integer, 2)
                        .right_aligned()
                        .with_default("40"),
                    FormField::new("is_part_time", "part-time worker", FieldKind::Boolean, 1),
                    FormField::new("contract_type", "contract type", FieldKind::Choice, 1)
                        .with_choices(CONTRACT_TYPES)
                        .with_default("1"),
                ],
            )
            .repeating(1, 9999),
        ],
    }
}

/// Health insurance loss report.
pub fn loss_form() -> Form {
    Form {
        code: "NHIS-2002",
        name: "health insurance loss report",
        authority: "NHIS",
        sections: vec![
            header_section("NHIS-2002"),
            company_section(false),
            FormSection::new(
                "employees",
                "lost employees",
                vec![
                    record_type_field(),
                    resident_no_field(),
                    employee_name_field(),
                    FormField::new("loss_date", "loss date", FieldKind::Date, 8).required(),
                    FormField::new("loss_reason", "loss reason", FieldKind::Choice, 2)
                        .required()
                        .with_choices(LOSS_REASONS)
                        .with_default("11"),
                    FormField::new("final_salary", "final monthly salary", FieldKind::Integer, 15)
                        .required()
                        .right_aligned(),
                ],
            )
            .repeating(1, 9999),
        ],
    }
}

/// Monthly-salary change report.
pub fn salary_change_form() -> Form {
    Form {
        code: "NHIS-2003",
        name: "health insurance salary change report",
        authority: "NHIS",
        sections: vec![
            header_section("NHIS-2003"),
            company_section(false),
            FormSection::new(
                "changes",
                "salary change rows",
                vec![
                    record_type_field(),
                    resident_no_field(),
                    employee_name_field(),
                    FormField::new("change_date", "change date", FieldKind::Date, 8).required(),
                    FormField::new("before_salary", "salary before change", FieldKind::Integer, 15)
                        .required()
                        .right_aligned(),
                    FormField::new("after_salary", "salary after change", FieldKind::Integer, 15)
                        .required()
                        .right_aligned(),
                    FormField::new("reason", "change reason", FieldKind::Text, 100),
                ],
            )
            .repeating(1, 9999),
        ],
    }
}

/// Dependent registration report.
pub fn dependent_form() -> Form {
    Form {
        code: "NHIS-2004",
        name: "health insurance dependent report",
        authority: "NHIS",
        sections: vec![
            header_section("NHIS-2004"),
            company_section(false),
            FormSection::new(
                "dependents",
                "dependent rows",
                vec![
                    record_type_field(),
                    resident_no_field(),
                    employee_name_field(),
                    FormField::new(
                        "dependent_resident_no",
                        "dependent resident number",
                        FieldKind::Text,
                        13,
                    )
                    .required()
                    .with_validators(crate::common::RESIDENT_NO),
                    FormField::new("dependent_name", "dependent name", FieldKind::Text, 20)
                        .required(),
                    FormField::new("relationship", "relationship", FieldKind::Choice, 2)
                        .required()
                        .with_choices(RELATIONSHIPS),
                    FormField::new("report_type", "report type", FieldKind::Choice, 1)
                        .required()
                        .with_choices(DEPENDENT_REPORT_TYPES)
                        .with_default("1"),
                    FormField::new("report_date", "report date", FieldKind::Date, 8).required(),
                ],
            )
            .repeating(1, 9999),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Value;
    use crate::form::{FormData, Record, SectionData};

    fn base_sections() -> FormData {
        let mut header = Record::new();
        header.insert("submit_date".into(), Value::text("2026-01-15"));
        let mut company = Record::new();
        company.insert("business_no".into(), Value::text("1234567891"));
        company.insert("workplace_no".into(), Value::text("1234567890123"));
        company.insert("company_name".into(), Value::text("KERP Test"));
        FormData::from([
            ("header".to_string(), SectionData::Single(header)),
            ("company".to_string(), SectionData::Single(company)),
        ])
    }

    #[test]
    fn acquisition_detail_width() {
        let detail = acquisition_form();
        let detail = detail.detail_section().unwrap();
        // 1 + 13 + 20 + 8 + 15 + 2 + 1 + 1
        assert_eq!(detail.line_width(), 61);
    }

    #[test]
    fn acquisition_accepts_part_time_rows() {
        let form = acquisition_form();
        let mut data = base_sections();
        let mut row = Record::new();
        row.insert("resident_no".into(), Value::text("8001011234560"));
        row.insert("name".into(), Value::text("Kim Younghee"));
        row.insert("acquisition_date".into(), Value::text("2026-01-15"));
        row.insert("monthly_salary".into(), Value::Integer(1_800_000));
        row.insert("work_hours_weekly".into(), Value::Integer(20));
        row.insert("is_part_time".into(), Value::Bool(true));
        data.insert("employees".into(), SectionData::Repeated(vec![row.clone()]));
        assert!(form.validate(&data).is_empty());

        let line = form.detail_section().unwrap().encode_line(&row).unwrap();
        assert_eq!(line.len(), 61);
        assert_eq!(line[59], b'Y'); // part-time flag sits before contract type
    }

    #[test]
    fn loss_defaults_reason_to_retirement() {
        let form = loss_form();
        let detail = form.detail_section().unwrap();
        let mut row = Record::new();
        row.insert("resident_no".into(), Value::text("8001011234560"));
        row.insert("name".into(), Value::text("Kim Younghee"));
        row.insert("loss_date".into(), Value::text("2026-02-01"));
        row.insert("final_salary".into(), Value::Integer(2_000_000));
        assert!(detail.validate(&row, "employees[0].").is_empty());
        let line = detail.encode_line(&row).unwrap();
        assert_eq!(&line[42..44], b"11");
    }

    #[test]
    fn salary_change_requires_both_amounts() {
        let form = salary_change_form();
        let mut data = base_sections();
        let mut row = Record::new();
        row.insert("resident_no".into(), Value::text("8001011234560"));
        row.insert("name".into(), Value::text("Kim Younghee"));
        row.insert("change_date".into(), Value::text("2026-03-01"));
        row.insert("before_salary".into(), Value::Integer(2_000_000));
        data.insert("changes".into(), SectionData::Repeated(vec![row]));
        let errors = form.validate(&data);
        assert!(errors.iter().any(|e| e.field.ends_with("after_salary")));
    }

    #[test]
    fn dependent_rows_validate_both_resident_numbers() {
        let form = dependent_form();
        let mut data = base_sections();
        let mut row = Record::new();
        row.insert("resident_no".into(), Value::text("8001011234560"));
        row.insert("name".into(), Value::text("Kim Younghee"));
        row.insert("dependent_resident_no".into(), Value::text("not-a-number"));
        row.insert("dependent_name".into(), Value::text("Kim Minjun"));
        row.insert("relationship".into(), Value::text("02"));
        row.insert("report_date".into(), Value::text("2026-01-20"));
        data.insert("dependents".into(), SectionData::Repeated(vec![row]));
        let errors = form.validate(&data);
        assert!(errors
            .iter()
            .any(|e| e.field.ends_with("dependent_resident_no")));
    }
}
