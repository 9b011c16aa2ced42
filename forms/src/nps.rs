// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! National Pension Service filing forms.
//!
//! Form codes follow the NPS EDI document catalogue: 1001 acquisition,
//! 1002 loss, 1003 change.

use crate::common::{
    company_section, employee_name_field, header_section, record_type_field, resident_no_field,
};
use crate::field::{FieldKind, FormField};
use crate::form::Form;
use crate::section::FormSection;

const ACQUISITION_TYPES: &[(&str, &str)] = &[
    ("01", "new acquisition"),
    ("02", "re-acquisition"),
    ("03", "transfer-in"),
];

const JOB_TYPES: &[(&str, &str)] = &[
    ("01", "office"),
    ("02", "production"),
    ("03", "sales"),
    ("04", "service"),
    ("99", "other"),
];

const LOSS_REASONS: &[(&str, &str)] = &[
    ("11", "retirement"),
    ("12", "death"),
    ("13", "reached age 60"),
    ("14", "nationality loss or emigration"),
    ("21", "acquired at another workplace"),
    ("22", "appointed as public official or teacher"),
    ("31", "other"),
];

const CHANGE_TYPES: &[(&str, &str)] = &[
    ("01", "standard monthly income"),
    ("02", "name"),
    ("03", "resident number correction"),
    ("04", "acquisition date correction"),
    ("05", "loss date correction"),
];

/// Pension acquisition report.
pub fn acquisition_form() -> Form {
    Form {
        code: "NPS-1001",
        name: "national pension acquisition report",
        authority: "NPS",
        sections: vec![
            header_section("NPS-1001"),
            company_section(true),
            FormSection::new(
                "employees",
                "acquired employees",
                vec![
                    record_type_field(),
                    resident_no_field(),
                    employee_name_field(),
                    FormField::new("acquisition_date", "acquisition date", FieldKind::Date, 8)
                        .required(),
                    FormField::new(
                        "monthly_income",
                        "standard monthly income",
                        FieldKind::Integer,
                        15,
                    )
                    .required()
                    .right_aligned(),
                    FormField::new("acquisition_type", "acquisition type", FieldKind::Choice, 2)
                        .required()
                        .with_choices(ACQUISITION_TYPES)
                        .with_default("01"),
                    FormField::new("job_type", "job type", FieldKind::Choice, 2)
                        .with_choices(JOB_TYPES)
                        .with_default("01"),
                    FormField::new("nationality", "nationality code", FieldKind::Text, 3)
                        .with_default("KOR"),
                ],
            )
            .repeating(1, 9999),
        ],
    }
}

/// Pension loss report.
pub fn loss_form() -> Form {
    Form {
        code: "NPS-1002",
        name: "national pension loss report",
        authority: "NPS",
        sections: vec![
            header_section("NPS-1002"),
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
                        .with_choices(LOSS_REASONS),
                    FormField::new(
                        "final_income",
                        "final standard monthly income",
                        FieldKind::Integer,
                        15,
                    )
                    .required()
                    .right_aligned(),
                ],
            )
            .repeating(1, 9999),
        ],
    }
}

/// Monthly payment summary report.
pub fn monthly_report_form() -> Form {
    Form {
        code: "NPS-1004",
        name: "national pension monthly payment report",
        authority: "NPS",
        sections: vec![
            header_section("NPS-1004"),
            company_section(false),
            FormSection::new(
                "summary",
                "monthly summary",
                vec![
                    record_type_field(),
                    FormField::new("report_month", "report month", FieldKind::Text, 6).required(),
                    FormField::new("employee_count", "employee count", FieldKind::Integer, 6)
                        .required()
                        .right_aligned(),
                    FormField::new(
                        "total_income",
                        "total standard monthly income",
                        FieldKind::Integer,
                        15,
                    )
                    .required()
                    .right_aligned(),
                ],
            )
            .repeating(1, 1),
        ],
    }
}

/// Pension membership change report.
pub fn change_form() -> Form {
    Form {
        code: "NPS-1003",
        name: "national pension change report",
        authority: "NPS",
        sections: vec![
            header_section("NPS-1003"),
            company_section(false),
            FormSection::new(
                "changes",
                "change rows",
                vec![
                    record_type_field(),
                    resident_no_field(),
                    employee_name_field(),
                    FormField::new("change_type", "change type", FieldKind::Choice, 2)
                        .required()
                        .with_choices(CHANGE_TYPES),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Value;
    use crate::form::{FormData, Record, SectionData};

    fn acquisition_data() -> FormData {
        let mut header = Record::new();
        header.insert("submit_date".into(), Value::text("2026-01-15"));
        let mut company = Record::new();
        company.insert("business_no".into(), Value::text("1234567891"));
        company.insert("workplace_no".into(), Value::text("1234567890123"));
        company.insert("company_name".into(), Value::text("KERP Test"));
        let mut employee = Record::new();
        employee.insert("resident_no".into(), Value::text("8001011234560"));
        employee.insert("name".into(), Value::text("Hong Gildong"));
        employee.insert("acquisition_date".into(), Value::text("2026-01-15"));
        employee.insert("monthly_income".into(), Value::Integer(3_000_000));
        FormData::from([
            ("header".to_string(), SectionData::Single(header)),
            ("company".to_string(), SectionData::Single(company)),
            (
                "employees".to_string(),
                SectionData::Repeated(vec![employee]),
            ),
        ])
    }

    #[test]
    fn acquisition_accepts_valid_filing() {
        let form = acquisition_form();
        assert!(form.validate(&acquisition_data()).is_empty());
    }

    #[test]
    fn acquisition_detail_line_is_byte_exact() {
        let form = acquisition_form();
        let detail = form.detail_section().unwrap();
        // 1 + 13 + 20 + 8 + 15 + 2 + 2 + 3
        assert_eq!(detail.line_width(), 64);

        let data = acquisition_data();
        let SectionData::Repeated(rows) = &data["employees"] else {
            unreachable!()
        };
        let line = detail.encode_line(&rows[0]).unwrap();
        assert_eq!(line.len(), 64);
        assert!(line.starts_with(b"D8001011234560Hong Gildong        20260115"));
        assert_eq!(&line[42..57], b"000000003000000");
    }

    #[test]
    fn nine_digit_business_number_fails_with_length_message() {
        let form = acquisition_form();
        let mut data = acquisition_data();
        if let Some(SectionData::Single(company)) = data.get_mut("company") {
            company.insert("business_no".into(), Value::text("123456789"));
        }
        let errors = form.validate(&data);
        assert!(errors.iter().any(|e| e.message.contains("10 digits")));
    }

    #[test]
    fn loss_requires_reason() {
        let form = loss_form();
        let mut employee = Record::new();
        employee.insert("resident_no".into(), Value::text("8001011234560"));
        employee.insert("name".into(), Value::text("Hong Gildong"));
        employee.insert("loss_date".into(), Value::text("2026-02-01"));
        employee.insert("final_income".into(), Value::Integer(3_000_000));
        let mut header = Record::new();
        header.insert("submit_date".into(), Value::text("2026-02-01"));
        let mut company = Record::new();
        company.insert("business_no".into(), Value::text("1234567891"));
        company.insert("workplace_no".into(), Value::text("1234567890123"));
        company.insert("company_name".into(), Value::text("KERP Test"));
        let data = FormData::from([
            ("header".to_string(), SectionData::Single(header)),
            ("company".to_string(), SectionData::Single(company)),
            (
                "employees".to_string(),
                SectionData::Repeated(vec![employee]),
            ),
        ]);
        let errors = form.validate(&data);
        assert!(errors.iter().any(|e| e.field.ends_with("loss_reason")));
    }

    #[test]
    fn change_form_roundtrips_through_to_edi() {
        let form = change_form();
        let mut header = Record::new();
        header.insert("submit_date".into(), Value::text("2026-03-02"));
        let mut company = Record::new();
        company.insert("business_no".into(), Value::text("1234567891"));
        company.insert("workplace_no".into(), Value::text("1234567890123"));
        company.insert("company_name".into(), Value::text("KERP Test"));
        let mut change = Record::new();
        change.insert("resident_no".into(), Value::text("8001011234560"));
        change.insert("name".into(), Value::text("Hong Gildong"));
        change.insert("change_type".into(), Value::text("01"));
        change.insert("change_date".into(), Value::text("2026-03-01"));
        change.insert("after_value".into(), Value::text("3500000"));
        let data = FormData::from([
            ("header".to_string(), SectionData::Single(header)),
            ("company".to_string(), SectionData::Single(company)),
            ("changes".to_string(), SectionData::Repeated(vec![change])),
        ]);

        let body = form.to_edi(&data).unwrap();
        let lines: Vec<&[u8]> = body.split(|&b| b == b'\n').collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].len(), 18); // 10 + 8
        assert_eq!(lines[1].len(), 63); // 10 + 13 + 40
        assert_eq!(lines[2].len(), form.detail_section().unwrap().line_width());
    }
}
