// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! National Health Insurance Service adapter.
//!
//! Health insurance cares about working hours: below 40 hours a week the
//! acquisition is flagged part-time, and change filings move the monthly
//! salary (document 2003) rather than free-form attributes.

use async_trait::async_trait;
use tracing::info;

use kedi_edi::{ClientPool, DocumentType, Error, InsuranceType, Protocol};
use kedi_forms::validators::strip_separators;
use kedi_forms::{nhis, FormData, Record, SectionData, Value};

use crate::common::{today_compact, DownloadResult, ProviderCore, ProviderStatus, StatusResult, SubmissionResult};
use crate::types::{AcquisitionData, ChangeData, LossData, ProviderConfig};
use crate::Provider;

const FULL_TIME_HOURS: u32 = 40;

pub struct NhisProvider {
    core: ProviderCore,
}

impl NhisProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, Error> {
        Protocol::new(config.protocol.clone())?;
        let protocol_config = config.protocol.clone();
        let pool = ClientPool::new(
            config.connection,
            move || Protocol::new(protocol_config.clone()),
            config.pool_size,
        );
        info!(authority = "NHIS", "provider initialized");
        Ok(Self {
            core: ProviderCore::new(pool),
        })
    }

    /// Register or remove a dependent (document 2004). Health-insurance
    /// only, so this lives outside the shared capability set.
    pub async fn submit_dependent(&self, data: &crate::types::DependentData) -> SubmissionResult {
        let mut form_data = Self::base_sections(&data.company);
        let mut row = Record::new();
        row.insert(
            "resident_no".into(),
            Value::text(strip_separators(&data.employee.resident_no)),
        );
        row.insert("name".into(), Value::text(&data.employee.name));
        row.insert(
            "dependent_resident_no".into(),
            Value::text(strip_separators(&data.dependent_resident_no)),
        );
        row.insert("dependent_name".into(), Value::text(&data.dependent_name));
        row.insert("relationship".into(), Value::text(&data.relationship));
        row.insert(
            "report_type".into(),
            Value::text(if data.register { "1" } else { "2" }),
        );
        row.insert("report_date".into(), Value::text(&data.date));
        form_data.insert("dependents".into(), SectionData::Repeated(vec![row]));

        self.core
            .submit(
                "NHIS",
                &nhis::dependent_form(),
                &form_data,
                "dependents",
                DocumentType::NhisDependent,
                &data.company.workplace_no,
                &data.company.workplace_no,
                &data.company.business_no,
            )
            .await
    }

    fn base_sections(company: &crate::types::CompanyContext) -> FormData {
        let mut header = Record::new();
        header.insert("submit_date".into(), Value::text(today_compact()));
        let mut section = Record::new();
        section.insert("business_no".into(), Value::text(&company.business_no));
        section.insert("workplace_no".into(), Value::text(&company.workplace_no));
        section.insert("company_name".into(), Value::text(&company.name));
        FormData::from([
            ("header".to_string(), SectionData::Single(header)),
            ("company".to_string(), SectionData::Single(section)),
        ])
    }
}

#[async_trait]
impl Provider for NhisProvider {
    fn name(&self) -> &'static str {
        "National Health Insurance Service"
    }

    fn code(&self) -> &'static str {
        "NHIS"
    }

    fn insurance(&self) -> InsuranceType {
        InsuranceType::Nhis
    }

    fn status(&self) -> ProviderStatus {
        self.core.status()
    }

    async fn connect(&self) -> bool {
        self.core.probe("NHIS").await
    }

    async fn disconnect(&self) {
        self.core.pool.close().await;
    }

    async fn health_check(&self) -> bool {
        self.core.probe("NHIS").await
    }

    async fn submit_acquisition(&self, data: &AcquisitionData) -> SubmissionResult {
        let work_hours = data.work_hours_weekly.unwrap_or(FULL_TIME_HOURS);

        let mut form_data = Self::base_sections(&data.company);
        let mut row = Record::new();
        row.insert(
            "resident_no".into(),
            Value::text(strip_separators(&data.employee.resident_no)),
        );
        row.insert("name".into(), Value::text(&data.employee.name));
        row.insert("acquisition_date".into(), Value::text(&data.date));
        row.insert("monthly_salary".into(), Value::Integer(data.monthly_income));
        row.insert(
            "work_hours_weekly".into(),
            Value::Integer(i64::from(work_hours)),
        );
        row.insert(
            "is_part_time".into(),
            Value::Bool(work_hours < FULL_TIME_HOURS),
        );
        if let Some(contract_type) = &data.contract_type {
            row.insert("contract_type".into(), Value::text(contract_type));
        }
        form_data.insert("employees".into(), SectionData::Repeated(vec![row]));

        self.core
            .submit(
                "NHIS",
                &nhis::acquisition_form(),
                &form_data,
                "employees",
                DocumentType::NhisAcquisition,
                &data.company.workplace_no,
                &data.company.workplace_no,
                &data.company.business_no,
            )
            .await
    }

    async fn submit_loss(&self, data: &LossData) -> SubmissionResult {
        let mut form_data = Self::base_sections(&data.company);
        let mut row = Record::new();
        row.insert(
            "resident_no".into(),
            Value::text(strip_separators(&data.employee.resident_no)),
        );
        row.insert("name".into(), Value::text(&data.employee.name));
        row.insert("loss_date".into(), Value::text(&data.date));
        row.insert(
            "loss_reason".into(),
            Value::text(data.reason_code.as_deref().unwrap_or("11")),
        );
        row.insert("final_salary".into(), Value::Integer(data.final_income));
        form_data.insert("employees".into(), SectionData::Repeated(vec![row]));

        self.core
            .submit(
                "NHIS",
                &nhis::loss_form(),
                &form_data,
                "employees",
                DocumentType::NhisLoss,
                &data.company.workplace_no,
                &data.company.workplace_no,
                &data.company.business_no,
            )
            .await
    }

    /// Change filings carry the salary movement (document 2003).
    async fn submit_change(&self, data: &ChangeData) -> SubmissionResult {
        let mut form_data = Self::base_sections(&data.company);
        let mut row = Record::new();
        row.insert(
            "resident_no".into(),
            Value::text(strip_separators(&data.employee.resident_no)),
        );
        row.insert("name".into(), Value::text(&data.employee.name));
        row.insert("change_date".into(), Value::text(&data.date));
        row.insert(
            "before_salary".into(),
            Value::text(data.before.as_deref().unwrap_or("0")),
        );
        row.insert("after_salary".into(), Value::text(&data.after));
        if let Some(reason) = &data.reason {
            row.insert("reason".into(), Value::text(reason));
        }
        form_data.insert("changes".into(), SectionData::Repeated(vec![row]));

        self.core
            .submit(
                "NHIS",
                &nhis::salary_change_form(),
                &form_data,
                "changes",
                DocumentType::NhisSalaryChange,
                &data.company.workplace_no,
                &data.company.workplace_no,
                &data.company.business_no,
            )
            .await
    }

    async fn query_status(&self, submission_id: &str) -> StatusResult {
        self.core
            .query_status("NHIS", InsuranceType::Nhis, submission_id)
            .await
    }

    async fn download_result(&self, submission_id: &str, _document_type: &str) -> DownloadResult {
        self.core
            .download(
                "NHIS",
                InsuranceType::Nhis,
                submission_id,
                format!("nhis_result_{submission_id}.pdf"),
            )
            .await
    }

    async fn cancel_filing(&self, submission_id: &str) -> SubmissionResult {
        self.core
            .cancel("NHIS", InsuranceType::Nhis, submission_id)
            .await
    }
}
