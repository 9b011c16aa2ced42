// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! National Pension Service adapter.

use async_trait::async_trait;
use tracing::info;

use kedi_edi::{ClientPool, DocumentType, Error, InsuranceType, Protocol};
use kedi_forms::validators::strip_separators;
use kedi_forms::{nps, FormData, Record, SectionData, Value};

use crate::common::{today_compact, DownloadResult, ProviderCore, ProviderStatus, StatusResult, SubmissionResult};
use crate::types::{AcquisitionData, ChangeData, LossData, ProviderConfig};
use crate::Provider;

pub struct NpsProvider {
    core: ProviderCore,
}

impl NpsProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, Error> {
        // Fail fast on unusable crypto settings before pooling.
        Protocol::new(config.protocol.clone())?;
        let protocol_config = config.protocol.clone();
        let pool = ClientPool::new(
            config.connection,
            move || Protocol::new(protocol_config.clone()),
            config.pool_size,
        );
        info!(authority = "NPS", "provider initialized");
        Ok(Self {
            core: ProviderCore::new(pool),
        })
    }

    /// File the monthly payment summary (document 1004). Pension-only,
    /// so this lives outside the shared capability set.
    pub async fn submit_monthly_report(
        &self,
        data: &crate::types::MonthlyReportData,
    ) -> SubmissionResult {
        let mut form_data = Self::base_sections(&data.company);
        let mut row = Record::new();
        row.insert("report_month".into(), Value::text(&data.report_month));
        row.insert(
            "employee_count".into(),
            Value::Integer(i64::from(data.employee_count)),
        );
        row.insert("total_income".into(), Value::Integer(data.total_income));
        form_data.insert("summary".into(), SectionData::Repeated(vec![row]));

        self.core
            .submit(
                "NPS",
                &nps::monthly_report_form(),
                &form_data,
                "summary",
                DocumentType::NpsMonthlyReport,
                &data.company.workplace_no,
                &data.company.workplace_no,
                &data.company.business_no,
            )
            .await
    }

    fn base_sections(data_company: &crate::types::CompanyContext) -> FormData {
        let mut header = Record::new();
        header.insert("submit_date".into(), Value::text(today_compact()));
        let mut company = Record::new();
        company.insert("business_no".into(), Value::text(&data_company.business_no));
        company.insert(
            "workplace_no".into(),
            Value::text(&data_company.workplace_no),
        );
        company.insert("company_name".into(), Value::text(&data_company.name));
        FormData::from([
            ("header".to_string(), SectionData::Single(header)),
            ("company".to_string(), SectionData::Single(company)),
        ])
    }
}

#[async_trait]
impl Provider for NpsProvider {
    fn name(&self) -> &'static str {
        "National Pension Service"
    }

    fn code(&self) -> &'static str {
        "NPS"
    }

    fn insurance(&self) -> InsuranceType {
        InsuranceType::Nps
    }

    fn status(&self) -> ProviderStatus {
        self.core.status()
    }

    async fn connect(&self) -> bool {
        self.core.probe("NPS").await
    }

    async fn disconnect(&self) {
        self.core.pool.close().await;
    }

    async fn health_check(&self) -> bool {
        self.core.probe("NPS").await
    }

    async fn submit_acquisition(&self, data: &AcquisitionData) -> SubmissionResult {
        let mut form_data = Self::base_sections(&data.company);
        let mut row = Record::new();
        row.insert(
            "resident_no".into(),
            Value::text(strip_separators(&data.employee.resident_no)),
        );
        row.insert("name".into(), Value::text(&data.employee.name));
        row.insert("acquisition_date".into(), Value::text(&data.date));
        row.insert("monthly_income".into(), Value::Integer(data.monthly_income));
        if let Some(job_type) = &data.job_type {
            row.insert("job_type".into(), Value::text(job_type));
        }
        if let Some(nationality) = &data.employee.nationality {
            row.insert("nationality".into(), Value::text(nationality));
        }
        form_data.insert("employees".into(), SectionData::Repeated(vec![row]));

        self.core
            .submit(
                "NPS",
                &nps::acquisition_form(),
                &form_data,
                "employees",
                DocumentType::NpsAcquisition,
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
        row.insert("final_income".into(), Value::Integer(data.final_income));
        form_data.insert("employees".into(), SectionData::Repeated(vec![row]));

        self.core
            .submit(
                "NPS",
                &nps::loss_form(),
                &form_data,
                "employees",
                DocumentType::NpsLoss,
                &data.company.workplace_no,
                &data.company.workplace_no,
                &data.company.business_no,
            )
            .await
    }

    async fn submit_change(&self, data: &ChangeData) -> SubmissionResult {
        let mut form_data = Self::base_sections(&data.company);
        let mut row = Record::new();
        row.insert(
            "resident_no".into(),
            Value::text(strip_separators(&data.employee.resident_no)),
        );
        row.insert("name".into(), Value::text(&data.employee.name));
        row.insert(
            "change_type".into(),
            Value::text(data.change_type.as_deref().unwrap_or("01")),
        );
        row.insert("change_date".into(), Value::text(&data.date));
        if let Some(before) = &data.before {
            row.insert("before_value".into(), Value::text(before));
        }
        row.insert("after_value".into(), Value::text(&data.after));
        if let Some(reason) = &data.reason {
            row.insert("reason".into(), Value::text(reason));
        }
        form_data.insert("changes".into(), SectionData::Repeated(vec![row]));

        self.core
            .submit(
                "NPS",
                &nps::change_form(),
                &form_data,
                "changes",
                DocumentType::NpsChange,
                &data.company.workplace_no,
                &data.company.workplace_no,
                &data.company.business_no,
            )
            .await
    }

    async fn query_status(&self, submission_id: &str) -> StatusResult {
        self.core
            .query_status("NPS", InsuranceType::Nps, submission_id)
            .await
    }

    async fn download_result(&self, submission_id: &str, _document_type: &str) -> DownloadResult {
        self.core
            .download(
                "NPS",
                InsuranceType::Nps,
                submission_id,
                format!("nps_result_{submission_id}.pdf"),
            )
            .await
    }

    async fn cancel_filing(&self, submission_id: &str) -> SubmissionResult {
        self.core
            .cancel("NPS", InsuranceType::Nps, submission_id)
            .await
    }
}
