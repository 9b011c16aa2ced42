// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! COMWEL adapter for employment insurance and workers' compensation.
//!
//! One institution serves both programs; the instance's target program
//! selects the document codes. Employment loss filings additionally decide
//! unemployment-benefit eligibility from the departure reason, and
//! acquisitions derive the reported employment type from weekly hours and
//! contract kind.

use async_trait::async_trait;
use tracing::info;

use kedi_edi::{ClientPool, DocumentType, Error, InsuranceType, Protocol};
use kedi_forms::validators::strip_separators;
use kedi_forms::{ei, FormData, Record, SectionData, Value};

use crate::common::{today_compact, DownloadResult, ProviderCore, ProviderStatus, StatusResult, SubmissionResult};
use crate::types::{AcquisitionData, ChangeData, LossData, ProviderConfig};
use crate::Provider;

/// Weekly hours below which a worker files as a daily worker.
const DAILY_WORKER_HOURS: u32 = 15;

/// A mapped departure reason with its benefit determination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LossReason {
    pub code: &'static str,
    pub detail: &'static str,
    pub benefit_eligible: bool,
}

/// Departure reasons recognized by the employment-insurance program.
/// Involuntary departures and the protected special cases qualify for
/// unemployment benefit; voluntary departures do not.
const LOSS_REASONS: &[LossReason] = &[
    LossReason { code: "11", detail: "dismissal for company reasons", benefit_eligible: true },
    LossReason { code: "12", detail: "contract expiry", benefit_eligible: true },
    LossReason { code: "13", detail: "mandatory retirement", benefit_eligible: true },
    LossReason { code: "14", detail: "restructuring", benefit_eligible: true },
    LossReason { code: "15", detail: "workplace relocation", benefit_eligible: true },
    LossReason { code: "16", detail: "recommended resignation", benefit_eligible: true },
    LossReason { code: "21", detail: "voluntary resignation", benefit_eligible: false },
    LossReason { code: "22", detail: "job change", benefit_eligible: false },
    LossReason { code: "23", detail: "personal reasons", benefit_eligible: false },
    LossReason { code: "31", detail: "resignation over wage arrears", benefit_eligible: true },
    LossReason { code: "32", detail: "workplace harassment", benefit_eligible: true },
    LossReason { code: "33", detail: "family care", benefit_eligible: true },
];

/// Map a caller-supplied reason code, falling back on the voluntary flag
/// when the code is unknown.
pub fn map_loss_reason(reason_code: Option<&str>, is_voluntary: bool) -> &'static LossReason {
    if let Some(code) = reason_code {
        if let Some(reason) = LOSS_REASONS.iter().find(|r| r.code == code) {
            return reason;
        }
    }
    let fallback = if is_voluntary { "21" } else { "11" };
    LOSS_REASONS
        .iter()
        .find(|r| r.code == fallback)
        .expect("fallback codes are in the table")
}

/// Employment-type derivation: under 15 weekly hours files as a daily
/// worker regardless of contract; otherwise the contract kind decides.
pub fn derive_employment_type(work_hours: u32, contract_type: Option<&str>) -> &'static str {
    if work_hours < DAILY_WORKER_HOURS {
        return "2";
    }
    match contract_type {
        Some("self_employed") => "3",
        Some("artist") => "4",
        Some("gig") => "5",
        _ => "1",
    }
}

pub struct EiProvider {
    core: ProviderCore,
    program: InsuranceType,
}

impl EiProvider {
    /// `program` must be employment or workers' comp; both are filed with
    /// COMWEL over the same endpoint.
    pub fn new(config: ProviderConfig, program: InsuranceType) -> Result<Self, Error> {
        debug_assert!(matches!(
            program,
            InsuranceType::Employment | InsuranceType::WorkersComp
        ));
        Protocol::new(config.protocol.clone())?;
        let protocol_config = config.protocol.clone();
        let pool = ClientPool::new(
            config.connection,
            move || Protocol::new(protocol_config.clone()),
            config.pool_size,
        );
        info!(authority = "COMWEL", program = program.name(), "provider initialized");
        Ok(Self {
            core: ProviderCore::new(pool),
            program,
        })
    }

    fn acquisition_document(&self) -> DocumentType {
        match self.program {
            InsuranceType::WorkersComp => DocumentType::WciAcquisition,
            _ => DocumentType::EiAcquisition,
        }
    }

    fn loss_document(&self) -> DocumentType {
        match self.program {
            InsuranceType::WorkersComp => DocumentType::WciLoss,
            _ => DocumentType::EiLoss,
        }
    }

    /// COMWEL has not published a dedicated change document code for this
    /// channel; until that is confirmed, change filings go out under the
    /// acquisition code. Kept in one place so the correction is a one-line
    /// change.
    fn change_document(&self) -> DocumentType {
        self.acquisition_document()
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
impl Provider for EiProvider {
    fn name(&self) -> &'static str {
        "Korea Workers' Compensation & Welfare Service"
    }

    fn code(&self) -> &'static str {
        "COMWEL"
    }

    fn insurance(&self) -> InsuranceType {
        self.program
    }

    fn status(&self) -> ProviderStatus {
        self.core.status()
    }

    async fn connect(&self) -> bool {
        self.core.probe("COMWEL").await
    }

    async fn disconnect(&self) {
        self.core.pool.close().await;
    }

    async fn health_check(&self) -> bool {
        self.core.probe("COMWEL").await
    }

    async fn submit_acquisition(&self, data: &AcquisitionData) -> SubmissionResult {
        let work_hours = data.work_hours_weekly.unwrap_or(40);
        let employment_type = derive_employment_type(work_hours, data.contract_type.as_deref());

        let mut form_data = Self::base_sections(&data.company);
        let mut row = Record::new();
        row.insert(
            "resident_no".into(),
            Value::text(strip_separators(&data.employee.resident_no)),
        );
        row.insert("name".into(), Value::text(&data.employee.name));
        row.insert("acquisition_date".into(), Value::text(&data.date));
        row.insert("monthly_income".into(), Value::Integer(data.monthly_income));
        row.insert(
            "work_hours_weekly".into(),
            Value::Integer(i64::from(work_hours)),
        );
        row.insert("employment_type".into(), Value::text(employment_type));
        if let Some(period) = &data.contract_period {
            row.insert("contract_period".into(), Value::text(period));
        }
        if let Some(job_code) = &data.job_type {
            row.insert("job_code".into(), Value::text(job_code));
        }
        row.insert("is_foreign_worker".into(), Value::Bool(data.is_foreign_worker));
        if data.is_foreign_worker {
            if let Some(visa) = &data.visa_type {
                row.insert("visa_type".into(), Value::text(visa));
            }
        }
        form_data.insert("employees".into(), SectionData::Repeated(vec![row]));

        self.core
            .submit(
                "COMWEL",
                &ei::acquisition_form(),
                &form_data,
                "employees",
                self.acquisition_document(),
                &data.company.workplace_no,
                &data.company.workplace_no,
                &data.company.business_no,
            )
            .await
    }

    async fn submit_loss(&self, data: &LossData) -> SubmissionResult {
        let reason = map_loss_reason(data.reason_code.as_deref(), data.is_voluntary);

        let mut form_data = Self::base_sections(&data.company);
        let mut row = Record::new();
        row.insert(
            "resident_no".into(),
            Value::text(strip_separators(&data.employee.resident_no)),
        );
        row.insert("name".into(), Value::text(&data.employee.name));
        row.insert("loss_date".into(), Value::text(&data.date));
        row.insert("loss_reason_code".into(), Value::text(reason.code));
        row.insert(
            "loss_reason_detail".into(),
            Value::text(data.reason_detail.as_deref().unwrap_or(reason.detail)),
        );
        row.insert("final_income".into(), Value::Integer(data.final_income));
        row.insert(
            "total_work_days".into(),
            Value::Integer(i64::from(data.total_work_days.unwrap_or(0))),
        );
        row.insert("is_voluntary".into(), Value::Bool(data.is_voluntary));
        row.insert(
            "benefit_eligible".into(),
            Value::Bool(reason.benefit_eligible),
        );
        form_data.insert("employees".into(), SectionData::Repeated(vec![row]));

        self.core
            .submit(
                "COMWEL",
                &ei::loss_form(),
                &form_data,
                "employees",
                self.loss_document(),
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
                "COMWEL",
                &ei::change_form(),
                &form_data,
                "changes",
                self.change_document(),
                &data.company.workplace_no,
                &data.company.workplace_no,
                &data.company.business_no,
            )
            .await
    }

    async fn query_status(&self, submission_id: &str) -> StatusResult {
        self.core
            .query_status("COMWEL", self.program, submission_id)
            .await
    }

    async fn download_result(&self, submission_id: &str, _document_type: &str) -> DownloadResult {
        self.core
            .download(
                "COMWEL",
                self.program,
                submission_id,
                format!("ei_result_{submission_id}.pdf"),
            )
            .await
    }

    async fn cancel_filing(&self, submission_id: &str) -> SubmissionResult {
        self.core.cancel("COMWEL", self.program, submission_id).await
    }
}
