// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Typed request and response shapes for the service surface. The RPC
//! layer maps its generated messages onto these one-to-one.

use kedi_edi::InsuranceType;
use kedi_providers::{CompanyContext, EmployeeContext, FilingStatus};

/// Acquisition operation payload.
#[derive(Debug, Clone, Default)]
pub struct AcquisitionDetails {
    pub acquisition_date: String,
    pub monthly_income: i64,
    pub job_type: Option<String>,
    pub work_hours_weekly: Option<u32>,
    pub contract_type: Option<String>,
    pub contract_period: Option<String>,
    pub is_foreign_worker: bool,
    pub visa_type: Option<String>,
}

/// Loss operation payload.
#[derive(Debug, Clone, Default)]
pub struct LossDetails {
    pub loss_date: String,
    pub loss_reason_code: Option<String>,
    pub loss_reason_detail: Option<String>,
    pub final_monthly_income: i64,
    pub total_work_days: Option<u32>,
    pub is_voluntary: bool,
}

/// Change operation payload.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetails {
    pub change_date: String,
    pub change_type: Option<String>,
    pub before_value: Option<String>,
    pub after_value: String,
    pub reason: Option<String>,
}

/// A submission request fanned out to one or more authorities.
#[derive(Debug, Clone)]
pub struct SubmitRequest<D> {
    /// Caller-assigned idempotency id; generated when absent.
    pub request_id: Option<String>,
    pub company: CompanyContext,
    pub employee: EmployeeContext,
    pub data: D,
    /// Target authorities, in the order results are reported.
    pub insurance_types: Vec<InsuranceType>,
}

pub type AcquisitionRequest = SubmitRequest<AcquisitionDetails>;
pub type LossRequest = SubmitRequest<LossDetails>;
pub type ChangeRequest = SubmitRequest<ChangeDetails>;

/// Per-authority outcome inside a submission response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityResult {
    pub insurance_type: InsuranceType,
    pub success: bool,
    pub reference_id: String,
    pub error_code: String,
    pub error_message: String,
}

/// Aggregated submission outcome.
#[derive(Debug, Clone)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
    /// Composite id: operation prefix, short request id, send timestamp.
    pub submission_id: String,
    pub results: Vec<AuthorityResult>,
}

#[derive(Debug, Clone)]
pub struct StatusRequest {
    pub submission_id: String,
    pub insurance_type: InsuranceType,
}

#[derive(Debug, Clone)]
pub struct StatusResponse {
    pub submission_id: String,
    pub insurance_type: InsuranceType,
    pub status: FilingStatus,
    pub status_message: String,
    pub processed_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CancelRequest {
    pub submission_id: String,
    pub insurance_type: InsuranceType,
}

#[derive(Debug, Clone)]
pub struct CancelResponse {
    pub submission_id: String,
    pub insurance_type: InsuranceType,
    pub success: bool,
    pub error_code: String,
    pub error_message: String,
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub submission_id: String,
    pub insurance_type: InsuranceType,
    pub document_type: String,
}

#[derive(Debug, Clone)]
pub struct DownloadResponse {
    pub success: bool,
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: String,
}

/// One entry in a batch, dispatched independently of its siblings.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub item_id: String,
    pub employee: EmployeeContext,
    pub insurance_types: Vec<InsuranceType>,
    pub data: BatchItemData,
}

#[derive(Debug, Clone)]
pub enum BatchItemData {
    Acquisition(AcquisitionDetails),
    Loss(LossDetails),
    Change(ChangeDetails),
}

#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub batch_id: String,
    pub company: CompanyContext,
    pub items: Vec<BatchItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItemResult {
    pub item_id: String,
    pub success: bool,
    pub submission_id: String,
    pub error_message: String,
}

#[derive(Debug, Clone)]
pub struct BatchResponse {
    pub success: bool,
    pub batch_id: String,
    pub total_count: usize,
    pub success_count: usize,
    pub failed_count: usize,
    pub results: Vec<BatchItemResult>,
}

/// Per-authority connectivity, reported by the health check.
#[derive(Debug, Clone)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
    pub providers: Vec<(InsuranceType, bool)>,
}
