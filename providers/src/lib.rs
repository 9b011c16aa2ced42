// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Authority adapters.
//!
//! Each provider validates typed filing data against its authority's form
//! schema, composes EDI records, exchanges them through that authority's
//! connection pool and maps response codes. Providers share one capability
//! set and are selected at runtime from a registry keyed by insurance
//! program; there is no inheritance between them.

mod common;
mod ei;
mod nhis;
mod nps;
mod registry;
mod types;

pub use self::common::{
    map_response_code, DownloadResult, FilingStatus, ProviderStatus, StatusResult,
    SubmissionResult, SUCCESS_CODES,
};
pub use self::ei::EiProvider;
pub use self::nhis::NhisProvider;
pub use self::nps::NpsProvider;
pub use self::registry::ProviderRegistry;
pub use self::types::{
    AcquisitionData, ChangeData, CompanyContext, DependentData, EmployeeContext, LossData,
    MonthlyReportData, ProviderConfig,
};

use async_trait::async_trait;
use kedi_edi::InsuranceType;

/// The capability set every authority adapter implements.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Institution display name.
    fn name(&self) -> &'static str;
    /// Institution short code (`NPS`, `NHIS`, `COMWEL`).
    fn code(&self) -> &'static str;
    /// The insurance program this instance files for.
    fn insurance(&self) -> InsuranceType;

    fn status(&self) -> ProviderStatus;

    /// Warm up a session; returns whether the authority is reachable.
    async fn connect(&self) -> bool;
    /// Drain the pool. The provider is finished after this.
    async fn disconnect(&self);
    /// Live connectivity probe.
    async fn health_check(&self) -> bool;

    async fn submit_acquisition(&self, data: &AcquisitionData) -> SubmissionResult;
    async fn submit_loss(&self, data: &LossData) -> SubmissionResult;
    async fn submit_change(&self, data: &ChangeData) -> SubmissionResult;
    async fn query_status(&self, submission_id: &str) -> StatusResult;
    async fn download_result(&self, submission_id: &str, document_type: &str) -> DownloadResult;
    /// Withdraw a filing that has not been processed yet.
    async fn cancel_filing(&self, submission_id: &str) -> SubmissionResult;
}
