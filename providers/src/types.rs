// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Typed filing payloads handed to providers by the request surface.

use std::time::Duration;

use kedi_edi::{ConnectionConfig, ProtocolConfig};

/// Workplace identification shared by every filing.
#[derive(Debug, Clone, Default)]
pub struct CompanyContext {
    /// Tax-office business registration number, 10 digits.
    pub business_no: String,
    /// Authority-assigned workplace management number, 13 digits.
    pub workplace_no: String,
    pub name: String,
}

/// Employee identification for per-person filings.
#[derive(Debug, Clone, Default)]
pub struct EmployeeContext {
    pub name: String,
    pub resident_no: String,
    pub nationality: Option<String>,
}

/// Acquisition (enrollment) filing data.
#[derive(Debug, Clone, Default)]
pub struct AcquisitionData {
    pub company: CompanyContext,
    pub employee: EmployeeContext,
    /// Acquisition date, any supported date notation.
    pub date: String,
    pub monthly_income: i64,
    pub job_type: Option<String>,
    pub work_hours_weekly: Option<u32>,
    pub contract_type: Option<String>,
    pub contract_period: Option<String>,
    pub is_foreign_worker: bool,
    pub visa_type: Option<String>,
}

/// Loss (departure) filing data.
#[derive(Debug, Clone, Default)]
pub struct LossData {
    pub company: CompanyContext,
    pub employee: EmployeeContext,
    pub date: String,
    pub reason_code: Option<String>,
    pub reason_detail: Option<String>,
    pub final_income: i64,
    pub total_work_days: Option<u32>,
    pub is_voluntary: bool,
}

/// Membership change filing data.
#[derive(Debug, Clone, Default)]
pub struct ChangeData {
    pub company: CompanyContext,
    pub employee: EmployeeContext,
    pub date: String,
    pub change_type: Option<String>,
    pub before: Option<String>,
    pub after: String,
    pub reason: Option<String>,
}

/// Monthly payment summary, a pension-only filing.
#[derive(Debug, Clone, Default)]
pub struct MonthlyReportData {
    pub company: CompanyContext,
    /// `YYYYMM`.
    pub report_month: String,
    pub employee_count: u32,
    pub total_income: i64,
}

/// Dependent registration, a health-insurance-only filing.
#[derive(Debug, Clone, Default)]
pub struct DependentData {
    pub company: CompanyContext,
    pub employee: EmployeeContext,
    pub dependent_name: String,
    pub dependent_resident_no: String,
    /// Relationship code from the NHIS table.
    pub relationship: String,
    /// `true` registers the dependent, `false` removes them.
    pub register: bool,
    pub date: String,
}

/// Everything needed to stand up one provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub connection: ConnectionConfig,
    pub protocol: ProtocolConfig,
    pub pool_size: usize,
}

impl ProviderConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            connection: ConnectionConfig::new(host, port),
            protocol: ProtocolConfig::default(),
            pool_size: 5,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connection.timeout = timeout;
        self.protocol.timeout = timeout;
        self
    }
}
