// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Provider behavior against an in-process mock authority.

use std::sync::atomic::Ordering;
use std::time::Duration;

use kedi_edi::{ConnectionConfig, DocumentType, InsuranceType, MessageType, ProtocolConfig};
use kedi_providers::{
    AcquisitionData, ChangeData, CompanyContext, DependentData, EmployeeContext, FilingStatus,
    LossData, MonthlyReportData, NhisProvider, NpsProvider, EiProvider, Provider, ProviderConfig,
};
use kedi_test_utils::{MockAuthority, MockOptions};

fn provider_config(server: &MockAuthority) -> ProviderConfig {
    ProviderConfig {
        connection: ConnectionConfig {
            host: server.host(),
            port: server.port(),
            timeout: Duration::from_secs(2),
            max_retries: 2,
            retry_delay: Duration::from_millis(10),
        },
        protocol: ProtocolConfig::plaintext(),
        pool_size: 2,
    }
}

fn company() -> CompanyContext {
    CompanyContext {
        business_no: "1234567891".to_string(),
        workplace_no: "1234567890123".to_string(),
        name: "KERP Test Company".to_string(),
    }
}

fn employee() -> EmployeeContext {
    EmployeeContext {
        name: "Hong Gildong".to_string(),
        resident_no: "8001011234560".to_string(),
        nationality: None,
    }
}

fn acquisition() -> AcquisitionData {
    AcquisitionData {
        company: company(),
        employee: employee(),
        date: "2026-01-15".to_string(),
        monthly_income: 3_000_000,
        ..AcquisitionData::default()
    }
}

#[tokio::test]
async fn nps_acquisition_happy_path() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let provider = NpsProvider::new(provider_config(&server)).unwrap();

    let result = provider.submit_acquisition(&acquisition()).await;
    assert!(result.success, "{result:?}");
    assert!(!result.reference_id.is_empty());
    assert!(result.error_code.is_empty());

    let request = server.last_request().unwrap();
    assert_eq!(request.body.document, Some(DocumentType::NpsAcquisition));
    assert_eq!(request.body.business_no, "1234567891");
    assert_eq!(request.body.company_id, "1234567890123");
    assert_eq!(request.body.record_count, 1);
    assert_eq!(request.header.insurance_type, InsuranceType::Nps);
}

#[tokio::test]
async fn nine_digit_business_number_never_reaches_the_socket() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let provider = NpsProvider::new(provider_config(&server)).unwrap();

    let mut data = acquisition();
    data.company.business_no = "123456789".to_string();
    let result = provider.submit_acquisition(&data).await;

    assert!(!result.success);
    assert_eq!(result.error_code, "VALIDATION_ERROR");
    assert!(result.error_message.contains("10 digits"), "{}", result.error_message);
    assert_eq!(server.connections.load(Ordering::SeqCst), 0, "no socket activity");
}

#[tokio::test]
async fn bad_checksum_is_rejected_before_the_wire() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let provider = NpsProvider::new(provider_config(&server)).unwrap();

    let mut data = acquisition();
    data.company.business_no = "1234567890".to_string();
    let result = provider.submit_acquisition(&data).await;
    assert_eq!(result.error_code, "VALIDATION_ERROR");
    assert_eq!(server.connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn employment_loss_involuntary_carries_eligibility() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let provider =
        EiProvider::new(provider_config(&server), InsuranceType::Employment).unwrap();

    let data = LossData {
        company: company(),
        employee: employee(),
        date: "2026-02-01".to_string(),
        reason_code: Some("14".to_string()),
        reason_detail: None,
        final_income: 3_500_000,
        total_work_days: Some(730),
        is_voluntary: false,
    };
    let result = provider.submit_loss(&data).await;
    assert!(result.success, "{result:?}");

    let request = server.last_request().unwrap();
    assert_eq!(request.body.document, Some(DocumentType::EiLoss));
    let record = &request.body.records[0];
    // Layout: ... total_work_days(4) | is_voluntary(1) | benefit_eligible(1)
    assert_eq!(record[record.len() - 2], b'N');
    assert_eq!(record[record.len() - 1], b'Y');
    // Reason code sits after the 8-byte loss date.
    assert_eq!(&record[42..44], b"14");
}

#[tokio::test]
async fn voluntary_resignation_is_not_benefit_eligible() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let provider =
        EiProvider::new(provider_config(&server), InsuranceType::Employment).unwrap();

    let data = LossData {
        company: company(),
        employee: employee(),
        date: "2026-02-01".to_string(),
        reason_code: Some("21".to_string()),
        reason_detail: None,
        final_income: 2_000_000,
        total_work_days: None,
        is_voluntary: true,
    };
    provider.submit_loss(&data).await;

    let record = server.last_request().unwrap().body.records[0].clone();
    assert_eq!(record[record.len() - 1], b'N');
}

#[tokio::test]
async fn workers_comp_program_uses_its_own_document_codes() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let provider =
        EiProvider::new(provider_config(&server), InsuranceType::WorkersComp).unwrap();

    provider.submit_acquisition(&acquisition()).await;
    let request = server.last_request().unwrap();
    assert_eq!(request.body.document, Some(DocumentType::WciAcquisition));
    assert_eq!(request.header.insurance_type, InsuranceType::WorkersComp);
}

#[tokio::test]
async fn short_week_files_as_daily_worker() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let provider =
        EiProvider::new(provider_config(&server), InsuranceType::Employment).unwrap();

    let mut data = acquisition();
    data.work_hours_weekly = Some(12);
    provider.submit_acquisition(&data).await;

    let record = server.last_request().unwrap().body.records[0].clone();
    // Layout: record_type(1) resident(13) name(20) date(8) income(15)
    // hours(2) employment_type(1) ...
    assert_eq!(&record[57..59], b"12");
    assert_eq!(record[59], b'2');
}

#[tokio::test]
async fn nhis_part_time_flag_follows_hours() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let provider = NhisProvider::new(provider_config(&server)).unwrap();

    let mut data = acquisition();
    data.work_hours_weekly = Some(20);
    let result = provider.submit_acquisition(&data).await;
    assert!(result.success, "{result:?}");

    let request = server.last_request().unwrap();
    assert_eq!(request.body.document, Some(DocumentType::NhisAcquisition));
    let record = &request.body.records[0];
    assert_eq!(record[59], b'Y');
}

#[tokio::test]
async fn nhis_change_moves_salary() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let provider = NhisProvider::new(provider_config(&server)).unwrap();

    let data = ChangeData {
        company: company(),
        employee: employee(),
        date: "2026-03-01".to_string(),
        change_type: None,
        before: Some("2000000".to_string()),
        after: "2500000".to_string(),
        reason: Some("annual raise".to_string()),
    };
    let result = provider.submit_change(&data).await;
    assert!(result.success, "{result:?}");
    assert_eq!(
        server.last_request().unwrap().body.document,
        Some(DocumentType::NhisSalaryChange)
    );
}

#[tokio::test]
async fn authority_rejection_is_surfaced_verbatim() {
    let server = MockAuthority::spawn(MockOptions::with_code("2001", "duplicate")).await;
    let provider = NpsProvider::new(provider_config(&server)).unwrap();

    let result = provider.submit_acquisition(&acquisition()).await;
    assert!(!result.success);
    assert_eq!(result.error_code, "2001");
    assert_eq!(result.error_message, "duplicate filing");
}

#[tokio::test]
async fn status_query_maps_first_digit() {
    let server = MockAuthority::spawn(MockOptions::with_code("1", "in process")).await;
    let provider = NpsProvider::new(provider_config(&server)).unwrap();

    let status = provider.query_status("RCPT-1").await;
    assert_eq!(status.status, FilingStatus::Processing);
    assert_eq!(status.message, "in process");
    assert!(status.processed_at.is_none());
}

#[tokio::test]
async fn completed_status_carries_processed_at() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let provider = NpsProvider::new(provider_config(&server)).unwrap();

    let status = provider.query_status("RCPT-1").await;
    assert_eq!(status.status, FilingStatus::Completed);
    assert!(status.processed_at.is_some());

    let request = server.last_request().unwrap();
    assert_eq!(request.body.reference_id().unwrap(), "RCPT-1");
}

#[tokio::test]
async fn download_returns_content() {
    let server = MockAuthority::spawn(MockOptions {
        response_data: Some(b"PDFBYTES".to_vec()),
        ..MockOptions::default()
    })
    .await;
    let provider = NpsProvider::new(provider_config(&server)).unwrap();

    let download = provider.download_result("RCPT-9", "receipt").await;
    assert!(download.success);
    assert_eq!(download.filename, "nps_result_RCPT-9.pdf");
    assert_eq!(download.content, b"PDFBYTES");
    assert_eq!(download.content_type, "application/pdf");
}

#[tokio::test]
async fn cancel_sends_cancel_message_type() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let provider = NpsProvider::new(provider_config(&server)).unwrap();

    let result = provider.cancel_filing("RCPT-5").await;
    assert!(result.success, "{result:?}");

    let request = server.last_request().unwrap();
    assert_eq!(request.header.message_type, MessageType::Cancel);
    assert_eq!(request.body.reference_id().unwrap(), "RCPT-5");
}

#[tokio::test]
async fn cancel_of_processed_filing_maps_error() {
    let server = MockAuthority::spawn(MockOptions::with_code("2002", "gone")).await;
    let provider = NpsProvider::new(provider_config(&server)).unwrap();

    let result = provider.cancel_filing("RCPT-5").await;
    assert!(!result.success);
    assert_eq!(result.error_code, "2002");
    assert_eq!(result.error_message, "no such record");
}

#[tokio::test]
async fn monthly_report_files_document_1004() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let provider = NpsProvider::new(provider_config(&server)).unwrap();

    let result = provider
        .submit_monthly_report(&MonthlyReportData {
            company: company(),
            report_month: "202601".to_string(),
            employee_count: 42,
            total_income: 126_000_000,
        })
        .await;
    assert!(result.success, "{result:?}");

    let request = server.last_request().unwrap();
    assert_eq!(request.body.document, Some(DocumentType::NpsMonthlyReport));
    let record = &request.body.records[0];
    // record_type(1) month(6) count(6) total(15)
    assert_eq!(&record[1..7], b"202601");
    assert_eq!(&record[7..13], b"000042");
}

#[tokio::test]
async fn dependent_registration_files_document_2004() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let provider = NhisProvider::new(provider_config(&server)).unwrap();

    let result = provider
        .submit_dependent(&DependentData {
            company: company(),
            employee: employee(),
            dependent_name: "Kim Minjun".to_string(),
            dependent_resident_no: "0502043234567".to_string(),
            relationship: "02".to_string(),
            register: true,
            date: "2026-01-20".to_string(),
        })
        .await;
    assert!(result.success, "{result:?}");

    let request = server.last_request().unwrap();
    assert_eq!(request.body.document, Some(DocumentType::NhisDependent));
    let record = &request.body.records[0];
    // Dependent resident number follows the worker identification.
    assert_eq!(&record[34..47], b"0502043234567");
}

#[tokio::test]
async fn dependent_with_bad_resident_number_is_rejected() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let provider = NhisProvider::new(provider_config(&server)).unwrap();

    let result = provider
        .submit_dependent(&DependentData {
            company: company(),
            employee: employee(),
            dependent_name: "Kim Minjun".to_string(),
            dependent_resident_no: "0502049234567".to_string(), // gender digit 9
            relationship: "02".to_string(),
            register: true,
            date: "2026-01-20".to_string(),
        })
        .await;
    assert_eq!(result.error_code, "VALIDATION_ERROR");
    assert_eq!(server.connections.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_authority_fails_health_check() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let mut config = provider_config(&server);
    // Point at a dead port; keep retries snappy.
    config.connection.port = 1;
    config.connection.timeout = Duration::from_millis(100);
    config.connection.max_retries = 1;
    let provider = NpsProvider::new(config).unwrap();

    assert!(!provider.health_check().await);
    assert_eq!(
        provider.status(),
        kedi_providers::ProviderStatus::Unavailable
    );
}

#[tokio::test]
async fn reachable_authority_passes_health_check() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let provider = NpsProvider::new(provider_config(&server)).unwrap();
    assert!(provider.health_check().await);
    assert_eq!(provider.status(), kedi_providers::ProviderStatus::Available);
}
