// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Request-surface scenarios against an in-process mock authority.

use std::sync::atomic::Ordering;

use kedi_edi::InsuranceType;
use kedi_gateway::types::*;
use kedi_gateway::{Config, InsuranceService};
use kedi_providers::{CompanyContext, EmployeeContext, FilingStatus, ProviderRegistry};
use kedi_test_utils::{MockAuthority, MockOptions};

fn config_for(server: &MockAuthority) -> Config {
    let mut config = Config::default();
    for endpoint in [&mut config.nps, &mut config.nhis, &mut config.ei] {
        endpoint.host = server.host();
        endpoint.port = server.port();
        endpoint.timeout = 2;
    }
    config.pool_size = 2;
    config
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

fn acquisition_request(insurance_types: Vec<InsuranceType>) -> AcquisitionRequest {
    SubmitRequest {
        request_id: Some("a1b2c3d4e5f6".to_string()),
        company: company(),
        employee: employee(),
        data: AcquisitionDetails {
            acquisition_date: "2026-01-15".to_string(),
            monthly_income: 3_000_000,
            ..AcquisitionDetails::default()
        },
        insurance_types,
    }
}

#[tokio::test]
async fn pension_acquisition_happy_path() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let service = InsuranceService::from_config(&config_for(&server)).unwrap();

    let response = service
        .submit_acquisition(acquisition_request(vec![InsuranceType::Nps]))
        .await;

    assert!(response.success, "{:?}", response.results);
    assert_eq!(response.results.len(), 1);
    assert!(response.results[0].success);
    assert!(!response.results[0].reference_id.is_empty());

    // Composite id: ACQ-<8 chars of the request id>-<14-digit timestamp>.
    assert!(response.submission_id.starts_with("ACQ-a1b2c3d4-"));
    let stamp = response.submission_id.rsplit('-').next().unwrap();
    assert_eq!(stamp.len(), 14);
    assert!(stamp.chars().all(|c| c.is_ascii_digit()));

    let request = server.last_request().unwrap();
    assert_eq!(request.body.document.unwrap().code(), "1001");
    service.shutdown().await;
}

#[tokio::test]
async fn fan_out_preserves_caller_order() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let service = InsuranceService::from_config(&config_for(&server)).unwrap();

    let order = vec![
        InsuranceType::Employment,
        InsuranceType::Nps,
        InsuranceType::Nhis,
    ];
    let response = service.submit_acquisition(acquisition_request(order.clone())).await;

    assert!(response.success);
    let reported: Vec<InsuranceType> =
        response.results.iter().map(|r| r.insurance_type).collect();
    assert_eq!(reported, order);
    service.shutdown().await;
}

#[tokio::test]
async fn validation_short_circuits_without_socket_activity() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let service = InsuranceService::from_config(&config_for(&server)).unwrap();

    let mut request = acquisition_request(vec![InsuranceType::Nps, InsuranceType::Nhis]);
    request.company.business_no = "123456789".to_string();
    let response = service.submit_acquisition(request).await;

    assert!(!response.success);
    for result in &response.results {
        assert_eq!(result.error_code, "VALIDATION_ERROR");
        assert!(result.error_message.contains("10 digits"));
    }
    assert_eq!(server.connections.load(Ordering::SeqCst), 0);
    service.shutdown().await;
}

#[tokio::test]
async fn employment_loss_sets_document_and_eligibility() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let service = InsuranceService::from_config(&config_for(&server)).unwrap();

    let response = service
        .submit_loss(SubmitRequest {
            request_id: None,
            company: company(),
            employee: employee(),
            data: LossDetails {
                loss_date: "2026-02-01".to_string(),
                loss_reason_code: Some("14".to_string()),
                loss_reason_detail: None,
                final_monthly_income: 3_500_000,
                total_work_days: None,
                is_voluntary: false,
            },
            insurance_types: vec![InsuranceType::Employment],
        })
        .await;

    assert!(response.success);
    assert!(response.submission_id.starts_with("LOSS-"));

    let request = server.last_request().unwrap();
    assert_eq!(request.body.document.unwrap().code(), "3002");
    let record = &request.body.records[0];
    assert_eq!(record[record.len() - 1], b'Y', "benefit eligible flag");
    service.shutdown().await;
}

#[tokio::test]
async fn unknown_provider_yields_item_error() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let config = config_for(&server);
    // A registry with pension only.
    let mut registry = ProviderRegistry::new();
    let nps = kedi_providers::NpsProvider::new(
        config.provider_config(InsuranceType::Nps).unwrap(),
    )
    .unwrap();
    registry.insert(InsuranceType::Nps, std::sync::Arc::new(nps));
    let service = InsuranceService::with_registry(registry, "test");

    let response = service
        .submit_acquisition(acquisition_request(vec![
            InsuranceType::Nps,
            InsuranceType::Nhis,
        ]))
        .await;

    assert!(!response.success);
    assert!(response.results[0].success);
    assert_eq!(response.results[1].error_code, "PROVIDER_NOT_FOUND");
}

#[tokio::test]
async fn batch_attempts_every_item() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let service = InsuranceService::from_config(&config_for(&server)).unwrap();

    let bad_employee = EmployeeContext {
        name: "Kim Younghee".to_string(),
        resident_no: "123".to_string(), // fails validation
        nationality: None,
    };

    let response = service
        .batch_submit(BatchRequest {
            batch_id: "BATCH-7".to_string(),
            company: company(),
            items: vec![
                BatchItem {
                    item_id: "item-1".to_string(),
                    employee: employee(),
                    insurance_types: vec![InsuranceType::Nps],
                    data: BatchItemData::Acquisition(AcquisitionDetails {
                        acquisition_date: "2026-01-15".to_string(),
                        monthly_income: 3_000_000,
                        ..AcquisitionDetails::default()
                    }),
                },
                BatchItem {
                    item_id: "item-2".to_string(),
                    employee: bad_employee,
                    insurance_types: vec![InsuranceType::Nps],
                    data: BatchItemData::Loss(LossDetails {
                        loss_date: "2026-02-01".to_string(),
                        final_monthly_income: 1_000_000,
                        ..LossDetails::default()
                    }),
                },
                BatchItem {
                    item_id: "item-3".to_string(),
                    employee: employee(),
                    insurance_types: vec![InsuranceType::Nhis],
                    data: BatchItemData::Change(ChangeDetails {
                        change_date: "2026-03-01".to_string(),
                        after_value: "2500000".to_string(),
                        ..ChangeDetails::default()
                    }),
                },
            ],
        })
        .await;

    assert!(!response.success);
    assert_eq!(response.total_count, 3);
    assert_eq!(response.success_count, 2);
    assert_eq!(response.failed_count, 1);
    assert_eq!(response.results.len(), 3);
    assert!(response.results[0].success);
    assert!(!response.results[1].success);
    assert!(response.results[2].success, "siblings still attempted");
    service.shutdown().await;
}

#[tokio::test]
async fn status_and_download_round_trip() {
    let server = MockAuthority::spawn(MockOptions {
        response_data: Some(b"RECEIPT".to_vec()),
        ..MockOptions::default()
    })
    .await;
    let service = InsuranceService::from_config(&config_for(&server)).unwrap();

    let status = service
        .query_status(StatusRequest {
            submission_id: "RCPT-1".to_string(),
            insurance_type: InsuranceType::Nps,
        })
        .await;
    assert_eq!(status.status, FilingStatus::Completed);
    assert!(status.processed_at.is_some());

    let download = service
        .download_result(DownloadRequest {
            submission_id: "RCPT-1".to_string(),
            insurance_type: InsuranceType::Nhis,
            document_type: "receipt".to_string(),
        })
        .await;
    assert!(download.success);
    assert_eq!(download.content, b"RECEIPT");
    service.shutdown().await;
}

#[tokio::test]
async fn cancel_filing_round_trip() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let service = InsuranceService::from_config(&config_for(&server)).unwrap();

    let response = service
        .cancel_filing(CancelRequest {
            submission_id: "RCPT-1".to_string(),
            insurance_type: InsuranceType::Nps,
        })
        .await;
    assert!(response.success, "{:?}", response.error_message);

    let request = server.last_request().unwrap();
    assert_eq!(request.header.message_type, kedi_edi::MessageType::Cancel);
    service.shutdown().await;
}

#[tokio::test]
async fn health_check_reports_every_authority() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let service = InsuranceService::from_config(&config_for(&server)).unwrap();

    let health = service.health_check().await;
    assert!(health.healthy);
    assert_eq!(health.providers.len(), 4);
    assert!(health.providers.iter().all(|(_, ok)| *ok));
    service.shutdown().await;
}

#[tokio::test]
async fn health_check_flags_unreachable_authority() {
    let server = MockAuthority::spawn(MockOptions::default()).await;
    let mut config = config_for(&server);
    config.nhis.host = "127.0.0.1".to_string();
    config.nhis.port = 1; // dead port
    config.nhis.timeout = 1;
    let service = InsuranceService::from_config(&config).unwrap();

    let health = service.health_check().await;
    assert!(!health.healthy);
    let nhis = health
        .providers
        .iter()
        .find(|(insurance, _)| *insurance == InsuranceType::Nhis)
        .unwrap();
    assert!(!nhis.1);
    service.shutdown().await;
}
