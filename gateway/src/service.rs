// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! The typed request surface. Fans submissions out to the providers named
//! by the caller, in the caller's order, and aggregates their outcomes.

use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};
use uuid::Uuid;

use kedi_edi::InsuranceType;
use kedi_providers::{
    AcquisitionData, ChangeData, EiProvider, LossData, NhisProvider, NpsProvider, Provider,
    ProviderRegistry, SubmissionResult,
};

use crate::config::{Config, ConfigError};
use crate::types::*;

pub struct InsuranceService {
    registry: ProviderRegistry,
    version: String,
}

impl InsuranceService {
    /// Stand up providers for all four programs from configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut registry = ProviderRegistry::new();

        let nps = NpsProvider::new(config.provider_config(InsuranceType::Nps)?)?;
        registry.insert(InsuranceType::Nps, Arc::new(nps));

        let nhis = NhisProvider::new(config.provider_config(InsuranceType::Nhis)?)?;
        registry.insert(InsuranceType::Nhis, Arc::new(nhis));

        let employment = EiProvider::new(
            config.provider_config(InsuranceType::Employment)?,
            InsuranceType::Employment,
        )?;
        registry.insert(InsuranceType::Employment, Arc::new(employment));

        let workers_comp = EiProvider::new(
            config.provider_config(InsuranceType::WorkersComp)?,
            InsuranceType::WorkersComp,
        )?;
        registry.insert(InsuranceType::WorkersComp, Arc::new(workers_comp));

        info!(count = registry.len(), "insurance providers initialized");
        Ok(Self {
            registry,
            version: config.service_version.clone(),
        })
    }

    /// Build from an explicit registry; used by tests and by deployments
    /// that enable a subset of programs.
    pub fn with_registry(registry: ProviderRegistry, version: impl Into<String>) -> Self {
        Self {
            registry,
            version: version.into(),
        }
    }

    pub async fn submit_acquisition(&self, request: AcquisitionRequest) -> SubmissionResponse {
        let request_id = request_id_or_new(request.request_id.as_deref());
        info!(
            request_id = %request_id,
            employee = %request.employee.name,
            targets = request.insurance_types.len(),
            "processing acquisition submission"
        );

        let data = AcquisitionData {
            company: request.company.clone(),
            employee: request.employee.clone(),
            date: request.data.acquisition_date.clone(),
            monthly_income: request.data.monthly_income,
            job_type: request.data.job_type.clone(),
            work_hours_weekly: request.data.work_hours_weekly,
            contract_type: request.data.contract_type.clone(),
            contract_period: request.data.contract_period.clone(),
            is_foreign_worker: request.data.is_foreign_worker,
            visa_type: request.data.visa_type.clone(),
        };

        let results = self
            .fan_out(&request.insurance_types, |provider| {
                let data = data.clone();
                async move { provider.submit_acquisition(&data).await }
            })
            .await;

        aggregate("ACQ", &request_id, "Acquisition", results)
    }

    pub async fn submit_loss(&self, request: LossRequest) -> SubmissionResponse {
        let request_id = request_id_or_new(request.request_id.as_deref());
        info!(
            request_id = %request_id,
            employee = %request.employee.name,
            "processing loss submission"
        );

        let data = LossData {
            company: request.company.clone(),
            employee: request.employee.clone(),
            date: request.data.loss_date.clone(),
            reason_code: request.data.loss_reason_code.clone(),
            reason_detail: request.data.loss_reason_detail.clone(),
            final_income: request.data.final_monthly_income,
            total_work_days: request.data.total_work_days,
            is_voluntary: request.data.is_voluntary,
        };

        let results = self
            .fan_out(&request.insurance_types, |provider| {
                let data = data.clone();
                async move { provider.submit_loss(&data).await }
            })
            .await;

        aggregate("LOSS", &request_id, "Loss", results)
    }

    pub async fn submit_change(&self, request: ChangeRequest) -> SubmissionResponse {
        let request_id = request_id_or_new(request.request_id.as_deref());
        info!(request_id = %request_id, "processing change submission");

        let data = ChangeData {
            company: request.company.clone(),
            employee: request.employee.clone(),
            date: request.data.change_date.clone(),
            change_type: request.data.change_type.clone(),
            before: request.data.before_value.clone(),
            after: request.data.after_value.clone(),
            reason: request.data.reason.clone(),
        };

        let results = self
            .fan_out(&request.insurance_types, |provider| {
                let data = data.clone();
                async move { provider.submit_change(&data).await }
            })
            .await;

        aggregate("CHG", &request_id, "Change", results)
    }

    pub async fn query_status(&self, request: StatusRequest) -> StatusResponse {
        info!(
            submission_id = %request.submission_id,
            insurance = request.insurance_type.name(),
            "querying status"
        );
        let Some(provider) = self.registry.get(request.insurance_type) else {
            return StatusResponse {
                submission_id: request.submission_id,
                insurance_type: request.insurance_type,
                status: kedi_providers::FilingStatus::Error,
                status_message: "provider not configured".to_string(),
                processed_at: None,
            };
        };

        let result = provider.query_status(&request.submission_id).await;
        StatusResponse {
            submission_id: request.submission_id,
            insurance_type: request.insurance_type,
            status: result.status,
            status_message: result.message,
            processed_at: result.processed_at,
        }
    }

    /// Withdraw a filing that the authority has not processed yet.
    pub async fn cancel_filing(&self, request: CancelRequest) -> CancelResponse {
        info!(
            submission_id = %request.submission_id,
            insurance = request.insurance_type.name(),
            "cancelling filing"
        );
        let Some(provider) = self.registry.get(request.insurance_type) else {
            return CancelResponse {
                submission_id: request.submission_id,
                insurance_type: request.insurance_type,
                success: false,
                error_code: "PROVIDER_NOT_FOUND".to_string(),
                error_message: "provider not configured".to_string(),
            };
        };

        let result = provider.cancel_filing(&request.submission_id).await;
        CancelResponse {
            submission_id: request.submission_id,
            insurance_type: request.insurance_type,
            success: result.success,
            error_code: result.error_code,
            error_message: result.error_message,
        }
    }

    pub async fn download_result(&self, request: DownloadRequest) -> DownloadResponse {
        info!(
            submission_id = %request.submission_id,
            document_type = %request.document_type,
            "downloading result"
        );
        let Some(provider) = self.registry.get(request.insurance_type) else {
            return DownloadResponse {
                success: false,
                filename: String::new(),
                content: Vec::new(),
                content_type: String::new(),
            };
        };

        let result = provider
            .download_result(&request.submission_id, &request.document_type)
            .await;
        DownloadResponse {
            success: result.success,
            filename: result.filename,
            content: result.content,
            content_type: result.content_type,
        }
    }

    /// Dispatch every batch item independently; one failing item never
    /// aborts its siblings.
    pub async fn batch_submit(&self, request: BatchRequest) -> BatchResponse {
        info!(
            batch_id = %request.batch_id,
            items = request.items.len(),
            "processing batch submission"
        );
        let total_count = request.items.len();
        let mut results = Vec::with_capacity(total_count);
        let mut success_count = 0usize;

        for item in request.items {
            let response = match item.data {
                BatchItemData::Acquisition(details) => {
                    self.submit_acquisition(SubmitRequest {
                        request_id: Some(item.item_id.clone()),
                        company: request.company.clone(),
                        employee: item.employee,
                        data: details,
                        insurance_types: item.insurance_types,
                    })
                    .await
                }
                BatchItemData::Loss(details) => {
                    self.submit_loss(SubmitRequest {
                        request_id: Some(item.item_id.clone()),
                        company: request.company.clone(),
                        employee: item.employee,
                        data: details,
                        insurance_types: item.insurance_types,
                    })
                    .await
                }
                BatchItemData::Change(details) => {
                    self.submit_change(SubmitRequest {
                        request_id: Some(item.item_id.clone()),
                        company: request.company.clone(),
                        employee: item.employee,
                        data: details,
                        insurance_types: item.insurance_types,
                    })
                    .await
                }
            };

            if response.success {
                success_count += 1;
            }
            results.push(BatchItemResult {
                item_id: item.item_id,
                success: response.success,
                submission_id: response.submission_id,
                error_message: if response.success {
                    String::new()
                } else {
                    response.message
                },
            });
        }

        let failed_count = total_count - success_count;
        BatchResponse {
            success: failed_count == 0,
            batch_id: request.batch_id,
            total_count,
            success_count,
            failed_count,
            results,
        }
    }

    /// Probe every configured authority.
    pub async fn health_check(&self) -> HealthResponse {
        let mut providers = Vec::with_capacity(self.registry.len());
        for (insurance, provider) in self.registry.iter() {
            providers.push((insurance, provider.health_check().await));
        }
        providers.sort_by_key(|(insurance, _)| insurance.code());
        HealthResponse {
            healthy: providers.iter().all(|(_, ok)| *ok),
            version: self.version.clone(),
            providers,
        }
    }

    /// Drain every provider's pool for shutdown.
    pub async fn shutdown(&self) {
        for (_, provider) in self.registry.iter() {
            provider.disconnect().await;
        }
        info!("insurance service shut down");
    }

    async fn fan_out<F, Fut>(
        &self,
        insurance_types: &[InsuranceType],
        submit: F,
    ) -> Vec<AuthorityResult>
    where
        F: Fn(Arc<dyn Provider>) -> Fut,
        Fut: std::future::Future<Output = SubmissionResult>,
    {
        let mut results = Vec::with_capacity(insurance_types.len());
        for &insurance in insurance_types {
            let Some(provider) = self.registry.get(insurance) else {
                warn!(insurance = insurance.name(), "provider not configured");
                results.push(AuthorityResult {
                    insurance_type: insurance,
                    success: false,
                    reference_id: String::new(),
                    error_code: "PROVIDER_NOT_FOUND".to_string(),
                    error_message: format!("provider not configured for {}", insurance.name()),
                });
                continue;
            };
            let outcome = submit(provider).await;
            results.push(AuthorityResult {
                insurance_type: insurance,
                success: outcome.success,
                reference_id: outcome.reference_id,
                error_code: outcome.error_code,
                error_message: outcome.error_message,
            });
        }
        results
    }
}

fn request_id_or_new(request_id: Option<&str>) -> String {
    match request_id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => Uuid::new_v4().to_string(),
    }
}

/// `<prefix>-<short request id>-<YYYYMMDDHHMMSS>`.
fn composite_submission_id(prefix: &str, request_id: &str) -> String {
    let short: String = request_id.chars().take(8).collect();
    let stamp = Local::now().format("%Y%m%d%H%M%S");
    format!("{prefix}-{short}-{stamp}")
}

fn aggregate(
    prefix: &str,
    request_id: &str,
    operation: &str,
    results: Vec<AuthorityResult>,
) -> SubmissionResponse {
    let success = !results.is_empty() && results.iter().all(|r| r.success);
    SubmissionResponse {
        success,
        message: if success {
            format!("{operation} submitted successfully")
        } else {
            "Some submissions failed".to_string()
        },
        submission_id: composite_submission_id(prefix, request_id),
        results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_id_shape() {
        let id = composite_submission_id("ACQ", "a1b2c3d4e5f6");
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts[0], "ACQ");
        assert_eq!(parts[1], "a1b2c3d4");
        assert_eq!(parts[2].len(), 14);
    }

    #[test]
    fn short_request_ids_are_kept_whole() {
        let id = composite_submission_id("LOSS", "abc");
        assert!(id.starts_with("LOSS-abc-"));
    }

    #[test]
    fn aggregate_requires_every_authority_to_succeed() {
        let ok = AuthorityResult {
            insurance_type: InsuranceType::Nps,
            success: true,
            reference_id: "R1".into(),
            error_code: String::new(),
            error_message: String::new(),
        };
        let failed = AuthorityResult {
            insurance_type: InsuranceType::Nhis,
            success: false,
            reference_id: String::new(),
            error_code: "3001".into(),
            error_message: "authority system error".into(),
        };

        assert!(aggregate("ACQ", "req", "Acquisition", vec![ok.clone()]).success);
        assert!(!aggregate("ACQ", "req", "Acquisition", vec![ok, failed]).success);
        assert!(!aggregate("ACQ", "req", "Acquisition", vec![]).success);
    }
}
