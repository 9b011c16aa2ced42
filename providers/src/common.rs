// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Result types and behavior shared by all providers.

use std::sync::Mutex;

use chrono::Local;
use tracing::{error, warn};

use kedi_edi::{ClientPool, DocumentType, Error, InsuranceType, Message};
use kedi_forms::{Form, FormData, ValidationError};

/// Response codes every authority treats as success.
pub const SUCCESS_CODES: [&str; 3] = ["0000", "00", "0"];

/// Provider connectivity status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderStatus {
    #[default]
    Unknown,
    Available,
    Unavailable,
}

/// Filing processing state reported by status queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilingStatus {
    Pending,
    Processing,
    Completed,
    Rejected,
    Error,
}

/// Outcome of a submission operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionResult {
    pub success: bool,
    /// Authority-issued receipt number for accepted filings.
    pub reference_id: String,
    pub error_code: String,
    pub error_message: String,
}

impl SubmissionResult {
    pub fn accepted(reference_id: String) -> Self {
        Self {
            success: true,
            reference_id,
            ..Self::default()
        }
    }

    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_code: code.into(),
            error_message: message.into(),
            ..Self::default()
        }
    }

    pub fn validation_failure(errors: &[ValidationError]) -> Self {
        Self::rejected(
            "VALIDATION_ERROR",
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Outcome of a status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResult {
    pub status: FilingStatus,
    pub message: String,
    pub processed_at: Option<String>,
}

impl StatusResult {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: FilingStatus::Error,
            message: message.into(),
            processed_at: None,
        }
    }
}

/// Outcome of a receipt download.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DownloadResult {
    pub success: bool,
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: String,
}

/// Map an authority response code to `(success, message)`.
///
/// Unknown codes fall through verbatim so operators see exactly what the
/// authority returned.
pub fn map_response_code(code: &str) -> (bool, String) {
    if SUCCESS_CODES.contains(&code) {
        return (true, "Success".to_string());
    }
    let message = match code {
        "1001" => "malformed request".to_string(),
        "1002" => "authentication failure".to_string(),
        "2001" => "duplicate filing".to_string(),
        "2002" => "no such record".to_string(),
        "3001" => "authority system error".to_string(),
        "9999" => "unknown error".to_string(),
        other => format!("error code: {other}"),
    };
    (false, message)
}

/// Map the leading digit of a query response code to a filing state.
pub fn map_status_code(code: &str) -> FilingStatus {
    match code.chars().next() {
        Some('0') => FilingStatus::Completed,
        Some('1') => FilingStatus::Processing,
        Some('2') => FilingStatus::Pending,
        Some('9') => FilingStatus::Rejected,
        _ => FilingStatus::Error,
    }
}

/// Today's date in the compact wire form, for form header lines.
pub(crate) fn today_compact() -> String {
    Local::now().format("%Y%m%d").to_string()
}

pub(crate) fn now_iso() -> String {
    Local::now().to_rfc3339()
}

/// Shared provider internals: the authority's pool plus a status cell.
pub(crate) struct ProviderCore {
    pub pool: ClientPool,
    pub status: Mutex<ProviderStatus>,
}

impl ProviderCore {
    pub fn new(pool: ClientPool) -> Self {
        Self {
            pool,
            status: Mutex::new(ProviderStatus::Unknown),
        }
    }

    pub fn status(&self) -> ProviderStatus {
        *self.status.lock().expect("status lock")
    }

    fn set_status(&self, status: ProviderStatus) {
        *self.status.lock().expect("status lock") = status;
    }

    /// Dial (or reuse) one pooled session; updates the status cell.
    pub async fn probe(&self, authority: &str) -> bool {
        match self.pool.acquire().await {
            Ok(_client) => {
                self.set_status(ProviderStatus::Available);
                true
            }
            Err(e) => {
                error!(authority, error = %e, "authority unreachable");
                self.set_status(ProviderStatus::Unavailable);
                false
            }
        }
    }

    /// Validate against the schema, encode detail rows and exchange the
    /// submission through the pool.
    pub async fn submit(
        &self,
        authority: &str,
        form: &Form,
        data: &FormData,
        detail_section: &str,
        document: DocumentType,
        sender_id: &str,
        company_id: &str,
        business_no: &str,
    ) -> SubmissionResult {
        let errors = form.validate(data);
        if !errors.is_empty() {
            warn!(authority, count = errors.len(), "validation rejected filing");
            return SubmissionResult::validation_failure(&errors);
        }

        let records = match encode_detail_rows(form, data, detail_section) {
            Ok(records) => records,
            Err(e) => return SubmissionResult::rejected("ENCODING_ERROR", e.to_string()),
        };

        let mut message = Message::create_submit(
            sender_id,
            document.insurance(),
            document,
            records,
            company_id,
            business_no,
        );

        match self.exchange(&mut message).await {
            Ok(response) => {
                let (success, mapped) = map_response_code(&response.response.code);
                if success {
                    SubmissionResult::accepted(response.header.message_id)
                } else {
                    SubmissionResult::rejected(response.response.code.clone(), mapped)
                }
            }
            Err(e) => {
                error!(authority, error = %e, "submission failed");
                SubmissionResult::rejected("SUBMISSION_ERROR", e.to_string())
            }
        }
    }

    pub async fn query_status(&self, authority: &str, insurance: InsuranceType, id: &str) -> StatusResult {
        let message = match Message::create_query("", insurance, id) {
            Ok(message) => message,
            Err(e) => return StatusResult::error(e.to_string()),
        };
        let mut message = message;
        match self.exchange(&mut message).await {
            Ok(response) => {
                let status = map_status_code(&response.response.code);
                StatusResult {
                    status,
                    message: response.response.message,
                    processed_at: (status == FilingStatus::Completed).then(now_iso),
                }
            }
            Err(e) => {
                error!(authority, error = %e, "status query failed");
                StatusResult::error(e.to_string())
            }
        }
    }

    pub async fn download(
        &self,
        authority: &str,
        insurance: InsuranceType,
        id: &str,
        filename: String,
    ) -> DownloadResult {
        let message = match Message::create_download("", insurance, id) {
            Ok(message) => message,
            Err(e) => {
                error!(authority, error = %e, "download request invalid");
                return DownloadResult::default();
            }
        };
        let mut message = message;
        match self.exchange(&mut message).await {
            Ok(response) => match response.response.data {
                Some(content) => DownloadResult {
                    success: true,
                    filename,
                    content,
                    content_type: "application/pdf".to_string(),
                },
                None => DownloadResult::default(),
            },
            Err(e) => {
                error!(authority, error = %e, "download failed");
                DownloadResult::default()
            }
        }
    }

    /// Withdraw a pending filing. Authorities accept cancellation only
    /// while the filing is still queued; anything else comes back as a
    /// mapped error code.
    pub async fn cancel(
        &self,
        authority: &str,
        insurance: InsuranceType,
        id: &str,
    ) -> SubmissionResult {
        let message = match Message::create_cancel("", insurance, id) {
            Ok(message) => message,
            Err(e) => return SubmissionResult::rejected("CANCEL_ERROR", e.to_string()),
        };
        let mut message = message;
        match self.exchange(&mut message).await {
            Ok(response) => {
                let (success, mapped) = map_response_code(&response.response.code);
                if success {
                    SubmissionResult::accepted(response.header.message_id)
                } else {
                    SubmissionResult::rejected(response.response.code.clone(), mapped)
                }
            }
            Err(e) => {
                error!(authority, error = %e, "cancellation failed");
                SubmissionResult::rejected("CANCEL_ERROR", e.to_string())
            }
        }
    }

    async fn exchange(&self, message: &mut Message) -> Result<Message, Error> {
        let (response, _signature_valid) = self
            .pool
            .with_client(|mut client| async move {
                client.send_with_retry(message, None).await
            })
            .await?;
        Ok(response)
    }
}

fn encode_detail_rows(
    form: &Form,
    data: &FormData,
    detail_section: &str,
) -> Result<Vec<Vec<u8>>, kedi_forms::Error> {
    let section = form
        .section(detail_section)
        .ok_or_else(|| kedi_forms::Error::UnknownSection(detail_section.to_string()))?;
    let rows = match data.get(detail_section) {
        Some(kedi_forms::SectionData::Repeated(rows)) => rows.as_slice(),
        _ => &[],
    };
    rows.iter().map(|row| section.encode_line(row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_codes_map_to_success() {
        for code in SUCCESS_CODES {
            assert!(map_response_code(code).0);
        }
    }

    #[test]
    fn known_errors_have_messages() {
        assert_eq!(map_response_code("2001"), (false, "duplicate filing".into()));
        assert_eq!(
            map_response_code("1002"),
            (false, "authentication failure".into())
        );
    }

    #[test]
    fn unknown_codes_fall_through_verbatim() {
        assert_eq!(map_response_code("7777"), (false, "error code: 7777".into()));
    }

    #[test]
    fn status_codes_map_by_first_digit() {
        assert_eq!(map_status_code("0000"), FilingStatus::Completed);
        assert_eq!(map_status_code("1"), FilingStatus::Processing);
        assert_eq!(map_status_code("2"), FilingStatus::Pending);
        assert_eq!(map_status_code("9001"), FilingStatus::Rejected);
        assert_eq!(map_status_code(""), FilingStatus::Error);
    }

    #[test]
    fn validation_failure_joins_messages() {
        let errors = vec![
            ValidationError::new("company.business_no", "must be 10 digits"),
            ValidationError::new("employees[0].name", "is required"),
        ];
        let result = SubmissionResult::validation_failure(&errors);
        assert!(!result.success);
        assert_eq!(result.error_code, "VALIDATION_ERROR");
        assert!(result.error_message.contains("10 digits"));
        assert!(result.error_message.contains("; "));
    }
}
