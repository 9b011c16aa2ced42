// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! EDI message model.
//!
//! On the wire a message is a 100-byte EUC-KR header, a 4-byte big-endian
//! body length, and the body. Submission bodies open with a pipe-delimited
//! document line followed by fixed-width record lines; queries carry a
//! `REF|<id>` envelope; responses open with `RSP|<code>|<message>`.

use chrono::Local;
use kedi_encoding::{decode as euckr_decode, encode as euckr_encode, fit_left, fit_right_zero};
use uuid::Uuid;

use crate::errors::Error;

/// Header width on the wire.
pub const HEADER_SIZE: usize = 100;
/// Width of the body length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;
/// Default body cap: authorities reject anything above 10 MiB.
pub const DEFAULT_MAX_BODY: usize = 10 * 1024 * 1024;

/// Message type octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Submit,
    Query,
    Download,
    Cancel,
    Success,
    Error,
    Pending,
}

impl MessageType {
    pub fn code(self) -> char {
        match self {
            MessageType::Submit => 'S',
            MessageType::Query => 'Q',
            MessageType::Download => 'D',
            MessageType::Cancel => 'C',
            MessageType::Success => '0',
            MessageType::Error => '1',
            MessageType::Pending => '2',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'S' => MessageType::Submit,
            'Q' => MessageType::Query,
            'D' => MessageType::Download,
            'C' => MessageType::Cancel,
            '0' => MessageType::Success,
            '1' => MessageType::Error,
            '2' => MessageType::Pending,
            _ => return None,
        })
    }

    /// Whether this is a response-direction type.
    pub fn is_response(self) -> bool {
        matches!(
            self,
            MessageType::Success | MessageType::Error | MessageType::Pending
        )
    }
}

/// The four statutory insurance programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsuranceType {
    /// National Pension Service
    Nps,
    /// National Health Insurance Service
    Nhis,
    /// Employment insurance (COMWEL)
    Employment,
    /// Workers' compensation (COMWEL)
    WorkersComp,
}

impl InsuranceType {
    pub const ALL: [InsuranceType; 4] = [
        InsuranceType::Nps,
        InsuranceType::Nhis,
        InsuranceType::Employment,
        InsuranceType::WorkersComp,
    ];

    pub fn code(self) -> &'static str {
        match self {
            InsuranceType::Nps => "10",
            InsuranceType::Nhis => "20",
            InsuranceType::Employment => "30",
            InsuranceType::WorkersComp => "40",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "10" => InsuranceType::Nps,
            "20" => InsuranceType::Nhis,
            "30" => InsuranceType::Employment,
            "40" => InsuranceType::WorkersComp,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            InsuranceType::Nps => "national pension",
            InsuranceType::Nhis => "health insurance",
            InsuranceType::Employment => "employment insurance",
            InsuranceType::WorkersComp => "workers compensation",
        }
    }
}

/// Document codes from the authorities' EDI catalogues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    NpsAcquisition,
    NpsLoss,
    NpsChange,
    NpsMonthlyReport,
    NhisAcquisition,
    NhisLoss,
    NhisSalaryChange,
    NhisDependent,
    EiAcquisition,
    EiLoss,
    WciAcquisition,
    WciLoss,
}

impl DocumentType {
    pub fn code(self) -> &'static str {
        match self {
            DocumentType::NpsAcquisition => "1001",
            DocumentType::NpsLoss => "1002",
            DocumentType::NpsChange => "1003",
            DocumentType::NpsMonthlyReport => "1004",
            DocumentType::NhisAcquisition => "2001",
            DocumentType::NhisLoss => "2002",
            DocumentType::NhisSalaryChange => "2003",
            DocumentType::NhisDependent => "2004",
            DocumentType::EiAcquisition => "3001",
            DocumentType::EiLoss => "3002",
            DocumentType::WciAcquisition => "4001",
            DocumentType::WciLoss => "4002",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "1001" => DocumentType::NpsAcquisition,
            "1002" => DocumentType::NpsLoss,
            "1003" => DocumentType::NpsChange,
            "1004" => DocumentType::NpsMonthlyReport,
            "2001" => DocumentType::NhisAcquisition,
            "2002" => DocumentType::NhisLoss,
            "2003" => DocumentType::NhisSalaryChange,
            "2004" => DocumentType::NhisDependent,
            "3001" => DocumentType::EiAcquisition,
            "3002" => DocumentType::EiLoss,
            "4001" => DocumentType::WciAcquisition,
            "4002" => DocumentType::WciLoss,
            _ => return None,
        })
    }

    pub fn insurance(self) -> InsuranceType {
        match self {
            DocumentType::NpsAcquisition
            | DocumentType::NpsLoss
            | DocumentType::NpsChange
            | DocumentType::NpsMonthlyReport => InsuranceType::Nps,
            DocumentType::NhisAcquisition
            | DocumentType::NhisLoss
            | DocumentType::NhisSalaryChange
            | DocumentType::NhisDependent => InsuranceType::Nhis,
            DocumentType::EiAcquisition | DocumentType::EiLoss => InsuranceType::Employment,
            DocumentType::WciAcquisition | DocumentType::WciLoss => InsuranceType::WorkersComp,
        }
    }
}

/// Fixed 100-byte message header.
///
/// Text fields are left-justified and space padded; `sequence_no` is
/// zero padded. Decoding is lenient about blank fields so pre-production
/// authority endpoints that omit them still parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub message_id: String,
    pub message_type: MessageType,
    pub version: String,
    pub sender_id: String,
    pub sender_name: String,
    pub insurance_type: InsuranceType,
    pub receiver_code: String,
    /// `YYYYMMDDHHMMSS`, kept as text for byte fidelity.
    pub send_timestamp: String,
    pub sequence_no: u32,
    pub encrypted: bool,
    pub signed: bool,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            message_id: String::new(),
            message_type: MessageType::Submit,
            version: "1.0".to_string(),
            sender_id: String::new(),
            sender_name: String::new(),
            insurance_type: InsuranceType::Nps,
            receiver_code: String::new(),
            send_timestamp: now_timestamp(),
            sequence_no: 1,
            encrypted: true,
            signed: true,
        }
    }
}

pub(crate) fn now_timestamp() -> String {
    Local::now().format("%Y%m%d%H%M%S").to_string()
}

impl Header {
    /// Serialize to exactly [`HEADER_SIZE`] bytes.
    pub fn encode(&self) -> Result<[u8; HEADER_SIZE], Error> {
        let mut out = Vec::with_capacity(HEADER_SIZE);
        out.extend(fit_left(&self.message_id, 20)?);
        out.push(self.message_type.code() as u8);
        out.extend(fit_left(&self.version, 4)?);
        out.extend(fit_left(&self.sender_id, 13)?);
        out.extend(fit_left(&self.sender_name, 30)?);
        out.extend(self.insurance_type.code().as_bytes());
        out.extend(fit_left(&self.receiver_code, 3)?);
        out.extend(fit_left(&self.send_timestamp, 14)?);
        out.extend(fit_right_zero(&self.sequence_no.to_string(), 4)?);
        out.push(if self.encrypted { b'Y' } else { b'N' });
        out.push(if self.signed { b'Y' } else { b'N' });
        out.resize(HEADER_SIZE, b' ');
        Ok(out.try_into().expect("fixed header width"))
    }

    /// Parse a header from exactly [`HEADER_SIZE`] bytes.
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        if data.len() < HEADER_SIZE {
            return Err(Error::ShortMessage { len: data.len() });
        }
        let text_at = |range: std::ops::Range<usize>| euckr_decode(&data[range]).trim().to_string();

        let type_code = data[20] as char;
        let message_type = if type_code == ' ' {
            MessageType::Submit
        } else {
            MessageType::from_code(type_code)
                .ok_or_else(|| Error::Protocol(format!("unknown message type {type_code:?}")))?
        };

        let insurance_code = text_at(68..70);
        let insurance_type = if insurance_code.is_empty() {
            InsuranceType::Nps
        } else {
            InsuranceType::from_code(&insurance_code)
                .ok_or_else(|| Error::Protocol(format!("unknown insurance type {insurance_code:?}")))?
        };

        let sequence = text_at(87..91);

        Ok(Self {
            message_id: text_at(0..20),
            message_type,
            version: text_at(21..25),
            sender_id: text_at(25..38),
            sender_name: text_at(38..68),
            insurance_type,
            receiver_code: text_at(70..73),
            send_timestamp: text_at(73..87),
            sequence_no: sequence.parse().unwrap_or(1),
            encrypted: data[91] == b'Y',
            signed: data[92] == b'Y',
        })
    }
}

/// Message body.
///
/// Constructed bodies are either a submission (document line plus encoded
/// record lines), a raw envelope (`REF|`, `RSP|`), or bytes that failed
/// structured parsing and are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Body {
    pub document: Option<DocumentType>,
    pub record_count: u32,
    pub company_id: String,
    pub business_no: String,
    /// Fixed-width record lines, already charset encoded.
    pub records: Vec<Vec<u8>>,
    /// Verbatim payload for envelopes and unparseable bodies.
    pub raw: Option<Vec<u8>>,
}

impl Body {
    /// A submission body with pre-encoded record lines.
    pub fn submission(
        document: DocumentType,
        company_id: impl Into<String>,
        business_no: impl Into<String>,
        records: Vec<Vec<u8>>,
    ) -> Self {
        Self {
            document: Some(document),
            record_count: records.len() as u32,
            company_id: company_id.into(),
            business_no: business_no.into(),
            records,
            raw: None,
        }
    }

    /// A query envelope referencing an earlier filing.
    pub fn query(reference_id: &str) -> Result<Self, Error> {
        let raw = euckr_encode(&format!("REF|{reference_id}"))?;
        Ok(Self {
            raw: Some(raw),
            ..Self::default()
        })
    }

    /// A response envelope; used by tests and by authority-side tooling.
    pub fn response(code: &str, message: &str, data: Option<&[u8]>) -> Result<Self, Error> {
        let mut raw = euckr_encode(&format!("RSP|{code}|{message}"))?;
        if let Some(data) = data {
            raw.push(b'\n');
            raw.extend_from_slice(data);
        }
        Ok(Self {
            raw: Some(raw),
            ..Self::default()
        })
    }

    /// Reference id carried by a query envelope, if this is one.
    pub fn reference_id(&self) -> Option<String> {
        let raw = self.raw.as_ref()?;
        let text = euckr_decode(raw);
        text.strip_prefix("REF|").map(|id| id.trim().to_string())
    }

    /// Canonical wire bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        if let Some(raw) = &self.raw {
            return Ok(raw.clone());
        }
        let document = self
            .document
            .ok_or_else(|| Error::Protocol("body has neither document nor raw payload".into()))?;
        let header_line = format!(
            "{}|{}|{}|{}",
            document.code(),
            self.record_count,
            self.company_id,
            self.business_no
        );
        let mut out = euckr_encode(&header_line)?;
        for record in &self.records {
            out.push(b'\n');
            out.extend_from_slice(record);
        }
        Ok(out)
    }

    /// Parse body bytes. Bodies that do not open with a document line are
    /// kept raw rather than rejected; responses and queries land here.
    pub fn from_bytes(data: &[u8]) -> Self {
        let raw_fallback = || Self {
            raw: Some(data.to_vec()),
            ..Self::default()
        };

        let mut lines = data.split(|&b| b == b'\n');
        let Some(first) = lines.next() else {
            return raw_fallback();
        };
        let first_text = euckr_decode(first);
        let parts: Vec<&str> = first_text.split('|').collect();
        let Some(document) = DocumentType::from_code(parts[0]) else {
            return raw_fallback();
        };

        let records: Vec<Vec<u8>> = lines
            .filter(|line| !line.is_empty())
            .map(<[u8]>::to_vec)
            .collect();
        Self {
            document: Some(document),
            record_count: parts
                .get(1)
                .and_then(|s| s.parse().ok())
                .unwrap_or(records.len() as u32),
            company_id: parts.get(2).map(|s| s.to_string()).unwrap_or_default(),
            business_no: parts.get(3).map(|s| s.to_string()).unwrap_or_default(),
            records,
            raw: None,
        }
    }
}

/// Response code, text and optional payload extracted from a response body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseFields {
    pub code: String,
    pub message: String,
    pub data: Option<Vec<u8>>,
}

impl ResponseFields {
    pub(crate) fn from_body(body: &Body) -> Self {
        let Some(raw) = &body.raw else {
            return Self::default();
        };
        if !raw.starts_with(b"RSP|") {
            return Self::default();
        }
        let (first, data) = match raw.iter().position(|&b| b == b'\n') {
            Some(pos) => (&raw[..pos], Some(raw[pos + 1..].to_vec())),
            None => (&raw[..], None),
        };
        let text = euckr_decode(first);
        let mut parts = text.splitn(3, '|');
        let _ = parts.next(); // RSP
        Self {
            code: parts.next().unwrap_or_default().to_string(),
            message: parts.next().unwrap_or_default().to_string(),
            data: data.filter(|d| !d.is_empty()),
        }
    }
}

/// A complete EDI message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub header: Header,
    pub body: Body,
    /// Populated when decoding a response envelope.
    pub response: ResponseFields,
}

impl Message {
    /// Serialize: header, 4-byte big-endian body length, body.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let body = self.body.to_bytes()?;
        if body.len() > u32::MAX as usize {
            return Err(Error::OversizeBody {
                len: body.len(),
                max: u32::MAX as usize,
            });
        }
        let mut out = Vec::with_capacity(HEADER_SIZE + LENGTH_PREFIX_SIZE + body.len());
        out.extend_from_slice(&self.header.encode()?);
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Deserialize with the default body cap.
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        Self::decode_with_limit(data, DEFAULT_MAX_BODY)
    }

    /// Deserialize, rejecting bodies above `max_body`.
    pub fn decode_with_limit(data: &[u8], max_body: usize) -> Result<Self, Error> {
        if data.len() < HEADER_SIZE + LENGTH_PREFIX_SIZE {
            return Err(Error::ShortMessage { len: data.len() });
        }
        let header = Header::decode(&data[..HEADER_SIZE])?;
        let len_bytes: [u8; LENGTH_PREFIX_SIZE] = data[HEADER_SIZE..HEADER_SIZE + LENGTH_PREFIX_SIZE]
            .try_into()
            .expect("fixed prefix width");
        let body_len = u32::from_be_bytes(len_bytes) as usize;
        if body_len > max_body {
            return Err(Error::OversizeBody {
                len: body_len,
                max: max_body,
            });
        }
        let body_start = HEADER_SIZE + LENGTH_PREFIX_SIZE;
        if data.len() < body_start + body_len {
            return Err(Error::ShortMessage { len: data.len() });
        }
        let body = Body::from_bytes(&data[body_start..body_start + body_len]);
        let response = ResponseFields::from_body(&body);
        Ok(Self {
            header,
            body,
            response,
        })
    }

    /// A submission message with a fresh correlation id.
    pub fn create_submit(
        sender_id: &str,
        insurance_type: InsuranceType,
        document: DocumentType,
        records: Vec<Vec<u8>>,
        company_id: &str,
        business_no: &str,
    ) -> Self {
        Self {
            header: Header {
                message_id: new_message_id(),
                message_type: MessageType::Submit,
                sender_id: sender_id.to_string(),
                insurance_type,
                ..Header::default()
            },
            body: Body::submission(document, company_id, business_no, records),
            response: ResponseFields::default(),
        }
    }

    /// A status query referencing an earlier filing.
    pub fn create_query(
        sender_id: &str,
        insurance_type: InsuranceType,
        reference_id: &str,
    ) -> Result<Self, Error> {
        Ok(Self {
            header: Header {
                message_id: new_message_id(),
                message_type: MessageType::Query,
                sender_id: sender_id.to_string(),
                insurance_type,
                ..Header::default()
            },
            body: Body::query(reference_id)?,
            response: ResponseFields::default(),
        })
    }

    /// A download request for an accepted filing's receipt document.
    pub fn create_download(
        sender_id: &str,
        insurance_type: InsuranceType,
        reference_id: &str,
    ) -> Result<Self, Error> {
        let mut message = Self::create_query(sender_id, insurance_type, reference_id)?;
        message.header.message_type = MessageType::Download;
        Ok(message)
    }

    /// A cancellation request for a pending filing.
    pub fn create_cancel(
        sender_id: &str,
        insurance_type: InsuranceType,
        reference_id: &str,
    ) -> Result<Self, Error> {
        let mut message = Self::create_query(sender_id, insurance_type, reference_id)?;
        message.header.message_type = MessageType::Cancel;
        Ok(message)
    }
}

fn new_message_id() -> String {
    let id = Uuid::new_v4().to_string();
    id[..20].to_string()
}
