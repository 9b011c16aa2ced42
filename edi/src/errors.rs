// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::time::Duration;

use thiserror::Error;

/// EDI error
///
/// `Crypto(BadPadding)` is a protocol-class failure (the peer framed or
/// encrypted the payload wrongly); signature mismatches are never reported
/// through this type, they surface as a `signature_valid = false` flag.
#[derive(Debug, Error)]
pub enum Error {
    /// Fewer bytes than a header plus length prefix
    #[error("Message too short: {len} bytes")]
    ShortMessage { len: usize },
    /// Declared payload length exceeds the configured cap
    #[error("Payload too large: {len} bytes exceeds cap of {max}")]
    OversizeBody { len: usize, max: usize },
    /// Malformed framing or a state-machine violation
    #[error("Protocol violation: {0}")]
    Protocol(String),
    #[error("Crypto failure: {0}")]
    Crypto(#[from] kedi_crypto::Error),
    #[error("Charset failure: {0}")]
    Encoding(#[from] kedi_encoding::Error),
    /// Send attempted without an established connection
    #[error("Not connected to EDI server")]
    NotConnected,
    #[error("Failed to connect after {attempts} attempts: {last}")]
    ConnectFailed { attempts: u32, last: String },
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
    /// Caller withdrew while an exchange was in flight
    #[error("Operation cancelled")]
    Cancelled,
    /// The pool is shut down
    #[error("Connection pool is closed")]
    PoolClosed,
    /// Non-success response code from the remote authority
    #[error("Authority error {code}: {message}")]
    Authority { code: String, message: String },
}

impl Error {
    /// Whether `send_with_retry` may reconnect and try again. Authority
    /// responses and cancellations are final; everything session-level is
    /// worth one more connection.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Error::Authority { .. } | Error::Cancelled | Error::PoolClosed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(Error::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(Error::NotConnected.is_retryable());
        assert!(Error::Protocol("bad frame".into()).is_retryable());
        assert!(!Error::Cancelled.is_retryable());
        assert!(!Error::Authority {
            code: "2001".into(),
            message: "duplicate".into()
        }
        .is_retryable());
    }
}
