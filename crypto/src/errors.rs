// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

/// Crypto error
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Key length is not one of the supported ARIA sizes
    #[error("Invalid key size: {0} bytes (expected 16, 24 or 32)")]
    InvalidKeySize(usize),
    /// Block input is not exactly one cipher block
    #[error("Block size must be 16 bytes, got {0}")]
    InvalidBlockSize(usize),
    /// CBC input is not a whole number of blocks
    #[error("Input length {0} is not a multiple of 16")]
    NotBlockAligned(usize),
    /// IV is not one cipher block wide
    #[error("IV must be 16 bytes, got {0}")]
    InvalidIv(usize),
    /// PKCS#7 padding failed validation on removal
    #[error("Bad PKCS#7 padding: {0}")]
    BadPadding(&'static str),
    /// Private key material could not be loaded or parsed
    #[error("Failed to load private key: {0}")]
    PrivateKey(String),
    /// Certificate material could not be loaded or parsed
    #[error("Failed to load certificate: {0}")]
    Certificate(String),
    /// Signing was requested without a loaded private key
    #[error("Private key not loaded")]
    NoPrivateKey,
    /// Verification was requested without a certificate or public key
    #[error("Certificate not loaded")]
    NoCertificate,
    /// Failed to produce a signature
    #[error("Failed to sign data: {0}")]
    Signing(String),
}
