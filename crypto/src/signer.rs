// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Raw RSA/SHA-256 signatures over EDI bodies.
//!
//! The authorities verify a detached PKCS#1 v1.5 signature computed over the
//! unencrypted body bytes. Key material arrives as an accredited-certificate
//! pair: an RSA private key (PKCS#8 or PKCS#1, PEM or DER, optionally
//! password protected) and an X.509 certificate whose public key the remote
//! end publishes for response verification.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use x509_cert::der::referenced::OwnedToRef;
use x509_cert::der::{Decode, DecodePem};
use x509_cert::Certificate;

use crate::errors::Error;

const PEM_MARKER: &[u8] = b"-----BEGIN";

/// Summary of the loaded certificate, for logging and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    pub subject: String,
    pub issuer: String,
    pub serial_number: String,
    pub not_before: SystemTime,
    pub not_after: SystemTime,
}

/// Signer/verifier for a single authority session.
#[derive(Default)]
pub struct EdiSigner {
    private_key: Option<RsaPrivateKey>,
    certificate: Option<Certificate>,
    /// Bare verification key, for peers that publish one without a
    /// certificate. The certificate's key wins when both are present.
    public_key: Option<RsaPublicKey>,
}

impl EdiSigner {
    /// Signer with no key material; signing and verification are disabled
    /// until keys are loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load key material from disk. Any path may be omitted.
    pub fn from_files(
        private_key_path: Option<&Path>,
        certificate_path: Option<&Path>,
        password: Option<&[u8]>,
    ) -> Result<Self, Error> {
        let mut signer = Self::new();
        if let Some(path) = private_key_path {
            let data = fs::read(path).map_err(|e| Error::PrivateKey(e.to_string()))?;
            signer.load_private_key(&data, password)?;
        }
        if let Some(path) = certificate_path {
            let data = fs::read(path).map_err(|e| Error::Certificate(e.to_string()))?;
            signer.load_certificate(&data)?;
        }
        Ok(signer)
    }

    /// Load a bare SubjectPublicKeyInfo verification key (PEM or DER).
    pub fn load_public_key(&mut self, data: &[u8]) -> Result<(), Error> {
        let key = if data.starts_with(PEM_MARKER) {
            let pem = std::str::from_utf8(data)
                .map_err(|_| Error::Certificate("PEM data is not UTF-8".into()))?;
            RsaPublicKey::from_public_key_pem(pem).map_err(|e| Error::Certificate(e.to_string()))?
        } else {
            RsaPublicKey::from_public_key_der(data).map_err(|e| Error::Certificate(e.to_string()))?
        };
        self.public_key = Some(key);
        Ok(())
    }

    /// Load a bare verification key from disk.
    pub fn load_public_key_file(&mut self, path: &Path) -> Result<(), Error> {
        let data = fs::read(path).map_err(|e| Error::Certificate(e.to_string()))?;
        self.load_public_key(&data)
    }

    /// Parse a private key from PEM or DER bytes.
    pub fn load_private_key(&mut self, data: &[u8], password: Option<&[u8]>) -> Result<(), Error> {
        let key = if let Some(password) = password {
            if data.starts_with(PEM_MARKER) {
                let pem = std::str::from_utf8(data)
                    .map_err(|_| Error::PrivateKey("PEM data is not UTF-8".into()))?;
                RsaPrivateKey::from_pkcs8_encrypted_pem(pem, password)
                    .map_err(|e| Error::PrivateKey(e.to_string()))?
            } else {
                RsaPrivateKey::from_pkcs8_encrypted_der(data, password)
                    .map_err(|e| Error::PrivateKey(e.to_string()))?
            }
        } else if data.starts_with(PEM_MARKER) {
            let pem = std::str::from_utf8(data)
                .map_err(|_| Error::PrivateKey("PEM data is not UTF-8".into()))?;
            RsaPrivateKey::from_pkcs8_pem(pem)
                .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
                .map_err(|e| Error::PrivateKey(e.to_string()))?
        } else {
            RsaPrivateKey::from_pkcs8_der(data)
                .or_else(|_| RsaPrivateKey::from_pkcs1_der(data))
                .map_err(|e| Error::PrivateKey(e.to_string()))?
        };
        self.private_key = Some(key);
        Ok(())
    }

    /// Parse a certificate from PEM or DER bytes.
    pub fn load_certificate(&mut self, data: &[u8]) -> Result<(), Error> {
        let cert = Certificate::from_pem(data)
            .or_else(|_| Certificate::from_der(data))
            .map_err(|e| Error::Certificate(e.to_string()))?;
        self.certificate = Some(cert);
        Ok(())
    }

    pub fn has_signing_key(&self) -> bool {
        self.private_key.is_some()
    }

    pub fn has_certificate(&self) -> bool {
        self.certificate.is_some()
    }

    /// Detached PKCS#1 v1.5 signature over SHA-256 of `data`.
    pub fn sign_raw(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        let key = self.private_key.as_ref().ok_or(Error::NoPrivateKey)?;
        let signing_key = pkcs1v15::SigningKey::<Sha256>::new(key.clone());
        Ok(signing_key.sign(data).to_vec())
    }

    /// Verify a detached signature with the certificate's public key, or
    /// the bare verification key when no certificate is loaded.
    ///
    /// Returns `false` for any failure (no key, malformed signature,
    /// mismatch); verification never errors.
    pub fn verify_raw(&self, data: &[u8], signature: &[u8]) -> bool {
        let Some(key) = self
            .certificate_public_key()
            .or_else(|| self.public_key.clone())
        else {
            return false;
        };
        Self::verify_with_key(&key, data, signature)
    }

    /// Verify against an explicitly supplied public key.
    pub fn verify_raw_with(&self, data: &[u8], signature: &[u8], key: &RsaPublicKey) -> bool {
        Self::verify_with_key(key, data, signature)
    }

    fn verify_with_key(key: &RsaPublicKey, data: &[u8], signature: &[u8]) -> bool {
        let verifying_key = pkcs1v15::VerifyingKey::<Sha256>::new(key.clone());
        let Ok(sig) = pkcs1v15::Signature::try_from(signature) else {
            return false;
        };
        verifying_key.verify(data, &sig).is_ok()
    }

    fn certificate_public_key(&self) -> Option<RsaPublicKey> {
        let cert = self.certificate.as_ref()?;
        let spki = cert.tbs_certificate.subject_public_key_info.owned_to_ref();
        RsaPublicKey::try_from(spki).ok()
    }

    /// Whether the loaded certificate is inside its validity window.
    pub fn certificate_valid_now(&self) -> bool {
        let Some(cert) = self.certificate.as_ref() else {
            return false;
        };
        let validity = &cert.tbs_certificate.validity;
        let now = SystemTime::now();
        validity.not_before.to_system_time() <= now && now <= validity.not_after.to_system_time()
    }

    pub fn certificate_info(&self) -> Option<CertificateInfo> {
        let cert = self.certificate.as_ref()?;
        let tbs = &cert.tbs_certificate;
        Some(CertificateInfo {
            subject: tbs.subject.to_string(),
            issuer: tbs.issuer.to_string(),
            serial_number: tbs.serial_number.to_string(),
            not_before: tbs.validity.not_before.to_system_time(),
            not_after: tbs.validity.not_after.to_system_time(),
        })
    }
}
