// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Cryptographic primitives required for EDI exchange with the Korean
//! social-insurance authorities: the ARIA block cipher in CBC mode, PKCS#7
//! padding, raw RSA/SHA-256 signatures with X.509 certificate handling, and
//! the usual key-material utilities (CSPRNG, PBKDF2, HMAC).

mod aria;
mod errors;
mod padding;
mod signer;
mod util;

pub use self::aria::{AriaCbc, AriaCipher, BLOCK_SIZE};
pub use self::errors::Error;
pub use self::padding::Pkcs7;
pub use self::signer::{CertificateInfo, EdiSigner};
pub use self::util::{
    constant_time_eq, derive_key, expand_secret, generate_iv, generate_key, hmac_sha256,
    verify_hmac, PBKDF2_ITERATIONS,
};
