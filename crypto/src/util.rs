// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// PBKDF2 iteration floor for password-derived keys.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Generate a random symmetric key of `size` bytes from the OS CSPRNG.
pub fn generate_key(size: usize) -> Vec<u8> {
    let mut key = vec![0u8; size];
    OsRng.fill_bytes(&mut key);
    key
}

/// Generate a random initialization vector.
pub fn generate_iv(size: usize) -> Vec<u8> {
    generate_key(size)
}

/// Derive a key from a password with PBKDF2-HMAC-SHA256.
///
/// A fresh 16-byte salt is generated when none is supplied; the salt used is
/// returned alongside the key so it can be persisted.
pub fn derive_key(password: &str, salt: Option<&[u8]>, key_length: usize) -> (Vec<u8>, Vec<u8>) {
    let salt = match salt {
        Some(s) => s.to_vec(),
        None => generate_key(16),
    };
    let mut key = vec![0u8; key_length];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut key);
    (key, salt)
}

/// Expand a shared secret into key material, HKDF style: SHA-256 extract
/// followed by counter-mode expansion over the context info.
pub fn expand_secret(shared_secret: &[u8], info: &[u8], length: usize) -> Vec<u8> {
    use sha2::Digest;

    let prk = Sha256::digest(shared_secret);
    let mut okm = Vec::with_capacity(length + 32);
    let mut block: Vec<u8> = Vec::new();
    let mut counter = 1u8;
    while okm.len() < length {
        let mut hasher = Sha256::new();
        hasher.update(&prk);
        hasher.update(&block);
        hasher.update(info);
        hasher.update([counter]);
        block = hasher.finalize().to_vec();
        okm.extend_from_slice(&block);
        counter = counter.wrapping_add(1);
    }
    okm.truncate(length);
    okm
}

/// HMAC-SHA256 of `message` under `key`.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Constant-time HMAC verification.
pub fn verify_hmac(key: &[u8], message: &[u8], expected: &[u8]) -> bool {
    constant_time_eq(&hmac_sha256(key, message), expected)
}

/// Constant-time equality for MACs and signatures.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.ct_eq(b).into()
}
