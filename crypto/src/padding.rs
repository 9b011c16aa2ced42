// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::errors::Error;

/// PKCS#7 byte-count padding for block ciphers.
///
/// Padding always adds between 1 and `block_size` bytes, so an aligned
/// input grows by a full block and removal is never ambiguous.
#[derive(Debug, Clone, Copy)]
pub struct Pkcs7 {
    block_size: usize,
}

impl Pkcs7 {
    /// Block size must fit in a single pad byte (1..=255).
    pub fn new(block_size: usize) -> Result<Self, Error> {
        if !(1..=255).contains(&block_size) {
            return Err(Error::BadPadding("block size must be between 1 and 255"));
        }
        Ok(Self { block_size })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Append `k` copies of byte `k` so the result is block aligned.
    pub fn pad(&self, data: &[u8]) -> Vec<u8> {
        let k = self.block_size - data.len() % self.block_size;
        let mut out = Vec::with_capacity(data.len() + k);
        out.extend_from_slice(data);
        out.extend(std::iter::repeat(k as u8).take(k));
        out
    }

    /// Strip and validate padding added by [`Pkcs7::pad`].
    pub fn unpad(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        if data.is_empty() {
            return Err(Error::BadPadding("input is empty"));
        }
        if data.len() % self.block_size != 0 {
            return Err(Error::BadPadding("length is not a multiple of block size"));
        }
        let k = *data.last().expect("non-empty") as usize;
        if k == 0 || k > self.block_size {
            return Err(Error::BadPadding("pad byte out of range"));
        }
        if data[data.len() - k..].iter().any(|&b| b as usize != k) {
            return Err(Error::BadPadding("pad bytes are inconsistent"));
        }
        Ok(data[..data.len() - k].to_vec())
    }

    pub fn is_valid(&self, data: &[u8]) -> bool {
        self.unpad(data).is_ok()
    }
}
