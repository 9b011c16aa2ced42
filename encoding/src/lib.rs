// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Charset and fixed-width utilities for the EDI wire format.
//!
//! Authority payloads are EUC-KR on the wire: ASCII stays single byte while
//! Hangul occupies two. All width arithmetic in this workspace is therefore
//! byte based, and this crate is the only place that touches the charset.

mod errors;
mod euckr;
mod fixed;

pub use self::errors::Error;
pub use self::euckr::{decode, decode_strict, encode, encoded_len};
pub use self::fixed::{fit_left, fit_right_space, fit_right_zero};
