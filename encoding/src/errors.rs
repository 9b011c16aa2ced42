// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

/// Encoding error
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Character has no EUC-KR representation
    #[error("Character {0:?} cannot be encoded as EUC-KR")]
    Unencodable(char),
    /// Byte sequence is not valid EUC-KR
    #[error("Invalid EUC-KR byte sequence")]
    InvalidSequence,
}
