// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Fixed-width field formatting.
//!
//! Widths are byte widths after EUC-KR encoding. Truncation never splits a
//! double-byte character; a dangling half is replaced by pad bytes so the
//! emitted width is always exact.

use crate::errors::Error;
use crate::euckr;

const SPACE: u8 = b' ';
const ZERO: u8 = b'0';

/// Encode `s` character by character until `width` bytes are filled.
fn truncate_encoded(s: &str, width: usize) -> Result<Vec<u8>, Error> {
    let mut out = Vec::with_capacity(width);
    for c in s.chars() {
        let mut buf = [0u8; 4];
        let encoded = euckr::encode(c.encode_utf8(&mut buf))?;
        if out.len() + encoded.len() > width {
            break;
        }
        out.extend_from_slice(&encoded);
    }
    Ok(out)
}

/// Left-justify: content first, space padding to `width` bytes.
pub fn fit_left(s: &str, width: usize) -> Result<Vec<u8>, Error> {
    let mut out = truncate_encoded(s, width)?;
    out.resize(width, SPACE);
    Ok(out)
}

/// Right-justify with space padding.
pub fn fit_right_space(s: &str, width: usize) -> Result<Vec<u8>, Error> {
    let content = truncate_encoded(s, width)?;
    let mut out = vec![SPACE; width - content.len()];
    out.extend_from_slice(&content);
    Ok(out)
}

/// Right-justify with zero padding, for numeric fields.
pub fn fit_right_zero(s: &str, width: usize) -> Result<Vec<u8>, Error> {
    let content = truncate_encoded(s, width)?;
    let mut out = vec![ZERO; width - content.len()];
    out.extend_from_slice(&content);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_pads_with_spaces() {
        assert_eq!(fit_left("AB", 5).unwrap(), b"AB   ");
    }

    #[test]
    fn left_truncates_to_width() {
        assert_eq!(fit_left("ABCDEFG", 3).unwrap(), b"ABC");
    }

    #[test]
    fn right_zero_pads_numeric() {
        assert_eq!(fit_right_zero("42", 6).unwrap(), b"000042");
    }

    #[test]
    fn right_space_pads() {
        assert_eq!(fit_right_space("42", 4).unwrap(), b"  42");
    }

    #[test]
    fn hangul_counts_bytes_not_chars() {
        // Three Hangul syllables occupy six bytes.
        let out = fit_left("\u{d64d}\u{ae38}\u{b3d9}", 10).unwrap();
        assert_eq!(out.len(), 10);
        assert_eq!(&out[6..], b"    ");
    }

    #[test]
    fn truncation_never_splits_a_character() {
        // Width 5 can hold two syllables (4 bytes) plus one pad byte.
        let out = fit_left("\u{d64d}\u{ae38}\u{b3d9}", 5).unwrap();
        assert_eq!(out.len(), 5);
        assert_eq!(out[4], b' ');
        assert_eq!(crate::euckr::decode(&out[..4]), "\u{d64d}\u{ae38}");
    }

    #[test]
    fn zero_width_is_empty() {
        assert_eq!(fit_left("anything", 0).unwrap(), Vec::<u8>::new());
    }
}
