// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use encoding_rs::EUC_KR;

use crate::errors::Error;

/// Encode a string as EUC-KR, failing on unmappable characters.
pub fn encode(s: &str) -> Result<Vec<u8>, Error> {
    let (bytes, _, had_errors) = EUC_KR.encode(s);
    if had_errors {
        let bad = s
            .chars()
            .find(|&c| EUC_KR.encode(&c.to_string()).2)
            .unwrap_or('\u{fffd}');
        return Err(Error::Unencodable(bad));
    }
    Ok(bytes.into_owned())
}

/// Decode EUC-KR bytes, substituting U+FFFD for invalid sequences.
///
/// Responses occasionally carry stray padding inside text fields, so the
/// lenient form is the default for inbound data.
pub fn decode(bytes: &[u8]) -> String {
    let (s, _, _) = EUC_KR.decode(bytes);
    s.into_owned()
}

/// Decode EUC-KR bytes, failing on any invalid sequence.
pub fn decode_strict(bytes: &[u8]) -> Result<String, Error> {
    let (s, _, had_errors) = EUC_KR.decode(bytes);
    if had_errors {
        return Err(Error::InvalidSequence);
    }
    Ok(s.into_owned())
}

/// Byte length of `s` after EUC-KR encoding.
pub fn encoded_len(s: &str) -> Result<usize, Error> {
    encode(s).map(|b| b.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_single_byte() {
        assert_eq!(encode("ABC 123").unwrap(), b"ABC 123");
        assert_eq!(encoded_len("hello").unwrap(), 5);
    }

    #[test]
    fn hangul_is_double_byte() {
        let bytes = encode("\u{d64d}\u{ae38}\u{b3d9}").unwrap(); // 홍길동
        assert_eq!(bytes.len(), 6);
        assert_eq!(decode(&bytes), "\u{d64d}\u{ae38}\u{b3d9}");
    }

    #[test]
    fn unmappable_character_fails() {
        assert_eq!(encode("\u{1f600}"), Err(Error::Unencodable('\u{1f600}')));
    }

    #[test]
    fn lenient_decode_replaces_invalid_bytes() {
        let s = decode(&[0xb0, 0xa1, 0xff]);
        assert!(s.starts_with('\u{ac00}')); // 가
        assert!(s.contains('\u{fffd}'));
    }

    #[test]
    fn strict_decode_rejects_invalid_bytes() {
        assert_eq!(decode_strict(&[0xff, 0xff]), Err(Error::InvalidSequence));
        assert_eq!(decode_strict(b"plain").unwrap(), "plain");
    }

    #[test]
    fn roundtrip_mixed_text() {
        let text = "KERP \u{c0ac}\u{c5c5}\u{c7a5} 01";
        assert_eq!(decode(&encode(text).unwrap()), text);
    }
}
