// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Checksum validators for Korean statutory identifiers.
//!
//! Only identifiers that pass these checks may reach the wire; the
//! providers reject everything else synchronously.

/// Strip dashes and whitespace, the separators callers habitually include.
pub fn strip_separators(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .collect()
}

fn digits(value: &str) -> Option<Vec<u32>> {
    value.chars().map(|c| c.to_digit(10)).collect()
}

/// Business registration number (10 digits, XXX-XX-XXXXX).
///
/// The check digit covers a weighted sum over the first nine digits plus a
/// tens-carry correction on the ninth.
pub fn validate_business_number(value: &str) -> bool {
    let cleaned = strip_separators(value);
    if cleaned.len() != 10 {
        return false;
    }
    let Some(d) = digits(&cleaned) else {
        return false;
    };
    const WEIGHTS: [u32; 9] = [1, 3, 7, 1, 3, 7, 1, 3, 5];
    let mut sum: u32 = WEIGHTS.iter().zip(&d).map(|(w, x)| w * x).sum();
    sum += WEIGHTS[8] * d[8] / 10;
    (10 - sum % 10) % 10 == d[9]
}

/// Format a valid business number as XXX-XX-XXXXX.
pub fn format_business_number(value: &str) -> Option<String> {
    let cleaned = strip_separators(value);
    if !validate_business_number(&cleaned) {
        return None;
    }
    Some(format!(
        "{}-{}-{}",
        &cleaned[..3],
        &cleaned[3..5],
        &cleaned[5..]
    ))
}

/// Resident registration number, strict mod-11 checksum over 13 digits.
pub fn validate_resident_number(value: &str) -> bool {
    let cleaned = strip_separators(value);
    if cleaned.len() != 13 {
        return false;
    }
    let Some(d) = digits(&cleaned) else {
        return false;
    };
    const WEIGHTS: [u32; 12] = [2, 3, 4, 5, 6, 7, 8, 9, 2, 3, 4, 5];
    let sum: u32 = WEIGHTS.iter().zip(&d).map(|(w, x)| w * x).sum();
    (11 - sum % 11) % 10 == d[12]
}

/// Resident number plausibility: birth date digits and the gender/century
/// marker (`1..=8`). This is the check the filing forms apply; the strict
/// checksum above is available for callers that want it.
pub fn validate_resident_birth(value: &str) -> bool {
    let cleaned = strip_separators(value);
    if cleaned.len() != 13 || digits(&cleaned).is_none() {
        return false;
    }
    let gender = cleaned.as_bytes()[6] - b'0';
    if !(1..=8).contains(&gender) {
        return false;
    }
    let month: u32 = cleaned[2..4].parse().unwrap_or(0);
    let day: u32 = cleaned[4..6].parse().unwrap_or(0);
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

/// Corporate registration number (13 digits) with its doubled-digit sum.
pub fn validate_corporate_number(value: &str) -> bool {
    let cleaned = strip_separators(value);
    if cleaned.len() != 13 {
        return false;
    }
    let Some(d) = digits(&cleaned) else {
        return false;
    };
    let mut sum = 0u32;
    for (i, x) in d[..12].iter().enumerate() {
        let product = if i % 2 == 0 { *x } else { x * 2 };
        sum += product / 10 + product % 10;
    }
    (10 - sum % 10) % 10 == d[12]
}

/// Domestic phone number: 9 to 11 digits once separators are removed.
pub fn validate_phone(value: &str) -> bool {
    let cleaned = strip_separators(value);
    (9..=11).contains(&cleaned.len()) && digits(&cleaned).is_some()
}

// Field-level adapters returning a message on failure, for use in form
// declarations. Empty values pass; `required` handles presence.

pub fn business_number_field(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    let cleaned = strip_separators(value);
    if cleaned.len() != 10 || cleaned.chars().any(|c| !c.is_ascii_digit()) {
        return Some("business registration number must be 10 digits".into());
    }
    if !validate_business_number(&cleaned) {
        return Some("business registration number checksum is invalid".into());
    }
    None
}

pub fn resident_number_field(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    let cleaned = strip_separators(value);
    if cleaned.len() != 13 || cleaned.chars().any(|c| !c.is_ascii_digit()) {
        return Some("resident registration number must be 13 digits".into());
    }
    if !validate_resident_birth(&cleaned) {
        return Some("resident registration number is invalid".into());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    // 123-45-6789 with the tens-carry correction yields check digit 1.
    const VALID_BUSINESS: &str = "1234567891";

    #[test]
    fn business_number_checksum() {
        assert!(validate_business_number(VALID_BUSINESS));
        assert!(validate_business_number("123-45-67891"));
        assert!(!validate_business_number("1234567890"));
    }

    #[test]
    fn business_number_requires_ten_digits() {
        assert!(!validate_business_number("123456789"));
        assert!(!validate_business_number("12345678911"));
        assert!(!validate_business_number("12345678a1"));
        assert!(!validate_business_number(""));
    }

    #[test]
    fn business_number_formatting() {
        assert_eq!(
            format_business_number(VALID_BUSINESS).unwrap(),
            "123-45-67891"
        );
        assert!(format_business_number("123456789").is_none());
    }

    #[test]
    fn resident_checksum_accepts_valid() {
        // 800101-1234567 style number with a correct check digit.
        // Weighted sum of 800101123456 with [2,3,4,5,6,7,8,9,2,3,4,5]:
        // 16+0+0+5+0+7+8+18+6+12+20+30 = 122; (11 - 122 % 11) % 10 = 0.
        assert!(validate_resident_number("8001011234560"));
        assert!(!validate_resident_number("8001011234561"));
    }

    #[test]
    fn resident_checksum_requires_thirteen_digits() {
        assert!(!validate_resident_number("800101123456"));
        assert!(!validate_resident_number("80010112345678"));
    }

    #[test]
    fn resident_birth_gender_digit_range() {
        assert!(validate_resident_birth("8001011234560"));
        assert!(validate_resident_birth("0502043234567"));
        // Gender digit 9 is outside the issued range.
        assert!(!validate_resident_birth("8001019234567"));
        assert!(!validate_resident_birth("8001010234567"));
    }

    #[test]
    fn resident_birth_date_sanity() {
        assert!(!validate_resident_birth("8013011234567")); // month 13
        assert!(!validate_resident_birth("8001321234567")); // day 32
        assert!(!validate_resident_birth("8000011234567")); // month 0
    }

    #[test]
    fn corporate_number_checksum() {
        // 110111-0012345 style: digit-doubling sum over the first twelve.
        // 1,1,0,1,1,1,0,0,1,2,3,4 with doubling at odd indices:
        // 1+2+0+2+1+2+0+0+1+4+3+8 = 24; (10 - 24 % 10) % 10 = 6.
        assert!(validate_corporate_number("1101110012346"));
        assert!(!validate_corporate_number("1101110012345"));
        assert!(!validate_corporate_number("110111001234"));
    }

    #[test]
    fn phone_length_bounds() {
        assert!(validate_phone("02-123-4567"));
        assert!(validate_phone("010-1234-5678"));
        assert!(!validate_phone("12345678"));
        assert!(!validate_phone("010-1234-56789"));
        assert!(!validate_phone("phone"));
    }

    #[test]
    fn field_adapters_pass_empty() {
        assert!(business_number_field("").is_none());
        assert!(resident_number_field("").is_none());
    }

    #[test]
    fn short_business_number_names_the_length_rule() {
        let message = business_number_field("123456789").unwrap();
        assert!(message.contains("10 digits"), "{message}");
        let message = resident_number_field("80010112345").unwrap();
        assert!(message.contains("13 digits"), "{message}");
    }
}
