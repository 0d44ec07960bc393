//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

// Chinese mobile phone number regex
static CHINA_MOBILE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^1[3-9]\d{9}$").unwrap()
});

// International phone number regex (E.164 format)
static INTERNATIONAL_PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[1-9]\d{1,14}$").unwrap()
});

/// Check if a phone number is a mainland China mobile number
pub fn is_valid_chinese_mobile(phone: &str) -> bool {
    CHINA_MOBILE_REGEX.is_match(phone)
}

/// Check if a phone number is in international E.164 format
pub fn is_valid_international_phone(phone: &str) -> bool {
    INTERNATIONAL_PHONE_REGEX.is_match(phone)
}

/// Check if a phone number is valid (either Chinese mobile or E.164)
///
/// The check runs on the raw input: the destination doubles as a store key,
/// so "+1 555 123 4567" and "+15551234567" must not both be accepted.
pub fn is_valid_phone(phone: &str) -> bool {
    is_valid_chinese_mobile(phone) || is_valid_international_phone(phone)
}

/// Mask a phone number for logging, keeping only the last 4 digits
///
/// `"+15551234567"` becomes `"+*******4567"`.
pub fn mask_phone_number(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }

    let visible: String = chars[chars.len() - 4..].iter().collect();
    let masked_count = chars.len() - 4;

    if chars[0] == '+' {
        format!("+{}{}", "*".repeat(masked_count - 1), visible)
    } else {
        format!("{}{}", "*".repeat(masked_count), visible)
    }
}
