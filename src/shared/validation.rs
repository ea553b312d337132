use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Fewest digits a phone number may carry, separators and plus excluded
pub const MIN_PHONE_DIGITS: usize = 7;

lazy_static! {
    /// Shape of a phone number: optional leading plus, then digit groups
    /// separated by single spaces or hyphens. Length is checked by [`validate_phone`].
    /// - Valid: "+62 812 3456 7890", "081234567890", "+1-202-555-0143"
    /// - Invalid: "phone", "+62--812", "0812 "
    pub static ref PHONE_REGEX: Regex =
        Regex::new(r"^\+?[0-9]+(?:[ -][0-9]+)*$").unwrap();

    /// Regex for "lat,lng" location strings captured from the device
    /// - Valid: "-6.2088,106.8456", "40.7, -74.0"
    /// - Invalid: "Main street", "12.5", "a,b"
    pub static ref COORDINATES_REGEX: Regex =
        Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*$").unwrap();
}

/// Validator for phone fields on complaints and profiles
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if PHONE_REGEX.is_match(phone) && digits >= MIN_PHONE_DIGITS {
        Ok(())
    } else {
        Err(ValidationError::new("phone").with_message("Invalid phone number".into()))
    }
}

/// Parse a "lat,lng" location into a coordinate pair within valid ranges
pub fn parse_coordinates(location: &str) -> Option<(f64, f64)> {
    let caps = COORDINATES_REGEX.captures(location)?;
    let lat: f64 = caps.get(1)?.as_str().parse().ok()?;
    let lng: f64 = caps.get(2)?.as_str().parse().ok()?;

    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) {
        Some((lat, lng))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_regex_valid() {
        assert!(PHONE_REGEX.is_match("+62 812 3456 7890"));
        assert!(PHONE_REGEX.is_match("081234567890"));
        assert!(PHONE_REGEX.is_match("+1-202-555-0143"));
    }

    #[test]
    fn test_phone_regex_invalid() {
        assert!(!PHONE_REGEX.is_match("phone"));
        assert!(!PHONE_REGEX.is_match("+62--812")); // double separator
        assert!(!PHONE_REGEX.is_match("0812 ")); // trailing space
        assert!(!PHONE_REGEX.is_match(""));
    }

    #[test]
    fn test_validate_phone_accepts_single_digit_country_code() {
        assert!(validate_phone("+1-202-555-0143").is_ok());
        assert!(validate_phone("+1 2025550143").is_ok());
        assert!(validate_phone("+62 812 3456 7890").is_ok());
    }

    #[test]
    fn test_validate_phone_requires_enough_digits() {
        assert!(validate_phone("1").is_err());
        assert!(validate_phone("12").is_err());
        assert!(validate_phone("+1-234").is_err());
        assert!(validate_phone("123-4567").is_ok());
    }

    #[test]
    fn test_parse_coordinates() {
        assert_eq!(
            parse_coordinates("-6.2088,106.8456"),
            Some((-6.2088, 106.8456))
        );
        assert_eq!(parse_coordinates(" 40.7 , -74 "), Some((40.7, -74.0)));
    }

    #[test]
    fn test_parse_coordinates_rejects_free_text_and_out_of_range() {
        assert_eq!(parse_coordinates("Near the old market"), None);
        assert_eq!(parse_coordinates("12.5"), None);
        assert_eq!(parse_coordinates("91.0,10.0"), None);
        assert_eq!(parse_coordinates("10.0,181.0"), None);
    }
}
