//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a room code is exactly 6 ASCII digits.
///
/// # Examples
///
/// ```ignore
/// validate_room_code("483920") // Ok
/// validate_room_code("48392")  // Err - too short
/// validate_room_code("48392a") // Err - non-digit
/// ```
pub fn validate_room_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != 6 {
        let mut err = ValidationError::new("room_code_length");
        err.message =
            Some(format!("Room code must be exactly 6 characters (got {})", code.len()).into());
        return Err(err);
    }

    if !code.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("room_code_format");
        err.message = Some("Room code must contain only ASCII digits".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_room_code_valid() {
        assert!(validate_room_code("483920").is_ok());
        assert!(validate_room_code("000000").is_ok());
        assert!(validate_room_code("999999").is_ok());
    }

    #[test]
    fn test_validate_room_code_invalid_length() {
        assert!(validate_room_code("48392").is_err()); // too short
        assert!(validate_room_code("4839201").is_err()); // too long
        assert!(validate_room_code("").is_err()); // empty
    }

    #[test]
    fn test_validate_room_code_invalid_format() {
        assert!(validate_room_code("48392a").is_err()); // letter
        assert!(validate_room_code("48 920").is_err()); // space
        assert!(validate_room_code("４８３９２０").is_err()); // full-width digits
    }
}
