//! Form field checks. Each returns the message to show, or `None` when valid.

/// Must contain '@' and a '.' after it, max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Email must be at most 254 characters".to_string());
    }
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => None,
        _ => Some("Please enter a valid email address".to_string()),
    }
}

/// Min 8 chars.
pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.chars().count() < 8 {
        return Some("Password must be at least 8 characters".to_string());
    }
    None
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    if value.trim().chars().count() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Progress as typed into a form: a whole number from 0 to 100.
pub fn validate_progress(value: &str) -> Result<u8, String> {
    match value.trim().parse::<u8>() {
        Ok(p) if p <= 100 => Ok(p),
        _ => Err("Progress must be a whole number between 0 and 100".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_needs_local_part_and_dotted_domain() {
        assert!(validate_email("ann@example.com").is_none());
        assert!(validate_email("@example.com").is_some());
        assert!(validate_email("ann@localhost").is_some());
        assert!(validate_email("  ").is_some());
    }

    #[test]
    fn progress_out_of_range_is_rejected() {
        assert_eq!(validate_progress(" 45 "), Ok(45));
        assert!(validate_progress("101").is_err());
        assert!(validate_progress("-1").is_err());
        assert!(validate_progress("half").is_err());
    }

    #[test]
    fn required_counts_characters_not_bytes() {
        assert!(validate_required("Müller", "Last name", 6).is_none());
        assert!(validate_required("   ", "Last name", 6).is_some());
    }
}
