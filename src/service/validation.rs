use crate::error::ServiceError;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Required text field: `None` passes through, blank is rejected.
pub fn required_text(field: &str, value: Option<String>) -> Result<Option<String>, ServiceError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Err(ServiceError::validation(format!("{field} must not be blank"))),
        other => Ok(other),
    }
}

/// Text that must be present and not blank.
pub fn non_empty(field: &str, value: String) -> Result<String, ServiceError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ServiceError::validation(format!("{field} is required")));
    }
    Ok(value)
}

pub fn email(email: &str) -> Result<(), ServiceError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ServiceError::validation("A valid email is required"))
    }
}

pub fn password(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// UK National Insurance number, e.g. `QQ 12 34 56 C`. Returned without spaces, upper-cased.
pub fn ni_number(raw: &str) -> Result<String, ServiceError> {
    let normalized: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    let chars: Vec<char> = normalized.chars().collect();
    let valid = chars.len() == 9
        && chars[..2].iter().all(|c| c.is_ascii_alphabetic())
        && chars[2..8].iter().all(|c| c.is_ascii_digit())
        && matches!(chars[8], 'A'..='D');

    if valid {
        Ok(normalized)
    } else {
        Err(ServiceError::validation("ni_number must look like QQ123456C"))
    }
}

pub fn pay_amount(amount: f64) -> Result<(), ServiceError> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(ServiceError::validation("pay_amount must be zero or more"))
    }
}

pub fn hours_per_week(hours: f64) -> Result<(), ServiceError> {
    if hours.is_finite() && hours > 0.0 && hours <= 168.0 {
        Ok(())
    } else {
        Err(ServiceError::validation("hours_per_week must be between 0 and 168"))
    }
}
