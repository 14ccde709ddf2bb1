//! Form validation rules applied before any remote call.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Minimum age to create an account.
pub const MIN_AGE: u32 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("terms of use must be accepted")]
    TermsNotAccepted,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("birth date is required")]
    MissingBirthDate,

    #[error("users must be at least {min} years old (got {age})")]
    Underage { age: u32, min: u32 },

    #[error("passwords do not match")]
    PasswordMismatch,
}

/// Registration form as submitted by the register screen.
#[derive(Clone)]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub birth_date: Option<NaiveDate>,
    pub accepted_terms: bool,
}

impl std::fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("display_name", &self.display_name)
            .field("birth_date", &self.birth_date)
            .field("accepted_terms", &self.accepted_terms)
            .finish()
    }
}

impl RegistrationRequest {
    /// Check the form against `today` and return the birth date on success.
    pub fn validate(&self, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
        if !self.accepted_terms {
            return Err(ValidationError::TermsNotAccepted);
        }
        require("email", &self.email)?;
        require("password", &self.password)?;
        require("display_name", &self.display_name)?;

        let birth_date = self.birth_date.ok_or(ValidationError::MissingBirthDate)?;
        let age = age_on(birth_date, today);
        if age < MIN_AGE {
            return Err(ValidationError::Underage { age, min: MIN_AGE });
        }
        Ok(birth_date)
    }
}

/// Check a new password and its confirmation.
pub fn validate_new_password(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    require("password", password)?;
    require("confirmation", confirmation)?;
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Calendar age in full years on `today`. Zero for birth dates in the future.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request() -> RegistrationRequest {
        RegistrationRequest {
            email: "lea@example.com".to_string(),
            password: "hunter22".to_string(),
            display_name: "lea".to_string(),
            birth_date: Some(date(1998, 4, 12)),
            accepted_terms: true,
        }
    }

    #[test]
    fn test_valid_request_returns_birth_date() {
        assert_eq!(request().validate(date(2025, 1, 1)), Ok(date(1998, 4, 12)));
    }

    #[test]
    fn test_terms_checked_first() {
        let req = RegistrationRequest {
            accepted_terms: false,
            birth_date: None,
            email: String::new(),
            ..request()
        };
        assert_eq!(
            req.validate(date(2025, 1, 1)),
            Err(ValidationError::TermsNotAccepted)
        );
    }

    #[test]
    fn test_blank_fields_rejected() {
        let req = RegistrationRequest {
            display_name: "   ".to_string(),
            ..request()
        };
        assert_eq!(
            req.validate(date(2025, 1, 1)),
            Err(ValidationError::MissingField("display_name"))
        );
    }

    #[test]
    fn test_missing_birth_date_rejected() {
        let req = RegistrationRequest {
            birth_date: None,
            ..request()
        };
        assert_eq!(
            req.validate(date(2025, 1, 1)),
            Err(ValidationError::MissingBirthDate)
        );
    }

    #[test]
    fn test_underage_rejected_until_eighteenth_birthday() {
        let req = RegistrationRequest {
            birth_date: Some(date(2007, 6, 15)),
            ..request()
        };

        assert_eq!(
            req.validate(date(2025, 6, 14)),
            Err(ValidationError::Underage { age: 17, min: 18 })
        );
        assert!(req.validate(date(2025, 6, 15)).is_ok());
    }

    #[test]
    fn test_age_on_future_birth_date_is_zero() {
        assert_eq!(age_on(date(2030, 1, 1), date(2025, 1, 1)), 0);
    }

    #[test]
    fn test_new_password_must_match() {
        assert_eq!(validate_new_password("abc", "abc"), Ok(()));
        assert_eq!(
            validate_new_password("abc", "abd"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            validate_new_password("", ""),
            Err(ValidationError::MissingField("password"))
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        assert!(!format!("{:?}", request()).contains("hunter22"));
    }
}
