use crate::errors::ValidationError;
use strum::{AsRefStr, Display};

const PASSWORD_SYMBOLS: &str = "@$!%*?&#";
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr)]
pub enum PasswordStrength {
    Weak,
    Moderate,
    Strong,
}

/// `local@domain.tld`: no whitespace, exactly one `@`, and a dot inside the
/// domain with something on both sides.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

pub fn password_strength(password: &str) -> PasswordStrength {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return PasswordStrength::Weak;
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    if has_upper && has_digit && has_symbol {
        PasswordStrength::Strong
    } else {
        PasswordStrength::Moderate
    }
}

/// Field-level errors for the credential form. Every field is checked so the
/// form can show all problems at once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialErrors {
    pub email: Option<ValidationError>,
    pub password: Option<ValidationError>,
    pub confirm_password: Option<ValidationError>,
}

impl CredentialErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none() && self.confirm_password.is_none()
    }

    pub fn into_result(self) -> Result<(), CredentialErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

fn check_email(email: &str) -> Option<ValidationError> {
    if email.is_empty() {
        Some(ValidationError::MissingEmail)
    } else if !is_valid_email(email) {
        Some(ValidationError::InvalidEmail)
    } else {
        None
    }
}

pub fn validate_sign_in(email: &str, password: &str) -> Result<(), CredentialErrors> {
    CredentialErrors {
        email: check_email(email),
        password: password.is_empty().then_some(ValidationError::MissingPassword),
        confirm_password: None,
    }
    .into_result()
}

pub fn validate_sign_up(
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), CredentialErrors> {
    let password_err = if password.is_empty() {
        Some(ValidationError::MissingPassword)
    } else if password_strength(password) == PasswordStrength::Weak {
        Some(ValidationError::WeakPassword)
    } else {
        None
    };

    let confirm_err = if confirm_password.is_empty() {
        Some(ValidationError::MissingConfirmation)
    } else if password != confirm_password {
        Some(ValidationError::PasswordMismatch)
    } else {
        None
    };

    CredentialErrors {
        email: check_email(email),
        password: password_err,
        confirm_password: confirm_err,
    }
    .into_result()
}

pub fn validate_label(label: &str) -> Result<String, ValidationError> {
    crate::util::trimmed_non_empty(label)
        .map(str::to_string)
        .ok_or(ValidationError::EmptyLabel)
}

pub fn validate_item_text(text: &str) -> Result<String, ValidationError> {
    crate::util::trimmed_non_empty(text)
        .map(str::to_string)
        .ok_or(ValidationError::EmptyText)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("u@example.com"));
        assert!(is_valid_email("first.last@mail.example.co"));
        assert!(!is_valid_email("u@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("u@.com"));
        assert!(!is_valid_email("u@example."));
        assert!(!is_valid_email("u @example.com"));
        assert!(!is_valid_email("u@ex@ample.com"));
    }

    #[test]
    fn test_password_strength_levels() {
        assert_eq!(password_strength("Ab1!"), PasswordStrength::Weak);
        assert_eq!(password_strength("abcdef"), PasswordStrength::Moderate);
        assert_eq!(password_strength("Abcdef1"), PasswordStrength::Moderate);
        assert_eq!(password_strength("Abcde1#"), PasswordStrength::Strong);
        assert_eq!(PasswordStrength::Moderate.to_string(), "Moderate");
    }

    #[test]
    fn test_sign_in_requires_email_and_password() {
        let errs = validate_sign_in("", "").unwrap_err();
        assert_eq!(errs.email, Some(ValidationError::MissingEmail));
        assert_eq!(errs.password, Some(ValidationError::MissingPassword));
        assert!(errs.confirm_password.is_none());

        let errs = validate_sign_in("nope", "x").unwrap_err();
        assert_eq!(errs.email, Some(ValidationError::InvalidEmail));
        assert!(errs.password.is_none());

        // Sign-in does not judge strength.
        assert!(validate_sign_in("u@example.com", "x").is_ok());
    }

    #[test]
    fn test_sign_up_rejects_weak_password_and_mismatch() {
        let errs = validate_sign_up("u@example.com", "abc", "abd").unwrap_err();
        assert!(errs.email.is_none());
        assert_eq!(errs.password, Some(ValidationError::WeakPassword));
        assert_eq!(
            errs.confirm_password,
            Some(ValidationError::PasswordMismatch)
        );

        let errs = validate_sign_up("u@example.com", "abcdef", "").unwrap_err();
        assert!(errs.password.is_none());
        assert_eq!(
            errs.confirm_password,
            Some(ValidationError::MissingConfirmation)
        );
    }

    #[test]
    fn test_sign_up_accepts_moderate_password() {
        assert!(validate_sign_up("u@example.com", "abcdef", "abcdef").is_ok());
    }

    #[test]
    fn test_label_and_text_are_trimmed() {
        assert_eq!(validate_label("  Groceries "), Ok("Groceries".to_string()));
        assert_eq!(validate_label(" "), Err(ValidationError::EmptyLabel));
        assert_eq!(validate_item_text("\tmilk\n"), Ok("milk".to_string()));
        assert_eq!(validate_item_text(""), Err(ValidationError::EmptyText));
    }
}
