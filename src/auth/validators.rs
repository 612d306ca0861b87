use super::models::{LoginRequest, RegisterRequest, UpdatePasswordRequest};
use crate::common::validation::{is_plausible_email, require_non_blank};
use crate::common::{ValidationResult, Validator};

/// Argon2 accepts far longer inputs; this just bounds request work.
const MAX_PASSWORD_LEN: usize = 1024;

fn check_email(result: &mut ValidationResult, email: &str) {
    require_non_blank(result, "email", email);
    if !email.trim().is_empty() && !is_plausible_email(email) {
        result.add_error("email", "email must be a valid email address");
    }
}

fn check_new_password(result: &mut ValidationResult, field: &str, password: &str) {
    require_non_blank(result, field, password);
    if password.len() > MAX_PASSWORD_LEN {
        result.add_error(field, "password must not exceed 1024 bytes");
    }
}

pub struct RegisterValidator;

impl Validator<RegisterRequest> for RegisterValidator {
    fn validate(&self, data: &RegisterRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        check_email(&mut result, &data.email);
        check_new_password(&mut result, "password", &data.password);
        result
    }
}

pub struct LoginValidator;

impl Validator<LoginRequest> for LoginValidator {
    fn validate(&self, data: &LoginRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        require_non_blank(&mut result, "email", &data.email);
        require_non_blank(&mut result, "password", &data.password);
        result
    }
}

pub struct PasswordChangeValidator;

impl Validator<UpdatePasswordRequest> for PasswordChangeValidator {
    fn validate(&self, data: &UpdatePasswordRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        require_non_blank(&mut result, "oldPassword", &data.old_password);
        check_new_password(&mut result, "newPassword", &data.new_password);
        result
    }
}
