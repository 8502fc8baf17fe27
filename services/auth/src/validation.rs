//! Input validation for the sign-up and sign-in forms

use common::validation::{ValidationErrors, require};
use regex::Regex;
use std::sync::OnceLock;

use crate::models::{LoginCredentials, SignupRequest};

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    require("Username", username)?;

    if username.chars().count() > 64 {
        return Err("Username must be at most 64 characters long".to_string());
    }

    if username.chars().any(char::is_whitespace) {
        return Err("Username cannot contain spaces".to_string());
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    require("Email", email)?;

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email.trim()) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Check every sign-up field before the request is attempted
pub fn validate_signup(request: &SignupRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check("username", validate_username(&request.username));
    errors.check("name", require("Name", &request.name));
    errors.check("email", validate_email(&request.email));
    errors.check("password", validate_password(&request.password));
    errors.into_result(())
}

/// Check the sign-in fields before the request is attempted
pub fn validate_credentials(credentials: &LoginCredentials) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check("username", require("Username", &credentials.username));
    errors.check("password", validate_password(&credentials.password));
    errors.into_result(())
}
