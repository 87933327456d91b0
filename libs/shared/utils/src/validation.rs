//! Single home for the field validation rules shared by every entry point.
//! Each validator appends its findings to a `FieldErrors` accumulator so a
//! form submission reports all offending fields at once.

use chrono::{NaiveDate, Utc};
use regex::Regex;

use shared_models::error::FieldErrors;

fn matches_pattern(pattern: &str, value: &str) -> bool {
    Regex::new(pattern).unwrap().is_match(value)
}

pub fn validate_username(username: &str, errors: &mut FieldErrors) {
    let username = username.trim();
    if username.is_empty() {
        errors.push("username", "Username is required.");
    } else if username.len() < 4 {
        errors.push("username", "Username must be at least 4 characters long.");
    } else if !matches_pattern(r"^[A-Za-z0-9_]+$", username) {
        errors.push(
            "username",
            "Username may only contain letters, numbers and underscores.",
        );
    }
}

pub fn validate_email(email: &str, errors: &mut FieldErrors) {
    let email = email.trim();
    if email.is_empty() {
        errors.push("email", "Email is required.");
    } else if !matches_pattern(r"^[\w.-]+@[\w.-]+\.\w+$", email) {
        errors.push("email", "Enter a valid email address.");
    }
}

/// First and last names: letters and spaces only (accented letters
/// included), at least 2 characters after trimming.
pub fn validate_person_name(field: &str, name: &str, errors: &mut FieldErrors) {
    let name = name.trim();
    if name.is_empty() {
        errors.push(field, "This field is required.");
    } else if !matches_pattern(r"^[A-Za-zÁÉÍÓÚáéíóúÑñ\s]+$", name) {
        errors.push(field, "Only letters and spaces are allowed.");
    } else if name.chars().count() < 2 {
        errors.push(field, "Must be at least 2 characters long.");
    }
}

/// Password policy: >= 8 characters with uppercase, lowercase, digit and
/// symbol classes all present.
pub fn validate_password(password: &str, errors: &mut FieldErrors) {
    if password.is_empty() {
        errors.push("password", "Password is required.");
        return;
    }
    if password.chars().count() < 8 {
        errors.push("password", "Password must be at least 8 characters long.");
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        errors.push("password", "Password must contain an uppercase letter.");
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        errors.push("password", "Password must contain a lowercase letter.");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("password", "Password must contain a digit.");
    }
    if !password.chars().any(|c| "!@#$%^&*(),.?\":{}|<>".contains(c)) {
        errors.push("password", "Password must contain a special character (!@#$...).");
    }
}

pub fn validate_password_confirmation(
    password: &str,
    confirmation: &str,
    errors: &mut FieldErrors,
) {
    if password != confirmation {
        errors.push("password_confirmation", "Passwords do not match.");
    }
}

/// Phone numbers use the local NNNN-NNNN format.
pub fn validate_phone(phone: &str, errors: &mut FieldErrors) {
    let phone = phone.trim();
    if phone.is_empty() {
        errors.push("phone", "Phone is required.");
    } else if !matches_pattern(r"^\d{4}-\d{4}$", phone) {
        errors.push("phone", "Phone must use the format NNNN-NNNN.");
    }
}

pub fn validate_address(address: &str, errors: &mut FieldErrors) {
    let address = address.trim();
    if address.is_empty() {
        errors.push("address", "Address is required.");
    } else if address.chars().count() < 5 {
        errors.push("address", "Address must be at least 5 characters long.");
    }
}

pub fn validate_birth_date(date_of_birth: NaiveDate, errors: &mut FieldErrors) {
    if date_of_birth > Utc::now().date_naive() {
        errors.push("date_of_birth", "Date of birth cannot be in the future.");
    }
}

/// Medical license numbers: 4-15 alphanumeric or hyphen characters.
pub fn validate_license_number(license: &str, errors: &mut FieldErrors) {
    let license = license.trim();
    if license.is_empty() {
        errors.push("license_number", "License number is required.");
    } else if !matches_pattern(r"^[A-Za-z0-9-]{4,15}$", license) {
        errors.push(
            "license_number",
            "License number must be 4-15 alphanumeric or hyphen characters.",
        );
    }
}

pub fn validate_specialty_name(name: &str, errors: &mut FieldErrors) {
    let name = name.trim();
    if name.is_empty() {
        errors.push("name", "Specialty name is required.");
    } else if name.chars().count() < 3 {
        errors.push("name", "Specialty name must be at least 3 characters long.");
    } else if !matches_pattern(r"^[A-Za-zÁÉÍÓÚáéíóúÑñ\s]+$", name) {
        errors.push("name", "Specialty name may only contain letters and spaces.");
    }
}

pub fn validate_appointment_reason(reason: &str, errors: &mut FieldErrors) {
    let reason = reason.trim();
    if reason.is_empty() {
        errors.push("reason", "A reason for the appointment is required.");
    } else if reason.chars().count() < 5 {
        errors.push("reason", "The reason must be at least 5 characters long.");
    }
}
