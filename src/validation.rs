use serde_json::Value;

use crate::{error::AppError, models::Role};

/// Fields every registration must carry, whatever the role.
pub const COMMON_FIELDS: &[&str] = &["name", "email", "password", "role", "gender"];

pub const STUDENT_FIELDS: &[&str] = &[
    "rollNo",
    "cnic",
    "phoneNumber",
    "guardianContact",
    "address",
    "age",
    "city",
];

pub const DRIVER_FIELDS: &[&str] = &[
    "policeClearance",
    "phoneNumber",
    "cnic",
    "licence",
    "address",
    "age",
    "city",
];

pub const BUS_FIELDS: &[&str] = &["busNumber", "status", "driverId"];

pub const COMPLAINT_FIELDS: &[&str] = &["title", "description"];

/// required_fields_for
///
/// The registration fields that must be present for `role`, in the order they are
/// reported when missing. The role is read from the raw body so that an unknown or
/// absent role still gets the common checks.
pub fn required_fields_for(role: Option<&str>) -> Vec<&'static str> {
    let mut fields = COMMON_FIELDS.to_vec();
    match role {
        Some("student") => fields.extend_from_slice(STUDENT_FIELDS),
        Some("driver") => fields.extend_from_slice(DRIVER_FIELDS),
        _ => {}
    }
    fields
}

/// check_required_fields
///
/// Rejects the body with `Missing required field: <field>` for the first field that is
/// absent, `null`, or blank once trimmed. Non-string values count as present.
pub fn check_required_fields(data: &Value, fields: &[&str]) -> Result<(), AppError> {
    for field in fields {
        let missing = match data.get(*field) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if missing {
            return Err(AppError::Validation(format!(
                "Missing required field: {field}"
            )));
        }
    }
    Ok(())
}

/// Deserializes an already-checked body into its typed request.
pub fn parse_body<T: serde::de::DeserializeOwned>(data: Value) -> Result<T, AppError> {
    serde_json::from_value(data).map_err(|e| AppError::Validation(e.to_string()))
}

/// Trims a text field, turning blank input into `None`.
pub fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Emails are stored trimmed and lowercased so uniqueness is case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Roles allowed to hold a given reference.
pub fn ensure_role(actual: Role, expected: Role, field: &str) -> Result<(), AppError> {
    if actual != expected {
        return Err(AppError::Validation(format!(
            "{field} must reference a {expected}"
        )));
    }
    Ok(())
}
