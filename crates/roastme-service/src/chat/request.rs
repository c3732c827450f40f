//! Validated chat inputs.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use roastme_core::error::AppError;

/// Longest codename accepted, in characters.
pub const MAX_CODENAME_LENGTH: u64 = 32;
/// Longest message accepted, in characters.
pub const MAX_MESSAGE_LENGTH: u64 = 2000;

/// A participant joining a session.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JoinRequest {
    /// Per-session alias.
    #[validate(length(min = 1, max = 32, message = "Codename must be 1-32 characters"))]
    pub codename: String,
}

impl JoinRequest {
    /// Builds a request with surrounding whitespace stripped.
    pub fn new(codename: &str) -> Self {
        Self {
            codename: codename.trim().to_string(),
        }
    }
}

/// A participant posting a message.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostMessageRequest {
    /// Sender's alias.
    #[validate(length(min = 1, max = 32, message = "Codename must be 1-32 characters"))]
    pub codename: String,
    /// Message text.
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub content: String,
}

impl PostMessageRequest {
    /// Builds a request with surrounding whitespace stripped.
    pub fn new(codename: &str, content: &str) -> Self {
        Self {
            codename: codename.trim().to_string(),
            content: content.trim().to_string(),
        }
    }
}

/// Validates a request, folding field errors into one validation error.
pub fn validate_request<T: Validate>(request: &T) -> Result<(), AppError> {
    request.validate().map_err(validation_error)
}

fn validation_error(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("Invalid {field}"),
            })
        })
        .collect();
    fields.sort();
    AppError::validation(fields.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_trims() {
        let req = JoinRequest::new("  spicy  ");
        assert_eq!(req.codename, "spicy");
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn test_blank_codename_rejected() {
        let err = validate_request(&JoinRequest::new("   ")).unwrap_err();
        assert_eq!(err.kind, roastme_core::error::ErrorKind::Validation);
        assert!(err.message.contains("Codename"));
    }

    #[test]
    fn test_length_limits_count_characters() {
        let name: String = "é".repeat(MAX_CODENAME_LENGTH as usize);
        assert!(validate_request(&JoinRequest::new(&name)).is_ok());
        let too_long = "x".repeat(MAX_CODENAME_LENGTH as usize + 1);
        assert!(validate_request(&JoinRequest::new(&too_long)).is_err());

        let body = "a".repeat(MAX_MESSAGE_LENGTH as usize);
        assert!(validate_request(&PostMessageRequest::new("spicy", &body)).is_ok());
        let body = "a".repeat(MAX_MESSAGE_LENGTH as usize + 1);
        assert!(validate_request(&PostMessageRequest::new("spicy", &body)).is_err());
    }
}
