// Error handling utilities for consistent error messages and exit codes
//
// User errors (bad input, unknown ids) exit with code 1. Anything else that
// reaches main is internal (I/O, corrupt data file) and exits with code 2.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct UserError(pub String);

impl UserError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Exit code for an error returned from `run`
pub fn exit_code(error: &anyhow::Error) -> i32 {
    if is_user_error(error) {
        1
    } else {
        2
    }
}

pub fn is_user_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| cause.is::<UserError>())
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), UserError> {
    if value.trim().is_empty() {
        Err(UserError(format!("{} cannot be empty", field_name)))
    } else {
        Ok(())
    }
}

/// Validate a deal id as typed on the command line
pub fn validate_deal_id(id: &str) -> Result<(), UserError> {
    validate_non_empty(id, "Deal ID")?;
    if id.chars().any(char::is_whitespace) {
        return Err(UserError(format!(
            "Invalid deal ID: '{}'. Deal IDs cannot contain whitespace.",
            id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_non_empty() {
        assert!(validate_non_empty("test", "field").is_ok());
        assert!(validate_non_empty("", "field").is_err());
        assert!(validate_non_empty("   ", "field").is_err());
    }

    #[test]
    fn test_validate_deal_id() {
        assert!(validate_deal_id("d1").is_ok());
        assert!(validate_deal_id("k2Hf8sLq0Zp3XyWv").is_ok());
        assert!(validate_deal_id("").is_err());
        assert!(validate_deal_id("d 1").is_err());
    }

    #[test]
    fn test_exit_codes() {
        let user: anyhow::Error = UserError::new("Deal 'x' not found").into();
        assert_eq!(exit_code(&user), 1);

        let wrapped = anyhow::Error::new(UserError::new("bad")).context("while moving");
        assert_eq!(exit_code(&wrapped), 1);

        let internal = anyhow::anyhow!("Failed to read data file");
        assert_eq!(exit_code(&internal), 2);
    }
}
