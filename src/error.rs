use crate::types::SessionStatus;
use thiserror::Error;

/// Errors raised by session operations
///
/// All of them are synchronous and leave the session untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
	#[error("Invalid preset: {0}")]
	InvalidPreset(String),

	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	#[error("Cannot {operation} while session is {status}")]
	InvalidState {
		operation: &'static str,
		status: SessionStatus,
	},
}

impl SessionError {
	pub(crate) fn invalid_state(operation: &'static str, status: SessionStatus) -> Self {
		SessionError::InvalidState { operation, status }
	}
}
