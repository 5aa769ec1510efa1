//! View models. Each one owns the state a screen shows and is changed
//! only through its own methods; every server round trip is awaited inline.

pub mod admin;
pub mod login;
pub mod user;

use crate::domain::ports::ApiError;

/// What became of a user-triggered operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The call went through and the view reflects the reply.
    Applied,
    /// The call was made and failed.
    Failed,
    /// Validation or gating stopped the operation before any call.
    Blocked,
    /// The user declined the confirmation.
    Cancelled,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// Server supplied `error` text, or `fallback`.
pub(crate) fn error_text(error: &ApiError, fallback: &str) -> String {
    error.server_message().unwrap_or(fallback).to_string()
}
