use crate::models::Role;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced by backend calls and the pre-submission guards.
///
/// Guard failures (`Role`, `Validation`) are raised before any network call;
/// reconciliation failures never appear here at all, the session manager
/// absorbs them.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Action attempted by a role not permitted to perform it
    #[error("{role} accounts cannot {action}")]
    Role { action: &'static str, role: &'static str },

    /// Input rejected before submission (amount out of bounds, bad state)
    #[error("{0}")]
    Validation(String),

    /// The backend already holds an active offer for this buyer and property
    #[error("you already have an active offer for this property")]
    DuplicateOffer,

    /// Processor-reported payment failure; the offer stays accepted and payable
    #[error("payment failed: {0}")]
    Payment(String),

    /// Any other non-2xx backend response
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Backend unreachable or the response could not be read
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    pub(crate) fn role(action: &'static str, role: Role) -> Self {
        ApiError::Role {
            action,
            role: role.as_str(),
        }
    }

    /// Whether the caller may sensibly retry the same call unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Payment(_))
    }

    /// Map a non-2xx response body to the taxonomy. The duplicate-offer
    /// conflict is the one backend signal with its own variant, so the caller
    /// can present it distinctly from generic validation failures.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        if status == StatusCode::CONFLICT && parsed.code.as_deref() == Some("DUPLICATE_OFFER") {
            return ApiError::DuplicateOffer;
        }
        let message = parsed
            .error
            .or(parsed.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

/// Error payload shape the backend uses; fields vary by endpoint
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
    code: Option<String>,
}
