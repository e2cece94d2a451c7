//! Error type for the table client
//!
//! Every non-success status from the row API maps onto one variant in
//! `RestTableClient::error_from`; transport-level failures arrive through
//! the `reqwest` conversion. Decode problems inside row payloads never
//! surface here, they degrade at the model layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Request never produced a usable response
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 401: missing or rejected API key
    #[error("Authentication required")]
    Unauthorized,

    /// 403: key lacks access to the table or column
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// 404: unknown table, RPC, or row
    #[error("Not found: {0}")]
    NotFound(String),

    /// 400/422: the backend rejected the payload
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any other non-success status
    #[error("Backend error: {0}")]
    Internal(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_backend_detail() {
        let err = ClientError::Validation("price must be non-negative".into());
        assert_eq!(
            err.to_string(),
            "Validation error: price must be non-negative"
        );
        assert_eq!(
            ClientError::Unauthorized.to_string(),
            "Authentication required"
        );
    }
}
