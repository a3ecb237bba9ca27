use passport_sdk::{DenialReason, PassportError, UnknownVariant};
use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    /// Code absent, expired or already consumed. Deliberately uniform.
    #[error("invalid or expired code")]
    InvalidOrExpiredCode,

    #[error("authentication required")]
    AuthenticationRequired,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("access denied: {0:?}")]
    Denied(DenialReason),

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// Candidate draws kept colliding; code space is close to saturation.
    #[error("code generation exhausted after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },

    /// Unique constraint lost to a concurrent insert. Recovered inside the
    /// domain and never returned to callers.
    #[error("unique constraint race on {what}")]
    Conflict { what: &'static str },

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<DenialReason> for DomainError {
    fn from(reason: DenialReason) -> Self {
        Self::Denied(reason)
    }
}

impl From<UnknownVariant> for DomainError {
    fn from(e: UnknownVariant) -> Self {
        Self::database(format!("corrupt row: {e}"))
    }
}

/// Convert domain errors to SDK errors for public API consumption.
impl From<DomainError> for PassportError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidOrExpiredCode => Self::InvalidOrExpiredCode,
            DomainError::AuthenticationRequired => Self::AuthenticationRequired,
            DomainError::RateLimited => Self::RateLimitExceeded,
            DomainError::Denied(reason) => Self::TenantStateDenied(reason),
            DomainError::Validation { field, message } => {
                Self::validation(format!("{field}: {message}"))
            }
            DomainError::NotFound { .. } => Self::NotFound,
            DomainError::GenerationExhausted { .. } => Self::Unavailable,
            DomainError::Conflict { .. } | DomainError::Database { .. } | DomainError::Internal(_) => {
                Self::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdk_mapping_hides_internals() {
        let e: PassportError = DomainError::database("disk on fire").into();
        assert!(matches!(e, PassportError::Internal));
        assert_eq!(e.to_string(), "internal error");
    }

    #[test]
    fn sdk_mapping_keeps_denial_reason() {
        let e: PassportError = DomainError::Denied(DenialReason::InactiveSubscription).into();
        assert_eq!(e.to_string(), "Please update your subscription.");
    }

    #[test]
    fn exhaustion_is_reported_as_unavailable() {
        let e: PassportError = DomainError::GenerationExhausted { attempts: 10 }.into();
        assert!(matches!(e, PassportError::Unavailable));
    }
}
