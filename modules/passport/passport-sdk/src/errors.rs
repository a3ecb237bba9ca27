//! Error types for the passport SDK.

use thiserror::Error;

/// Why a tenant-scoped request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Authenticated identity without an account membership.
    NoAccount,
    /// Subscription is neither active nor trialing.
    InactiveSubscription,
    /// Role lacks admin-level access.
    InsufficientRole,
    /// Actor may not manage the target member.
    CannotManage,
}

impl DenialReason {
    /// User-actionable remediation; never exposes internal state.
    #[must_use]
    pub const fn remediation(self) -> &'static str {
        match self {
            Self::NoAccount => "Please complete your account setup.",
            Self::InactiveSubscription => "Please update your subscription.",
            Self::InsufficientRole | Self::CannotManage => {
                "You don't have permission to do that. Contact an account admin."
            }
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum PassportError {
    #[error("invalid or expired code")]
    InvalidOrExpiredCode,

    #[error("authentication required")]
    AuthenticationRequired,

    #[error("too many attempts, try again later")]
    RateLimitExceeded,

    #[error("{}", .0.remediation())]
    TenantStateDenied(DenialReason),

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("not found")]
    NotFound,

    #[error("service temporarily unavailable")]
    Unavailable,

    #[error("internal error")]
    Internal,
}

impl PassportError {
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// A stored string did not match any variant of a closed enum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    #[must_use]
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
