use axum::http::StatusCode;
use passport_sdk::DenialReason;

use super::problem::Problem;
use crate::domain::error::DomainError;

const OPAQUE_DETAIL: &str = "An internal error occurred";

const fn denial_code(reason: DenialReason) -> &'static str {
    match reason {
        DenialReason::NoAccount => "PASSPORT_ACCOUNT_REQUIRED",
        DenialReason::InactiveSubscription => "PASSPORT_SUBSCRIPTION_INACTIVE",
        DenialReason::InsufficientRole => "PASSPORT_INSUFFICIENT_ROLE",
        DenialReason::CannotManage => "PASSPORT_CANNOT_MANAGE",
    }
}

impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        let trace_id = tracing::Span::current()
            .id()
            .map(|id| id.into_u64().to_string());

        let (status, code, title, detail) = match &e {
            DomainError::InvalidOrExpiredCode => (
                StatusCode::UNAUTHORIZED,
                "PASSPORT_INVALID_CODE",
                "Unauthorized",
                "Try another code.".to_owned(),
            ),
            DomainError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                "PASSPORT_AUTHENTICATION_REQUIRED",
                "Unauthorized",
                "Please sign in.".to_owned(),
            ),
            DomainError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "PASSPORT_RATE_LIMITED",
                "Too Many Requests",
                "Try again later.".to_owned(),
            ),
            DomainError::Denied(reason) => (
                StatusCode::FORBIDDEN,
                denial_code(*reason),
                "Forbidden",
                reason.remediation().to_owned(),
            ),
            DomainError::Validation { field, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "PASSPORT_VALIDATION",
                "Unprocessable Entity",
                format!("Validation error on '{field}': {message}"),
            ),
            DomainError::NotFound { entity, .. } => (
                StatusCode::NOT_FOUND,
                "PASSPORT_NOT_FOUND",
                "Not Found",
                format!("{entity} not found"),
            ),
            DomainError::GenerationExhausted { attempts } => {
                tracing::error!(attempts, "code generation exhausted");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PASSPORT_UNAVAILABLE",
                    "Service Unavailable",
                    "Please try again in a moment.".to_owned(),
                )
            }
            DomainError::Conflict { .. }
            | DomainError::Database { .. }
            | DomainError::Internal(_) => {
                tracing::error!(error = ?e, "internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PASSPORT_INTERNAL",
                    "Internal Server Error",
                    OPAQUE_DETAIL.to_owned(),
                )
            }
        };

        let mut problem = Problem::new(status, title, detail)
            .with_type(format!("https://errors.cyberfabric.io/{code}"))
            .with_code(code);

        if let Some(id) = trace_id {
            problem = problem.with_trace_id(id);
        }

        problem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn status_mapping() {
        let cases = [
            (DomainError::InvalidOrExpiredCode, StatusCode::UNAUTHORIZED),
            (DomainError::AuthenticationRequired, StatusCode::UNAUTHORIZED),
            (DomainError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (
                DomainError::Denied(DenialReason::NoAccount),
                StatusCode::FORBIDDEN,
            ),
            (
                DomainError::validation("title", "can't be blank"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                DomainError::not_found("Article", Uuid::nil()),
                StatusCode::NOT_FOUND,
            ),
            (
                DomainError::GenerationExhausted { attempts: 10 },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                DomainError::database("boom"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let p = Problem::from(err);
            assert_eq!(p.status, status, "{}", p.code);
        }
    }

    #[test]
    fn denial_names_remediation() {
        let p = Problem::from(DomainError::Denied(DenialReason::InactiveSubscription));
        assert_eq!(p.code, "PASSPORT_SUBSCRIPTION_INACTIVE");
        assert_eq!(p.detail, "Please update your subscription.");
    }

    #[test]
    fn internal_errors_are_opaque() {
        let p = Problem::from(DomainError::database("relation \"users\" does not exist"));
        assert_eq!(p.detail, OPAQUE_DETAIL);
        assert!(!p.detail.contains("users"));
    }

    #[test]
    fn rate_limit_carries_no_quota_details() {
        let p = Problem::from(DomainError::RateLimited);
        assert_eq!(p.detail, "Try again later.");
    }
}
