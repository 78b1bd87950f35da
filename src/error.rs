use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

/// Failure of a service operation. The message is safe to show to callers;
/// raw database detail is logged where the failure is classified and never
/// carried in here.
#[derive(Debug, Display, PartialEq)]
pub enum ServiceError {
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "{}", _0)]
    Conflict(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "{}", _0)]
    Unauthorized(String),
    #[display(fmt = "{}", _0)]
    Forbidden(String),
    #[display(fmt = "{}", _0)]
    TransactionFailure(String),
    #[display(fmt = "{}", _0)]
    Internal(String),
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::Conflict(_) => "CONFLICT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::TransactionFailure(_) => "TRANSACTION_FAILURE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "NOT_FOUND")]
    pub code: String,
    #[schema(example = "Employee not found")]
    pub message: String,
}

/// `{"success": false, "error": {...}}`
#[derive(Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::TransactionFailure(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        })
    }
}

/// Converts database errors at an operation boundary.
///
/// Unique-constraint violations become `CONFLICT`; everything else is a
/// `TRANSACTION_FAILURE` carrying only the operation-level `message`.
pub trait DbResultExt<T> {
    fn or_tx_failure(self, message: &'static str) -> Result<T, ServiceError>;
}

impl<T> DbResultExt<T> for Result<T, sqlx::Error> {
    fn or_tx_failure(self, message: &'static str) -> Result<T, ServiceError> {
        self.map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    warn!(error = %e, "Write rejected by uniqueness constraint");
                    return ServiceError::Conflict("A conflicting record already exists".into());
                }
            }
            error!(error = %e, "{}", message);
            ServiceError::TransactionFailure(message.to_string())
        })
    }
}
