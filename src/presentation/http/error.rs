use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::application::error::ServiceError;

/// Body of every non-2xx response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    /// A single message, or a list of messages for validation failures.
    #[schema(value_type = Object)]
    pub message: Value,
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self(ServiceError::Internal(e))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ServiceError::BadRequest(rejection.body_text()))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// `Json` whose rejections use the common error body.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

pub fn error_response(status: StatusCode, message: Value) -> Response {
    let body = ErrorBody {
        status_code: status.as_u16(),
        message,
        error: status.canonical_reason().unwrap_or("Error").to_string(),
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            ServiceError::BadRequest(m) => (StatusCode::BAD_REQUEST, Value::String(m)),
            ServiceError::Validation(list) => (
                StatusCode::BAD_REQUEST,
                Value::Array(list.into_iter().map(Value::String).collect()),
            ),
            ServiceError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, Value::String(m)),
            ServiceError::Forbidden(m) => (StatusCode::FORBIDDEN, Value::String(m)),
            ServiceError::NotFound(m) => (StatusCode::NOT_FOUND, Value::String(m)),
            ServiceError::Conflict(m) => (StatusCode::CONFLICT, Value::String(m)),
            ServiceError::Failed { message, cause } => {
                tracing::error!(error = ?cause, public = message, "request_failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Value::String(message.to_string()),
                )
            }
            ServiceError::Internal(e) => {
                tracing::error!(error = ?e, "request_failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Value::String("Internal server error".into()),
                )
            }
        };
        error_response(status, message)
    }
}

/// Flattens validator output into one message per failed rule, sorted by field.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect()
}

pub fn validate<T: Validate>(dto: &T) -> ApiResult<()> {
    dto.validate()
        .map_err(|e| ApiError(ServiceError::Validation(validation_messages(&e))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[derive(Validate)]
    struct Sample {
        #[validate(email(message = "email must be an email"))]
        email: String,
        #[validate(length(min = 2, message = "name is too short"))]
        name: String,
    }

    async fn body_of(resp: Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn service_errors_map_to_status_and_reason() {
        let resp = ApiError(ServiceError::not_found("Product with ID x not found")).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = body_of(resp).await;
        assert_eq!(body["statusCode"], 404);
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["message"], "Product with ID x not found");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let resp = ApiError(ServiceError::Internal(anyhow::anyhow!("pool timed out"))).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(resp).await["message"], "Internal server error");

        let io = std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connect 10.0.0.5:5432 refused",
        );
        let db = anyhow::Error::new(sqlx::Error::Io(io));
        assert!(db.chain().count() > 1);
        let resp = ApiError(ServiceError::Internal(db)).into_response();
        let body = body_of(resp).await;
        assert_eq!(body["message"], "Internal server error");
        assert!(!body.to_string().contains("10.0.0.5"));

        let wrapped = anyhow::anyhow!("pool timed out").context("duplicate key value");
        let resp = ApiError(ServiceError::Internal(wrapped)).into_response();
        assert_eq!(body_of(resp).await["message"], "Internal server error");
    }

    #[tokio::test]
    async fn failed_errors_show_only_their_message() {
        let resp = ApiError(ServiceError::Failed {
            message: "Could not create customer account",
            cause: anyhow::anyhow!("relation \"customers\" does not exist"),
        })
        .into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_of(resp).await["message"],
            "Could not create customer account"
        );
    }

    #[tokio::test]
    async fn validation_failures_list_every_message() {
        let dto = Sample {
            email: "nope".into(),
            name: "x".into(),
        };
        let Err(err) = validate(&dto) else {
            panic!("expected validation failure");
        };
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_of(resp).await;
        assert_eq!(
            body["message"],
            serde_json::json!(["email must be an email", "name is too short"])
        );
    }
}
