use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::errors::ModelError;
use serde_json::{json, Map, Value};
use service::errors::ServiceError;
use tracing::error;
use uuid::Uuid;

/// Handler error: a service failure translated to an HTTP status.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            ServiceError::Model(ModelError::Markup(errors)) => {
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            ServiceError::Model(ModelError::Required(field)) => {
                (StatusCode::BAD_REQUEST, Json(required_body(field))).into_response()
            }
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND.into_response(),
            e => internal_error(&e),
        }
    }
}

/// `{"errors": {"html": ["The Html field is required."]}}`
fn required_body(field: &str) -> Value {
    let mut label = field.to_string();
    if let Some(first) = label.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    let mut errors = Map::new();
    errors.insert(field.to_string(), json!([format!("The {label} field is required.")]));
    json!({ "errors": errors })
}

/// Log the failure under a fresh correlation id and hand only that id back.
fn internal_error(e: &ServiceError) -> Response {
    let error_code = Uuid::new_v4();
    error!(%error_code, error = %e, "unexpected failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal error", "error_code": error_code })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_per_error_kind() {
        let cases = [
            (ServiceError::Model(ModelError::Required("html")), StatusCode::BAD_REQUEST),
            (ServiceError::Model(ModelError::Markup(models::html::validate("<div>div>"))), StatusCode::BAD_REQUEST),
            (ServiceError::not_found("banner", Uuid::nil()), StatusCode::NOT_FOUND),
            (ServiceError::Inconsistent("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::Db("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).into_response().status(), status);
        }
    }

    #[test]
    fn required_body_names_the_field() {
        assert_eq!(
            required_body("html"),
            json!({ "errors": { "html": ["The Html field is required."] } })
        );
    }
}
