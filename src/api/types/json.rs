//! JSON extractor whose rejections use the API error envelope

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::{de::DeserializeOwned, Serialize};

use super::error::{ApiError, ApiErrorType};

const JSON_PARSE_ERROR: &str = "json_parse_error";

/// `axum::Json` with rejections reported as [`ApiError`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        AxumJson::<T>::from_request(req, state)
            .await
            .map(|AxumJson(value)| Json(value))
            .map_err(rejection_to_error)
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    let message = match &rejection {
        JsonRejection::JsonDataError(err) => format!("Invalid request body: {}", err.body_text()),
        JsonRejection::JsonSyntaxError(err) => format!("Malformed JSON: {}", err.body_text()),
        JsonRejection::MissingJsonContentType(_) => {
            "Expected 'Content-Type: application/json'".to_string()
        }
        JsonRejection::BytesRejection(err) => {
            format!("Failed to read request body: {}", err.body_text())
        }
        _ => "Invalid JSON request".to_string(),
    };

    ApiError::new(rejection.status(), ApiErrorType::InvalidRequestError, message)
        .with_code(JSON_PARSE_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct FlagBody {
        flag: String,
    }

    async fn extract(content_type: Option<&str>, body: &str) -> Result<Json<FlagBody>, ApiError> {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        Json::<FlagBody>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn test_extracts_valid_body() {
        let Json(body) = extract(Some("application/json"), r#"{"flag":"flag{x}"}"#)
            .await
            .unwrap();
        assert_eq!(body.flag, "flag{x}");
    }

    #[tokio::test]
    async fn test_missing_field_is_unprocessable() {
        let err = extract(Some("application/json"), r#"{"other":1}"#)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.response.error.message.contains("flag"));
        assert_eq!(err.response.error.code.as_deref(), Some(JSON_PARSE_ERROR));
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let err = extract(None, r#"{"flag":"x"}"#).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(err.response.error.error_type, ApiErrorType::InvalidRequestError);
    }
}
