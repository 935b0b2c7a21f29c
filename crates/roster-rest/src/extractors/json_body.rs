//! JSON body extractor with decode errors mapped to the API error shape.
//!
//! Unlike `axum::Json`, the body is decoded whatever its `Content-Type`, and
//! every failure is a 400 `DECODE_ERROR` rather than a mix of 400/415/422.

use crate::responses::AppError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use roster_core::RosterError;
use serde::de::DeserializeOwned;

/// JSON extractor that reports failures as [`RosterError::Decode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T> std::ops::Deref for JsonBody<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| RosterError::decode(rejection.body_text()))?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| AppError(RosterError::decode(e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use roster_core::NewUser;

    async fn extract(body: &str) -> Result<JsonBody<NewUser>, AppError> {
        let request = Request::builder()
            .method("POST")
            .uri("/users")
            .body(Body::from(body.to_string()))
            .unwrap();
        JsonBody::<NewUser>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn test_accepts_body_without_content_type() {
        let JsonBody(user) = extract(
            r#"{"name":"Ann","surname":"Lee","floor":3,"status":"active","dob":"1990-01-01","dateAdded":"2024-01-01"}"#,
        )
        .await
        .unwrap();
        assert_eq!(user.surname, "Lee");
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let err = extract("{not json").await.unwrap_err();
        assert!(matches!(err.0, RosterError::Decode(_)));
        assert_eq!(err.0.status_code(), 400);
    }

    #[tokio::test]
    async fn test_wrong_type_is_decode_error() {
        let err = extract(r#"{"name":"Ann","surname":"Lee","floor":"three","status":"a","dob":"1990-01-01","date_added":"2024-01-01"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err.0, RosterError::Decode(_)));
    }
}
