//! Request extractors whose rejections render through [`AppError`].

use axum::extract::{
    FromRequest, FromRequestParts, Request,
    rejection::{JsonRejection, PathRejection, QueryRejection},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{error::AppError, validation::FieldErrors};

/// JSON object body. A value that does not fit its field's type is a
/// validation error on that field; a body that is not JSON is a 400.
#[derive(Debug)]
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(body) = axum::Json::<Value>::from_request(req, state).await?;
        match serde_json::from_value::<T>(body.clone()) {
            Ok(value) => Ok(AppJson(value)),
            Err(err) => {
                let errors = match &body {
                    Value::Object(object) => field_errors::<T>(object),
                    _ => FieldErrors::new(),
                };
                if errors.is_empty() {
                    Err(AppError::BadRequest(err.to_string()))
                } else {
                    Err(AppError::Validation(errors))
                }
            }
        }
    }
}

/// Decodes each member on its own so every bad field is named. Payload
/// fields are all optional, so a one-member object isolates that member.
fn field_errors<T: DeserializeOwned>(object: &Map<String, Value>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for (name, value) in object {
        let single = Map::from_iter([(name.clone(), value.clone())]);
        if let Err(err) = serde_json::from_value::<T>(Value::Object(single)) {
            errors.add(name.clone(), err.to_string());
        }
    }
    errors
}

/// Path parameters; an id that does not parse names no record, so it is a 404.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "unparseable path parameter");
        AppError::NotFound
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Sample {
        count: Option<i32>,
        day: Option<chrono::NaiveDate>,
        name: Option<String>,
    }

    #[test]
    fn each_bad_member_is_reported() {
        let body = json!({ "count": "many", "day": "2025-13-40", "name": "ok" });
        let Value::Object(object) = body else {
            unreachable!()
        };
        let errors = field_errors::<Sample>(&object);
        assert!(errors.contains("count"));
        assert!(errors.contains("day"));
        assert!(!errors.contains("name"));
    }
}
